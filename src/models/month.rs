use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::fmt;
use std::str::FromStr;

/// Calendar month identifier rendered as `YYYY-MM`. Gates the once-per-month
/// allowance posting and report sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthStamp {
    year: i32,
    month: u32,
}

impl MonthStamp {
    pub fn new(year: i32, month: u32) -> Result<Self, String> {
        if !(1..=12).contains(&month) {
            return Err(format!("Invalid month {}. Expected 1-12", month));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn of_datetime(datetime: NaiveDateTime) -> Self {
        Self::of(datetime.date())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        // month is validated on construction
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or_default()
    }

    pub fn next(&self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// Suffix used by exported artefacts, e.g. `2024_02`
    pub fn file_suffix(&self) -> String {
        format!("{}_{:02}", self.year, self.month)
    }

    /// Human title, e.g. `February 2024`
    pub fn long_name(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

impl fmt::Display for MonthStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthStamp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("Invalid month '{}'. Please use YYYY-MM.", s);
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        Self::new(year, month).map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_pads_month() {
        let stamp = MonthStamp::new(2024, 2).unwrap();
        assert_eq!(stamp.to_string(), "2024-02");
        assert_eq!(stamp.file_suffix(), "2024_02");
    }

    #[test]
    fn test_parse_round_trip() {
        let stamp: MonthStamp = "2024-11".parse().unwrap();
        assert_eq!(stamp.year(), 2024);
        assert_eq!(stamp.month(), 11);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("2024-13".parse::<MonthStamp>().is_err());
        assert!("2024/01".parse::<MonthStamp>().is_err());
        assert!("24-01".parse::<MonthStamp>().is_err());
        assert!("".parse::<MonthStamp>().is_err());
    }

    #[test]
    fn test_next_rolls_over_year() {
        let december = MonthStamp::new(2023, 12).unwrap();
        assert_eq!(december.next(), MonthStamp::new(2024, 1).unwrap());
        let june = MonthStamp::new(2024, 6).unwrap();
        assert_eq!(june.next().to_string(), "2024-07");
    }

    #[test]
    fn test_of_date_and_long_name() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let stamp = MonthStamp::of(date);
        assert_eq!(stamp.to_string(), "2024-02");
        assert_eq!(stamp.long_name(), "February 2024");
        assert_eq!(stamp.first_day(), NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }
}
