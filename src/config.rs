use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "finance.db";
pub const DEFAULT_OUT_DIR: &str = ".";

/// Process-level settings resolved from flags and environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    /// Where CSV exports and charts are written
    pub out_dir: PathBuf,
    pub run_cycle: bool,
}

impl AppConfig {
    pub fn new(db_path: PathBuf, out_dir: PathBuf, skip_cycle: bool) -> Self {
        Self {
            db_path,
            out_dir,
            run_cycle: !skip_cycle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_cycle_disables_cycle() {
        let config = AppConfig::new(PathBuf::from(DEFAULT_DB_PATH), PathBuf::from(DEFAULT_OUT_DIR), true);
        assert!(!config.run_cycle);
        assert_eq!(config.db_path, PathBuf::from("finance.db"));
    }
}
