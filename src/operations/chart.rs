use crate::db::ledger_repository;
use crate::error::Result;
use crate::models::month::MonthStamp;
use crate::models::transaction::Transaction;
use chrono::NaiveDateTime;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::{Color, Style},
    symbols,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::info;

const WIDTH: f64 = 1000.0;
const HEIGHT: f64 = 600.0;
const MARGIN_LEFT: f64 = 90.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 60.0;
const MARGIN_BOTTOM: f64 = 90.0;
const LINE_COLOR: &str = "#3fa9f5";

#[derive(Debug, Clone, PartialEq)]
pub struct BalancePoint {
    pub timestamp: NaiveDateTime,
    pub balance: Decimal,
}

/// A rendered chart ready to be attached or written to disk
#[derive(Debug, Clone)]
pub struct ChartImage {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Running balance over the month's transactions, starting from zero
pub fn balance_trend(transactions: &[Transaction]) -> Vec<BalancePoint> {
    let mut balance = Decimal::ZERO;
    transactions
        .iter()
        .map(|tx| {
            balance = balance.saturating_add(tx.amount);
            BalancePoint {
                timestamp: tx.timestamp,
                balance,
            }
        })
        .collect()
}

pub fn chart_file_name(month: MonthStamp) -> String {
    format!("balance_{}.svg", month.file_suffix())
}

fn value_bounds(points: &[BalancePoint]) -> (f64, f64) {
    let values = points.iter().map(|p| p.balance.to_f64().unwrap_or(0.0));
    let min = values.clone().fold(0.0_f64, f64::min);
    let max = values.fold(0.0_f64, f64::max);
    if (max - min).abs() < f64::EPSILON {
        (min - 1.0, max + 1.0)
    } else {
        (min, max)
    }
}

/// Renders the balance trend as an SVG document
pub fn render_svg(month: MonthStamp, points: &[BalancePoint]) -> String {
    let plot_w = WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let plot_h = HEIGHT - MARGIN_TOP - MARGIN_BOTTOM;
    let (min, max) = value_bounds(points);
    let x_at = |i: usize| {
        if points.len() <= 1 {
            MARGIN_LEFT + plot_w / 2.0
        } else {
            MARGIN_LEFT + plot_w * i as f64 / (points.len() - 1) as f64
        }
    };
    let y_at = |value: f64| MARGIN_TOP + plot_h * (1.0 - (value - min) / (max - min));

    let mut svg = format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = WIDTH,
        h = HEIGHT
    );
    svg.push('\n');
    svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"#1a1a1a\"/>\n");
    svg.push_str(&format!(
        "<text x=\"{}\" y=\"35\" fill=\"#ffffff\" font-family=\"sans-serif\" font-size=\"22\" text-anchor=\"middle\">Balance Trend - {}</text>\n",
        WIDTH / 2.0,
        month
    ));

    // horizontal grid with value labels
    for step in 0..=4 {
        let value = min + (max - min) * step as f64 / 4.0;
        let y = y_at(value);
        svg.push_str(&format!(
            "<line x1=\"{:.1}\" y1=\"{y:.1}\" x2=\"{:.1}\" y2=\"{y:.1}\" stroke=\"#ffffff\" stroke-opacity=\"0.2\"/>\n",
            MARGIN_LEFT,
            WIDTH - MARGIN_RIGHT,
        ));
        svg.push_str(&format!(
            "<text x=\"{:.1}\" y=\"{:.1}\" fill=\"#cccccc\" font-family=\"sans-serif\" font-size=\"12\" text-anchor=\"end\">{:.2}</text>\n",
            MARGIN_LEFT - 8.0,
            y + 4.0,
            value
        ));
    }

    if !points.is_empty() {
        let coords: Vec<(f64, f64)> = points
            .iter()
            .enumerate()
            .map(|(i, p)| (x_at(i), y_at(p.balance.to_f64().unwrap_or(0.0))))
            .collect();
        let baseline = y_at(min);
        let line: Vec<String> = coords.iter().map(|(x, y)| format!("{:.1},{:.1}", x, y)).collect();
        let area = format!(
            "{:.1},{:.1} {} {:.1},{:.1}",
            coords[0].0,
            baseline,
            line.join(" "),
            coords[coords.len() - 1].0,
            baseline
        );

        svg.push_str(&format!(
            "<polygon points=\"{}\" fill=\"{}\" fill-opacity=\"0.3\"/>\n",
            area, LINE_COLOR
        ));
        svg.push_str(&format!(
            "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>\n",
            line.join(" "),
            LINE_COLOR
        ));

        let label_y = HEIGHT - MARGIN_BOTTOM + 20.0;
        for ((x, y), point) in coords.iter().zip(points) {
            svg.push_str(&format!(
                "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"4\" fill=\"{}\"/>\n",
                x, y, LINE_COLOR
            ));
            svg.push_str(&format!(
                "<text x=\"{x:.1}\" y=\"{label_y:.1}\" fill=\"#cccccc\" font-family=\"sans-serif\" font-size=\"11\" text-anchor=\"end\" transform=\"rotate(-45 {x:.1} {label_y:.1})\">{}</text>\n",
                point.timestamp.format("%Y-%m-%d")
            ));
        }
    }

    svg.push_str("</svg>\n");
    svg
}

/// Builds the month's chart from the ledger
pub fn build_balance_chart(conn: &Connection, month: MonthStamp) -> Result<ChartImage> {
    let transactions = ledger_repository::get_monthly_transactions(conn, month)?;
    let points = balance_trend(&transactions);
    Ok(ChartImage {
        file_name: chart_file_name(month),
        content_type: "image/svg+xml",
        bytes: render_svg(month, &points).into_bytes(),
    })
}

/// Writes the month's chart into `out_dir` and returns it with its path
pub fn write_balance_chart(
    conn: &Connection,
    month: MonthStamp,
    out_dir: &Path,
) -> Result<(PathBuf, ChartImage)> {
    let chart = build_balance_chart(conn, month)?;
    fs::create_dir_all(out_dir)?;
    let path = out_dir.join(&chart.file_name);
    fs::write(&path, &chart.bytes)?;
    info!(path = %path.display(), "chart written");
    Ok((path, chart))
}

/// Shows the balance trend in the terminal until `q` or `Esc` is pressed
pub fn preview_balance_chart(conn: &Connection, month: MonthStamp) -> Result<()> {
    let transactions = ledger_repository::get_monthly_transactions(conn, month)?;
    let trend = balance_trend(&transactions);
    let data: Vec<(f64, f64)> = trend
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.balance.to_f64().unwrap_or(0.0)))
        .collect();
    let (min, max) = value_bounds(&trend);
    let title = format!("Balance Trend - {}  (press q to exit)", month);
    let first = trend
        .first()
        .map(|p| p.timestamp.format("%m-%d").to_string())
        .unwrap_or_default();
    let last = trend
        .last()
        .map(|p| p.timestamp.format("%m-%d").to_string())
        .unwrap_or_default();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let result = (|| -> io::Result<()> {
        let backend = ratatui::backend::CrosstermBackend::new(io::stdout());
        let mut terminal = ratatui::Terminal::new(backend)?;

        loop {
            terminal.draw(|frame| {
                let dataset = Dataset::default()
                    .name("balance")
                    .marker(symbols::Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(Color::Cyan))
                    .data(&data);
                let chart = Chart::new(vec![dataset])
                    .block(Block::default().title(title.as_str()).borders(Borders::ALL))
                    .x_axis(
                        Axis::default()
                            .title("Date")
                            .bounds([0.0, (data.len().max(2) - 1) as f64])
                            .labels(vec![Span::raw(first.clone()), Span::raw(last.clone())]),
                    )
                    .y_axis(
                        Axis::default()
                            .title("Balance (€)")
                            .bounds([min, max])
                            .labels(vec![
                                Span::raw(format!("{:.2}", min)),
                                Span::raw(format!("{:.2}", max)),
                            ]),
                    );
                frame.render_widget(chart, frame.area());
            })?;

            if event::poll(std::time::Duration::from_millis(250))? {
                match event::read()? {
                    Event::Key(key) if key.code == KeyCode::Char('q') => break,
                    Event::Key(key) if key.code == KeyCode::Esc => break,
                    _ => {}
                }
            }
        }
        Ok(())
    })();

    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)?;

    Ok(result?)
}
