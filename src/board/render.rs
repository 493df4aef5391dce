//! Text rendering of the board's lists (table, json, csv)

use super::{BoardError, BoardResult};
use crate::backend::{Shift, TaskCategory, Timesheet, UserSummary};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Output format of list commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!(
                "unknown output format '{}', expected table, json or csv",
                other
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

const TIMESHEET_HEADERS: [&str; 7] = [
    "ID",
    "Date",
    "Hours Worked",
    "Details",
    "Category",
    "Shift",
    "User",
];

/// Render timesheets with category, shift and user names resolved
///
/// JSON keeps the raw records; table and csv show names, falling back to
/// the id when a reference list does not know it.
pub fn render_timesheets(
    entries: &[Timesheet],
    categories: &[TaskCategory],
    shifts: &[Shift],
    users: &[UserSummary],
    format: OutputFormat,
) -> BoardResult<String> {
    if format == OutputFormat::Json {
        return Ok(serde_json::to_string_pretty(entries)?);
    }

    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|ts| {
            vec![
                opt_id(ts.timesheet_id),
                ts.work_date.clone().unwrap_or_default(),
                ts.hours_worked.clone().unwrap_or_default(),
                ts.details.clone().unwrap_or_default(),
                resolve(ts.category_id, |id| {
                    categories
                        .iter()
                        .find(|c| c.category_id == id)
                        .map(|c| c.category_name.clone())
                }),
                resolve(ts.shift_id, |id| {
                    shifts
                        .iter()
                        .find(|s| s.shift_id == id)
                        .map(|s| s.shift_name.clone())
                }),
                resolve(ts.user_id, |id| {
                    users.iter().find(|u| u.user_id == id).map(UserSummary::label)
                }),
            ]
        })
        .collect();

    match format {
        OutputFormat::Csv => csv_text(&TIMESHEET_HEADERS, &rows),
        _ if rows.is_empty() => Ok("No timesheets found.".to_string()),
        _ => Ok(table_text(&TIMESHEET_HEADERS, &rows)),
    }
}

/// Reference list (categories, shifts, users) as `ID` / `Name` pairs
pub trait ReferenceRow: Serialize {
    fn id(&self) -> i64;
    fn name(&self) -> String;
}

impl ReferenceRow for TaskCategory {
    fn id(&self) -> i64 {
        self.category_id
    }

    fn name(&self) -> String {
        self.category_name.clone()
    }
}

impl ReferenceRow for Shift {
    fn id(&self) -> i64 {
        self.shift_id
    }

    fn name(&self) -> String {
        self.shift_name.clone()
    }
}

impl ReferenceRow for UserSummary {
    fn id(&self) -> i64 {
        self.user_id
    }

    fn name(&self) -> String {
        self.label()
    }
}

pub fn render_reference<T: ReferenceRow>(items: &[T], format: OutputFormat) -> BoardResult<String> {
    let headers = ["ID", "Name"];
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| vec![item.id().to_string(), item.name()])
        .collect();

    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(items)?),
        OutputFormat::Csv => csv_text(&headers, &rows),
        OutputFormat::Table if rows.is_empty() => Ok("Nothing to show.".to_string()),
        OutputFormat::Table => Ok(table_text(&headers, &rows)),
    }
}

fn opt_id(id: Option<i64>) -> String {
    id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}

fn resolve(id: Option<i64>, lookup: impl Fn(i64) -> Option<String>) -> String {
    match id {
        Some(id) => lookup(id).unwrap_or_else(|| id.to_string()),
        None => "-".to_string(),
    }
}

fn csv_text(headers: &[&str], rows: &[Vec<String>]) -> BoardResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(headers)?;
    for row in rows {
        writer.write_record(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| BoardError::Render(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| BoardError::Render(e.to_string()))
}

fn table_text(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
    let mut out = vec![line(headers.to_vec()), "-".repeat(total)];
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}
