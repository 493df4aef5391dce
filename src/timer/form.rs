//! Companion fields of a timesheet entry
//!
//! The timer only knows how long an interval lasted; details, category,
//! shift and work date come from the form the user fills in before Time Out.

use crate::backend::TimesheetEntry;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A required form field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryField {
    Details,
    Category,
    Shift,
}

impl std::fmt::Display for EntryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryField::Details => write!(f, "Details"),
            EntryField::Category => write!(f, "Category"),
            EntryField::Shift => write!(f, "Shift"),
        }
    }
}

/// Form state accompanying a timed interval
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryForm {
    pub work_date: NaiveDate,
    pub details: String,
    pub category_id: Option<i64>,
    pub shift_id: Option<i64>,
}

impl EntryForm {
    /// Empty form for `work_date`
    pub fn new(work_date: NaiveDate) -> Self {
        Self {
            work_date,
            details: String::new(),
            category_id: None,
            shift_id: None,
        }
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    pub fn category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn shift(mut self, shift_id: i64) -> Self {
        self.shift_id = Some(shift_id);
        self
    }

    /// Blank required fields, in form order
    pub fn missing_fields(&self) -> Vec<EntryField> {
        let mut missing = Vec::new();
        if self.details.trim().is_empty() {
            missing.push(EntryField::Details);
        }
        if self.category_id.is_none() {
            missing.push(EntryField::Category);
        }
        if self.shift_id.is_none() {
            missing.push(EntryField::Shift);
        }
        missing
    }

    /// Build the entry to submit, or report the blank fields
    pub fn to_entry(
        &self,
        hours_worked: impl Into<String>,
        user_id: i64,
    ) -> Result<TimesheetEntry, Vec<EntryField>> {
        match (self.category_id, self.shift_id, self.missing_fields().is_empty()) {
            (Some(category_id), Some(shift_id), true) => Ok(TimesheetEntry {
                work_date: self.work_date,
                hours_worked: hours_worked.into(),
                details: self.details.clone(),
                category_id,
                shift_id,
                user_id,
            }),
            _ => Err(self.missing_fields()),
        }
    }
}

/// Render a field list as "Details, Category, Shift"
pub fn describe_fields(fields: &[EntryField]) -> String {
    fields
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
