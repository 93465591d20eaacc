//! Domain model for the sheet catalog.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One catalog entry: a downloadable exam sheet and its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sheet {
    /// Display title.
    pub name: String,
    /// Grouping label, e.g. "May 2024 session".
    #[serde(default)]
    pub session: String,
    /// Year-month identifier ("2024-01"), used only for ordering.
    #[serde(default)]
    pub period: String,
    /// Facet labels; insertion order is preserved for display.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Primary asset filename; unique within the catalog and used as the
    /// lookup key by the detail and solution flows.
    pub file: String,
    /// Solution filenames; empty means no solutions are offered.
    #[serde(default)]
    pub solutions: Vec<String>,
}

impl Sheet {
    /// Parse `period` as the first day of the indicated month.
    ///
    /// Missing and malformed periods return `None`; such sheets sort below
    /// every dated sheet.
    pub fn period_date(&self) -> Option<NaiveDate> {
        let trimmed = self.period.trim();
        if trimmed.is_empty() {
            return None;
        }
        NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d").ok()
    }

    /// Whether any solution files are offered for this sheet.
    pub fn has_solutions(&self) -> bool {
        !self.solutions.is_empty()
    }
}

/// Wire format of the catalog resource.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFile {
    /// Ordered list of sheet entries.
    #[serde(default)]
    pub sheets: Vec<Sheet>,
    /// Optional explicit tag vocabulary; derived from the sheets when absent.
    #[serde(default)]
    pub tags: Vec<String>,
}
