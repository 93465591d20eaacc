//! Catalog store: the loaded sheets plus the derived tag vocabulary.
//!
//! Populated once at startup and read-only afterward. Sorting and
//! vocabulary derivation happen here so every consumer sees the same order.

use std::cmp::Reverse;
use std::collections::HashSet;

use tracing::warn;

use crate::models::{CatalogFile, Sheet};

/// The loaded catalog: sheets sorted most-recent-first and the facet
/// vocabulary they can be filtered by.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    sheets: Vec<Sheet>,
    vocabulary: Vec<String>,
}

impl Catalog {
    /// Build a catalog from the raw wire format.
    ///
    /// Sheets are stably sorted by period descending; sheets with a missing
    /// or unparseable period sort last, keeping their relative order. The
    /// primary filename is the lookup key for the detail and solution flows,
    /// so duplicate filenames keep the first occurrence only.
    pub fn load(raw: CatalogFile) -> Self {
        let mut seen = HashSet::new();
        let mut sheets: Vec<Sheet> = Vec::with_capacity(raw.sheets.len());
        for sheet in raw.sheets {
            if !seen.insert(sheet.file.clone()) {
                warn!(file = %sheet.file, "duplicate primary filename in catalog, dropping entry");
                continue;
            }
            if sheet.period_date().is_none() && !sheet.period.trim().is_empty() {
                warn!(file = %sheet.file, period = %sheet.period, "unparseable period, sheet sorts last");
            }
            sheets.push(sheet);
        }

        sheets.sort_by_key(|s| Reverse(s.period_date()));

        let vocabulary = if raw.tags.is_empty() {
            derive_vocabulary(&sheets)
        } else {
            raw.tags
        };

        Self { sheets, vocabulary }
    }

    /// All sheets, most recent first.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// The facet vocabulary.
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Look up a sheet by its primary filename.
    pub fn by_file(&self, file: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.file == file)
    }

    /// Number of sheets in the catalog.
    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    /// Whether the catalog holds no sheets at all.
    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// Union of every sheet's tags, sorted lexicographically (ordinal,
/// case-sensitive).
fn derive_vocabulary(sheets: &[Sheet]) -> Vec<String> {
    let mut tags: Vec<String> = sheets
        .iter()
        .flat_map(|s| s.tags.iter().cloned())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    tags.sort();
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(name: &str, file: &str, period: &str, tags: &[&str]) -> Sheet {
        Sheet {
            name: name.to_string(),
            session: String::new(),
            period: period.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            file: file.to_string(),
            solutions: vec![],
        }
    }

    #[test]
    fn test_load_sorts_most_recent_first() {
        let raw = CatalogFile {
            sheets: vec![
                sheet("old", "old.pdf", "2023-05", &[]),
                sheet("new", "new.pdf", "2024-01", &[]),
            ],
            tags: vec![],
        };
        let catalog = Catalog::load(raw);
        assert_eq!(catalog.sheets()[0].name, "new");
        assert_eq!(catalog.sheets()[1].name, "old");
    }

    #[test]
    fn test_load_sort_is_stable_for_equal_periods() {
        let raw = CatalogFile {
            sheets: vec![
                sheet("first", "a.pdf", "2024-01", &[]),
                sheet("second", "b.pdf", "2024-01", &[]),
            ],
            tags: vec![],
        };
        let catalog = Catalog::load(raw);
        assert_eq!(catalog.sheets()[0].name, "first");
        assert_eq!(catalog.sheets()[1].name, "second");
    }

    #[test]
    fn test_load_undated_sheets_sort_last() {
        let raw = CatalogFile {
            sheets: vec![
                sheet("undated", "u.pdf", "not a date", &[]),
                sheet("dated", "d.pdf", "2020-01", &[]),
            ],
            tags: vec![],
        };
        let catalog = Catalog::load(raw);
        assert_eq!(catalog.sheets()[0].name, "dated");
        assert_eq!(catalog.sheets()[1].name, "undated");
    }

    #[test]
    fn test_load_drops_duplicate_filenames() {
        let raw = CatalogFile {
            sheets: vec![
                sheet("kept", "same.pdf", "2024-01", &[]),
                sheet("dropped", "same.pdf", "2024-02", &[]),
            ],
            tags: vec![],
        };
        let catalog = Catalog::load(raw);
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.sheets()[0].name, "kept");
    }

    #[test]
    fn test_load_derives_vocabulary_when_absent() {
        let raw = CatalogFile {
            sheets: vec![
                sheet("a", "a.pdf", "2024-01", &["math", "algebra"]),
                sheet("b", "b.pdf", "2024-02", &["math", "geometry"]),
            ],
            tags: vec![],
        };
        let catalog = Catalog::load(raw);
        assert_eq!(catalog.vocabulary(), &["algebra", "geometry", "math"]);
    }

    #[test]
    fn test_load_keeps_explicit_vocabulary_order() {
        let raw = CatalogFile {
            sheets: vec![sheet("a", "a.pdf", "2024-01", &["math"])],
            tags: vec!["zeta".to_string(), "alpha".to_string()],
        };
        let catalog = Catalog::load(raw);
        assert_eq!(catalog.vocabulary(), &["zeta", "alpha"]);
    }

    #[test]
    fn test_by_file_finds_sheet() {
        let raw = CatalogFile {
            sheets: vec![sheet("a", "a.pdf", "2024-01", &[])],
            tags: vec![],
        };
        let catalog = Catalog::load(raw);
        assert!(catalog.by_file("a.pdf").is_some());
        assert!(catalog.by_file("missing.pdf").is_none());
    }
}
