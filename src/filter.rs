//! Filter engine: pure predicates combining free-text search and tag facets.
//!
//! All functions here are deterministic and side-effect free; the event loop
//! recomputes the visible set through them on every input change.

use std::collections::BTreeSet;

use crate::catalog::Catalog;
use crate::models::Sheet;

/// Case-folded substring match against the sheet's name, session label, or
/// any single tag. An empty query matches everything.
pub fn matches_query(sheet: &Sheet, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    sheet.name.to_lowercase().contains(&needle)
        || sheet.session.to_lowercase().contains(&needle)
        || sheet.tags.iter().any(|t| t.to_lowercase().contains(&needle))
}

/// Conjunctive tag match: every active tag must be present on the sheet.
/// An empty selection matches everything.
pub fn matches_tags(sheet: &Sheet, active: &BTreeSet<String>) -> bool {
    active.iter().all(|t| sheet.tags.iter().any(|st| st == t))
}

/// The visible subset of the catalog for a query and facet selection.
///
/// A sheet is visible when both predicates hold. Catalog order (most recent
/// first) is preserved.
pub fn filter<'a>(catalog: &'a Catalog, query: &str, active: &BTreeSet<String>) -> Vec<&'a Sheet> {
    catalog
        .sheets()
        .iter()
        .filter(|s| matches_query(s, query) && matches_tags(s, active))
        .collect()
}

/// Index form of [`filter`] for callers that address sheets by position.
pub fn filter_indices(catalog: &Catalog, query: &str, active: &BTreeSet<String>) -> Vec<usize> {
    catalog
        .sheets()
        .iter()
        .enumerate()
        .filter(|(_, s)| matches_query(s, query) && matches_tags(s, active))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatalogFile;

    fn sheet(name: &str, session: &str, file: &str, tags: &[&str]) -> Sheet {
        Sheet {
            name: name.to_string(),
            session: session.to_string(),
            period: "2024-01".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            file: file.to_string(),
            solutions: vec![],
        }
    }

    fn catalog() -> Catalog {
        Catalog::load(CatalogFile {
            sheets: vec![
                sheet("Algebra Basics", "May 2024", "a.pdf", &["math", "algebra"]),
                sheet("Geometry", "January 2024", "b.pdf", &["math"]),
                sheet("Grammar", "May 2024", "c.pdf", &["language"]),
            ],
            tags: vec![],
        })
    }

    fn active(tags: &[&str]) -> BTreeSet<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_empty_query_and_selection_match_all_in_order() {
        let catalog = catalog();
        let result = filter(&catalog, "", &BTreeSet::new());
        let names: Vec<&str> = result.iter().map(|s| s.name.as_str()).collect();
        let stored: Vec<&str> = catalog.sheets().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, stored);
    }

    #[test]
    fn test_query_matches_name_case_insensitively() {
        let catalog = catalog();
        let result = filter(&catalog, "ALGEBRA", &BTreeSet::new());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Algebra Basics");
    }

    #[test]
    fn test_query_matches_session_label() {
        let catalog = catalog();
        let result = filter(&catalog, "january", &BTreeSet::new());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Geometry");
    }

    #[test]
    fn test_query_matches_any_tag() {
        let catalog = catalog();
        let result = filter(&catalog, "language", &BTreeSet::new());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Grammar");
    }

    #[test]
    fn test_tag_selection_is_conjunctive() {
        let catalog = catalog();
        // "math" alone matches two sheets; adding "algebra" must narrow to
        // the one carrying both.
        let result = filter(&catalog, "", &active(&["math"]));
        assert_eq!(result.len(), 2);
        let result = filter(&catalog, "", &active(&["math", "algebra"]));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Algebra Basics");
    }

    #[test]
    fn test_query_and_tags_combine_with_and() {
        let catalog = catalog();
        let result = filter(&catalog, "may", &active(&["math"]));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "Algebra Basics");
    }

    #[test]
    fn test_no_match_yields_empty() {
        let catalog = catalog();
        assert!(filter(&catalog, "chemistry", &BTreeSet::new()).is_empty());
        assert!(filter(&catalog, "", &active(&["math", "language"])).is_empty());
    }

    #[test]
    fn test_filter_indices_mirrors_filter() {
        let catalog = catalog();
        let refs = filter(&catalog, "math", &BTreeSet::new());
        let indices = filter_indices(&catalog, "math", &BTreeSet::new());
        assert_eq!(refs.len(), indices.len());
        for (sheet, &i) in refs.iter().zip(&indices) {
            assert_eq!(sheet.file, catalog.sheets()[i].file);
        }
    }
}
