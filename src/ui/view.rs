//! Render pipeline: pure projection of catalog state into a view model.
//!
//! The drawing layer consumes [`ViewModel`] verbatim; everything testable
//! about rendering lives here, independent of any terminal.

use crate::catalog::Catalog;
use crate::facets::TagSelection;

/// Label of the reset pseudo-chip at the head of the facet row. Active iff
/// no tags are selected.
pub const ALL_TAG_LABEL: &str = "All";

/// One facet chip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagChip {
    pub label: String,
    pub active: bool,
}

/// One visible sheet card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetCard {
    pub name: String,
    pub session: String,
    pub tags: Vec<String>,
    pub file: String,
    pub has_solutions: bool,
}

/// Header counters. Purely a projection, no logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    pub total_sheets: usize,
    pub total_tags: usize,
    pub visible_sheets: usize,
    pub active_filters: usize,
}

/// Everything the drawing layer needs for one frame of the catalog screen.
#[derive(Debug, Clone, Default)]
pub struct ViewModel {
    pub chips: Vec<TagChip>,
    pub cards: Vec<SheetCard>,
    pub counters: Counters,
    pub no_results: bool,
}

impl ViewModel {
    /// Project the catalog, facet state, and the current visible subset.
    ///
    /// `visible` holds indices into `catalog.sheets()` as produced by the
    /// filter engine.
    pub fn project(catalog: &Catalog, selection: &TagSelection, visible: &[usize]) -> Self {
        let mut chips = Vec::with_capacity(selection.vocabulary().len() + 1);
        chips.push(TagChip {
            label: ALL_TAG_LABEL.to_string(),
            active: selection.is_empty(),
        });
        for tag in selection.vocabulary() {
            chips.push(TagChip {
                label: tag.clone(),
                active: selection.is_active(tag),
            });
        }

        let cards: Vec<SheetCard> = visible
            .iter()
            .filter_map(|&i| catalog.sheets().get(i))
            .map(|s| SheetCard {
                name: s.name.clone(),
                session: s.session.clone(),
                tags: s.tags.clone(),
                file: s.file.clone(),
                has_solutions: s.has_solutions(),
            })
            .collect();

        let counters = Counters {
            total_sheets: catalog.len(),
            total_tags: selection.vocabulary().len(),
            visible_sheets: cards.len(),
            active_filters: selection.active_count(),
        };
        let no_results = cards.is_empty();

        Self {
            chips,
            cards,
            counters,
            no_results,
        }
    }
}
