//! Search and sort over the canonical record collection.

use std::cmp::Ordering;

use feruca::Collator;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use unicase::UniCase;

use crate::model::Record;

/// How sort intents combine with search intents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortMode {
    /// Each sort reorders the current view in ascending order; a later search
    /// starts again from the canonical order.
    #[default]
    Compose,
    /// The view is always the canonical collection filtered by the search term
    /// and then ordered by the active sort key. Sorting the active field again
    /// flips the direction.
    Canonical,
}

/// The active sort column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

/// Owns the canonical records and the working view derived from them.
#[derive(Debug, Clone, Default)]
pub struct ViewEngine {
    mode: SortMode,
    collection: Vec<Record>,
    // Positions into `collection`; a view never holds records of its own.
    rows: Vec<usize>,
    search: String,
    sort: Option<SortKey>,
}

impl ViewEngine {
    pub fn new(mode: SortMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> SortMode {
        self.mode
    }

    pub fn collection(&self) -> &[Record] {
        &self.collection
    }

    /// The lower-cased search term, empty when everything matches.
    pub fn search_term(&self) -> &str {
        &self.search
    }

    pub fn sort_key(&self) -> Option<&SortKey> {
        self.sort.as_ref()
    }

    pub fn view(&self) -> WorkingView<'_> {
        WorkingView {
            collection: &self.collection,
            rows: &self.rows,
        }
    }

    /// Display column order, taken from the header of the current collection.
    pub fn columns(&self) -> Vec<&str> {
        self.collection
            .first()
            .map(|record| record.keys().collect())
            .unwrap_or_default()
    }

    /// Swaps in a freshly ingested collection and clears search and sort.
    pub fn replace_collection(&mut self, collection: Vec<Record>) -> WorkingView<'_> {
        debug!(record_count = collection.len(), "collection replaced");
        self.rows = (0..collection.len()).collect();
        self.collection = collection;
        self.search.clear();
        self.sort = None;
        self.view()
    }

    /// Keeps the records with at least one value containing `term`,
    /// ignoring case.
    pub fn set_search_term(&mut self, term: &str) -> WorkingView<'_> {
        self.search = term.to_lowercase();
        self.rows = self.filtered_rows();
        match self.mode {
            // The refiltered view is back in canonical order.
            SortMode::Compose => self.sort = None,
            SortMode::Canonical => self.apply_sort(),
        }
        trace!(search = %self.search, matches = self.rows.len(), "search applied");
        self.view()
    }

    /// Orders the view by the values of `field`. Records without the field
    /// sort as if it were empty.
    pub fn sort_by(&mut self, field: &str) -> WorkingView<'_> {
        match self.mode {
            SortMode::Compose => {
                self.sort = Some(SortKey {
                    field: field.to_string(),
                    descending: false,
                });
            }
            SortMode::Canonical => {
                let descending = match &self.sort {
                    Some(active) if active.field == field => !active.descending,
                    _ => false,
                };
                self.sort = Some(SortKey {
                    field: field.to_string(),
                    descending,
                });
                self.rows = self.filtered_rows();
            }
        }
        self.apply_sort();
        trace!(field, rows = self.rows.len(), "sort applied");
        self.view()
    }

    fn filtered_rows(&self) -> Vec<usize> {
        self.collection
            .iter()
            .enumerate()
            .filter(|(_, record)| record.matches(&self.search))
            .map(|(index, _)| index)
            .collect()
    }

    fn apply_sort(&mut self) {
        let Some(key) = &self.sort else {
            return;
        };
        let collection = &self.collection;
        let value = |index: usize| collection[index].get(&key.field).unwrap_or_default();
        let mut collator = CellCollator::default();
        // `sort_by` is stable, so equal keys keep their current order.
        self.rows.sort_by(|&lhs, &rhs| {
            let ordering = collator.compare(value(lhs), value(rhs));
            if key.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
    }
}

/// Locale-aware ordering of cell values, using the root collation order with
/// lowercase before uppercase.
pub struct CellCollator {
    collator: Collator,
}

impl Default for CellCollator {
    fn default() -> Self {
        Self {
            collator: Collator::default(),
        }
    }
}

impl CellCollator {
    pub fn compare(&mut self, lhs: &str, rhs: &str) -> Ordering {
        self.collator
            .collate(lhs, rhs)
            .then_with(|| UniCase::new(lhs).cmp(&UniCase::new(rhs)))
            .then_with(|| rhs.cmp(lhs))
    }
}

/// Compares two cells with a fresh [`CellCollator`].
pub fn compare_cells(lhs: &str, rhs: &str) -> Ordering {
    CellCollator::default().compare(lhs, rhs)
}

/// Borrowed, ordered subset of the canonical collection.
#[derive(Debug, Clone, Copy)]
pub struct WorkingView<'a> {
    collection: &'a [Record],
    rows: &'a [usize],
}

impl<'a> WorkingView<'a> {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, position: usize) -> Option<&'a Record> {
        self.rows
            .get(position)
            .and_then(|&index| self.collection.get(index))
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Record> + 'a {
        let (collection, rows) = (self.collection, self.rows);
        rows.iter().filter_map(move |&index| collection.get(index))
    }

    /// Positions of the viewed records in the canonical collection.
    pub fn indices(&self) -> &'a [usize] {
        self.rows
    }

    pub fn to_records(&self) -> Vec<Record> {
        self.iter().cloned().collect()
    }
}
