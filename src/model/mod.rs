use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Unprocessed rows as returned by a sheet store. Rows may be ragged.
pub type RawTable = Vec<Vec<String>>;

/// A single data row keyed by the header names of its sheet.
///
/// Keys keep the header order so that display and export columns follow the
/// sheet. Duplicate header names collapse into one key holding the value of
/// the right-most cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, String>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Zips a row against the header. Missing trailing cells become empty
    /// strings and cells beyond the header are dropped.
    pub fn from_row(header: &[String], row: &[String]) -> Self {
        let mut record = Self::new();
        for (index, name) in header.iter().enumerate() {
            let value = row.get(index).cloned().unwrap_or_default();
            record.insert(name.clone(), value);
        }
        record
    }

    /// Inserts or replaces a field value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Field names in header order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns `true` when any value contains `needle`, which must already be
    /// lower-cased.
    pub fn matches(&self, needle: &str) -> bool {
        needle.is_empty()
            || self
                .values()
                .any(|value| value.to_lowercase().contains(needle))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (field, value) in iter {
            record.insert(field, value);
        }
        record
    }
}

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub name: String,
    pub email: String,
    pub image_url: String,
}

impl Identity {
    pub fn greeting(&self) -> String {
        format!("Welcome, {}", self.name)
    }
}

/// Outcome of a successful export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResult {
    /// Identifier of the newly created spreadsheet.
    pub spreadsheet_id: String,
    /// Link the user can open to view the export.
    pub url: String,
    /// Number of data rows written, excluding the header.
    pub row_count: usize,
}
