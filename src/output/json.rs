//! The aggregated dataset and its JSON form

use crate::model::ProviderRecord;
use crate::output::{OutputError, OutputResult};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::ser::PrettyFormatter;
use std::path::Path;

/// Provider records grouped by category, in discovery order
///
/// Serializes as a JSON object whose keys appear in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlResult {
    categories: Vec<(String, Vec<ProviderRecord>)>,
}

impl CrawlResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a category's records
    ///
    /// Re-inserting an existing name replaces its records in place.
    pub fn insert(&mut self, category: impl Into<String>, records: Vec<ProviderRecord>) {
        let category = category.into();
        match self.categories.iter_mut().find(|(name, _)| *name == category) {
            Some((_, existing)) => *existing = records,
            None => self.categories.push((category, records)),
        }
    }

    pub fn get(&self, category: &str) -> Option<&[ProviderRecord]> {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map(|(_, records)| records.as_slice())
    }

    /// Category names in insertion order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|(name, _)| name.as_str())
    }

    /// Number of categories
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Number of records across every category
    pub fn total_records(&self) -> usize {
        self.categories.iter().map(|(_, records)| records.len()).sum()
    }
}

impl Serialize for CrawlResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.categories.len()))?;
        for (name, records) in &self.categories {
            map.serialize_entry(name, records)?;
        }
        map.end()
    }
}

/// Renders the dataset as JSON with four-space indentation
pub fn to_json_string(result: &CrawlResult) -> OutputResult<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    result.serialize(&mut serializer)?;
    buf.push(b'\n');

    Ok(String::from_utf8(buf)?)
}

/// Writes the dataset to `path`
pub fn write_output(result: &CrawlResult, path: &Path) -> OutputResult<()> {
    let json = to_json_string(result)?;
    std::fs::write(path, json).map_err(|source| OutputError::Write {
        path: path.display().to_string(),
        source,
    })?;

    tracing::info!(
        "Wrote {} records in {} categories to {}",
        result.total_records(),
        result.len(),
        path.display()
    );
    Ok(())
}
