use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One input document, addressed relative to the configured resource root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSource {
    pub file_path: String,
    pub file_name: String,
}

impl ImageSource {
    pub fn new(file_path: impl Into<String>, file_name: impl Into<String>) -> Self {
        ImageSource {
            file_path: file_path.into(),
            file_name: file_name.into(),
        }
    }

    pub fn resolve(&self, root: &Path) -> PathBuf {
        root.join(&self.file_path).join(&self.file_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Morpheme {
    pub surface: String,
    pub tag: String,
}

impl Morpheme {
    pub fn new(surface: impl Into<String>, tag: impl Into<String>) -> Self {
        Morpheme {
            surface: surface.into(),
            tag: tag.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub plain_text: String,
    pub nouns: Vec<String>,
}

/// Distinct token -> occurrence count, kept in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyTable {
    pub(crate) entries: Vec<(String, usize)>,
}

impl FrequencyTable {
    pub fn get(&self, token: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|(key, _)| key == token)
            .map(|(_, count)| *count)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts, equal to the length of the counted sequence.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, count)| count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(key, count)| (key.as_str(), *count))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub token: String,
    pub count: usize,
}

/// Entries sorted by count, descending.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedList {
    pub(crate) entries: Vec<RankedEntry>,
}

impl RankedList {
    pub fn entries(&self) -> &[RankedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top(&self, n: usize) -> &[RankedEntry] {
        &self.entries[..n.min(self.entries.len())]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordReport {
    pub source: ImageSource,
    pub fingerprint: String,
    pub generated_at: DateTime<Utc>,
    pub plain_text: String,
    pub total_tokens: usize,
    pub distinct_tokens: usize,
    pub frequencies: FrequencyTable,
    pub ranked: RankedList,
}
