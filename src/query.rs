//! Sorting and filtering of annotation lists.
//!
//! Both operations are pure: they borrow their input and never mutate it.

use serde::{Deserialize, Serialize};
use icu_collator::{Collator, CollatorOptions, Strength};
use std::{
    borrow::Cow,
    cmp::Ordering,
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::annotation::AnnotationRecord;

/// Ordering applied to the records of one category section.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Line ascending, then column ascending.
    #[default]
    LineAscending,
    /// Line descending, then column descending.
    LineDescending,
    /// Text ascending, ignoring case and accents.
    Alphabetical,
    /// Text descending, ignoring case and accents.
    ReverseAlphabetical,
}

impl SortOrder {
    pub fn all() -> &'static [SortOrder] {
        &[
            SortOrder::LineAscending,
            SortOrder::LineDescending,
            SortOrder::Alphabetical,
            SortOrder::ReverseAlphabetical,
        ]
    }

    /// Persisted key, matching the serde representation.
    pub fn key(&self) -> &'static str {
        match self {
            SortOrder::LineAscending => "line-ascending",
            SortOrder::LineDescending => "line-descending",
            SortOrder::Alphabetical => "alphabetical",
            SortOrder::ReverseAlphabetical => "reverse-alphabetical",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::LineAscending => "Line (ascending)",
            SortOrder::LineDescending => "Line (descending)",
            SortOrder::Alphabetical => "Alphabetical (A-Z)",
            SortOrder::ReverseAlphabetical => "Alphabetical (Z-A)",
        }
    }

    /// Parse a persisted key, falling back to [SortOrder::LineAscending] for anything
    /// unrecognized.
    pub fn from_key_lossy(key: &str) -> SortOrder {
        key.parse().unwrap_or_else(|_| {
            tracing::warn!("Unknown sort order '{key}', falling back to line-ascending");
            SortOrder::LineAscending
        })
    }
}

impl Display for SortOrder {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOrder::all()
            .iter()
            .find(|order| order.key() == s.trim())
            .copied()
            .ok_or_else(|| format!("Unknown sort order '{s}'"))
    }
}

fn base_collator() -> Option<Collator> {
    let mut options = CollatorOptions::new();
    options.strength = Some(Strength::Primary);
    match Collator::try_new(&Default::default(), options) {
        Ok(collator) => Some(collator),
        Err(e) => {
            tracing::warn!("Root collation unavailable, comparing lower-cased text: {e}");
            None
        }
    }
}

thread_local! {
    static BASE_COLLATOR: Option<Collator> = base_collator();
}

/// Compare two texts the way a reader expects an index to be ordered: root collation at
/// primary strength, so case and accents are ignored, letters without a decomposition
/// (`Æ`, `Ł`, `ß`) sit with their base letters, and punctuation sorts before digits before
/// letters. Texts that compare equal keep their relative input order when sorting.
pub fn compare_text(a: &str, b: &str) -> Ordering {
    BASE_COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b),
        None => a.to_lowercase().cmp(&b.to_lowercase()),
    })
}

fn by_position(a: &AnnotationRecord, b: &AnnotationRecord) -> Ordering {
    a.line.cmp(&b.line).then(a.column.cmp(&b.column))
}

/// Return a newly ordered copy of `records`.
///
/// All orders are stable: records with equal keys keep their input order.
pub fn sort_records(records: &[AnnotationRecord], order: SortOrder) -> Vec<AnnotationRecord> {
    let mut sorted = records.to_vec();
    match order {
        SortOrder::LineAscending => sorted.sort_by(by_position),
        SortOrder::LineDescending => sorted.sort_by(|a, b| by_position(b, a)),
        SortOrder::Alphabetical => sorted.sort_by(|a, b| compare_text(&a.text, &b.text)),
        SortOrder::ReverseAlphabetical => sorted.sort_by(|a, b| compare_text(&b.text, &a.text)),
    }
    sorted
}

/// Normalized form of a search query: trimmed and lower-cased.
pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

/// Whether `record` matches an already-normalized, non-empty query.
pub fn matches_query(record: &AnnotationRecord, needle: &str) -> bool {
    record.text.to_lowercase().contains(needle)
}

/// Keep the records whose text contains `query`, ignoring case. Relative order is kept.
///
/// An empty (or all-whitespace) query borrows the input unchanged.
pub fn filter_records<'a>(
    records: &'a [AnnotationRecord],
    query: &str,
) -> Cow<'a, [AnnotationRecord]> {
    let needle = normalize_query(query);
    if needle.is_empty() {
        return Cow::Borrowed(records);
    }
    Cow::Owned(
        records
            .iter()
            .filter(|record| matches_query(record, &needle))
            .cloned()
            .collect(),
    )
}
