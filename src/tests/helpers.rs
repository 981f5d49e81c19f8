//! Shared test utilities for the annotation index

use crate::{
    annotation::{AnnotationRecord, Category},
    config::MemorySettingsStore,
    session::AnnotationSession,
};

/// Initialize logging for tests
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// A document exercising every annotation syntax, across several lines.
pub const SAMPLE_DOCUMENT: &str = "\
# Reading notes

The ==central claim== is stated early, with <mark>supporting data</mark> after.
%%check the citation%% before quoting.
Later the author says ==Zebra crossings== matter[^1].

<!-- revisit this section -->
A second ==aside== shows up here.

[^1]: Smith, 2019, p. 12
[^long note]: an unfinished thought";

/// Helper to create a record whose span is the text plus `delimiter_len` characters.
pub fn create_test_record(
    category: Category,
    text: &str,
    line: usize,
    column: usize,
    delimiter_len: usize,
) -> AnnotationRecord {
    AnnotationRecord::new(
        category,
        text,
        line,
        column,
        text.chars().count() + delimiter_len,
    )
}

/// A session backed by an empty in-memory store, plus a handle to inspect that store.
pub fn create_test_session() -> (AnnotationSession<MemorySettingsStore>, MemorySettingsStore) {
    init_logging();
    let store = MemorySettingsStore::default();
    (AnnotationSession::load(store.clone()), store)
}
