//! Interfaces to the host application that embeds the annotation index.
//!
//! The host owns the open document and the editor surface. The core only reads the active
//! document's text through a [DocumentSource] and asks an [EditorSink] to move, reveal and
//! focus a selection.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::MarginaliaError;

/// Provides the text of the currently active document, if any.
pub trait DocumentSource {
    /// `None` means no document is open.
    fn active_document_text(&self) -> Option<String>;

    fn has_active_document(&self) -> bool {
        self.active_document_text().is_some()
    }
}

/// Receives navigation requests. Columns are character offsets within `line`, and
/// `column_end` is exclusive.
pub trait EditorSink {
    fn move_cursor_and_select(&mut self, line: usize, column_start: usize, column_end: usize);
    fn reveal_range(&mut self, line: usize, column_start: usize, column_end: usize);
    fn focus(&mut self);
}

/// A single-line selection `[start, end)` handed to the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

/// Document text pushed in by the host rather than pulled on demand.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StaticDocumentSource(pub Option<String>);

impl StaticDocumentSource {
    pub fn open<T: Into<String>>(text: T) -> Self {
        StaticDocumentSource(Some(text.into()))
    }

    pub fn closed() -> Self {
        StaticDocumentSource(None)
    }
}

impl DocumentSource for StaticDocumentSource {
    fn active_document_text(&self) -> Option<String> {
        self.0.clone()
    }

    fn has_active_document(&self) -> bool {
        self.0.is_some()
    }
}

/// Reads the active document from a file on every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDocumentSource {
    path: PathBuf,
}

impl FileDocumentSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        FileDocumentSource {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Like [DocumentSource::active_document_text], but reports why a read failed.
    pub fn read(&self) -> Result<Option<String>, MarginaliaError> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(std::fs::read_to_string(&self.path)?))
    }
}

impl DocumentSource for FileDocumentSource {
    fn active_document_text(&self) -> Option<String> {
        match self.read() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Could not read {:?}: {e}", self.path);
                None
            }
        }
    }

    fn has_active_document(&self) -> bool {
        self.path.is_file()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorCall {
    Select(Selection),
    Reveal(Selection),
    Focus,
}

/// An [EditorSink] that records each request. Used by headless hosts and tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingEditorSink {
    pub calls: Vec<EditorCall>,
}

impl RecordingEditorSink {
    /// The most recent selection request, if any.
    pub fn last_selection(&self) -> Option<Selection> {
        self.calls.iter().rev().find_map(|call| match call {
            EditorCall::Select(selection) => Some(*selection),
            _ => None,
        })
    }
}

impl EditorSink for RecordingEditorSink {
    fn move_cursor_and_select(&mut self, line: usize, column_start: usize, column_end: usize) {
        self.calls.push(EditorCall::Select(Selection {
            line,
            start: column_start,
            end: column_end,
        }));
    }

    fn reveal_range(&mut self, line: usize, column_start: usize, column_end: usize) {
        self.calls.push(EditorCall::Reveal(Selection {
            line,
            start: column_start,
            end: column_end,
        }));
    }

    fn focus(&mut self) {
        self.calls.push(EditorCall::Focus);
    }
}
