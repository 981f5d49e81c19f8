//! # marginalia-core
//!
//! Extracts inline annotations (highlights, comments and footnote definitions) from a
//! plain-text document and maintains a live, filterable, sortable index of them.
//!
//! ## Overview
//!
//! The crate is the engine behind an "annotations" side panel in a text editor. The host
//! editor supplies document text and change notifications; marginalia-core turns them into a
//! [render::RenderPlan] that a UI layer draws, and maps clicks back to editor selections.
//!
//! Recognized syntax, one line at a time:
//!
//! | Syntax | Category |
//! |---|---|
//! | `==text==`, `<mark>text</mark>` | Highlight |
//! | `%%text%%`, `<!-- text -->` | Comment |
//! | `[^id]: text` | Footnote |
//!
//! ## Architecture
//!
//! - **[`parser`]**: text → ordered [`annotation::AnnotationRecord`]s. Pure, never fails.
//! - **[`query`]**: sorting ([`query::SortOrder`]) and case-insensitive filtering.
//! - **[`view_state`]**: the persisted presentation state and its transitions.
//! - **[`render`]**: joins records and state into a render plan; navigation contract.
//! - **[`session`]**: owns the state for the lifetime of the host plugin and persists it.
//! - **[`host`]** / **[`config`]**: collaborator interfaces for the editor and settings storage.
//! - **[`debounce`]** / **[`event`]**: coalescing host change notifications into refreshes.
//!
//! ## Quick Start
//!
//! ```rust
//! use marginalia_core::{
//!     annotation::Category,
//!     config::MemorySettingsStore,
//!     host::{RecordingEditorSink, StaticDocumentSource},
//!     session::AnnotationSession,
//!     view_state::ViewAction,
//! };
//!
//! let document = StaticDocumentSource::open("==alpha== and %%a note%%\n[^1]: see appendix");
//! let mut session = AnnotationSession::load(MemorySettingsStore::default());
//!
//! let _ = session.apply(ViewAction::SetSearchQuery { query: "note".to_string() });
//! let plan = session.render_plan(&document);
//! let comments = plan.section(Category::Comment).unwrap();
//! assert_eq!(comments.records[0].text, "a note");
//!
//! let mut editor = RecordingEditorSink::default();
//! session.navigate(&document, &mut editor, &comments.records[0]);
//! assert_eq!(editor.last_selection().unwrap().start, 14);
//! ```
//!
//! ## Features
//!
//! - **default**: parsing, view state, render plans, settings storage
//! - **service**: [`watch::WatchService`], live plans for a file on disk (`notify`)
//! - **bin**: the `marginalia` command line host
//! - **wasm**: JavaScript host adapter

pub mod annotation;
pub mod config;
pub mod debounce;
pub mod error;
#[cfg(not(target_arch = "wasm32"))]
pub mod event;
pub mod host;
pub mod parser;
pub mod query;
pub mod render;
pub mod session;
#[cfg(test)]
mod tests;
pub mod view_state;
#[cfg(feature = "wasm")]
pub mod wasm;
#[cfg(all(feature = "service", not(target_arch = "wasm32")))]
pub mod watch;

pub use error::*;
