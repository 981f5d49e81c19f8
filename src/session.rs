//! The long-lived owner of a [ViewState].
//!
//! An [AnnotationSession] is created once when the host loads the annotation index, and
//! dropped when it unloads. It is the only place the view state is mutated: host UI events
//! come in as [ViewAction]s, and persisted changes are flushed to the [SettingsStore]
//! straight away. Storage failures are logged and never interrupt the session.

use crate::{
    annotation::AnnotationRecord,
    config::SettingsStore,
    error::MarginaliaError,
    host::{DocumentSource, EditorSink},
    render::{build_render_plan, build_render_plan_from, navigate_to, Navigation, RenderPlan},
    view_state::{ChangeScope, ViewAction, ViewState},
};

#[derive(Debug)]
pub struct AnnotationSession<S: SettingsStore> {
    state: ViewState,
    store: S,
}

impl<S: SettingsStore> AnnotationSession<S> {
    /// Load persisted settings from `store`, repairing them against the defaults.
    ///
    /// A blob that cannot be read at all is logged and replaced by the defaults.
    pub fn load(store: S) -> Self {
        let blob = match store.load() {
            Ok(blob) => blob,
            Err(e) => {
                tracing::warn!("Could not load settings, using defaults: {e}");
                None
            }
        };
        let state = ViewState::repair(blob.as_ref());
        tracing::info!(
            "Annotation session loaded (font size {}px, default sort {})",
            state.font_size_px(),
            state.default_sort_order()
        );
        AnnotationSession { state, store }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Apply one user interaction and persist it if needed.
    pub fn apply(&mut self, action: ViewAction) -> ChangeScope {
        let scope = self.state.apply(action);
        if scope.needs_persist() {
            if let Err(e) = self.flush() {
                tracing::warn!("Could not persist settings: {e}");
            }
        }
        scope
    }

    /// Write the persisted part of the state to the store.
    pub fn flush(&self) -> Result<(), MarginaliaError> {
        self.store.save(&self.state.persisted())
    }

    pub fn render_text(&self, document: Option<&str>) -> RenderPlan {
        build_render_plan(document, &self.state)
    }

    pub fn render_plan<D: DocumentSource + ?Sized>(&self, source: &D) -> RenderPlan {
        build_render_plan_from(source, &self.state)
    }

    pub fn navigate<D, E>(
        &self,
        source: &D,
        editor: &mut E,
        record: &AnnotationRecord,
    ) -> Navigation
    where
        D: DocumentSource + ?Sized,
        E: EditorSink + ?Sized,
    {
        navigate_to(source, editor, record)
    }
}
