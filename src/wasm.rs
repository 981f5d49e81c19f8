//! WASM bindings for marginalia-core
//!
//! JavaScript hosts (editor plugins) drive the annotation index through
//! [AnnotationViewWasm]. The host keeps ownership of the editor, the settings storage and the
//! change events; this adapter only holds the view state and turns text into render plans.
//!
//! ## Usage
//!
//! ```javascript,ignore
//! import init, { AnnotationViewWasm } from './marginalia_core.js';
//!
//! await init();
//! AnnotationViewWasm.initLogging();
//!
//! const view = new AnnotationViewWasm(await plugin.loadData());
//! const plan = view.renderPlan(editor.getValue());
//!
//! const { persist, settings } = view.apply({ type: "toggleCategoryCollapsed", category: "comment" });
//! if (persist) await plugin.saveData(settings);
//!
//! const { line, start, end } = AnnotationViewWasm.navigate(plan.body.sections[0].records[0]);
//! editor.setSelection({ line, ch: start }, { line, ch: end });
//! ```
//!
//! Values cross the boundary through `serde_wasm_bindgen` with the json-compatible serializer,
//! so maps arrive in JavaScript as plain objects rather than `Map`s.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::{
    annotation::AnnotationRecord,
    error::MarginaliaError,
    parser::parse,
    render::{build_render_plan, selection_for},
    view_state::{PersistedSettings, ViewAction, ViewState},
};

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&MarginaliaError::from(e).to_string()))
}

fn from_js<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| JsValue::from_str(&MarginaliaError::from(e).to_string()))
}

#[derive(Serialize)]
struct ApplyResult {
    persist: bool,
    settings: PersistedSettings,
}

#[wasm_bindgen]
pub struct AnnotationViewWasm {
    state: ViewState,
}

#[wasm_bindgen]
impl AnnotationViewWasm {
    /// Create the view from the host's stored settings blob (`null`/`undefined` for none).
    #[wasm_bindgen(constructor)]
    pub fn new(settings: JsValue) -> AnnotationViewWasm {
        let blob: Option<serde_json::Value> = if settings.is_null() || settings.is_undefined() {
            None
        } else {
            match serde_wasm_bindgen::from_value(settings) {
                Ok(blob) => Some(blob),
                Err(e) => {
                    tracing::warn!("Unreadable settings blob, using defaults: {e}");
                    None
                }
            }
        };
        AnnotationViewWasm {
            state: ViewState::repair(blob.as_ref()),
        }
    }

    #[wasm_bindgen(js_name = initLogging)]
    pub fn init_logging() {
        if tracing_wasm::try_set_as_global_default().is_err() {
            tracing::debug!("tracing-wasm already installed");
        }
    }

    /// Annotation records in document order.
    pub fn parse(text: &str) -> Result<JsValue, JsValue> {
        to_js(&parse(text))
    }

    /// Render plan for `text`, or the "no document" plan when `text` is `null`.
    #[wasm_bindgen(js_name = renderPlan)]
    pub fn render_plan(&self, text: Option<String>) -> Result<JsValue, JsValue> {
        to_js(&build_render_plan(text.as_deref(), &self.state))
    }

    /// Apply a view action. Returns `{ persist, settings }`; the host should store
    /// `settings` when `persist` is true.
    pub fn apply(&mut self, action: JsValue) -> Result<JsValue, JsValue> {
        let action: ViewAction = from_js(action)?;
        let scope = self.state.apply(action);
        to_js(&ApplyResult {
            persist: scope.needs_persist(),
            settings: self.state.persisted(),
        })
    }

    pub fn settings(&self) -> Result<JsValue, JsValue> {
        to_js(&self.state.persisted())
    }

    #[wasm_bindgen(js_name = searchQuery)]
    pub fn search_query(&self) -> String {
        self.state.search_query().to_string()
    }

    /// The `{ line, start, end }` selection covering a record's full span.
    pub fn navigate(record: JsValue) -> Result<JsValue, JsValue> {
        let record: AnnotationRecord = from_js(record)?;
        to_js(&selection_for(&record))
    }
}
