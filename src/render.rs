//! Render plans: parsed annotations joined with the view state for one presentation pass.
//!
//! A [RenderPlan] is everything a UI layer needs to draw the annotation index: the category
//! sections in display order (hidden categories omitted), one of three distinct empty
//! states, and projections for the category toggle bar and the sort menu. The plan holds
//! no reference to the document or the state it was built from.

use serde::{Deserialize, Serialize};

use crate::{
    annotation::{AnnotationRecord, Category},
    host::{DocumentSource, EditorSink, Selection},
    parser::parse,
    query::{filter_records, normalize_query, sort_records, SortOrder},
    view_state::{CategoryMap, ViewState},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub category: Category,
    /// Filtered records in the category's sort order.
    pub records: Vec<AnnotationRecord>,
    /// Number of records after filtering.
    pub count: usize,
    pub collapsed: bool,
    pub sort_order: SortOrder,
}

impl Section {
    pub fn label(&self) -> &'static str {
        self.category.label()
    }

    pub fn sort_menu(&self) -> Vec<SortMenuEntry> {
        sort_menu(self.sort_order)
    }
}

/// One entry of the category toggle bar. Present for every category, hidden ones included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryToggle {
    pub category: Category,
    pub visible: bool,
    /// Records of this category in the document, before filtering.
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortMenuEntry {
    pub order: SortOrder,
    pub label: &'static str,
    pub selected: bool,
}

/// Every sort order, with `current` marked as selected.
pub fn sort_menu(current: SortOrder) -> Vec<SortMenuEntry> {
    SortOrder::all()
        .iter()
        .map(|order| SortMenuEntry {
            order: *order,
            label: order.label(),
            selected: *order == current,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PlanBody {
    /// No document is open.
    NoDocument,
    /// The document contains no annotations at all, whatever the query.
    NoAnnotations,
    /// The document has annotations but the active query matched none that are visible.
    NoMatches { query: String },
    Sections { sections: Vec<Section> },
}

impl PlanBody {
    /// Empty-state message, or `None` when there are sections to show.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            PlanBody::NoDocument => Some("Open a document to see its annotations."),
            PlanBody::NoAnnotations => {
                Some("No highlights, comments or footnotes in this document.")
            }
            PlanBody::NoMatches { .. } => Some("No annotations match the search."),
            PlanBody::Sections { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderPlan {
    pub font_size_px: u32,
    pub search_query: String,
    pub toggles: Vec<CategoryToggle>,
    pub body: PlanBody,
}

impl RenderPlan {
    pub fn sections(&self) -> &[Section] {
        match &self.body {
            PlanBody::Sections { sections } => sections,
            _ => &[],
        }
    }

    pub fn section(&self, category: Category) -> Option<&Section> {
        self.sections().iter().find(|s| s.category == category)
    }

    /// Records a user can click: those in expanded sections, in display order.
    pub fn navigable(&self) -> impl Iterator<Item = &AnnotationRecord> {
        self.sections()
            .iter()
            .filter(|section| !section.collapsed)
            .flat_map(|section| section.records.iter())
    }
}

fn toggles(state: &ViewState, totals: &CategoryMap<usize>) -> Vec<CategoryToggle> {
    totals
        .iter()
        .map(|(category, total)| CategoryToggle {
            category,
            visible: state.is_visible(category),
            total,
        })
        .collect()
}

/// Build the render plan for `document` (`None` when no document is open).
pub fn build_render_plan(document: Option<&str>, state: &ViewState) -> RenderPlan {
    let plan = |totals: CategoryMap<usize>, body: PlanBody| RenderPlan {
        font_size_px: state.font_size_px(),
        search_query: state.search_query().to_string(),
        toggles: toggles(state, &totals),
        body,
    };

    let Some(text) = document else {
        return plan(CategoryMap::default(), PlanBody::NoDocument);
    };

    let records = parse(text);
    let mut totals = CategoryMap::<usize>::default();
    for record in records.iter() {
        *totals.get_mut(record.category) += 1;
    }
    if records.is_empty() {
        return plan(totals, PlanBody::NoAnnotations);
    }

    let filtered = filter_records(&records, state.search_query());
    let sections: Vec<Section> = Category::all()
        .iter()
        .filter(|category| state.is_visible(**category))
        .map(|category| {
            let group: Vec<AnnotationRecord> = filtered
                .iter()
                .filter(|record| record.category == *category)
                .cloned()
                .collect();
            let sort_order = state.sort_order(*category);
            Section {
                category: *category,
                count: group.len(),
                records: sort_records(&group, sort_order),
                collapsed: state.is_collapsed(*category),
                sort_order,
            }
        })
        .collect();

    let shown: usize = sections.iter().map(|section| section.count).sum();
    let query = normalize_query(state.search_query());
    tracing::debug!(
        "Render plan: {} annotation(s), {} shown across {} section(s)",
        records.len(),
        shown,
        sections.len()
    );

    if shown == 0 && !query.is_empty() {
        return plan(
            totals,
            PlanBody::NoMatches {
                query: state.search_query().trim().to_string(),
            },
        );
    }
    plan(totals, PlanBody::Sections { sections })
}

/// Build the render plan for whatever document `source` currently has open.
pub fn build_render_plan_from<D: DocumentSource + ?Sized>(
    source: &D,
    state: &ViewState,
) -> RenderPlan {
    build_render_plan(source.active_document_text().as_deref(), state)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Navigation {
    Moved(Selection),
    /// Nothing was open to navigate within; the editor was not touched.
    NoDocument,
}

/// The editor selection covering the full span of `record`.
pub fn selection_for(record: &AnnotationRecord) -> Selection {
    Selection {
        line: record.line,
        start: record.column,
        end: record.end_column(),
    }
}

/// Move the editor cursor to `record`, reveal and select its span, then focus the editor.
///
/// Coordinates come from the last parse. If the document changed since, the selection may
/// land slightly off; that race is accepted.
pub fn navigate_to<D, E>(source: &D, editor: &mut E, record: &AnnotationRecord) -> Navigation
where
    D: DocumentSource + ?Sized,
    E: EditorSink + ?Sized,
{
    if !source.has_active_document() {
        tracing::debug!("Navigation ignored: no active document");
        return Navigation::NoDocument;
    }
    let selection = selection_for(record);
    editor.move_cursor_and_select(selection.line, selection.start, selection.end);
    editor.reveal_range(selection.line, selection.start, selection.end);
    editor.focus();
    Navigation::Moved(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{EditorCall, RecordingEditorSink, StaticDocumentSource};

    const DOC: &str = "==alpha== and <mark>beta</mark>\n%%note one%%\n[^1]: see appendix";

    #[test]
    fn test_no_document() {
        let plan = build_render_plan(None, &ViewState::default());
        assert_eq!(plan.body, PlanBody::NoDocument);
        assert!(plan.sections().is_empty());
        assert!(plan.body.message().is_some());
    }

    #[test]
    fn test_empty_document_has_no_annotations() {
        let mut state = ViewState::default();
        let _ = state.set_search_query("anything");
        let plan = build_render_plan(Some(""), &state);
        assert_eq!(plan.body, PlanBody::NoAnnotations);
    }

    #[test]
    fn test_sections_in_display_order() {
        let plan = build_render_plan(Some(DOC), &ViewState::default());
        let categories: Vec<Category> = plan.sections().iter().map(|s| s.category).collect();
        assert_eq!(categories, Category::all());
        assert_eq!(plan.section(Category::Highlight).unwrap().count, 2);
        assert_eq!(plan.section(Category::Comment).unwrap().count, 1);
        assert_eq!(plan.section(Category::Footnote).unwrap().count, 1);
        assert_eq!(plan.body.message(), None);
    }

    #[test]
    fn test_hidden_category_is_omitted() {
        let mut state = ViewState::default();
        let _ = state.toggle_category_visible(Category::Highlight);
        let plan = build_render_plan(Some(DOC), &state);
        assert!(plan.section(Category::Highlight).is_none());
        assert_eq!(plan.sections().len(), 2);

        let toggle = plan.toggles[0];
        assert_eq!(toggle.category, Category::Highlight);
        assert!(!toggle.visible);
        assert_eq!(toggle.total, 2);
    }

    #[test]
    fn test_query_without_hits() {
        let mut state = ViewState::default();
        let _ = state.set_search_query(" zebra ");
        let plan = build_render_plan(Some(DOC), &state);
        assert_eq!(
            plan.body,
            PlanBody::NoMatches {
                query: "zebra".to_string()
            }
        );
    }

    #[test]
    fn test_query_hits_only_in_hidden_category() {
        let mut state = ViewState::default();
        let _ = state.set_search_query("note");
        let _ = state.toggle_category_visible(Category::Comment);
        let plan = build_render_plan(Some(DOC), &state);
        assert!(matches!(plan.body, PlanBody::NoMatches { .. }));
    }

    #[test]
    fn test_query_filters_and_counts() {
        let mut state = ViewState::default();
        let _ = state.set_search_query("NOTE");
        let plan = build_render_plan(Some(DOC), &state);
        assert_eq!(plan.section(Category::Highlight).unwrap().count, 0);
        let comments = plan.section(Category::Comment).unwrap();
        assert_eq!(comments.count, 1);
        assert_eq!(comments.records[0].text, "note one");
    }

    #[test]
    fn test_sections_use_their_own_sort_order() {
        let mut state = ViewState::default();
        let _ = state.set_category_sort_order(Category::Highlight, SortOrder::ReverseAlphabetical);
        let plan = build_render_plan(Some("==Alpha== ==beta==\n==gamma=="), &state);
        let highlights = plan.section(Category::Highlight).unwrap();
        assert_eq!(highlights.sort_order, SortOrder::ReverseAlphabetical);
        let texts: Vec<&str> = highlights.records.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["gamma", "beta", "Alpha"]);

        let selected: Vec<SortOrder> = highlights
            .sort_menu()
            .into_iter()
            .filter(|entry| entry.selected)
            .map(|entry| entry.order)
            .collect();
        assert_eq!(selected, vec![SortOrder::ReverseAlphabetical]);
    }

    #[test]
    fn test_collapsed_sections_are_not_navigable() {
        let mut state = ViewState::default();
        let _ = state.toggle_category_collapsed(Category::Highlight);
        let plan = build_render_plan(Some(DOC), &state);
        assert!(plan.section(Category::Highlight).unwrap().collapsed);
        assert_eq!(plan.section(Category::Highlight).unwrap().records.len(), 2);
        assert!(plan
            .navigable()
            .all(|record| record.category != Category::Highlight));
        assert_eq!(plan.navigable().count(), 2);
    }

    #[test]
    fn test_navigate_selects_full_span() {
        let source = StaticDocumentSource::open(DOC);
        let record = parse(DOC).remove(1);
        let mut editor = RecordingEditorSink::default();

        let outcome = navigate_to(&source, &mut editor, &record);
        let expected = Selection {
            line: 0,
            start: 14,
            end: 31,
        };
        assert_eq!(outcome, Navigation::Moved(expected));
        assert_eq!(
            editor.calls,
            vec![
                EditorCall::Select(expected),
                EditorCall::Reveal(expected),
                EditorCall::Focus
            ]
        );
    }

    #[test]
    fn test_navigate_without_document_is_noop() {
        let record = AnnotationRecord::new(Category::Comment, "x", 3, 0, 5);
        let mut editor = RecordingEditorSink::default();
        let outcome = navigate_to(&StaticDocumentSource::closed(), &mut editor, &record);
        assert_eq!(outcome, Navigation::NoDocument);
        assert!(editor.calls.is_empty());
    }
}
