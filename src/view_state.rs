//! Persisted presentation state and the transitions that mutate it.
//!
//! [ViewState] is pure configuration: per-category visibility, collapse and sort order, a
//! global default sort order, the font size, and the transient search query. It never
//! references annotation records. Every transition reports a [ChangeScope] telling the
//! owner whether the change has to be flushed to settings storage.

use enumset::EnumSet;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{annotation::Category, query::SortOrder};

pub const MIN_FONT_SIZE_PX: u32 = 10;
pub const MAX_FONT_SIZE_PX: u32 = 24;
pub const DEFAULT_FONT_SIZE_PX: u32 = 14;

/// One value per [Category].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryMap<T> {
    pub highlight: T,
    pub comment: T,
    pub footnote: T,
}

impl<T: Copy> CategoryMap<T> {
    /// The same value for every category.
    pub fn splat(value: T) -> Self {
        CategoryMap {
            highlight: value,
            comment: value,
            footnote: value,
        }
    }

    pub fn get(&self, category: Category) -> T {
        match category {
            Category::Highlight => self.highlight,
            Category::Comment => self.comment,
            Category::Footnote => self.footnote,
        }
    }

    pub fn set(&mut self, category: Category, value: T) {
        *self.get_mut(category) = value;
    }

    pub fn get_mut(&mut self, category: Category) -> &mut T {
        match category {
            Category::Highlight => &mut self.highlight,
            Category::Comment => &mut self.comment,
            Category::Footnote => &mut self.footnote,
        }
    }

    /// `(category, value)` pairs in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, T)> + '_ {
        Category::all().iter().map(move |c| (*c, self.get(*c)))
    }
}

/// Whether a transition must be written back to settings storage.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChangeScope {
    Persist,
    Transient,
}

impl ChangeScope {
    pub fn needs_persist(&self) -> bool {
        matches!(self, ChangeScope::Persist)
    }
}

/// A user interaction expressed as data, so hosts can forward UI events unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ViewAction {
    SetFontSize { px: i64 },
    ToggleCategoryVisible { category: Category },
    /// Right-click "show all": every category visible. Collapse state is left alone.
    ShowAllCategories,
    ToggleCategoryCollapsed { category: Category },
    SetCategorySortOrder { category: Category, order: SortOrder },
    SetDefaultSortOrder { order: SortOrder },
    SetSearchQuery { query: String },
}

/// The persisted subset of [ViewState]. Field order keeps plain values ahead of tables so
/// the struct serializes cleanly to toml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSettings {
    pub font_size_px: u32,
    pub default_sort_order: SortOrder,
    pub category_visible: CategoryMap<bool>,
    pub category_collapsed: CategoryMap<bool>,
    pub category_sort_order: CategoryMap<SortOrder>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    font_size_px: u32,
    category_visible: CategoryMap<bool>,
    category_collapsed: CategoryMap<bool>,
    category_sort_order: CategoryMap<SortOrder>,
    default_sort_order: SortOrder,
    search_query: String,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            font_size_px: DEFAULT_FONT_SIZE_PX,
            category_visible: CategoryMap::splat(true),
            category_collapsed: CategoryMap::splat(false),
            category_sort_order: CategoryMap::splat(SortOrder::default()),
            default_sort_order: SortOrder::default(),
            search_query: String::new(),
        }
    }
}

fn clamp_font_size(px: i64) -> u32 {
    px.clamp(MIN_FONT_SIZE_PX as i64, MAX_FONT_SIZE_PX as i64) as u32
}

fn repair_map<T: Copy>(
    blob: &Map<String, Value>,
    key: &str,
    fallback: CategoryMap<T>,
    read: impl Fn(&Value) -> Option<T>,
) -> CategoryMap<T> {
    let Some(value) = blob.get(key) else {
        return fallback;
    };
    let Some(entries) = value.as_object() else {
        tracing::warn!("Settings key '{key}' is not a map, using defaults");
        return fallback;
    };
    let mut repaired = fallback;
    for category in Category::all() {
        match entries.get(category.key()).map(&read) {
            Some(Some(v)) => repaired.set(*category, v),
            Some(None) => {
                tracing::warn!("Settings key '{key}.{category}' has the wrong type, using default")
            }
            None => {}
        }
    }
    repaired
}

impl ViewState {
    /// Rebuild state from a persisted settings blob.
    ///
    /// Each known key is taken from the blob when present and well-typed, otherwise from the
    /// defaults. Unknown keys are ignored. A missing blob yields the defaults. The search
    /// query always starts empty.
    pub fn repair(blob: Option<&Value>) -> ViewState {
        let defaults = ViewState::default();
        let Some(blob) = blob else {
            return defaults;
        };
        let Some(blob) = blob.as_object() else {
            tracing::warn!("Settings blob is not a map, using defaults");
            return defaults;
        };

        let font_size_px = match blob.get("fontSizePx") {
            None => defaults.font_size_px,
            Some(value) => match value.as_f64() {
                Some(px) => clamp_font_size(px.round() as i64),
                None => {
                    tracing::warn!("Settings key 'fontSizePx' is not a number, using default");
                    defaults.font_size_px
                }
            },
        };

        let default_sort_order = match blob.get("defaultSortOrder") {
            None => defaults.default_sort_order,
            Some(value) => match value.as_str() {
                Some(key) => SortOrder::from_key_lossy(key),
                None => {
                    tracing::warn!(
                        "Settings key 'defaultSortOrder' is not a string, using default"
                    );
                    defaults.default_sort_order
                }
            },
        };

        ViewState {
            font_size_px,
            category_visible: repair_map(
                blob,
                "categoryVisible",
                defaults.category_visible,
                Value::as_bool,
            ),
            category_collapsed: repair_map(
                blob,
                "categoryCollapsed",
                defaults.category_collapsed,
                Value::as_bool,
            ),
            category_sort_order: repair_map(
                blob,
                "categorySortOrder",
                CategoryMap::splat(default_sort_order),
                |v| v.as_str().map(SortOrder::from_key_lossy),
            ),
            default_sort_order,
            search_query: String::new(),
        }
    }

    /// The fields that survive a session. Excludes the search query.
    pub fn persisted(&self) -> PersistedSettings {
        PersistedSettings {
            font_size_px: self.font_size_px,
            default_sort_order: self.default_sort_order,
            category_visible: self.category_visible,
            category_collapsed: self.category_collapsed,
            category_sort_order: self.category_sort_order,
        }
    }

    pub fn font_size_px(&self) -> u32 {
        self.font_size_px
    }

    pub fn is_visible(&self, category: Category) -> bool {
        self.category_visible.get(category)
    }

    pub fn visible_categories(&self) -> EnumSet<Category> {
        Category::all()
            .iter()
            .filter(|c| self.is_visible(**c))
            .copied()
            .collect()
    }

    pub fn is_collapsed(&self, category: Category) -> bool {
        self.category_collapsed.get(category)
    }

    /// Effective sort order for a category's section.
    pub fn sort_order(&self, category: Category) -> SortOrder {
        self.category_sort_order.get(category)
    }

    pub fn default_sort_order(&self) -> SortOrder {
        self.default_sort_order
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_font_size(&mut self, px: i64) -> ChangeScope {
        self.font_size_px = clamp_font_size(px);
        ChangeScope::Persist
    }

    pub fn toggle_category_visible(&mut self, category: Category) -> ChangeScope {
        let visible = self.category_visible.get_mut(category);
        *visible = !*visible;
        ChangeScope::Persist
    }

    pub fn set_all_categories_visible(&mut self, visible: bool) -> ChangeScope {
        self.category_visible = CategoryMap::splat(visible);
        ChangeScope::Persist
    }

    /// Collapse is independent of visibility.
    pub fn toggle_category_collapsed(&mut self, category: Category) -> ChangeScope {
        let collapsed = self.category_collapsed.get_mut(category);
        *collapsed = !*collapsed;
        ChangeScope::Persist
    }

    /// Overrides one category. The default sort order is untouched.
    pub fn set_category_sort_order(&mut self, category: Category, order: SortOrder) -> ChangeScope {
        self.category_sort_order.set(category, order);
        ChangeScope::Persist
    }

    /// Sets the default and snaps every category back to it.
    pub fn set_default_sort_order(&mut self, order: SortOrder) -> ChangeScope {
        self.default_sort_order = order;
        self.category_sort_order = CategoryMap::splat(order);
        ChangeScope::Persist
    }

    pub fn set_search_query<T: Into<String>>(&mut self, query: T) -> ChangeScope {
        self.search_query = query.into();
        ChangeScope::Transient
    }

    pub fn apply(&mut self, action: ViewAction) -> ChangeScope {
        tracing::debug!("Applying view action {action:?}");
        match action {
            ViewAction::SetFontSize { px } => self.set_font_size(px),
            ViewAction::ToggleCategoryVisible { category } => {
                self.toggle_category_visible(category)
            }
            ViewAction::ShowAllCategories => self.set_all_categories_visible(true),
            ViewAction::ToggleCategoryCollapsed { category } => {
                self.toggle_category_collapsed(category)
            }
            ViewAction::SetCategorySortOrder { category, order } => {
                self.set_category_sort_order(category, order)
            }
            ViewAction::SetDefaultSortOrder { order } => self.set_default_sort_order(order),
            ViewAction::SetSearchQuery { query } => self.set_search_query(query),
        }
    }
}
