//! Annotation records and the categories they fall into.

use enumset::{EnumSet, EnumSetType};
use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

/// The three kinds of inline annotation extracted from a document.
///
/// Declaration order is the fixed display order used by render plans.
#[derive(Debug, Serialize, Deserialize, PartialOrd, Ord, Hash, EnumSetType)]
#[enumset(serialize_repr = "list")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// `==text==` or `<mark>text</mark>`
    Highlight,
    /// `%%text%%` or `<!-- text -->`
    Comment,
    /// `[^id]: text`
    Footnote,
}

impl Category {
    /// All categories in display order.
    pub fn all() -> &'static [Category] {
        &[Category::Highlight, Category::Comment, Category::Footnote]
    }

    pub fn set() -> EnumSet<Category> {
        EnumSet::all()
    }

    /// Key used for this category in persisted settings.
    pub fn key(&self) -> &'static str {
        match self {
            Category::Highlight => "highlight",
            Category::Comment => "comment",
            Category::Footnote => "footnote",
        }
    }

    /// Section heading shown by a UI layer.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Highlight => "Highlights",
            Category::Comment => "Comments",
            Category::Footnote => "Footnotes",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::all()
            .iter()
            .find(|category| category.key().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| format!("Unknown annotation category '{s}'"))
    }
}

/// One annotation found in a document.
///
/// Records are plain values produced fresh by every [crate::parser::parse] call. Positions go
/// stale as soon as the document is edited, so records are never cached across parses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRecord {
    pub category: Category,
    /// Trimmed inner content. Footnotes carry the reconstructed `[^id]: body` string.
    pub text: String,
    /// Zero-based line index.
    pub line: usize,
    /// Zero-based character offset of the start of the full match within its line.
    pub column: usize,
    /// Length in characters of the full match, delimiters included.
    pub span_length: usize,
}

impl AnnotationRecord {
    pub fn new<T: Into<String>>(
        category: Category,
        text: T,
        line: usize,
        column: usize,
        span_length: usize,
    ) -> Self {
        AnnotationRecord {
            category,
            text: text.into(),
            line,
            column,
            span_length,
        }
    }

    /// Character offset one past the end of the matched span.
    pub fn end_column(&self) -> usize {
        self.column + self.span_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_display_order() {
        let ordered: Vec<Category> = Category::set().iter().collect();
        assert_eq!(ordered, Category::all());
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Comment".parse::<Category>(), Ok(Category::Comment));
        assert_eq!(" footnote ".parse::<Category>(), Ok(Category::Footnote));
        assert!("marginal".parse::<Category>().is_err());
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = AnnotationRecord::new(Category::Highlight, "alpha", 0, 4, 9);
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["spanLength"], 9);
        assert_eq!(value["category"], "highlight");
        assert_eq!(record.end_column(), 13);
    }
}
