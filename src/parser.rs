//! Extraction of highlights, comments and footnote definitions from document text.
//!
//! The parser is a pure function over a borrowed string. Each line is scanned independently
//! against five patterns in a fixed order:
//!
//! 1. `==text==` → [Category::Highlight]
//! 2. `<mark>text</mark>` (tag name case-insensitive) → [Category::Highlight]
//! 3. `%%text%%` → [Category::Comment]
//! 4. `<!-- text -->` → [Category::Comment]
//! 5. `[^id]: text` → [Category::Footnote]
//!
//! Delimited patterns are non-greedy: within a pattern, matches are found left to right,
//! never overlap, and each consumes the shortest span that closes. Different patterns are
//! matched independently, so `==%%x%%==` yields both a highlight and a comment.
//!
//! Columns and span lengths are counted in characters (Unicode scalar values), not bytes.
//! Lines are split on `\n` and a trailing `\r` is dropped. Highlight and comment bodies are
//! trimmed; footnote bodies are kept verbatim.
//!
//! The footnote pattern is not anchored to the start of the line, so `see [^a]: later`
//! yields a footnote definition at column 4.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::annotation::{AnnotationRecord, Category};

#[derive(Debug, Clone, Copy)]
enum BodyKind {
    /// Capture group 1, trimmed.
    Inner,
    /// Capture group 1 is the footnote id, group 2 the remainder of the line.
    Footnote,
}

#[derive(Debug)]
struct AnnotationPattern {
    category: Category,
    regex: Regex,
    body: BodyKind,
}

impl AnnotationPattern {
    fn new(category: Category, pattern: &str, body: BodyKind) -> Self {
        AnnotationPattern {
            category,
            regex: Regex::new(pattern).expect("annotation patterns to always compile"),
            body,
        }
    }

    fn text(&self, caps: &Captures<'_>) -> Option<String> {
        match self.body {
            BodyKind::Inner => caps.get(1).map(|inner| inner.as_str().trim().to_string()),
            BodyKind::Footnote => {
                let id = caps.get(1)?;
                let rest = caps.get(2).map(|rest| rest.as_str()).unwrap_or_default();
                Some(format!("[^{}]: {}", id.as_str(), rest))
            }
        }
    }
}

/// Scan order matters: records for one line are emitted by column, and patterns never
/// share a start column, so this order only decides how a line is searched.
static PATTERNS: Lazy<Vec<AnnotationPattern>> = Lazy::new(|| {
    vec![
        AnnotationPattern::new(Category::Highlight, r"==(.+?)==", BodyKind::Inner),
        AnnotationPattern::new(
            Category::Highlight,
            r"(?i)<mark>(.+?)</mark>",
            BodyKind::Inner,
        ),
        AnnotationPattern::new(Category::Comment, r"%%(.+?)%%", BodyKind::Inner),
        AnnotationPattern::new(Category::Comment, r"<!--(.+?)-->", BodyKind::Inner),
        // At most one separating whitespace character is consumed; the rest of the line is
        // kept verbatim.
        AnnotationPattern::new(
            Category::Footnote,
            r"\[\^([^\]]+)\]:\s?(.*)",
            BodyKind::Footnote,
        ),
    ]
});

/// Split document text into lines on `\n`, dropping the `\r` of CRLF line endings.
pub fn lines(text: &str) -> impl Iterator<Item = &str> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
}

/// Extract every annotation on a single line.
///
/// Records are returned ordered by column.
pub fn parse_line(line: &str, line_idx: usize) -> Vec<AnnotationRecord> {
    let mut records = Vec::new();
    for pattern in PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(line) {
            let (Some(full), Some(text)) = (caps.get(0), pattern.text(&caps)) else {
                continue;
            };
            records.push(AnnotationRecord {
                category: pattern.category,
                text,
                line: line_idx,
                column: line[..full.start()].chars().count(),
                span_length: full.as_str().chars().count(),
            });
        }
    }
    records.sort_by_key(|record| record.column);
    records
}

/// Extract every annotation in `text`, top to bottom and left to right within a line.
///
/// Never fails: unterminated or malformed delimiters simply produce no record.
pub fn parse(text: &str) -> Vec<AnnotationRecord> {
    let records: Vec<AnnotationRecord> = lines(text)
        .enumerate()
        .flat_map(|(line_idx, line)| parse_line(line, line_idx))
        .collect();
    tracing::debug!("Parsed {} annotation(s)", records.len());
    records
}
