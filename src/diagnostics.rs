//! Warnings about Markdown constructs the V2EX Default format cannot show.
//!
//! The checks look at the unconverted input, not the converted text, and never
//! influence the conversion itself.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Serialize, Serializer};

use crate::convert::inline::DESTINATION;

/// Same shape the image stage rewrites, so the warning fires exactly when
/// an image is replaced.
static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"!\[[^\]\n]*\]{DESTINATION}")).unwrap());

static TABLE_ROW_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^\s*\|.*\|\s*$").unwrap());

static TASK_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*[-*+]\s+\[[ xX]\]\s+\S").unwrap());

/// Matches both references and the start of definitions.
static FOOTNOTE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\^[^\]\n]+\]").unwrap());

/// A comment opener, or a tag whose name starts with a letter.
static HTML_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--|</?([A-Za-z][A-Za-z0-9]*)[^<>]*>").unwrap());

/// `<https://..>` and `<mailto:..>` keep their address in the output.
static AUTOLINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<(?:[A-Za-z][A-Za-z0-9+.-]*://|mailto:)[^<>\s]+>$").unwrap()
});

/// Inline tags the forum tolerates.
const ALLOWED_TAGS: &[&str] = &["code", "pre", "b", "i", "strong", "em"];

/// One category of unsupported content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Warning {
    Image,
    Table,
    TaskList,
    Footnote,
    Html,
}

impl Warning {
    pub const ALL: [Self; 5] = [
        Self::Image,
        Self::Table,
        Self::TaskList,
        Self::Footnote,
        Self::Html,
    ];

    /// Human-readable explanation of what happened to the construct.
    pub const fn message(self) -> &'static str {
        match self {
            Self::Image => "images are not supported inline; each image was replaced by its URL",
            Self::Table => "tables are not supported; table rows were converted to plain text",
            Self::TaskList => "task lists are not supported; items were converted to [x]/[ ] lines",
            Self::Footnote => "footnotes are not supported; references and definitions were removed",
            Self::Html => "HTML tags may not be supported; tags and comments were removed",
        }
    }

    fn detect(self, markdown: &str) -> bool {
        match self {
            Self::Image => IMAGE_RE.is_match(markdown),
            Self::Table => TABLE_ROW_RE.is_match(markdown),
            Self::TaskList => TASK_ITEM_RE.is_match(markdown),
            Self::Footnote => FOOTNOTE_RE.is_match(markdown),
            Self::Html => has_disallowed_html(markdown),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for Warning {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

/// Every category of unsupported content present in `markdown`, in a fixed
/// order, each at most once.
pub fn check(markdown: &str) -> Vec<Warning> {
    let warnings: Vec<Warning> = Warning::ALL
        .into_iter()
        .filter(|warning| warning.detect(markdown))
        .collect();
    if !warnings.is_empty() {
        tracing::debug!(count = warnings.len(), "unsupported constructs detected");
    }
    warnings
}

/// True when `markdown` contains nothing [`check`] would warn about.
pub fn is_compatible(markdown: &str) -> bool {
    Warning::ALL.into_iter().all(|warning| !warning.detect(markdown))
}

fn has_disallowed_html(markdown: &str) -> bool {
    HTML_TAG_RE.captures_iter(markdown).any(|caps| {
        let Some(name) = caps.get(1) else {
            return true;
        };
        if AUTOLINK_RE.is_match(&caps[0]) {
            return false;
        }
        !ALLOWED_TAGS.contains(&name.as_str().to_ascii_lowercase().as_str())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_markdown_has_no_warnings() {
        let md = "# Title\n\n**bold** and [a link](https://e.com)\n\n- item";
        assert!(check(md).is_empty());
        assert!(is_compatible(md));
    }

    #[test]
    fn test_each_category_detected() {
        assert_eq!(check("![a](b.png)"), vec![Warning::Image]);
        assert_eq!(check("| a | b |"), vec![Warning::Table]);
        assert_eq!(check("- [ ] todo"), vec![Warning::TaskList]);
        assert_eq!(check("text[^1]"), vec![Warning::Footnote]);
        assert_eq!(check("[^note]: def"), vec![Warning::Footnote]);
        assert_eq!(check("<div>x</div>"), vec![Warning::Html]);
    }

    #[test]
    fn test_whitelisted_tags_are_not_reported() {
        assert!(check("<b>x</b> <em>y</em> <CODE>z</CODE> <pre>p</pre>").is_empty());
    }

    #[test]
    fn test_comment_counts_as_html() {
        assert_eq!(check("a <!-- hidden --> b"), vec![Warning::Html]);
    }

    #[test]
    fn test_autolinks_and_comparisons_are_not_html() {
        assert!(check("see <https://e.com/a> or <mailto:me@e.com>").is_empty());
        assert!(check("x < 3 and y > 2").is_empty());
        assert!(check("a <-- b --> c").is_empty());
    }

    #[test]
    fn test_image_with_spaced_url_matches_conversion() {
        let md = "![a](my pic.png)";
        assert_eq!(check(md), vec![Warning::Image]);
        assert_eq!(
            crate::convert::convert(md, &crate::convert::ConvertOptions::default()),
            "my pic.png"
        );
        assert!(check("![a]\n(b.png)").is_empty());
    }

    #[test]
    fn test_tag_name_must_match_exactly() {
        assert_eq!(check("<bold>x</bold>"), vec![Warning::Html]);
    }

    #[test]
    fn test_multiple_categories_in_fixed_order_once_each() {
        let md = "<span>s</span>\n![a](b.png)\n![c](d.png)\n| x |";
        assert_eq!(
            check(md),
            vec![Warning::Image, Warning::Table, Warning::Html]
        );
    }

    #[test]
    fn test_display_uses_message() {
        assert_eq!(Warning::Table.to_string(), Warning::Table.message());
    }
}
