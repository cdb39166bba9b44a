//! Markdown to V2EX Default conversion pipeline.
//!
//! This module handles:
//! - Protecting fenced and inline code behind placeholder tokens
//! - Block rewrites (quotes, headings, tables, lists, rules)
//! - Inline rewrites (HTML, footnotes, images, links, emphasis)
//! - Final blank-line cleanup
//!
//! The stage order is fixed. Fenced code is pulled out before any block
//! stage sees the text; inline code is pulled out after the block stages
//! and before the inline ones, so emphasis inside a code span is never
//! touched. Both are restored verbatim at the end.

pub mod block;
pub mod inline;
mod options;
pub mod vault;

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

pub use options::{ConvertOptions, HeadingSeparator, LinkMode, ParseOptionError, TableMode};

use crate::diagnostics::{self, Warning};
use crate::perf;

static EXCESS_NEWLINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Convert Markdown to V2EX Default syntax.
///
/// Never fails: constructs the pipeline does not recognize pass through
/// unchanged. Empty or whitespace-only input yields an empty string.
///
/// # Example
///
/// ```
/// use mdv2ex::convert::{convert, ConvertOptions};
///
/// let out = convert("# Hi\n\n**bold**", &ConvertOptions::default());
/// assert_eq!(out, "Hi\n======\n\n[b]bold[/b]");
/// ```
pub fn convert(markdown: &str, options: &ConvertOptions) -> String {
    let _scope = perf::scope("convert");
    let mut text = sanitize(markdown);
    if text.trim().is_empty() {
        return String::new();
    }

    let (rewritten, code_blocks) = timed("extract_code_blocks", || block::extract_code_blocks(&text));
    text = rewritten;

    text = timed("blockquotes", || block::blockquotes(&text));
    text = timed("headings", || block::headings(&text, options.heading_separator));
    text = timed("tables", || block::tables(&text, options.table));
    text = timed("task_lists", || block::task_lists(&text));
    text = timed("lists", || block::lists(&text));
    text = timed("horizontal_rules", || block::horizontal_rules(&text));

    let (rewritten, inline_code) = timed("extract_inline_code", || inline::extract_inline_code(&text));
    text = rewritten;

    text = timed("html", || inline::strip_html(&text));
    text = timed("footnotes", || inline::strip_footnotes(&text));
    text = timed("images", || inline::images(&text));
    text = timed("links", || inline::links(&text, options.links));
    text = timed("bold", || inline::bold(&text, options.bold));
    text = timed("italic", || inline::italic(&text));
    text = timed("strikethrough", || inline::strikethrough(&text));

    text = inline_code.restore(&text);
    text = code_blocks.restore(&text);
    tracing::debug!(
        code_blocks = code_blocks.len(),
        inline_code = inline_code.len(),
        "restored protected regions"
    );

    cleanup(&text)
}

/// Remove NUL characters and normalize line endings to `\n`.
///
/// NUL is reserved for placeholder tokens.
fn sanitize(markdown: &str) -> String {
    markdown
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace(vault::SENTINEL, "")
}

/// Collapse three or more newlines to two and trim the result.
fn cleanup(text: &str) -> String {
    EXCESS_NEWLINES_RE
        .replace_all(text, "\n\n")
        .trim()
        .to_string()
}

fn timed<T>(name: &'static str, stage: impl FnOnce() -> T) -> T {
    let _scope = perf::scope(name);
    stage()
}

/// Output of a conversion together with the advisory warnings.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub output: String,
    pub warnings: Vec<Warning>,
}

/// A conversion pipeline bound to one set of options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub const fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub const fn options(&self) -> &ConvertOptions {
        &self.options
    }

    pub fn convert(&self, markdown: &str) -> String {
        convert(markdown, &self.options)
    }

    /// Convert and also report unsupported constructs found in `markdown`.
    pub fn convert_with_warnings(&self, markdown: &str) -> Conversion {
        Conversion {
            output: self.convert(markdown),
            warnings: diagnostics::check(markdown),
        }
    }
}
