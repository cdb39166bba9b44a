//! Inline rewrite stages.
//!
//! Tag, link and emphasis patterns never match a NUL, so placeholder tokens
//! pass through those stages intact. Constructs that are removed outright
//! (HTML comments, footnote definitions) take any tokens inside them along.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use super::options::LinkMode;
use super::vault::{self, PlaceholderKind, Vault};

static INLINE_CODE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`\n]+)`").unwrap());

static HTML_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static AUTOLINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<((?:[A-Za-z][A-Za-z0-9+.-]*://|mailto:)[^<>\s\x00]+)>").unwrap()
});

static HTML_TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^<>\x00]+>").unwrap());

static FOOTNOTE_DEFINITION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\[\^[^\]\n]+\]:.*$").unwrap());

static FOOTNOTE_REFERENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\^[^\]\n]+\]").unwrap());

/// Destination of a link or image: a URL on one line, which may contain
/// spaces and one level of balanced parentheses, then an optional title.
pub(crate) const DESTINATION: &str =
    r#"\(\s*((?:[^()\n\x00]|\([^()\n\x00]*\))+?)(?:\s+"[^"\n]*")?\s*\)"#;

static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"!\[[^\]\n]*\]{DESTINATION}")).unwrap());

static LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"\[([^\]\n]+)\]{DESTINATION}")).unwrap());

static BOLD_STAR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());

static BOLD_UNDERSCORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"__(.+?)__").unwrap());

static STRIKETHROUGH_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~~(.+?)~~").unwrap());

/// Swap inline code spans for placeholder tokens.
pub fn extract_inline_code(text: &str) -> (String, Vault) {
    vault::extract(text, &INLINE_CODE_RE, PlaceholderKind::InlineCode, |caps| {
        format!("[code]{}[/code]", &caps[1])
    })
}

/// Remove HTML comments, then tags. Autolinks keep their address.
pub fn strip_html(text: &str) -> String {
    let text = HTML_COMMENT_RE.replace_all(text, "");
    let text = AUTOLINK_RE.replace_all(&text, "${1}");
    HTML_TAG_RE.replace_all(&text, "").into_owned()
}

/// Blank footnote definition lines, then drop the references.
pub fn strip_footnotes(text: &str) -> String {
    let text = FOOTNOTE_DEFINITION_RE.replace_all(text, "");
    FOOTNOTE_REFERENCE_RE.replace_all(&text, "").into_owned()
}

/// `![alt](url)` becomes the bare URL.
pub fn images(text: &str) -> String {
    IMAGE_RE.replace_all(text, "${1}").into_owned()
}

/// `[label](url)` becomes the label, the URL, or both on separate lines.
pub fn links(text: &str, mode: LinkMode) -> String {
    LINK_RE
        .replace_all(text, |caps: &Captures<'_>| match mode {
            LinkMode::Label => caps[1].to_string(),
            LinkMode::Url => caps[2].to_string(),
            LinkMode::Both => format!("{}\n{}", &caps[1], &caps[2]),
        })
        .into_owned()
}

/// `**x**` and `__x__` become `[b]x[/b]`, or plain `x` when disabled.
pub fn bold(text: &str, enabled: bool) -> String {
    let replacement = if enabled { "[b]${1}[/b]" } else { "${1}" };
    let text = BOLD_STAR_RE.replace_all(text, replacement);
    BOLD_UNDERSCORE_RE.replace_all(&text, replacement).into_owned()
}

/// Strip single-delimiter `*x*` and `_x_` emphasis.
///
/// Run after [`bold`], so any `**` or `__` still present is unbalanced and
/// must not be split into two single delimiters.
pub fn italic(text: &str) -> String {
    let text = strip_single_delimiters(text, '*', false);
    strip_single_delimiters(&text, '_', true)
}

/// `~~x~~` becomes `x`.
pub fn strikethrough(text: &str) -> String {
    STRIKETHROUGH_RE.replace_all(text, "${1}").into_owned()
}

fn strip_single_delimiters(text: &str, marker: char, word_bound: bool) -> String {
    text.split('\n')
        .map(|line| strip_line_delimiters(line, marker, word_bound))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Pair up lone `marker` characters on one line and drop each pair.
///
/// A delimiter is lone when neither neighbor is `marker`. The text between
/// a pair is non-empty and free of `marker`. With `word_bound`, an opener
/// may not follow an alphanumeric character and a closer may not precede
/// one, which keeps `snake_case_names` intact.
fn strip_line_delimiters(line: &str, marker: char, word_bound: bool) -> String {
    if !line.contains(marker) {
        return line.to_string();
    }
    let chars: Vec<char> = line.chars().collect();
    let is_lone = |i: usize| {
        chars[i] == marker
            && (i == 0 || chars[i - 1] != marker)
            && chars.get(i + 1).is_none_or(|&c| c != marker)
    };
    let can_open = |i: usize| {
        is_lone(i)
            && chars.get(i + 1).is_some_and(|c| !c.is_whitespace())
            && !(word_bound && i > 0 && chars[i - 1].is_alphanumeric())
    };
    let can_close = |i: usize| {
        is_lone(i)
            && !chars[i - 1].is_whitespace()
            && !(word_bound && chars.get(i + 1).is_some_and(|c| c.is_alphanumeric()))
    };

    let mut removed = vec![false; chars.len()];
    let mut i = 0;
    while i < chars.len() {
        if !can_open(i) {
            i += 1;
            continue;
        }
        let Some(offset) = chars[i + 1..].iter().position(|&c| c == marker) else {
            break;
        };
        let close = i + 1 + offset;
        if close > i + 1 && can_close(close) {
            removed[i] = true;
            removed[close] = true;
            i = close + 1;
        } else {
            i = close;
        }
    }

    chars
        .iter()
        .zip(removed)
        .filter_map(|(&c, skip)| (!skip).then_some(c))
        .collect()
}
