//! Placeholder vault for regions that must survive every rewrite stage.
//!
//! Protected text is swapped out for opaque tokens of the form
//! `\0<TAG><n>\0`. The orchestrator strips NUL from the input beforehand, so
//! a token can never collide with ordinary text, and no stage pattern matches
//! across a NUL.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Delimiter byte wrapped around every token.
pub const SENTINEL: char = '\0';

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x00(CODEBLOCK|INLINECODE)(\d+)\x00").unwrap());

/// Category of a protected region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderKind {
    /// Fenced code block.
    CodeBlock,
    /// Inline code span.
    InlineCode,
}

impl PlaceholderKind {
    const fn tag(self) -> &'static str {
        match self {
            Self::CodeBlock => "CODEBLOCK",
            Self::InlineCode => "INLINECODE",
        }
    }

    fn token(self, index: usize) -> String {
        format!("{SENTINEL}{}{index}{SENTINEL}", self.tag())
    }
}

/// A token and the content it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub token: String,
    pub content: String,
}

/// Ordered placeholders extracted during one conversion call.
#[derive(Debug, Clone)]
pub struct Vault {
    kind: PlaceholderKind,
    entries: Vec<Placeholder>,
}

impl Vault {
    pub const fn new(kind: PlaceholderKind) -> Self {
        Self {
            kind,
            entries: Vec::new(),
        }
    }

    pub const fn kind(&self) -> PlaceholderKind {
        self.kind
    }

    /// Placeholders in extraction order.
    pub fn entries(&self) -> &[Placeholder] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Store `content` and return the token minted for it.
    pub fn insert(&mut self, content: String) -> String {
        let token = self.kind.token(self.entries.len());
        self.entries.push(Placeholder {
            token: token.clone(),
            content,
        });
        token
    }

    /// Substitute every token of this vault with its content.
    ///
    /// Tokens of another kind, or with a counter this vault never minted,
    /// are left in place.
    pub fn restore(&self, text: &str) -> String {
        if self.entries.is_empty() {
            return text.to_string();
        }
        TOKEN_RE
            .replace_all(text, |caps: &Captures<'_>| {
                let index = (&caps[1] == self.kind.tag())
                    .then(|| caps[2].parse::<usize>().ok())
                    .flatten();
                match index.and_then(|i| self.entries.get(i)) {
                    Some(entry) => entry.content.clone(),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

/// Replace every match of `pattern` with a fresh token.
///
/// `formatter` computes the protected content from the match; matches are
/// visited left to right and never overlap.
pub fn extract<F>(text: &str, pattern: &Regex, kind: PlaceholderKind, formatter: F) -> (String, Vault)
where
    F: Fn(&Captures<'_>) -> String,
{
    let mut vault = Vault::new(kind);
    let rewritten = pattern
        .replace_all(text, |caps: &Captures<'_>| vault.insert(formatter(caps)))
        .into_owned();
    (rewritten, vault)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backticks() -> Regex {
        Regex::new(r"`([^`\n]+)`").unwrap()
    }

    #[test]
    fn test_extract_replaces_matches_in_order() {
        let (text, vault) = extract(
            "a `x` b `y`",
            &backticks(),
            PlaceholderKind::InlineCode,
            |caps| format!("[code]{}[/code]", &caps[1]),
        );
        assert_eq!(text, "a \0INLINECODE0\0 b \0INLINECODE1\0");
        assert_eq!(vault.len(), 2);
        assert_eq!(vault.entries()[0].content, "[code]x[/code]");
        assert_eq!(vault.entries()[1].content, "[code]y[/code]");
    }

    #[test]
    fn test_restore_is_pure_substitution() {
        let (text, vault) = extract("`a`", &backticks(), PlaceholderKind::InlineCode, |caps| {
            caps[1].to_string()
        });
        let moved = format!("prefix {text} and again {text}");
        assert_eq!(vault.restore(&moved), "prefix a and again a");
    }

    #[test]
    fn test_restore_ignores_other_kinds() {
        let mut blocks = Vault::new(PlaceholderKind::CodeBlock);
        let token = blocks.insert("[code]x[/code]".to_string());
        let inline = Vault::new(PlaceholderKind::InlineCode);
        assert_eq!(inline.restore(&token), token);
        assert_eq!(blocks.restore(&token), "[code]x[/code]");
    }

    #[test]
    fn test_tokens_do_not_prefix_collide() {
        let mut vault = Vault::new(PlaceholderKind::CodeBlock);
        let tokens: Vec<String> = (0..11).map(|i| vault.insert(format!("#{i}"))).collect();
        let joined = tokens.join(" ");
        let restored = vault.restore(&joined);
        assert_eq!(restored, "#0 #1 #2 #3 #4 #5 #6 #7 #8 #9 #10");
    }

    #[test]
    fn test_unknown_counter_is_left_alone() {
        let mut vault = Vault::new(PlaceholderKind::CodeBlock);
        vault.insert("one".to_string());
        let stray = "\0CODEBLOCK7\0";
        assert_eq!(vault.restore(stray), stray);
    }

    #[test]
    fn test_empty_vault_restore_returns_input() {
        let vault = Vault::new(PlaceholderKind::InlineCode);
        assert!(vault.is_empty());
        assert_eq!(vault.restore("plain"), "plain");
    }
}
