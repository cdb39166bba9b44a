//! Block-level rewrite stages.
//!
//! Each stage takes the whole document and returns the whole document.
//! Line-oriented stages split on `\n` and join back with `\n`, so a stage
//! that emits an empty string for a line still produces a line.

use std::sync::LazyLock;

use regex::Regex;

use super::options::{HeadingSeparator, TableMode};
use super::vault::{self, PlaceholderKind, Vault};

static FENCED_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```[\w+#.-]*\n(.*?)```").unwrap());

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());

static BLOCKQUOTE_PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*> ?").unwrap());

static TABLE_ROW_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*\|.*\|\s*$").unwrap());

static ALIGNMENT_CELL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^:?-+:?$").unwrap());

static TASK_ITEM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*)[-*+]\s+\[([ xX])\]\s+(.+)$").unwrap());

static LIST_ITEM_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\s*)[-*+]\s+(.+)$").unwrap());

static HORIZONTAL_RULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:-{3,}|\*{3,}|_{3,})\s*$").unwrap());

/// Nested list indentation is cut to this many characters.
const MAX_LIST_INDENT: usize = 4;

const HORIZONTAL_RULE: &str = "------";

/// Swap fenced code blocks for placeholder tokens.
///
/// The info string after the opening fence is dropped; the body keeps every
/// character except trailing whitespace.
pub fn extract_code_blocks(text: &str) -> (String, Vault) {
    vault::extract(text, &FENCED_CODE_RE, PlaceholderKind::CodeBlock, |caps| {
        format!("[code]{}[/code]", caps[1].trim_end())
    })
}

/// Merge runs of `>` lines into `[blockquote]...[/blockquote]` blocks.
pub fn blockquotes(text: &str) -> String {
    let mut result: Vec<String> = Vec::new();
    let mut buffer: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if line.trim_start().starts_with('>') {
            let prefix_len = BLOCKQUOTE_PREFIX_RE.find(line).map_or(0, |m| m.end());
            buffer.push(&line[prefix_len..]);
            continue;
        }
        flush_blockquote(&mut buffer, &mut result);
        result.push(line.to_string());
    }
    flush_blockquote(&mut buffer, &mut result);

    result.join("\n")
}

fn flush_blockquote(buffer: &mut Vec<&str>, result: &mut Vec<String>) {
    if buffer.is_empty() {
        return;
    }
    result.push(format!("[blockquote]{}[/blockquote]", buffer.join("\n")));
    buffer.clear();
}

/// Replace `#` headings with the heading text and an underline.
pub fn headings(text: &str, separator: HeadingSeparator) -> String {
    map_lines(text, |line, out| {
        let Some(caps) = HEADING_RE.captures(line) else {
            return false;
        };
        let content = strip_closing_hashes(caps[2].trim());
        if content.is_empty() {
            return false;
        }
        out.push(content.to_string());
        out.push(separator.line_for(caps[1].len()).to_string());
        true
    })
}

/// Drop a closing `#` run such as in `## Title ##`. The run must be
/// separated by whitespace, so `C#` keeps its hash.
fn strip_closing_hashes(content: &str) -> &str {
    let without = content.trim_end_matches('#');
    if without.len() == content.len() {
        return content;
    }
    if without.is_empty() || without.ends_with(char::is_whitespace) {
        return without.trim_end();
    }
    content
}

/// Render pipe tables according to `mode`.
pub fn tables(text: &str, mode: TableMode) -> String {
    let mut result: Vec<String> = Vec::new();
    let mut region: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if TABLE_ROW_RE.is_match(line) {
            region.push(line);
            continue;
        }
        if !region.is_empty() {
            result.extend(format_table(&region, mode));
            region.clear();
        }
        result.push(line.to_string());
    }
    if !region.is_empty() {
        result.extend(format_table(&region, mode));
    }

    result.join("\n")
}

fn format_table(rows: &[&str], mode: TableMode) -> Vec<String> {
    if mode == TableMode::Strip {
        return Vec::new();
    }
    let content_rows = rows.iter().filter(|row| !is_alignment_row(row));
    match mode {
        TableMode::Keep => content_rows.map(|row| (*row).to_string()).collect(),
        TableMode::Space => content_rows
            .map(|row| {
                row.split('|')
                    .map(str::trim)
                    .filter(|cell| !cell.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect(),
        TableMode::Strip => Vec::new(),
    }
}

/// A row whose non-blank cells are all `---`, `:--`, `--:` or `:-:`.
fn is_alignment_row(row: &str) -> bool {
    row.split('|')
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .all(|cell| ALIGNMENT_CELL_RE.is_match(cell))
}

/// Turn `- [x] item` into `[x] item`, normalizing the check mark.
pub fn task_lists(text: &str) -> String {
    map_lines(text, |line, out| {
        let Some(caps) = TASK_ITEM_RE.captures(line) else {
            return false;
        };
        let checkbox = if caps[2].eq_ignore_ascii_case("x") {
            "[x]"
        } else {
            "[ ]"
        };
        out.push(format!("{}{checkbox} {}", &caps[1], &caps[3]));
        true
    })
}

/// Strip unordered list bullets, keeping at most four characters of indent.
///
/// Ordered items are valid plain text in the target format and pass through.
pub fn lists(text: &str) -> String {
    map_lines(text, |line, out| {
        let Some(caps) = LIST_ITEM_RE.captures(line) else {
            return false;
        };
        let indent: String = caps[1].chars().take(MAX_LIST_INDENT).collect();
        out.push(format!("{indent}{}", &caps[2]));
        true
    })
}

/// Normalize `---`, `***` and `___` rules to `------`.
pub fn horizontal_rules(text: &str) -> String {
    map_lines(text, |line, out| {
        if !HORIZONTAL_RULE_RE.is_match(line) {
            return false;
        }
        out.push(HORIZONTAL_RULE.to_string());
        true
    })
}

/// Apply `rewrite` to every line; lines it declines are copied verbatim.
fn map_lines<F>(text: &str, mut rewrite: F) -> String
where
    F: FnMut(&str, &mut Vec<String>) -> bool,
{
    let mut result: Vec<String> = Vec::new();
    for line in text.split('\n') {
        if !rewrite(line, &mut result) {
            result.push(line.to_string());
        }
    }
    result.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_block_drops_language_and_trailing_whitespace() {
        let (text, vault) = extract_code_blocks("before\n```rust\nlet x = 1;\n\n```\nafter");
        assert_eq!(text, "before\n\0CODEBLOCK0\0\nafter");
        assert_eq!(vault.entries()[0].content, "[code]let x = 1;[/code]");
    }

    #[test]
    fn test_code_block_keeps_inner_markup_verbatim() {
        let (_, vault) = extract_code_blocks("```\n# not a heading\n`tick`\n```");
        assert_eq!(vault.entries()[0].content, "[code]# not a heading\n`tick`[/code]");
    }

    #[test]
    fn test_empty_code_block() {
        let (_, vault) = extract_code_blocks("```\n```");
        assert_eq!(vault.entries()[0].content, "[code][/code]");
    }

    #[test]
    fn test_unterminated_fence_is_not_extracted() {
        let (text, vault) = extract_code_blocks("```\nopen forever");
        assert!(vault.is_empty());
        assert_eq!(text, "```\nopen forever");
    }

    #[test]
    fn test_blockquote_merges_consecutive_lines() {
        assert_eq!(
            blockquotes("> one\n>two\n  > three"),
            "[blockquote]one\ntwo\nthree[/blockquote]"
        );
    }

    #[test]
    fn test_blockquote_strips_only_one_space() {
        assert_eq!(blockquotes(">   indented"), "[blockquote]  indented[/blockquote]");
    }

    #[test]
    fn test_blockquotes_separated_by_blank_line_stay_separate() {
        assert_eq!(
            blockquotes("> a\n\n> b"),
            "[blockquote]a[/blockquote]\n\n[blockquote]b[/blockquote]"
        );
    }

    #[test]
    fn test_blockquote_flushes_at_end_of_input() {
        assert_eq!(blockquotes("text\n> tail"), "text\n[blockquote]tail[/blockquote]");
    }

    #[test]
    fn test_heading_closing_hashes_trimmed() {
        assert_eq!(headings("## Title ##", HeadingSeparator::Equals), "Title\n======");
        assert_eq!(headings("### Title #", HeadingSeparator::Equals), "Title\n------");
        assert_eq!(headings("# Learn C#", HeadingSeparator::Equals), "Learn C#\n======");
        assert_eq!(headings("# ###", HeadingSeparator::Equals), "# ###");
    }

    #[test]
    fn test_headings_all_levels_equals() {
        for level in 1..=6 {
            let line = format!("{} Title", "#".repeat(level));
            let expected = if level <= 2 { "Title\n======" } else { "Title\n------" };
            assert_eq!(headings(&line, HeadingSeparator::Equals), expected, "level {level}");
        }
    }

    #[test]
    fn test_headings_dashes_everywhere() {
        assert_eq!(headings("# Top", HeadingSeparator::Dashes), "Top\n------");
    }

    #[test]
    fn test_seven_hashes_is_not_a_heading() {
        assert_eq!(headings("####### deep", HeadingSeparator::Equals), "####### deep");
    }

    #[test]
    fn test_heading_requires_space_and_text() {
        assert_eq!(headings("#hashtag", HeadingSeparator::Equals), "#hashtag");
        assert_eq!(headings("#   ", HeadingSeparator::Equals), "#   ");
    }

    #[test]
    fn test_heading_text_is_trimmed() {
        assert_eq!(headings("##   spaced   ", HeadingSeparator::Equals), "spaced\n======");
    }

    const TABLE: &str = "| A | B |\n|:---|---:|\n| 1 | 2 |";

    #[test]
    fn test_table_space_mode_removes_pipes() {
        assert_eq!(tables(TABLE, TableMode::Space), "A B\n1 2");
    }

    #[test]
    fn test_table_keep_mode_drops_only_separator() {
        assert_eq!(tables(TABLE, TableMode::Keep), "| A | B |\n| 1 | 2 |");
    }

    #[test]
    fn test_table_strip_mode_produces_no_lines() {
        assert_eq!(tables(&format!("before\n{TABLE}\nafter"), TableMode::Strip), "before\nafter");
    }

    #[test]
    fn test_separator_only_region_produces_no_lines() {
        assert_eq!(tables("x\n|---|---|\ny", TableMode::Space), "x\ny");
    }

    #[test]
    fn test_two_tables_are_formatted_independently() {
        let input = "| a |\n\n| b | c |";
        assert_eq!(tables(input, TableMode::Space), "a\n\nb c");
    }

    #[test]
    fn test_task_list_normalizes_checkbox() {
        assert_eq!(task_lists("- [X] done"), "[x] done");
        assert_eq!(task_lists("* [ ] todo"), "[ ] todo");
        assert_eq!(task_lists("  + [x] nested"), "  [x] nested");
    }

    #[test]
    fn test_list_markers_are_stripped() {
        assert_eq!(lists("- a\n* b\n+ c"), "a\nb\nc");
    }

    #[test]
    fn test_list_indent_truncated_to_four() {
        assert_eq!(lists("  - two\n        - eight"), "  two\n    eight");
    }

    #[test]
    fn test_ordered_list_untouched() {
        assert_eq!(lists("1. one\n2. two"), "1. one\n2. two");
    }

    #[test]
    fn test_emphasis_at_line_start_is_not_a_bullet() {
        assert_eq!(lists("**bold** start\n*em* start"), "**bold** start\n*em* start");
    }

    #[test]
    fn test_horizontal_rules_normalized() {
        for rule in ["---", "***", "___", "----------", "  ***  "] {
            assert_eq!(horizontal_rules(rule), "------", "rule {rule:?}");
        }
    }

    #[test]
    fn test_mixed_or_short_rules_untouched() {
        for line in ["--", "-*-", "- - -", "--- text"] {
            assert_eq!(horizontal_rules(line), line, "line {line:?}");
        }
    }
}
