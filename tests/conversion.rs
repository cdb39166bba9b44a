use mdv2ex::prelude::*;

const SAMPLE: &str = include_str!("fixtures/sample.md");

fn default_convert(input: &str) -> String {
    convert(input, &ConvertOptions::default())
}

#[test]
fn chinese_sample_converts_headings_and_emphasis() {
    let out = default_convert("# 标题\n\n**加粗** 和 *斜体* 以及 ~~删除~~。");
    assert!(out.contains("标题\n======"));
    assert!(out.contains("[b]加粗[/b]"));
    assert!(out.contains("斜体"));
    assert!(!out.contains('*'));
    assert!(out.contains("删除"));
    assert!(!out.contains('~'));
}

#[test]
fn parenthesized_url_is_not_truncated() {
    let options = ConvertOptions::default().with_links(LinkMode::Both);
    assert_eq!(
        convert("[Label](https://example.com/path(1))", &options),
        "Label\nhttps://example.com/path(1)"
    );
}

#[test]
fn bold_inside_inline_code_is_untouched() {
    assert_eq!(default_convert("`**not bold**`"), "[code]**not bold**[/code]");
}

#[test]
fn space_mode_table_has_no_pipes() {
    let options = ConvertOptions::default().with_table(TableMode::Space);
    let out = convert("| A | B |\n|---|---|\n| 1 | 2 |", &options);
    assert!(!out.contains('|'));
    assert!(out.contains("A B"));
    assert!(out.contains("1 2"));
}

#[test]
fn keep_mode_table_drops_only_the_alignment_row() {
    let options = ConvertOptions::default().with_table(TableMode::Keep);
    let out = convert("| A | B |\n|:--|--:|\n| 1 | 2 |", &options);
    assert_eq!(out, "| A | B |\n| 1 | 2 |");
}

#[test]
fn dashes_separator_applies_to_every_level() {
    let options = ConvertOptions::default().with_heading_separator(HeadingSeparator::Dashes);
    assert_eq!(convert("# Top\n\n### Sub", &options), "Top\n------\n\nSub\n------");
}

#[test]
fn sample_document_converts_every_section() {
    let out = default_convert(SAMPLE);

    assert!(out.starts_with("Release notes\n======"));
    assert!(out.contains("Highlights\n======"));
    assert!(out.contains(
        "[blockquote]Upgrading from 0.2? Read the [b]migration[/b] section first.[/blockquote]"
    ));
    assert!(out.contains("Faster table handling\nNew [code]--heading-separator[/code] flag"));
    assert!(out.contains("  accepts equals or dashes"));
    assert!(out.contains("[x] Windows support\n[ ] Plugin API"));
    assert!(out.contains("Option Default\nlinks both\ntable space"));
    assert!(out.contains("\n------\n"));
    assert!(out.contains("changelog\nhttps://example.com/changelog(v0.3) for details."));
    assert!(out.contains("https://example.com/shot.png"));
    assert!(out.contains("Thanks to all [b]contributors[/b]!"));
    assert!(out.contains(
        "[code]fn main() {\n    println!(\"**not bold** | not a table |\");\n}[/code]"
    ));

    assert!(!out.contains("internal note"));
    assert!(!out.contains("<div"));
    assert!(!out.contains("[^1]"));
    assert!(!out.contains("Older entries"));
    assert!(!out.contains("\n\n\n"));
}

#[test]
fn sample_document_reports_every_warning_category() {
    let result = Converter::default().convert_with_warnings(SAMPLE);
    assert_eq!(result.warnings, Warning::ALL.to_vec());
    assert!(!mdv2ex::diagnostics::is_compatible(SAMPLE));
}

#[test]
fn code_marker_count_matches_protected_regions() {
    let out = default_convert(SAMPLE);
    // One fenced block plus one inline span.
    assert_eq!(out.matches("[code]").count(), 2);
    assert_eq!(out.matches("[/code]").count(), 2);
}
