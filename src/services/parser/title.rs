use super::classifier::is_structural_header;
use crate::core::config::ParserConfig;
use regex::Regex;
use std::sync::LazyLock;

static QUOTED_TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*"([^"]+)"\s*$"#).expect("valid quoted title regex"));

static UPPERCASE_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\p{Lu}[\p{Lu}\s']+)\s*$").expect("valid uppercase title regex")
});

static LABELLED_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:titolo|title)\s*:\s*(.+)").expect("valid labelled title regex")
});

static AUTHOR_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)\b(?:di|by|autore|author)\s*:\s*(.+)").expect("valid author label regex"),
        Regex::new(r"(?i)\b(?:scritto da|written by)\s+(.+)").expect("valid written-by regex"),
    ]
});

/// Looks for a title and an author in the first `title_scan_lines` lines.
///
/// Title patterns are tried per line in order: a quoted line, a standalone
/// uppercase line, then an explicit `TITLE:` label. The first capture longer
/// than `min_title_len` wins. Act and scene headers are never titles. The
/// author search is independent of the title search.
pub fn extract_title_and_author(text: &str, config: &ParserConfig) -> (Option<String>, Option<String>) {
    let lines: Vec<&str> = text
        .lines()
        .take(config.title_scan_lines)
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let title = lines.iter().find_map(|line| {
        if is_structural_header(line) {
            return None;
        }
        [&*QUOTED_TITLE, &*UPPERCASE_TITLE, &*LABELLED_TITLE]
            .iter()
            .find_map(|pattern| {
                let captured = pattern.captures(line)?.get(1)?.as_str().trim();
                (captured.chars().count() > config.min_title_len).then(|| captured.to_string())
            })
    });

    let author = lines.iter().find_map(|line| {
        AUTHOR_PATTERNS.iter().find_map(|pattern| {
            let captured = pattern.captures(line)?.get(1)?.as_str().trim();
            (!captured.is_empty()).then(|| captured.to_string())
        })
    });

    (title, author)
}
