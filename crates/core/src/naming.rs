//! Download file naming.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

/// Characters that are not allowed in file names on common platforms.
static ILLEGAL_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|\x00-\x1f\x7f]"#).unwrap());

/// Regex to collapse runs of whitespace.
static WHITESPACE_COLLAPSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// MIME type of a PPTX file.
pub const PPTX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.presentationml.presentation";

/// Build `"{company} {YYYY-MM-DD}.pptx"`, replacing characters that cannot appear in a file name.
pub fn deck_filename(company: &str, date: NaiveDate) -> String {
    let cleaned = ILLEGAL_FILENAME_CHARS.replace_all(company, "_");
    let cleaned = WHITESPACE_COLLAPSE_REGEX.replace_all(cleaned.trim(), " ");
    let stem = if cleaned.is_empty() {
        "presentation".into()
    } else {
        cleaned
    };
    format!("{} {}.pptx", stem, date.format("%Y-%m-%d"))
}

/// ASCII-only variant for header values: non-ASCII characters become `_`.
pub fn ascii_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    #[test]
    fn test_deck_filename() {
        assert_eq!(deck_filename("Apple Inc.", day()), "Apple Inc. 2024-01-31.pptx");
    }

    #[test]
    fn test_deck_filename_strips_illegal_chars() {
        assert_eq!(
            deck_filename("AT&T / \"Ma Bell\"", day()),
            "AT&T _ _Ma Bell_ 2024-01-31.pptx"
        );
        assert_eq!(deck_filename("  ", day()), "presentation 2024-01-31.pptx");
    }

    #[test]
    fn test_ascii_filename() {
        assert_eq!(ascii_filename("Nestlé S.A. 2024-01-31.pptx"), "Nestl_ S.A. 2024-01-31.pptx");
    }
}
