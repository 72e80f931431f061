/// True when the line has at least one cased letter and none of them is
/// lowercase. Lines without letters ("1999", "...") are not uppercase.
pub fn is_all_uppercase(s: &str) -> bool {
    let mut has_cased = false;
    for c in s.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}

/// Strips a leading BOM and folds CRLF / lone CR line endings to LF.
pub fn normalize_text(s: &str) -> String {
    let s = s.strip_prefix('\u{feff}').unwrap_or(s);
    s.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_all_uppercase() {
        assert!(is_all_uppercase("AMLETO"));
        assert!(is_all_uppercase("ATTO I - SCENA 2"));
        assert!(is_all_uppercase("PERCHÉ?"));
        assert!(!is_all_uppercase("Amleto"));
        assert!(!is_all_uppercase("12345678901"));
        assert!(!is_all_uppercase(""));
    }

    #[test]
    fn test_normalize_text() {
        assert_eq!(normalize_text("\u{feff}A\r\nB\rC\n"), "A\nB\nC\n");
        assert_eq!(normalize_text("plain"), "plain");
    }
}
