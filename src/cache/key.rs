//! Cache key normalization

/// Turns a human-entered reference into its cache key
///
/// Lower-cases, drops every space character and replaces `:` with `_`, so
/// "John 3:16", "john3:16" and "JOHN 3:16" all map to `john3_16`. Only case
/// and spaces are forgiven: "John 3.16" is a different key. An empty
/// reference maps to an empty key; callers reject empty input before it gets
/// here.
pub fn normalize_reference(reference: &str) -> String {
    reference
        .to_lowercase()
        .replace(' ', "")
        .replace(':', "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_reference_basic() {
        assert_eq!(normalize_reference("John 3:16"), "john3_16");
        assert_eq!(normalize_reference("Romans 8:28-30"), "romans8_28-30");
        assert_eq!(normalize_reference("1 Corinthians 13:4-7"), "1corinthians13_4-7");
    }

    #[test]
    fn test_normalize_reference_case_and_space_insensitive() {
        let expected = normalize_reference("John 3:16");
        assert_eq!(normalize_reference("john3:16"), expected);
        assert_eq!(normalize_reference("JOHN 3 : 16".replace(' ', "").as_str()), expected);
        assert_eq!(normalize_reference("  JoHn   3:16 "), expected);
    }

    #[test]
    fn test_normalize_reference_keeps_other_punctuation() {
        assert_ne!(normalize_reference("John 3.16"), normalize_reference("John 3:16"));
    }

    #[test]
    fn test_normalize_reference_empty() {
        assert_eq!(normalize_reference(""), "");
        assert_eq!(normalize_reference("   "), "");
    }

    #[test]
    fn test_normalize_reference_only_strips_spaces() {
        // Tabs and newlines are not space characters for key purposes
        assert_eq!(normalize_reference("John\t3:16"), "john\t3_16");
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(reference in "[ -~]{0,40}") {
            let once = normalize_reference(&reference);
            prop_assert_eq!(normalize_reference(&once), once);
        }

        #[test]
        fn prop_normalize_ignores_case_and_spaces(
            book in "[A-Za-z]{1,12}",
            chapter in 1u32..150,
            verse in 1u32..176,
            pad in " {0,3}",
        ) {
            let plain = format!("{} {}:{}", book, chapter, verse);
            let shouted = format!("{}{}{}{}:{}", pad, book.to_uppercase(), pad, chapter, verse);
            prop_assert_eq!(normalize_reference(&plain), normalize_reference(&shouted));
        }

        #[test]
        fn prop_normalized_key_has_no_spaces_or_colons(reference in "[ -~]{0,40}") {
            let key = normalize_reference(&reference);
            prop_assert!(!key.contains(' '));
            prop_assert!(!key.contains(':'));
        }
    }
}
