//! URL slugs derived from titles.

use regex::Regex;
use std::sync::LazyLock;

/// Runs of anything outside `[a-z0-9]`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NON_SLUG_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// Lowercase `title` and collapse every other run of characters into a
/// single hyphen.
///
/// # Examples
/// ```
/// use lexpanel_client::slug::slugify;
///
/// assert_eq!(slugify("Privacy & Cookies!!"), "privacy-cookies");
/// assert_eq!(slugify("  Terms of Service  "), "terms-of-service");
/// ```
pub fn slugify(title: &str) -> String {
    let lower = title.to_lowercase();
    NON_SLUG_CHARS
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_slug(s: &str) -> bool {
        s.chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
            && !s.starts_with('-')
            && !s.ends_with('-')
    }

    #[test]
    fn test_slugify_examples() {
        assert_eq!(slugify("Privacy & Cookies!!"), "privacy-cookies");
        assert_eq!(slugify("Refund Policy 2024"), "refund-policy-2024");
        assert_eq!(slugify("--Already-Slugged--"), "already-slugged");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_output_alphabet() {
        let titles = [
            "Privacy & Cookies!!",
            "Über uns",
            "  leading and trailing  ",
            "Tabs\tand\nnewlines",
            "Emoji 🚀 launch",
            "UPPER_case-Mixed.123",
            "",
        ];
        for title in titles {
            let slug = slugify(title);
            assert!(is_slug(&slug), "{title:?} -> {slug:?}");
            assert!(!slug.contains("--"), "{title:?} -> {slug:?}");
        }
    }
}
