//! Human-oriented string ordering used when sorting cards by title or author.
//!
//! Raw byte order would put every uppercase letter ahead of every lowercase one
//! ("Zed" before "apple") and push accented letters past `z`. Readers expect a
//! dictionary order instead, so keys are compared in levels: base letters
//! first, then accents, then case with lowercase first.

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Precomputed comparison key. Ordering of the fields is the ordering of the
/// comparison levels, so the derived `Ord` does the right thing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CollationKey {
    base: String,
    accented: String,
    uppercase: Vec<bool>,
    raw: String,
}

impl CollationKey {
    pub fn new(text: &str) -> Self {
        let decomposed: String = text.nfd().collect();
        let base = decomposed
            .chars()
            .filter(|ch| !is_combining_mark(*ch))
            .flat_map(char::to_lowercase)
            .collect();
        let accented = decomposed.chars().flat_map(char::to_lowercase).collect();
        let uppercase = decomposed
            .chars()
            .filter(|ch| !is_combining_mark(*ch))
            .map(char::is_uppercase)
            .collect();

        Self {
            base,
            accented,
            uppercase,
            raw: text.to_string(),
        }
    }
}

/// Compare two strings the way a reader would order them in an index.
pub fn compare(left: &str, right: &str) -> Ordering {
    CollationKey::new(left).cmp(&CollationKey::new(right))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sorted(words: &[&str]) -> Vec<String> {
        let mut owned: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        owned.sort_by(|a, b| compare(a, b));
        owned
    }

    #[test]
    fn lowercase_letters_interleave_with_uppercase() {
        assert_eq!(compare("a", "B"), Ordering::Less);
        assert_eq!(compare("b", "A"), Ordering::Greater);
        assert_eq!(
            sorted(&["Zed", "apple", "Banana", "cherry"]),
            vec!["apple", "Banana", "cherry", "Zed"]
        );
    }

    #[test]
    fn case_only_differences_put_lowercase_first() {
        assert_eq!(compare("a", "A"), Ordering::Less);
        assert_eq!(compare("Dune", "dune"), Ordering::Greater);
    }

    #[test]
    fn accents_sort_next_to_their_base_letter() {
        assert_eq!(
            sorted(&["zebra", "Émile", "Eve", "echo"]),
            vec!["echo", "Émile", "Eve", "zebra"]
        );
        assert_eq!(compare("resume", "résumé"), Ordering::Less);
    }

    #[test]
    fn empty_string_sorts_first() {
        assert_eq!(compare("", "a"), Ordering::Less);
        assert_eq!(compare("", ""), Ordering::Equal);
    }
}
