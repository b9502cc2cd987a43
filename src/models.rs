//! Domain models for the catalog. `RecordInput` mirrors the loosely-typed JSON
//! the data file ships with, while `Record` is the immutable value the query
//! pipeline and the card renderer consume. Every coercion from the former to
//! the latter happens once, at construction, so the predicates below never
//! have to think about malformed data.

use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Prefix joined with a record's image path when resolving its cover.
pub const DEFAULT_COVER_PREFIX: &str = "static/";

/// Separator used by the data file to pack several languages into one field.
pub const LANGUAGE_SEPARATOR: &str = ", ";

/// Raw record shape as found in the data file. Every field is optional and
/// tolerant of the wrong JSON type: unusable values become `None` instead of
/// failing the whole load.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RecordInput {
    #[serde(deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub author: Option<String>,
    #[serde(alias = "publicationYear", deserialize_with = "lenient_year")]
    pub year: Option<i32>,
    #[serde(alias = "languages", deserialize_with = "lenient_languages")]
    pub language: Vec<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub country: Option<String>,
    #[serde(alias = "pageCount", deserialize_with = "lenient_count")]
    pub pages: Option<u32>,
    #[serde(
        rename = "imageLink",
        alias = "coverImagePath",
        deserialize_with = "lenient_text"
    )]
    pub image_link: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub link: Option<String>,
}

/// One catalog item. Fields are private so a record cannot change after the
/// catalog has indexed it.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    title: Option<String>,
    author: Option<String>,
    year: Option<i32>,
    languages: Vec<String>,
    country: Option<String>,
    pages: Option<u32>,
    image_link: Option<String>,
    link: Option<String>,
}

impl From<RecordInput> for Record {
    fn from(input: RecordInput) -> Self {
        Self {
            title: input.title,
            author: input.author,
            year: input.year,
            languages: input.language,
            country: input.country,
            pages: input.pages,
            image_link: input.image_link,
            link: input.link,
        }
    }
}

impl Record {
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// Publication year; negative values are BCE. `None` when the source had
    /// no usable number.
    pub fn year(&self) -> Option<i32> {
        self.year
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn pages(&self) -> Option<u32> {
        self.pages
    }

    pub fn image_link(&self) -> Option<&str> {
        self.image_link.as_deref()
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    /// Languages joined back into the data file's delimited form.
    pub fn languages_label(&self) -> String {
        self.languages.join(LANGUAGE_SEPARATOR)
    }

    /// `Title - Author`, omitting the hyphen when the author is blank.
    pub fn display_title(&self) -> String {
        let title = self.title().unwrap_or("Untitled");
        match self.author().map(str::trim) {
            Some(author) if !author.is_empty() => format!("{title} - {author}"),
            _ => title.to_string(),
        }
    }

    /// Free-text match. A blank term matches everything; otherwise the trimmed,
    /// lowercased term must appear inside the title, the author, or one of the
    /// languages.
    pub fn matches_query(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);
        self.title().is_some_and(contains)
            || self.author().is_some_and(contains)
            || self.languages.iter().any(|language| contains(language))
    }

    /// Inclusive year-range membership. `None` on either side leaves that side
    /// open. Records without a year fall outside every range that has at least
    /// one bound. Inverted bounds simply match nothing.
    pub fn is_within_years(&self, min_year: Option<i32>, max_year: Option<i32>) -> bool {
        if min_year.is_none() && max_year.is_none() {
            return true;
        }
        let Some(year) = self.year else {
            return false;
        };
        min_year.map_or(true, |min| min <= year) && max_year.map_or(true, |max| year <= max)
    }

    /// Exact, case-sensitive membership in the language list.
    pub fn has_language(&self, language: &str) -> bool {
        self.languages.iter().any(|candidate| candidate == language)
    }

    /// Cover path under [`DEFAULT_COVER_PREFIX`].
    pub fn resolve_cover_url(&self) -> Option<String> {
        self.resolve_cover_url_with(DEFAULT_COVER_PREFIX)
    }

    /// Join `prefix` with the stored image path. Pure string work; nothing is
    /// fetched or checked on disk.
    pub fn resolve_cover_url_with(&self, prefix: &str) -> Option<String> {
        let path = self.image_link()?.trim();
        if path.is_empty() {
            return None;
        }
        if prefix.is_empty() {
            return Some(path.to_string());
        }
        Some(format!(
            "{}/{}",
            prefix.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title().unwrap_or("Untitled"))
    }
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number_to_year(&number),
        Value::String(text) => parse_leading_integer(&text),
        _ => None,
    })
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_languages<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => split_languages(&text),
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(text) if !text.is_empty() => Some(text),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Split the packed language field into its tokens, dropping empty pieces.
pub fn split_languages(raw: &str) -> Vec<String> {
    raw.split(LANGUAGE_SEPARATOR)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

fn number_to_year(number: &serde_json::Number) -> Option<i32> {
    if let Some(whole) = number.as_i64() {
        return i32::try_from(whole).ok();
    }
    number
        .as_f64()
        .filter(|value| value.is_finite())
        .map(f64::trunc)
        .filter(|value| *value >= f64::from(i32::MIN) && *value <= f64::from(i32::MAX))
        .map(|value| value as i32)
}

/// Read an optionally signed run of digits from the start of `text`, ignoring
/// whatever follows it (`"1850s"` is 1850). Anything else yields `None`.
fn parse_leading_integer(text: &str) -> Option<i32> {
    let trimmed = text.trim();
    let digits_start = usize::from(trimmed.starts_with(['-', '+']));
    let digits_len = trimmed[digits_start..]
        .chars()
        .take_while(char::is_ascii_digit)
        .count();
    if digits_len == 0 {
        return None;
    }
    trimmed[..digits_start + digits_len].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(title: Option<&str>, author: Option<&str>, year: Option<i32>) -> Record {
        Record::from(RecordInput {
            title: title.map(str::to_string),
            author: author.map(str::to_string),
            year,
            ..RecordInput::default()
        })
    }

    fn parse(json: &str) -> RecordInput {
        serde_json::from_str(json).expect("valid record json")
    }

    #[test]
    fn blank_query_matches_even_empty_records() {
        let empty = Record::from(RecordInput::default());
        assert!(empty.matches_query(""));
        assert!(empty.matches_query("   "));
        assert!(!empty.matches_query("a"));
    }

    #[test]
    fn query_is_trimmed_and_case_insensitive_substring() {
        let book = record(Some("Things Fall Apart"), Some("Chinua Achebe"), Some(1958));
        assert!(book.matches_query("fall"));
        assert!(book.matches_query("  FALL APART "));
        assert!(book.matches_query("ngs f"));
        assert!(!book.matches_query("falling"));
    }

    #[test]
    fn query_searches_author_and_languages_too() {
        let book = Record::from(parse(
            r#"{"title": "Ficciones", "author": "Jorge Luis Borges", "language": "Spanish"}"#,
        ));
        assert!(book.matches_query("borges"));
        assert!(book.matches_query("spani"));
        assert!(!book.matches_query("english"));
    }

    #[test]
    fn year_range_is_inclusive_on_both_ends() {
        let book = record(Some("Dune"), None, Some(1965));
        assert!(book.is_within_years(Some(1965), Some(1965)));
        assert!(book.is_within_years(Some(1900), Some(1965)));
        assert!(!book.is_within_years(Some(1966), Some(2000)));
        assert!(!book.is_within_years(Some(1900), Some(1964)));
    }

    #[test]
    fn inverted_year_range_matches_nothing() {
        let book = record(Some("Dune"), None, Some(1965));
        assert!(!book.is_within_years(Some(2000), Some(1900)));
    }

    #[test]
    fn open_bounds_and_missing_years() {
        let dated = record(Some("Iliad"), Some("Homer"), Some(-750));
        let undated = record(Some("Mid"), None, None);

        assert!(dated.is_within_years(None, Some(0)));
        assert!(dated.is_within_years(Some(-800), None));
        assert!(!undated.is_within_years(Some(-10_000), None));
        assert!(!undated.is_within_years(None, Some(10_000)));
        assert!(undated.is_within_years(None, None));
    }

    #[test]
    fn language_membership_is_exact_per_token() {
        let book = Record::from(parse(r#"{"title": "Mixed", "language": "French, English"}"#));
        assert!(book.has_language("French"));
        assert!(book.has_language("English"));
        assert!(!book.has_language("english"));
        assert!(!book.has_language("Eng"));
        assert!(!book.has_language("French, English"));

        let none = Record::from(parse(r#"{"title": "Silent"}"#));
        assert!(!none.has_language("English"));
    }

    #[test]
    fn year_coercion_accepts_numbers_strings_and_junk() {
        assert_eq!(parse(r#"{"year": 1990}"#).year, Some(1990));
        assert_eq!(parse(r#"{"year": -1200}"#).year, Some(-1200));
        assert_eq!(parse(r#"{"year": "1850s"}"#).year, Some(1850));
        assert_eq!(parse(r#"{"year": " -50 "}"#).year, Some(-50));
        assert_eq!(parse(r#"{"year": 1605.7}"#).year, Some(1605));
        assert_eq!(parse(r#"{"year": "unknown"}"#).year, None);
        assert_eq!(parse(r#"{"year": null}"#).year, None);
        assert_eq!(parse(r#"{"year": true}"#).year, None);
        assert_eq!(parse(r#"{}"#).year, None);
    }

    #[test]
    fn aliases_and_wrong_types_do_not_fail() {
        let input = parse(
            r#"{
                "title": 1984,
                "author": null,
                "publicationYear": "1949",
                "languages": ["English", ""],
                "pageCount": "328",
                "coverImagePath": "images/1984.jpg"
            }"#,
        );
        assert_eq!(input.title.as_deref(), Some("1984"));
        assert_eq!(input.author, None);
        assert_eq!(input.year, Some(1949));
        assert_eq!(input.language, vec!["English".to_string()]);
        assert_eq!(input.pages, Some(328));
        assert_eq!(input.image_link.as_deref(), Some("images/1984.jpg"));
    }

    #[test]
    fn cover_url_joins_prefix_and_path() {
        let book = Record::from(parse(r#"{"imageLink": "images/dune.jpg"}"#));
        assert_eq!(
            book.resolve_cover_url().as_deref(),
            Some("static/images/dune.jpg")
        );
        assert_eq!(
            book.resolve_cover_url_with("covers/").as_deref(),
            Some("covers/images/dune.jpg")
        );
        assert_eq!(
            book.resolve_cover_url_with("").as_deref(),
            Some("images/dune.jpg")
        );

        let bare = Record::from(parse(r#"{"imageLink": "  "}"#));
        assert_eq!(bare.resolve_cover_url(), None);
        assert_eq!(Record::from(RecordInput::default()).resolve_cover_url(), None);
    }

    #[test]
    fn display_title_omits_missing_author() {
        assert_eq!(
            record(Some("Emma"), Some("Jane Austen"), None).display_title(),
            "Emma - Jane Austen"
        );
        assert_eq!(record(Some("Emma"), Some("  "), None).display_title(), "Emma");
        assert_eq!(record(None, None, None).display_title(), "Untitled");
    }
}
