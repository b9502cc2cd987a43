//! The query pipeline. A `Catalog` owns the full record set and a view over
//! it. Every filter starts again from the full set and then re-applies the
//! active sort key, so the view is always a function of
//! (full set, active filters, sort key) and never a narrowing of a narrowing.

use std::fmt;

use serde_json::Value;
use tracing::{debug, info};

use crate::collation::{self, CollationKey};
use crate::error::LoadError;
use crate::loader::records_from_value;
use crate::models::{Record, RecordInput};

/// Language choice that means "no language filter".
pub const ALL_LANGUAGES: &str = "All";

/// Orderings the view can be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Title,
    Author,
    Year,
}

impl SortKey {
    /// Map a user-supplied criterion onto a key. Anything unrecognised sorts by
    /// title.
    pub fn from_criterion(criterion: &str) -> Self {
        match criterion.trim().to_ascii_lowercase().as_str() {
            "author" => SortKey::Author,
            "year" => SortKey::Year,
            _ => SortKey::Title,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::Author => "author",
            SortKey::Year => "year",
        }
    }

    /// The key after this one when cycling through them.
    pub fn next(self) -> Self {
        match self {
            SortKey::Title => SortKey::Author,
            SortKey::Author => SortKey::Year,
            SortKey::Year => SortKey::Title,
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive year bounds. `None` leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearBounds {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

/// Active narrowing, one slot per filter kind. The view is the full set
/// reduced by every occupied slot, so the order in which slots were filled
/// never matters; filtering the same kind again replaces that slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub query: Option<String>,
    pub years: Option<YearBounds>,
    pub language: Option<String>,
}

impl Filters {
    pub fn is_empty(&self) -> bool {
        self.query.is_none() && self.years.is_none() && self.language.is_none()
    }

    pub fn matches(&self, record: &Record) -> bool {
        self.query
            .as_deref()
            .map_or(true, |term| record.matches_query(term))
            && self
                .years
                .map_or(true, |bounds| record.is_within_years(bounds.min, bounds.max))
            && self
                .language
                .as_deref()
                .map_or(true, |language| record.has_language(language))
    }
}

impl fmt::Display for Filters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }

        let mut parts = Vec::new();
        if let Some(term) = &self.query {
            parts.push(format!("search \"{term}\""));
        }
        if let Some(YearBounds { min, max }) = self.years {
            let bound = |year: Option<i32>| year.map_or_else(|| "*".to_string(), |y| y.to_string());
            parts.push(format!("years {}..{}", bound(min), bound(max)));
        }
        if let Some(language) = &self.language {
            parts.push(format!("language {language}"));
        }
        f.write_str(&parts.join(", "))
    }
}

/// A user intent dispatched by the front-end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SubmitQuery(String),
    SetYearRange(Option<i32>, Option<i32>),
    SelectLanguage(String),
    SetSort(SortKey),
    Reset,
}

/// Where the catalog is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CatalogState {
    /// Nothing loaded yet.
    #[default]
    Empty,
    /// View is the full set in load order.
    Loaded,
    /// View was derived by a filter or sort.
    Refined,
}

/// Full record set plus the derived view. The view stores indices into
/// `records` so filtering and sorting never clone records.
#[derive(Debug, Default)]
pub struct Catalog {
    records: Vec<Record>,
    view: Vec<usize>,
    sort_key: SortKey,
    filters: Filters,
    state: CatalogState,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog already loaded with `records`.
    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = RecordInput>,
    {
        let mut catalog = Self::new();
        catalog.load(records);
        catalog
    }

    /// Replace the full set. The view becomes every record in the order given;
    /// nothing is sorted yet.
    pub fn load<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = RecordInput>,
    {
        self.records = records.into_iter().map(Record::from).collect();
        self.view = (0..self.records.len()).collect();
        self.sort_key = SortKey::Title;
        self.filters = Filters::default();
        self.state = CatalogState::Loaded;
        info!(total = self.records.len(), "catalog loaded");
    }

    /// Load from an untyped JSON value. A value that is not an array of
    /// objects is rejected and the catalog is left as it was.
    pub fn load_json(&mut self, value: Value) -> Result<(), LoadError> {
        let records = records_from_value(value)?;
        self.load(records);
        Ok(())
    }

    /// Search title, author, and languages. A blank term clears the search.
    pub fn filter_by_query(&mut self, term: &str) {
        let term = term.trim();
        self.filters.query = (!term.is_empty()).then(|| term.to_string());
        self.refilter();
    }

    /// Keep records dated inside the range. Two open sides clear the range.
    pub fn filter_by_year_range(&mut self, min_year: Option<i32>, max_year: Option<i32>) {
        self.filters.years = (min_year.is_some() || max_year.is_some()).then_some(YearBounds {
            min: min_year,
            max: max_year,
        });
        self.refilter();
    }

    /// Narrow to one language. [`ALL_LANGUAGES`] clears every filter and shows
    /// the full set.
    pub fn filter_by_language(&mut self, language: &str) {
        if language == ALL_LANGUAGES {
            self.filters = Filters::default();
        } else {
            self.filters.language = Some(language.to_string());
        }
        self.refilter();
    }

    /// Remember `key` for later filters and reorder the current view with it.
    pub fn sort_by(&mut self, key: SortKey) {
        self.sort_key = key;
        if self.view.is_empty() {
            debug!(sort = %key, "sort skipped on empty view");
            return;
        }
        self.sort_view();
        self.mark_refined();
        debug!(sort = %key, shown = self.view.len(), "view sorted");
    }

    /// Show the full set in load order and go back to sorting by title.
    pub fn reset_to_all(&mut self) {
        self.view = (0..self.records.len()).collect();
        self.sort_key = SortKey::Title;
        self.filters = Filters::default();
        if self.state != CatalogState::Empty {
            self.state = CatalogState::Loaded;
        }
        debug!(shown = self.view.len(), "view reset");
    }

    /// Dispatch a front-end command onto the matching operation.
    pub fn apply(&mut self, command: Command) {
        match command {
            Command::SubmitQuery(term) => self.filter_by_query(&term),
            Command::SetYearRange(min, max) => self.filter_by_year_range(min, max),
            Command::SelectLanguage(language) => self.filter_by_language(&language),
            Command::SetSort(key) => self.sort_by(key),
            Command::Reset => self.reset_to_all(),
        }
    }

    /// Records in the current view, in display order.
    pub fn current_view(&self) -> impl ExactSizeIterator<Item = &Record> + '_ {
        self.view.iter().map(|&index| &self.records[index])
    }

    /// The record at `position` in the current view.
    pub fn view_record(&self, position: usize) -> Option<&Record> {
        self.view.get(position).map(|&index| &self.records[index])
    }

    pub fn display_count(&self) -> usize {
        self.view.len()
    }

    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    pub fn sort_key(&self) -> SortKey {
        self.sort_key
    }

    pub fn filters(&self) -> &Filters {
        &self.filters
    }

    pub fn state(&self) -> CatalogState {
        self.state
    }

    /// Every distinct language in the full set, in reading order. A language
    /// literally named like [`ALL_LANGUAGES`] is left out since choosing it
    /// would clear the filters instead.
    pub fn available_languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self
            .records
            .iter()
            .flat_map(|record| record.languages().iter())
            .filter(|language| language.as_str() != ALL_LANGUAGES)
            .cloned()
            .collect();
        languages.sort_by(|a, b| collation::compare(a, b));
        languages.dedup();
        languages
    }

    /// Rebuild the view from the full set and the active filters, then sort.
    fn refilter(&mut self) {
        let records = &self.records;
        let filters = &self.filters;
        self.view = (0..records.len())
            .filter(|&index| filters.matches(&records[index]))
            .collect();
        self.sort_view();
        self.mark_refined();
        debug!(
            filters = %self.filters,
            sort = %self.sort_key,
            shown = self.view.len(),
            total = self.records.len(),
            "view filtered"
        );
    }

    /// Stable sort of the view by the active key.
    fn sort_view(&mut self) {
        let records = &self.records;
        match self.sort_key {
            SortKey::Title => self
                .view
                .sort_by_cached_key(|&index| CollationKey::new(records[index].title().unwrap_or(""))),
            SortKey::Author => self
                .view
                .sort_by_cached_key(|&index| CollationKey::new(records[index].author().unwrap_or(""))),
            SortKey::Year => self.view.sort_by_key(|&index| records[index].year()),
        }
    }

    fn mark_refined(&mut self) {
        if self.state != CatalogState::Empty {
            self.state = CatalogState::Refined;
        }
    }
}
