use crate::catalog::ALL_LANGUAGES;

/// Popup state for choosing a language. The first option is always the
/// "All" sentinel, followed by the languages present in the catalog.
pub(crate) struct LanguagePicker {
    pub(crate) options: Vec<String>,
    pub(crate) selected: usize,
}

impl LanguagePicker {
    /// Build the option list and pre-select the language currently filtered
    /// on, if any. The sentinel is never listed twice.
    pub(crate) fn new(languages: Vec<String>, active: Option<&str>) -> Self {
        let mut options = Vec::with_capacity(languages.len() + 1);
        options.push(ALL_LANGUAGES.to_string());
        options.extend(
            languages
                .into_iter()
                .filter(|language| language != ALL_LANGUAGES),
        );

        let selected = active
            .and_then(|current| options.iter().position(|option| option == current))
            .unwrap_or(0);

        Self { options, selected }
    }

    pub(crate) fn current(&self) -> Option<&str> {
        self.options.get(self.selected).map(String::as_str)
    }

    pub(crate) fn move_selection(&mut self, offset: isize) {
        if self.options.is_empty() {
            return;
        }
        let len = self.options.len() as isize;
        let new = (self.selected as isize + offset).clamp(0, len - 1);
        self.selected = new as usize;
    }

    pub(crate) fn select_first(&mut self) {
        self.selected = 0;
    }

    pub(crate) fn select_last(&mut self) {
        self.selected = self.options.len().saturating_sub(1);
    }
}
