use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::catalog::YearBounds;

/// Internal representation of the year range form fields. Both fields hold
/// raw text until the user submits, so partial input like `-` is allowed.
#[derive(Default, Clone)]
pub(crate) struct YearRangeForm {
    pub(crate) min: String,
    pub(crate) max: String,
    pub(crate) active: YearField,
    pub(crate) error: Option<String>,
}

/// Fields available within the year range form.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub(crate) enum YearField {
    #[default]
    Min,
    Max,
}

impl YearRangeForm {
    /// Seed the form from the active range so re-opening it shows what is
    /// currently applied.
    pub(crate) fn from_bounds(bounds: Option<YearBounds>) -> Self {
        let mut form = Self::default();
        if let Some(YearBounds { min, max }) = bounds {
            form.min = min.map(|year| year.to_string()).unwrap_or_default();
            form.max = max.map(|year| year.to_string()).unwrap_or_default();
        }
        form
    }

    /// Swap focus between the two bounds.
    pub(crate) fn toggle_field(&mut self) {
        self.active = match self.active {
            YearField::Min => YearField::Max,
            YearField::Max => YearField::Min,
        };
    }

    fn active_value(&mut self) -> &mut String {
        match self.active {
            YearField::Min => &mut self.min,
            YearField::Max => &mut self.max,
        }
    }

    /// Append a character to the active field. Digits are always accepted; a
    /// minus sign only as the first character, for BCE years.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        let value = self.active_value();
        if ch.is_ascii_digit() || (ch == '-' && value.is_empty()) {
            value.push(ch);
            true
        } else {
            false
        }
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        self.active_value().pop();
    }

    /// Validate the inputs. A blank field leaves that side of the range open.
    pub(crate) fn parse_inputs(&self) -> Result<(Option<i32>, Option<i32>)> {
        let min = parse_bound(&self.min, "From")?;
        let max = parse_bound(&self.max, "To")?;
        Ok((min, max))
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: YearField) -> Line<'static> {
        let value = match field {
            YearField::Min => &self.min,
            YearField::Max => &self.max,
        };
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<any>".to_string()
        } else {
            value.clone()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    /// Return the character count for the requested field.
    pub(crate) fn value_len(&self, field: YearField) -> usize {
        match field {
            YearField::Min => self.min.chars().count(),
            YearField::Max => self.max.chars().count(),
        }
    }
}

fn parse_bound(raw: &str, label: &str) -> Result<Option<i32>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i32>()
        .map(Some)
        .map_err(|_| anyhow!("{label} year must be a whole number."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn blank_fields_are_open_bounds() {
        let form = YearRangeForm::default();
        assert_eq!(form.parse_inputs().expect("blank is valid"), (None, None));
    }

    #[test]
    fn accepts_signed_years_and_ignores_letters() {
        let mut form = YearRangeForm::default();
        for ch in "-7a50".chars() {
            form.push_char(ch);
        }
        form.toggle_field();
        for ch in "19-00".chars() {
            form.push_char(ch);
        }

        assert_eq!(form.min, "-750");
        assert_eq!(form.max, "1900");
        assert_eq!(
            form.parse_inputs().expect("valid years"),
            (Some(-750), Some(1900))
        );
    }

    #[test]
    fn lone_minus_sign_is_rejected() {
        let mut form = YearRangeForm::default();
        form.push_char('-');
        let err = form.parse_inputs().unwrap_err();
        assert_eq!(err.to_string(), "From year must be a whole number.");
    }

    #[test]
    fn prefills_from_active_year_bounds() {
        let form = YearRangeForm::from_bounds(Some(YearBounds {
            min: None,
            max: Some(1900),
        }));
        assert_eq!(form.min, "");
        assert_eq!(form.max, "1900");

        let other = YearRangeForm::from_bounds(None);
        assert_eq!(other.max, "");
    }

    #[test]
    fn backspace_edits_the_focused_field() {
        let mut form = YearRangeForm::from_bounds(Some(YearBounds {
            min: Some(1800),
            max: Some(1900),
        }));
        form.toggle_field();
        form.backspace();
        assert_eq!(form.min, "1800");
        assert_eq!(form.max, "190");
        assert_eq!(form.value_len(YearField::Max), 3);
    }
}
