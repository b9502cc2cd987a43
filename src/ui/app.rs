use std::cmp::min;
use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{debug, warn};

use crate::catalog::{Catalog, Command, ALL_LANGUAGES};
use crate::config::Config;
use crate::models::Record;

use super::forms::{YearField, YearRangeForm};
use super::helpers::{build_card_lines, centered_rect, surface_error, year_label};
use super::screens::LanguagePicker;

/// Number of book cards shown in each row of the grid.
const GRID_COLUMNS: usize = 3;
/// Footer space reserved for the summary, status messages, and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Height allocation per card row.
const CARD_HEIGHT: u16 = 7;
/// Rows skipped by PageUp/PageDown.
const PAGE_ROWS: isize = 3;
/// ASCII textures standing in for cover images. The texture is picked from the
/// title so a book keeps its art across sorts and filters.
const COVER_ART: &[&[&str]] = &[
    &["/\\/\\/", "\\/\\/\\"],
    &["*+*+", "+*+*"],
    &["=--=", "--=="],
    &["<>><", "><<>"],
    &["..--", "--.."],
    &["oOo ", " OoO"],
    &["##  ", "  ##"],
    &["||--", "--||"],
    &["~~  ", "  ~~"],
    &["^v^v", "v^v^"],
];

/// Fine-grained input modes layered over the card grid.
enum Mode {
    Normal,
    Searching(SearchState),
    EditingYears(YearRangeForm),
    SelectingLanguage(LanguagePicker),
}

/// State for an active inline search.
struct SearchState {
    query: String,
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Controller for the TUI. It owns the catalog outright, turns key presses
/// into catalog commands, and paints whatever view results.
pub struct App {
    catalog: Catalog,
    config: Config,
    selected: usize,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(catalog: Catalog, config: Config) -> Self {
        Self {
            catalog,
            config,
            selected: 0,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Position of the highlighted card within the current view.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Process one key press. Returns `true` when the user asked to quit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::Searching(state) => self.handle_search(code, state)?,
            Mode::EditingYears(form) => self.handle_year_form(code, form)?,
            Mode::SelectingLanguage(picker) => self.handle_language_picker(code, picker)?,
        };

        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => *exit = true,
            KeyCode::Left => self.move_horizontal(-1),
            KeyCode::Right => self.move_horizontal(1),
            KeyCode::Up => self.move_vertical(-1),
            KeyCode::Down => self.move_vertical(1),
            KeyCode::PageUp => self.move_vertical(-PAGE_ROWS),
            KeyCode::PageDown => self.move_vertical(PAGE_ROWS),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.catalog.display_count().saturating_sub(1),
            KeyCode::Char('/') => {
                self.clear_status();
                let query = self.catalog.filters().query.clone().unwrap_or_default();
                return Ok(Mode::Searching(SearchState { query }));
            }
            KeyCode::Char('y') => {
                self.clear_status();
                return Ok(Mode::EditingYears(YearRangeForm::from_bounds(
                    self.catalog.filters().years,
                )));
            }
            KeyCode::Char('l') => {
                self.clear_status();
                let picker = LanguagePicker::new(
                    self.catalog.available_languages(),
                    self.catalog.filters().language.as_deref(),
                );
                return Ok(Mode::SelectingLanguage(picker));
            }
            KeyCode::Char('s') => {
                let key = self.catalog.sort_key().next();
                self.dispatch(Command::SetSort(key));
                self.set_status(format!("Sorted by {key}."), StatusKind::Info);
            }
            KeyCode::Char('r') => {
                self.dispatch(Command::Reset);
                self.selected = 0;
                self.set_status("Showing the whole catalog.", StatusKind::Info);
            }
            KeyCode::Enter | KeyCode::Char('o') => self.open_selected_link(),
            KeyCode::Char('c') => self.open_selected_cover(),
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.dispatch(Command::SubmitQuery(String::new()));
                return Ok(Mode::Normal);
            }
            KeyCode::Enter => return Ok(Mode::Normal),
            KeyCode::Up => {
                self.move_vertical(-1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Down => {
                self.move_vertical(1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Left => {
                self.move_horizontal(-1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Right => {
                self.move_horizontal(1);
                return Ok(Mode::Searching(state));
            }
            KeyCode::Backspace => {
                state.query.pop();
            }
            KeyCode::Char(ch) if !ch.is_control() => state.query.push(ch),
            _ => return Ok(Mode::Searching(state)),
        }

        self.dispatch(Command::SubmitQuery(state.query.clone()));
        Ok(Mode::Searching(state))
    }

    fn handle_year_form(&mut self, code: KeyCode, mut form: YearRangeForm) -> Result<Mode> {
        match code {
            KeyCode::Esc => {
                self.set_status("Year filter cancelled.", StatusKind::Info);
                return Ok(Mode::Normal);
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.toggle_field(),
            KeyCode::Backspace => {
                form.backspace();
                form.error = None;
            }
            KeyCode::Enter => match form.parse_inputs() {
                Ok((min_year, max_year)) => {
                    self.dispatch(Command::SetYearRange(min_year, max_year));
                    self.set_status(
                        format!("Filtered by {}.", self.catalog.filters()),
                        StatusKind::Info,
                    );
                    return Ok(Mode::Normal);
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(Mode::EditingYears(form))
    }

    fn handle_language_picker(
        &mut self,
        code: KeyCode,
        mut picker: LanguagePicker,
    ) -> Result<Mode> {
        match code {
            KeyCode::Esc => return Ok(Mode::Normal),
            KeyCode::Up => picker.move_selection(-1),
            KeyCode::Down => picker.move_selection(1),
            KeyCode::Home => picker.select_first(),
            KeyCode::End => picker.select_last(),
            KeyCode::Enter => {
                if let Some(language) = picker.current().map(str::to_string) {
                    self.dispatch(Command::SelectLanguage(language.clone()));
                    if language == ALL_LANGUAGES {
                        self.set_status("Showing the whole catalog.", StatusKind::Info);
                    } else {
                        self.set_status(format!("Language: {language}."), StatusKind::Info);
                    }
                }
                return Ok(Mode::Normal);
            }
            _ => {}
        }
        Ok(Mode::SelectingLanguage(picker))
    }

    /// Hand a command to the catalog and keep the selection on a real card.
    fn dispatch(&mut self, command: Command) {
        debug!(?command, "dispatching command");
        self.catalog.apply(command);
        self.ensure_in_bounds();
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_card_grid(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::EditingYears(form) => self.draw_year_form(frame, area, form),
            Mode::SelectingLanguage(picker) => self.draw_language_picker(frame, area, picker),
            Mode::Normal => {}
        }
    }

    fn draw_card_grid(&self, frame: &mut Frame, area: Rect) {
        if self.catalog.display_count() == 0 {
            let text = if self.catalog.total_count() == 0 {
                "The catalog is empty."
            } else {
                "No books match. Press 'r' to show everything."
            };
            let message = Paragraph::new(text)
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::NONE));
            frame.render_widget(message, area);
            return;
        }

        let capacity = ((area.height / CARD_HEIGHT) as usize).max(1);
        let selected_row = self.selected / GRID_COLUMNS;
        let first_row = if selected_row >= capacity {
            selected_row + 1 - capacity
        } else {
            0
        };
        let visible_rows = min(capacity, self.row_count() - first_row);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints(vec![Constraint::Length(CARD_HEIGHT); visible_rows])
            .split(area);

        for (offset, row_chunk) in rows.iter().enumerate() {
            let columns = self.split_columns(*row_chunk);
            for (col_idx, column_chunk) in columns.iter().enumerate() {
                let position = (first_row + offset) * GRID_COLUMNS + col_idx;
                if let Some(record) = self.catalog.view_record(position) {
                    self.draw_card(frame, *column_chunk, record, position);
                }
            }
        }
    }

    fn draw_card(&self, frame: &mut Frame, area: Rect, record: &Record, position: usize) {
        let is_selected = position == self.selected;
        let mut block = Block::default()
            .borders(Borders::ALL)
            .title(year_label(record.year()));
        if is_selected {
            block = block.style(Style::default().fg(Color::Yellow));
        }

        let art_index = record
            .title()
            .map_or(0, |title| title.chars().map(|ch| ch as usize).sum::<usize>());
        let pattern = COVER_ART[art_index % COVER_ART.len()];
        let lines = build_card_lines(
            record,
            pattern,
            area.width.saturating_sub(2),
            area.height.saturating_sub(2),
            is_selected,
        );
        let card = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .block(block);
        frame.render_widget(card, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let mut spans = vec![Span::styled(
            self.summary(),
            Style::default().add_modifier(Modifier::BOLD),
        )];
        if let Some(status) = &self.status {
            spans.push(Span::raw("   "));
            spans.push(Span::styled(status.text.clone(), status.kind.style()));
        }

        let paragraph = Paragraph::new(vec![Line::from(spans), self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    /// "Showing X of Y" plus the active sort and filters.
    pub fn summary(&self) -> String {
        format!(
            "Showing {} of {} · sort: {} · filter: {}",
            self.catalog.display_count(),
            self.catalog.total_count(),
            self.catalog.sort_key(),
            self.catalog.filters()
        )
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_year_form(&self, frame: &mut Frame, area: Rect, form: &YearRangeForm) {
        let popup_area = centered_rect(50, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Filter by Year")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line("From", YearField::Min),
            form.build_line("To", YearField::Max),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to apply • Tab to switch • blank means any • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (prefix, row) = match form.active {
            YearField::Min => ("From: ".len(), 0),
            YearField::Max => ("To: ".len(), 1),
        };
        let cursor_x = inner.x + prefix as u16 + form.value_len(form.active) as u16;
        frame.set_cursor_position((cursor_x, inner.y + row));
    }

    fn draw_language_picker(&self, frame: &mut Frame, area: Rect, picker: &LanguagePicker) {
        let popup_area = centered_rect(40, 60, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Filter by Language")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let items: Vec<ListItem> = picker
            .options
            .iter()
            .map(|language| ListItem::new(language.clone()))
            .collect();

        let list = List::new(items)
            .block(Block::default().borders(Borders::NONE))
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("▶ ");

        let mut list_state = ListState::default();
        list_state.select(Some(picker.selected));
        frame.render_stateful_widget(list, inner, &mut list_state);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match &self.mode {
            Mode::Normal => &[
                ("[←↑↓→]", " Move   "),
                ("[/]", " Search   "),
                ("[y]", " Years   "),
                ("[l]", " Language   "),
                ("[s]", " Sort   "),
                ("[r]", " Reset   "),
                ("[o]", " Link   "),
                ("[c]", " Cover   "),
                ("[q]", " Quit"),
            ],
            Mode::Searching(_) => &[
                ("[Type]", " Filter   "),
                ("[↑↓]", " Move   "),
                ("[Enter]", " Keep   "),
                ("[Esc]", " Clear"),
            ],
            Mode::EditingYears(_) => &[
                ("[Tab]", " Switch field   "),
                ("[Enter]", " Apply   "),
                ("[Esc]", " Cancel"),
            ],
            Mode::SelectingLanguage(_) => &[
                ("[↑↓]", " Navigate   "),
                ("[Enter]", " Select   "),
                ("[Esc]", " Cancel"),
            ],
        };

        Line::from(
            hints
                .iter()
                .flat_map(|(key, label)| {
                    [
                        Span::styled(key.to_string(), key_style),
                        Span::raw(label.to_string()),
                    ]
                })
                .collect::<Vec<_>>(),
        )
    }

    fn open_selected_link(&mut self) {
        let Some(record) = self.current_record() else {
            self.set_status("No book selected.", StatusKind::Error);
            return;
        };
        let title = record.display_title();
        let link = record
            .link()
            .map(str::trim)
            .filter(|link| !link.is_empty())
            .map(str::to_string);
        match link {
            Some(link) => self.open_target(&link, &title),
            None => self.set_status("This book does not have a link.", StatusKind::Error),
        }
    }

    fn open_selected_cover(&mut self) {
        let Some(record) = self.current_record() else {
            self.set_status("No book selected.", StatusKind::Error);
            return;
        };
        let title = record.display_title();
        match record.resolve_cover_url_with(&self.config.cover_prefix) {
            Some(cover) => self.open_target(&cover, &title),
            None => self.set_status("This book does not have a cover.", StatusKind::Error),
        }
    }

    fn open_target(&mut self, target: &str, title: &str) {
        if let Err(err) = open_link(target) {
            warn!(%target, error = %err, "failed to open");
            self.set_status(format!("Failed to open {target}: {err}"), StatusKind::Error);
        } else {
            self.set_status(format!("Opened {title}."), StatusKind::Info);
        }
    }

    fn split_columns(&self, area: Rect) -> Vec<Rect> {
        let columns = GRID_COLUMNS.max(1) as u16;
        let percent = (100 / columns).max(1);
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Percentage(percent); columns as usize])
            .split(area);
        chunks.iter().cloned().collect()
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    fn current_record(&self) -> Option<&Record> {
        self.catalog.view_record(self.selected)
    }

    fn row_count(&self) -> usize {
        let cols = GRID_COLUMNS.max(1);
        self.catalog.display_count().div_ceil(cols)
    }

    fn ensure_in_bounds(&mut self) {
        let len = self.catalog.display_count();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    fn move_horizontal(&mut self, offset: isize) {
        let new_index = self.selected as isize + offset;
        if (0..self.catalog.display_count() as isize).contains(&new_index) {
            self.selected = new_index as usize;
        }
    }

    fn move_vertical(&mut self, offset: isize) {
        let len = self.catalog.display_count() as isize;
        if len == 0 {
            return;
        }
        let new_index = self.selected as isize + offset * GRID_COLUMNS as isize;
        self.selected = new_index.clamp(0, len - 1) as usize;
    }
}
