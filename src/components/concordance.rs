//! Concordance page component
//!
//! Data file list, query line with a Search button, and the results table.

use crate::action::Action;
use crate::component::Component;
use crate::components::{split_sidebar, ResultsTableComponent};
use crate::model::results::ResultsView;
use crate::model::selection::Selection;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcordanceFocus {
    Files,
    Query,
    SearchButton,
    Results,
}

impl ConcordanceFocus {
    fn next(self) -> Self {
        match self {
            Self::Files => Self::Query,
            Self::Query => Self::SearchButton,
            Self::SearchButton => Self::Results,
            Self::Results => Self::Files,
        }
    }

    fn prev(self) -> Self {
        match self {
            Self::Files => Self::Results,
            Self::Query => Self::Files,
            Self::SearchButton => Self::Query,
            Self::Results => Self::SearchButton,
        }
    }
}

pub struct ConcordanceComponent {
    pub files: Selection,
    pub files_state: ListState,
    pub query: String,
    pub focus: ConcordanceFocus,
    pub results: ResultsTableComponent,
    /// A search is in flight
    pub searching: bool,
}

impl Default for ConcordanceComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl ConcordanceComponent {
    pub fn new() -> Self {
        Self {
            files: Selection::new(),
            files_state: ListState::default(),
            query: String::new(),
            focus: ConcordanceFocus::Query,
            results: ResultsTableComponent::new(),
            searching: false,
        }
    }

    /// New file listing; the first file becomes the active one
    pub fn set_files(&mut self, files: Vec<String>) {
        self.files.replace_and_activate_first(files);
        self.files_state.select(self.files.active_index());
    }

    pub fn set_results(&mut self, view: ResultsView) {
        self.searching = false;
        self.results.set_view(view);
    }

    fn run_query(&self) -> Action {
        Action::RunQuery {
            query: self.query.clone(),
            filename: self.files.active_item().map(str::to_string),
        }
    }

    fn move_file_cursor(&mut self, forward: bool) {
        if self.files.is_empty() {
            return;
        }
        let last = self.files.len() - 1;
        let next = match (self.files_state.selected(), forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1).min(last),
            (Some(i), false) => i.saturating_sub(1),
        };
        self.files_state.select(Some(next));
    }

    fn set_focus(&mut self, focus: ConcordanceFocus) {
        self.focus = focus;
        self.results.focused = focus == ConcordanceFocus::Results;
    }

    fn draw_files(&mut self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .files
            .items()
            .iter()
            .enumerate()
            .map(|(i, file)| {
                let active = self.files.is_active(i);
                let marker = if active { "● " } else { "  " };
                let style = if active {
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Green)),
                    Span::styled(file.clone(), style),
                ]))
            })
            .collect();

        let border = if self.focus == ConcordanceFocus::Files {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Data files ({}) ", self.files.len()))
                    .border_style(Style::default().fg(border)),
            )
            .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, area, &mut self.files_state);
    }

    fn draw_query(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(12)])
            .split(area);

        let query_focused = self.focus == ConcordanceFocus::Query;
        let mut spans = vec![Span::styled(
            self.query.clone(),
            Style::default().fg(Color::White),
        )];
        if query_focused {
            spans.push(Span::styled("█", Style::default().fg(Color::Cyan)));
        }
        let query = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Query ")
                .border_style(Style::default().fg(if query_focused {
                    Color::Cyan
                } else {
                    Color::DarkGray
                })),
        );
        frame.render_widget(query, chunks[0]);

        let button_style = if self.focus == ConcordanceFocus::SearchButton {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Green)
        };
        let label = if self.searching { "Searching" } else { "Search" };
        let button = Paragraph::new(Span::styled(label, button_style))
            .alignment(ratatui::layout::Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(button, chunks[1]);
    }
}

impl Component for ConcordanceComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Tab => return Ok(Some(Action::FocusNext)),
            KeyCode::BackTab => return Ok(Some(Action::FocusPrev)),
            _ => {}
        }

        let action = match self.focus {
            ConcordanceFocus::Files => match key.code {
                KeyCode::Char('j') | KeyCode::Down => Some(Action::NextItem),
                KeyCode::Char('k') | KeyCode::Up => Some(Action::PrevItem),
                KeyCode::Enter | KeyCode::Char(' ') => {
                    if let Some(idx) = self.files_state.selected() {
                        self.files.select_index(idx);
                    }
                    None
                }
                _ => None,
            },
            ConcordanceFocus::Query => match key.code {
                KeyCode::Enter => Some(self.run_query()),
                KeyCode::Backspace => {
                    self.query.pop();
                    None
                }
                KeyCode::Char(c)
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
                {
                    self.query.push(c);
                    None
                }
                _ => None,
            },
            ConcordanceFocus::SearchButton => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => Some(self.run_query()),
                _ => None,
            },
            ConcordanceFocus::Results => self.results.handle_key_event(key)?,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::FocusNext => self.set_focus(self.focus.next()),
            Action::FocusPrev => self.set_focus(self.focus.prev()),
            Action::NextItem => self.move_file_cursor(true),
            Action::PrevItem => self.move_file_cursor(false),
            other => return self.results.update(other),
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let (files_area, main_area) = split_sidebar(area);
        self.draw_files(frame, files_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(main_area);
        self.draw_query(frame, chunks[0]);
        self.results.draw(frame, chunks[1])
    }
}
