//! Analysis choice dialog component
//!
//! The dropdown of an example's choice control. Confirming an option emits
//! exactly one pick for it.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use crate::model::example::{Choice, ChoiceControl};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Choice dialog
pub struct ChoiceDialog {
    pub selected_index: usize,
    pub example_id: String,
    pub control: ChoiceControl,
    pub list_state: ListState,
}

impl Default for ChoiceDialog {
    fn default() -> Self {
        Self::new()
    }
}

impl ChoiceDialog {
    pub fn new() -> Self {
        Self {
            selected_index: 0,
            example_id: String::new(),
            control: ChoiceControl {
                label: String::new(),
                choices: Vec::new(),
            },
            list_state: ListState::default(),
        }
    }

    /// Show the options of `control`, first one highlighted
    pub fn open(&mut self, example_id: &str, control: ChoiceControl) {
        self.example_id = example_id.to_string();
        self.control = control;
        self.selected_index = 0;
        self.list_state
            .select(if self.control.choices.is_empty() { None } else { Some(0) });
    }

    pub fn selected_choice(&self) -> Option<&Choice> {
        self.control.choices.get(self.selected_index)
    }

    /// The pick for the highlighted option
    pub fn pick_action(&self) -> Option<Action> {
        self.selected_choice().map(|choice| Action::PickChoice {
            target: choice.id.clone(),
            choice: choice.text.clone(),
            example_id: self.example_id.clone(),
        })
    }

    fn select_next(&mut self) {
        if self.selected_index + 1 < self.control.choices.len() {
            self.selected_index += 1;
            self.list_state.select(Some(self.selected_index));
        }
    }

    fn select_prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            self.list_state.select(Some(self.selected_index));
        }
    }
}

impl Component for ChoiceDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Enter if self.selected_choice().is_some() => Some(Action::ConfirmModal),
            KeyCode::Up | KeyCode::Char('k') => {
                self.select_prev();
                Some(Action::ModalUp)
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.select_next();
                Some(Action::ModalDown)
            }
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                if idx < self.control.choices.len() {
                    self.selected_index = idx;
                    self.list_state.select(Some(idx));
                    Some(Action::ConfirmModal)
                } else {
                    None
                }
            }
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let height = (self.control.choices.len() as u16 + 8).min(area.height.saturating_sub(4));
        let popup_area = centered_popup(area, 50, height.max(9));
        frame.render_widget(Clear, popup_area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(2),    // Options
                Constraint::Length(3), // Help bar
            ])
            .split(popup_area);

        let header = Paragraph::new(Line::from(vec![
            Span::styled("Current: ", Style::default().fg(Color::DarkGray)),
            Span::styled(self.control.label.clone(), Style::default().fg(Color::Cyan)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Analyses for {} ", self.example_id))
                .title_style(
                    Style::default()
                        .fg(Color::Magenta)
                        .add_modifier(Modifier::BOLD),
                ),
        );
        frame.render_widget(header, chunks[0]);

        let items: Vec<ListItem> = self
            .control
            .choices
            .iter()
            .enumerate()
            .map(|(i, choice)| {
                let shortcut = if i < 9 {
                    format!("[{}] ", i + 1)
                } else {
                    "    ".to_string()
                };
                ListItem::new(Line::from(vec![
                    Span::styled(shortcut, Style::default().fg(Color::DarkGray)),
                    Span::raw(choice.text.trim().to_string()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, chunks[1], &mut self.list_state);

        let help = Paragraph::new(Line::from(vec![
            Span::styled(" Enter ", Style::default().fg(Color::Yellow)),
            Span::raw("Pick  "),
            Span::styled(" j/k ", Style::default().fg(Color::Cyan)),
            Span::raw("Navigate  "),
            Span::styled(" Esc ", Style::default().fg(Color::Yellow)),
            Span::raw("Cancel"),
        ]))
        .alignment(ratatui::layout::Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(help, chunks[2]);

        Ok(())
    }
}
