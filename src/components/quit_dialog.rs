//! Quit confirmation
//!
//! Warns about fields that were typed into but never left or committed,
//! since those edits only exist in this session.

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

const LISTED: usize = 3;

#[derive(Default)]
pub struct QuitDialog {
    /// Ids of edited fields not sent to the server
    pub unsent: Vec<String>,
}

impl QuitDialog {
    fn warning_lines(&self) -> Vec<Line<'static>> {
        if self.unsent.is_empty() {
            return Vec::new();
        }
        let red = Style::default().fg(Color::Red);
        let mut lines = vec![Line::from(Span::styled(
            format!("{} edited field(s) not sent yet:", self.unsent.len()),
            red.add_modifier(Modifier::BOLD),
        ))];
        lines.extend(
            self.unsent
                .iter()
                .take(LISTED)
                .map(|id| Line::from(Span::styled(id.clone(), red))),
        );
        if self.unsent.len() > LISTED {
            lines.push(Line::from(Span::styled(
                format!("and {} more", self.unsent.len() - LISTED),
                red,
            )));
        }
        lines
    }
}

impl Component for QuitDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        Ok(match key.code {
            KeyCode::Char('y' | 'Y') => Some(Action::ForceQuit),
            KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::CloseModal),
            _ => None,
        })
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let key = |k: &'static str, color: Color| {
            Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
        };

        let mut content = vec![Line::from(""), Line::from("Leave the annotation session?")];
        content.extend(self.warning_lines());
        content.push(Line::from(""));
        content.push(Line::from(vec![
            key(" y ", Color::Green),
            Span::raw("quit  "),
            key(" n/Esc ", Color::Red),
            Span::raw("stay"),
        ]));

        let popup = centered_popup(area, 52, content.len() as u16 + 2);
        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(content)
                .alignment(Alignment::Center)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Yellow))
                        .title(" Quit ")
                        .title_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                ),
            popup,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_long_unsent_list_is_summarised() {
        let dialog = QuitDialog {
            unsent: (1..=5).map(|i| format!("r{i}_oft")).collect(),
        };
        let lines = dialog.warning_lines();
        // header, three ids, remainder
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[4].spans[0].content, "and 2 more");
    }

    #[test]
    fn test_nothing_unsent_no_warning() {
        assert!(QuitDialog::default().warning_lines().is_empty());
    }
}
