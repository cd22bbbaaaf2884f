//! Key reference for both pages

use crate::action::Action;
use crate::component::Component;
use crate::components::centered_popup;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

#[derive(Default)]
pub struct HelpDialog {
    /// First visible line, clamped on draw
    pub scroll_offset: usize,
}

impl HelpDialog {
    fn scroll_by(&mut self, delta: isize) {
        self.scroll_offset = self.scroll_offset.saturating_add_signed(delta);
    }
}

impl Component for HelpDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') => return Ok(Some(Action::CloseModal)),
            KeyCode::Char('j') | KeyCode::Down => self.scroll_by(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_by(-1),
            KeyCode::PageDown => self.scroll_by(10),
            KeyCode::PageUp => self.scroll_by(-10),
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let popup = centered_popup(area, 64, area.height.saturating_sub(4));
        let content = build_help_content();
        let total = content.len();
        let visible = popup.height.saturating_sub(2) as usize;
        let overflow = total.saturating_sub(visible);
        self.scroll_offset = self.scroll_offset.min(overflow);

        frame.render_widget(Clear, popup);
        frame.render_widget(
            Paragraph::new(content)
                .scroll((self.scroll_offset as u16, 0))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::Cyan))
                        .title(" Keys ")
                        .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                ),
            popup,
        );

        if overflow > 0 {
            let mut state = ScrollbarState::new(overflow).position(self.scroll_offset);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight),
                popup.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut state,
            );
        }
        Ok(())
    }
}

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Global",
        &[
            ("F1", "Show this help"),
            ("F2", "Switch Annotation / Concordance"),
            ("Ctrl+e", "Export the corpus on the server"),
            ("Ctrl+q", "Quit"),
        ],
    ),
    (
        "Annotation: Texts",
        &[
            ("j / k", "Move through the texts"),
            ("Enter", "Load the text's examples"),
            ("Tab", "Go to the examples"),
        ],
    ),
    (
        "Annotation: Examples",
        &[
            ("Tab / ↓", "Next field (saves an edited field)"),
            ("Shift+Tab / ↑", "Previous field"),
            ("Enter", "Save field and refresh the example"),
            ("Enter / Space", "Open analyses on a dropdown"),
            ("1-9", "Pick an analysis in the dropdown"),
            ("Esc", "Leave the examples"),
        ],
    ),
    (
        "Concordance",
        &[
            ("Tab", "Files / Query / Search / Results"),
            ("Enter / Space", "Make the file active"),
            ("Enter", "Run the query"),
        ],
    ),
    (
        "Results",
        &[
            ("j / k", "Scroll one row"),
            ("PgDn / PgUp", "Scroll one page"),
            ("[ / ]", "Choose the sort column"),
            ("s", "Sort by the column, again to reverse"),
        ],
    ),
];

fn build_help_content() -> Vec<Line<'static>> {
    let heading = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);
    let key_style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);

    let mut lines = Vec::new();
    for (title, shortcuts) in SECTIONS {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!("  {title}"), heading)));
        for (key, description) in *shortcuts {
            lines.push(Line::from(vec![
                Span::styled(format!("  {key:14}"), key_style),
                Span::raw(*description),
            ]));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Esc or F1 closes",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}
