//! Results table component
//!
//! Renders concordance results with headers, rows and column alignment,
//! and lets the user scroll and sort by column.

use crate::action::Action;
use crate::component::Component;
use crate::components::fit_cell;
use crate::model::results::{ResultsTable, ResultsView};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Widest a column may grow before its cells are cut
const MAX_COLUMN_WIDTH: usize = 50;

/// Rows moved by PageUp/PageDown
const PAGE: usize = 10;

pub struct ResultsTableComponent {
    pub view: ResultsView,
    /// Scroll offset in rows
    pub scroll: usize,
    /// Column chosen with `[` / `]`
    pub sort_column: usize,
    pub focused: bool,
}

impl Default for ResultsTableComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultsTableComponent {
    pub fn new() -> Self {
        Self {
            view: ResultsView::Empty,
            scroll: 0,
            sort_column: 0,
            focused: false,
        }
    }

    /// Replace the results with a new search response
    pub fn set_view(&mut self, view: ResultsView) {
        self.view = view;
        self.scroll = 0;
        self.sort_column = 0;
    }

    fn column_count(&self) -> usize {
        match &self.view {
            ResultsView::Table(table) => table.column_count(),
            _ => 0,
        }
    }

    /// Build table lines from headers and rows
    pub fn build_table_lines(table: &ResultsTable, sort_column: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        let columns = table.column_count();
        if columns == 0 {
            return vec![Line::from("Empty result table")];
        }

        let mut col_widths = vec![0usize; columns];
        for (i, h) in table.headers.iter().enumerate() {
            col_widths[i] = h.width() + 2;
        }
        for row in &table.rows {
            for (i, cell) in row.iter().enumerate() {
                col_widths[i] = col_widths[i].max(cell.width());
            }
        }
        for width in &mut col_widths {
            *width = (*width).clamp(1, MAX_COLUMN_WIDTH);
        }

        let header_spans: Vec<Span> = (0..columns)
            .flat_map(|i| {
                let name = table.headers.get(i).map(String::as_str).unwrap_or("");
                let label = match table.sort {
                    Some((col, order)) if col == i => format!("{} {}", name, order.marker()),
                    _ => name.to_string(),
                };
                let mut style = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
                if i == sort_column {
                    style = style.add_modifier(Modifier::UNDERLINED);
                }
                vec![
                    Span::styled(fit_cell(&label, col_widths[i]), style),
                    Span::raw(" │ "),
                ]
            })
            .collect();
        lines.push(Line::from(header_spans));

        let separator: String = col_widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        lines.push(Line::from(Span::styled(
            separator,
            Style::default().fg(Color::DarkGray),
        )));

        for row in &table.rows {
            let row_spans: Vec<Span> = (0..columns)
                .flat_map(|i| {
                    let cell = row.get(i).map(String::as_str).unwrap_or("");
                    vec![
                        Span::styled(
                            fit_cell(cell, col_widths[i]),
                            Style::default().fg(Color::White),
                        ),
                        Span::raw(" │ "),
                    ]
                })
                .collect();
            lines.push(Line::from(row_spans));
        }

        lines
    }
}

impl Component for ResultsTableComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Action::ScrollDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::ScrollUp),
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::PageDown)
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::PageUp)
            }
            KeyCode::PageDown => Some(Action::PageDown),
            KeyCode::PageUp => Some(Action::PageUp),
            KeyCode::Char(']') | KeyCode::Right => Some(Action::SortColumnNext),
            KeyCode::Char('[') | KeyCode::Left => Some(Action::SortColumnPrev),
            KeyCode::Char('s') => Some(Action::ToggleSort),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let max_scroll = self.view.row_count().saturating_sub(1);
        match action {
            Action::ScrollDown => {
                if self.scroll < max_scroll {
                    self.scroll += 1;
                }
            }
            Action::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            Action::PageDown => {
                self.scroll = (self.scroll + PAGE).min(max_scroll);
            }
            Action::PageUp => {
                self.scroll = self.scroll.saturating_sub(PAGE);
            }
            Action::SortColumnNext => {
                let columns = self.column_count();
                if columns > 0 {
                    self.sort_column = (self.sort_column + 1) % columns;
                }
            }
            Action::SortColumnPrev => {
                let columns = self.column_count();
                if columns > 0 {
                    self.sort_column = (self.sort_column + columns - 1) % columns;
                }
            }
            Action::ToggleSort => {
                if let ResultsView::Table(table) = &mut self.view {
                    table.toggle_sort(self.sort_column);
                    self.scroll = 0;
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let border = if self.focused { Color::Cyan } else { Color::DarkGray };

        let (content, title, header_rows) = match &self.view {
            ResultsView::Empty => (
                vec![Line::from(Span::styled(
                    "No results yet. Enter a query and press Enter.",
                    Style::default().fg(Color::DarkGray),
                ))],
                " Results ".to_string(),
                0,
            ),
            ResultsView::Text(text) => (
                vec![Line::from(text.clone())],
                " Results ".to_string(),
                0,
            ),
            ResultsView::Table(table) => (
                Self::build_table_lines(table, self.sort_column),
                format!(" Results ({} rows) ", table.rows.len()),
                2,
            ),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(border));

        if header_rows == 0 {
            frame.render_widget(
                Paragraph::new(content).block(block).wrap(Wrap { trim: true }),
                area,
            );
            return Ok(());
        }

        // keep the header pinned while rows scroll underneath
        let mut lines = content;
        let body = lines.split_off(header_rows.min(lines.len()));
        let visible = area.height.saturating_sub(2 + header_rows as u16) as usize;
        lines.extend(body.iter().skip(self.scroll).take(visible).cloned());

        frame.render_widget(Paragraph::new(lines).block(block), area);

        let total = body.len();
        if total > visible {
            let mut scrollbar_state =
                ScrollbarState::new(total.saturating_sub(visible)).position(self.scroll);

            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(Some("↑"))
                    .end_symbol(Some("↓")),
                area.inner(ratatui::layout::Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }

        Ok(())
    }
}
