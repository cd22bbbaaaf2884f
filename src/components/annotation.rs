//! Annotation page component
//!
//! A text selector on the left and the examples of the loaded text on the
//! right. Typing edits the focused field locally; leaving a modified field,
//! pressing Enter or choosing an analysis goes out as an Action.

use crate::action::Action;
use crate::component::Component;
use crate::components::{fit_cell, split_sidebar};
use crate::model::example::{Example, ExampleList, InputField, Segment};
use crate::model::selection::Selection;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationFocus {
    Texts,
    Examples,
}

/// Position of the focused control: (example index, control index)
pub type Cursor = (usize, usize);

pub struct AnnotationComponent {
    pub texts: Selection,
    pub texts_state: ListState,
    pub examples: ExampleList,
    /// Text whose examples are on screen (or still streaming in)
    pub loaded_text: Option<String>,
    pub loading: bool,
    pub focus: AnnotationFocus,
    pub cursor: Option<Cursor>,
    /// First visible line of the examples pane
    scroll: u16,
}

impl Default for AnnotationComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationComponent {
    pub fn new() -> Self {
        Self {
            texts: Selection::new(),
            texts_state: ListState::default(),
            examples: ExampleList::new(),
            loaded_text: None,
            loading: false,
            focus: AnnotationFocus::Texts,
            cursor: None,
            scroll: 0,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Text selector
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_texts(&mut self, texts: Vec<String>) {
        self.texts.replace(texts);
        if let Some(loaded) = self.loaded_text.clone() {
            self.texts.select(&loaded);
        }
        let cursor = self.texts.active_index().or(if self.texts.is_empty() {
            None
        } else {
            Some(0)
        });
        self.texts_state.select(cursor);
    }

    fn highlighted_text(&self) -> Option<&str> {
        self.texts_state
            .selected()
            .and_then(|idx| self.texts.items().get(idx))
            .map(String::as_str)
    }

    fn move_text_cursor(&mut self, forward: bool) {
        if self.texts.is_empty() {
            return;
        }
        let last = self.texts.len() - 1;
        let next = match (self.texts_state.selected(), forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1).min(last),
            (Some(i), false) => i.saturating_sub(1),
        };
        self.texts_state.select(Some(next));
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Example list
    // ─────────────────────────────────────────────────────────────────────────

    /// Start showing `text_id`: the example list is emptied right away
    pub fn begin_load(&mut self, text_id: &str) {
        self.texts.select(text_id);
        self.loaded_text = Some(text_id.to_string());
        self.loading = true;
        self.examples.clear();
        self.cursor = None;
        self.scroll = 0;
    }

    pub fn append_example(&mut self, example: Example) {
        self.examples.append(example);
        if self.cursor.is_none() {
            self.cursor = self.positions().first().copied();
        }
    }

    /// All examples are in; size every field on the page
    pub fn finish_load(&mut self) {
        self.loading = false;
        self.examples.fit_all();
    }

    /// Swap in a re-rendered example. Returns false if it is gone from the page.
    pub fn replace_example(&mut self, example_id: &str, example: Example) -> bool {
        if !self.examples.replace(example_id, example) {
            return false;
        }
        self.examples.fit_all();
        self.clamp_cursor();
        true
    }

    /// Every focusable control on the page in focus order
    fn positions(&self) -> Vec<Cursor> {
        self.examples
            .iter()
            .enumerate()
            .flat_map(|(ex_idx, ex)| (0..ex.control_count()).map(move |c| (ex_idx, c)))
            .collect()
    }

    fn clamp_cursor(&mut self) {
        let Some((ex_idx, ctrl_idx)) = self.cursor else {
            return;
        };
        let count = self
            .examples
            .get(ex_idx)
            .map(Example::control_count)
            .unwrap_or(0);
        self.cursor = if count > 0 {
            Some((ex_idx, ctrl_idx.min(count - 1)))
        } else {
            self.positions()
                .into_iter()
                .find(|(e, _)| *e >= ex_idx)
                .or_else(|| self.positions().last().copied())
        };
    }

    /// Ids of edited fields that have not been sent yet
    pub fn pending_edits(&self) -> Vec<String> {
        self.examples
            .iter()
            .flat_map(Example::inputs)
            .filter(|field| field.is_dirty())
            .map(|field| field.id.clone())
            .collect()
    }

    pub fn focused_example(&self) -> Option<&Example> {
        self.cursor.and_then(|(ex_idx, _)| self.examples.get(ex_idx))
    }

    pub fn focused_control(&self) -> Option<&Segment> {
        let (ex_idx, ctrl_idx) = self.cursor?;
        self.examples.get(ex_idx)?.control(ctrl_idx)
    }

    fn focused_input_mut(&mut self) -> Option<&mut InputField> {
        let (ex_idx, ctrl_idx) = self.cursor?;
        match self.examples.get_mut(ex_idx)?.control_mut(ctrl_idx)? {
            Segment::Input(field) => Some(field),
            _ => None,
        }
    }

    /// The focused field loses focus. A modified value yields one change.
    fn blur(&mut self) -> Option<Action> {
        let field = self.focused_input_mut()?;
        if !field.is_dirty() {
            return None;
        }
        field.mark_sent();
        Some(Action::ChangeField {
            target: field.id.clone(),
            value: field.value.clone(),
        })
    }

    fn move_cursor(&mut self, forward: bool) -> Option<Action> {
        let positions = self.positions();
        if positions.is_empty() {
            return None;
        }
        let blurred = self.blur();
        let current = self
            .cursor
            .and_then(|c| positions.iter().position(|p| *p == c));
        let next = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1).min(positions.len() - 1),
            (Some(i), false) => i.saturating_sub(1),
        };
        self.cursor = Some(positions[next]);
        blurred
    }

    /// Enter on the focused control
    fn activate(&mut self) -> Option<Action> {
        let example_id = self.focused_example()?.id.clone();
        match self.focused_control()?.clone() {
            Segment::Choice(control) => Some(Action::OpenChoices {
                example_id,
                control,
            }),
            Segment::Input(_) => {
                let field = self.focused_input_mut()?;
                field.mark_sent();
                Some(Action::CommitField {
                    target: field.id.clone(),
                    value: field.value.clone(),
                    example_id,
                })
            }
            _ => None,
        }
    }

    fn handle_examples_key(&mut self, key: KeyEvent) -> Option<Action> {
        let typing = !key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);
        match key.code {
            KeyCode::Tab | KeyCode::Down => Some(Action::FocusNext),
            KeyCode::BackTab | KeyCode::Up => Some(Action::FocusPrev),
            KeyCode::Enter => self.activate(),
            KeyCode::Esc => {
                let blurred = self.blur();
                self.focus = AnnotationFocus::Texts;
                blurred
            }
            KeyCode::Char(' ')
                if matches!(self.focused_control(), Some(Segment::Choice(_))) =>
            {
                self.activate()
            }
            KeyCode::Char(c) if typing => {
                if let Some(field) = self.focused_input_mut() {
                    field.push(c);
                }
                None
            }
            KeyCode::Backspace => {
                if let Some(field) = self.focused_input_mut() {
                    field.pop();
                }
                None
            }
            _ => None,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Rendering
    // ─────────────────────────────────────────────────────────────────────────

    fn render_example(ex: &Example, number: usize, focused: Option<usize>) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(vec![
            Span::styled(format!("({}) ", number), Style::default().fg(Color::Cyan)),
            Span::styled(ex.id.clone(), Style::default().fg(Color::DarkGray)),
        ])];
        let mut control = 0;

        for segments in ex.lines() {
            let mut spans: Vec<Span<'static>> = Vec::new();
            for segment in segments {
                let is_focused = segment.is_control() && focused == Some(control);
                let highlight = |style: Style| {
                    if is_focused {
                        style.add_modifier(Modifier::REVERSED)
                    } else {
                        style
                    }
                };
                match segment {
                    Segment::LineBreak => {}
                    Segment::Text(text) => spans.push(Span::raw(text.clone())),
                    Segment::Input(field) => {
                        let width = field.display_width() as usize;
                        let span = match &field.placeholder {
                            Some(placeholder) if field.value.is_empty() => Span::styled(
                                fit_cell(placeholder, width),
                                highlight(
                                    Style::default()
                                        .fg(Color::DarkGray)
                                        .add_modifier(Modifier::ITALIC | Modifier::UNDERLINED),
                                ),
                            ),
                            _ => Span::styled(
                                fit_cell(&field.value, width),
                                highlight(
                                    Style::default()
                                        .fg(Color::Yellow)
                                        .add_modifier(Modifier::UNDERLINED),
                                ),
                            ),
                        };
                        spans.push(span);
                        spans.push(Span::raw(" "));
                    }
                    Segment::Choice(choice) => {
                        spans.push(Span::styled(
                            format!("{} ▾", choice.label),
                            highlight(Style::default().fg(Color::Magenta)),
                        ));
                        spans.push(Span::raw(" "));
                    }
                }
                if segment.is_control() {
                    control += 1;
                }
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::from(""));
        lines
    }

    fn draw_texts(&mut self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .texts
            .items()
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let active = self.texts.is_active(i);
                let marker = if active { "● " } else { "  " };
                let style = if active {
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::White)
                };
                ListItem::new(Line::from(vec![
                    Span::styled(marker, Style::default().fg(Color::Green)),
                    Span::styled(text.clone(), style),
                ]))
            })
            .collect();

        let border = if self.focus == AnnotationFocus::Texts {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" Texts ({}) ", self.texts.len()))
                    .border_style(Style::default().fg(border)),
            )
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, area, &mut self.texts_state);
    }

    fn draw_examples(&mut self, frame: &mut Frame, area: Rect) {
        let mut lines: Vec<Line> = Vec::new();
        let mut focused_span = None;

        for (ex_idx, ex) in self.examples.iter().enumerate() {
            let focused = match self.cursor {
                Some((e, c)) if e == ex_idx && self.focus == AnnotationFocus::Examples => Some(c),
                _ => None,
            };
            let start = lines.len();
            lines.extend(Self::render_example(ex, ex_idx + 1, focused));
            if self.cursor.map(|(e, _)| e) == Some(ex_idx) {
                focused_span = Some((start, lines.len()));
            }
        }

        if lines.is_empty() {
            let hint = match (&self.loaded_text, self.loading) {
                (Some(_), true) => "Loading examples...",
                (Some(_), false) => "This text has no examples.",
                (None, _) => "Select a text and press Enter to load it.",
            };
            lines.push(Line::from(Span::styled(
                hint,
                Style::default().fg(Color::DarkGray),
            )));
        }

        // keep the focused example on screen
        let visible = area.height.saturating_sub(2) as usize;
        if let Some((start, end)) = focused_span {
            let scroll = self.scroll as usize;
            if start < scroll {
                self.scroll = start as u16;
            } else if end > scroll + visible {
                self.scroll = end.saturating_sub(visible).min(start) as u16;
            }
        }

        let title = match &self.loaded_text {
            Some(text) => format!(" {} ({} examples) ", text, self.examples.len()),
            None => " Examples ".to_string(),
        };
        let border = if self.focus == AnnotationFocus::Examples {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let paragraph = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(border)),
            )
            .scroll((self.scroll, 0));
        frame.render_widget(paragraph, area);
    }
}

impl Component for AnnotationComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match self.focus {
            AnnotationFocus::Texts => match key.code {
                KeyCode::Char('j') | KeyCode::Down => Some(Action::NextItem),
                KeyCode::Char('k') | KeyCode::Up => Some(Action::PrevItem),
                KeyCode::Enter => self.highlighted_text().map(|t| Action::LoadText(t.to_string())),
                KeyCode::Tab => Some(Action::FocusNext),
                _ => None,
            },
            AnnotationFocus::Examples => self.handle_examples_key(key),
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let follow_up = match (self.focus, action) {
            (AnnotationFocus::Texts, Action::NextItem) => {
                self.move_text_cursor(true);
                None
            }
            (AnnotationFocus::Texts, Action::PrevItem) => {
                self.move_text_cursor(false);
                None
            }
            (AnnotationFocus::Texts, Action::FocusNext) => {
                if !self.examples.is_empty() {
                    self.focus = AnnotationFocus::Examples;
                    self.clamp_cursor();
                    if self.cursor.is_none() {
                        self.cursor = self.positions().first().copied();
                    }
                }
                None
            }
            (AnnotationFocus::Examples, Action::FocusNext) => self.move_cursor(true),
            (AnnotationFocus::Examples, Action::FocusPrev) => self.move_cursor(false),
            _ => None,
        };
        Ok(follow_up)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let (texts_area, examples_area) = split_sidebar(area);
        self.draw_texts(frame, texts_area);
        self.draw_examples(frame, examples_area);
        Ok(())
    }
}
