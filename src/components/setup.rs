//! Setup wizard component
//!
//! First-run configuration: which corpus server to talk to and, optionally,
//! which text to open on start-up.

use crate::action::Action;
use crate::component::Component;
use crate::config::{Config, DEFAULT_SERVER_URL};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::path::PathBuf;

/// Setup wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    Welcome,
    ServerUrl,
    InitialText,
    Confirm,
}

impl SetupStep {
    const ORDER: [SetupStep; 4] = [
        SetupStep::Welcome,
        SetupStep::ServerUrl,
        SetupStep::InitialText,
        SetupStep::Confirm,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|s| *s == self).unwrap_or(0)
    }

    fn next(self) -> Option<SetupStep> {
        Self::ORDER.get(self.position() + 1).copied()
    }

    fn prev(self) -> Option<SetupStep> {
        self.position().checked_sub(1).map(|i| Self::ORDER[i])
    }

    fn title(self) -> &'static str {
        match self {
            SetupStep::Welcome => "Welcome",
            SetupStep::ServerUrl => "Corpus Server",
            SetupStep::InitialText => "Start Text",
            SetupStep::Confirm => "Confirm",
        }
    }
}

/// Setup wizard component
pub struct SetupComponent {
    pub step: SetupStep,
    /// Config being built
    pub config: Config,
    pub input: String,
    pub error: Option<String>,
    pub complete: bool,
    /// Where to save; the default config location when unset
    save_path: Option<PathBuf>,
}

impl Default for SetupComponent {
    fn default() -> Self {
        Self::new()
    }
}

impl SetupComponent {
    pub fn new() -> Self {
        Self {
            step: SetupStep::Welcome,
            config: Config::default(),
            input: String::new(),
            error: None,
            complete: false,
            save_path: None,
        }
    }

    #[cfg(test)]
    pub fn with_save_path(path: PathBuf) -> Self {
        Self {
            save_path: Some(path),
            ..Self::new()
        }
    }

    /// The saved config once setup has completed
    pub fn get_config(&self) -> Option<&Config> {
        if self.complete {
            Some(&self.config)
        } else {
            None
        }
    }

    fn validate_current_step(&mut self) -> bool {
        self.error = None;

        match self.step {
            SetupStep::Welcome | SetupStep::Confirm => true,
            SetupStep::ServerUrl => {
                let candidate = Config {
                    server_url: self.input.trim().to_string(),
                    ..self.config.clone()
                };
                match candidate.validate() {
                    Ok(_) => {
                        self.config = candidate;
                        true
                    }
                    Err(e) => {
                        self.error = Some(e.to_string());
                        false
                    }
                }
            }
            SetupStep::InitialText => {
                let text = self.input.trim();
                self.config.initial_text = (!text.is_empty()).then(|| text.to_string());
                true
            }
        }
    }

    fn input_for(&self, step: SetupStep) -> String {
        match step {
            SetupStep::ServerUrl => self.config.server_url.clone(),
            SetupStep::InitialText => self.config.initial_text.clone().unwrap_or_default(),
            SetupStep::Welcome | SetupStep::Confirm => String::new(),
        }
    }

    fn advance_step(&mut self) {
        if self.validate_current_step() {
            if let Some(next) = self.step.next() {
                self.step = next;
                self.input = self.input_for(next);
            }
        }
    }

    fn go_back(&mut self) {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
            self.error = None;
            self.input = self.input_for(prev);
        }
    }

    fn save_config(&mut self) {
        let saved = match &self.save_path {
            Some(path) => self.config.save_to(path),
            None => self.config.save(),
        };
        match saved {
            Ok(()) => {
                tracing::info!(server = %self.config.server_url, "configuration saved");
                self.complete = true;
            }
            Err(e) => {
                self.error = Some(format!("Failed to save config: {}", e));
            }
        }
    }
}

impl Component for SetupComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let editing = matches!(self.step, SetupStep::ServerUrl | SetupStep::InitialText);
        match (self.step, key.code) {
            (SetupStep::Welcome, KeyCode::Esc) => return Ok(Some(Action::ForceQuit)),
            (SetupStep::Confirm, KeyCode::Enter | KeyCode::Char('y' | 'Y')) => {
                self.save_config();
                return Ok(self.complete.then_some(Action::SetupConfirm));
            }
            (SetupStep::Confirm, KeyCode::Char('n' | 'N') | KeyCode::Backspace) | (_, KeyCode::Esc) => {
                self.go_back()
            }
            (_, KeyCode::Enter) => self.advance_step(),
            (_, KeyCode::Backspace) if editing => {
                self.input.pop();
                self.error = None;
            }
            (_, KeyCode::Char(c)) if editing => {
                self.input.push(c);
                self.error = None;
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        frame.render_widget(Clear, area);

        let margin = 4;
        let content_area = Rect::new(
            area.x + margin,
            area.y + margin,
            area.width.saturating_sub(margin * 2),
            area.height.saturating_sub(margin * 2),
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(2), // Progress
                Constraint::Min(10),   // Content
                Constraint::Length(3), // Help
            ])
            .split(content_area);

        let title = Paragraph::new(Line::from(vec![Span::styled(
            " lingcorp-tui Setup ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, chunks[0]);

        let progress = format!(
            "Step {} of {}: {}",
            self.step.position() + 1,
            SetupStep::ORDER.len(),
            self.step.title()
        );
        frame.render_widget(
            Paragraph::new(Span::styled(progress, Style::default().fg(Color::DarkGray))),
            chunks[1],
        );

        self.draw_step_content(frame, chunks[2]);

        let help_text = match self.step {
            SetupStep::Welcome => " Enter  Continue   Esc  Quit",
            SetupStep::ServerUrl | SetupStep::InitialText => {
                " Enter  Continue   Esc  Back   Type to edit"
            }
            SetupStep::Confirm => " Enter/y  Save & Continue   Esc/n  Go Back",
        };
        let help = Paragraph::new(Span::styled(
            help_text,
            Style::default().fg(Color::DarkGray),
        ))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(help, chunks[3]);

        Ok(())
    }
}

impl SetupComponent {
    fn draw_step_content(&self, frame: &mut Frame, area: Rect) {
        match self.step {
            SetupStep::Welcome => self.draw_welcome(frame, area),
            SetupStep::ServerUrl => self.draw_prompt(
                frame,
                area,
                " Corpus Server ",
                &[
                    "Enter the address of the corpus server:",
                    "(the Flask app serving /textrecords, /search, ...)",
                ],
            ),
            SetupStep::InitialText => self.draw_prompt(
                frame,
                area,
                " Start Text ",
                &[
                    "Text to open on start-up (optional):",
                    "(leave empty to pick one from the list)",
                ],
            ),
            SetupStep::Confirm => self.draw_confirm(frame, area),
        }
    }

    fn error_lines(&self) -> Vec<Line<'static>> {
        match &self.error {
            Some(error) => vec![
                Line::from(""),
                Line::from(Span::styled(format!("Error: {error}"), Style::default().fg(Color::Red))),
            ],
            None => Vec::new(),
        }
    }

    fn draw_welcome(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Welcome to lingcorp-tui!",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Annotate corpus examples and run concordance searches"),
            Line::from("against a running corpus server."),
            Line::from(""),
            Line::from(Span::styled(
                format!("  Default server: {}", DEFAULT_SERVER_URL),
                Style::default().fg(Color::Cyan),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter to begin...",
                Style::default().fg(Color::Yellow),
            )),
        ];

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Welcome ")
                .border_style(Style::default().fg(Color::Green)),
        );
        frame.render_widget(paragraph, area);
    }

    fn draw_prompt(&self, frame: &mut Frame, area: Rect, title: &str, intro: &[&str]) {
        let mut lines = vec![Line::from("")];
        lines.extend(intro.iter().map(|l| Line::from(l.to_string())));
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Cyan)),
            Span::styled(
                format!("{}_", &self.input),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]));

        lines.extend(self.error_lines());

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title.to_string())
                .border_style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(paragraph, area);
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect) {
        let config_file = match &self.save_path {
            Some(path) => path.display().to_string(),
            None => Config::config_dir()
                .map(|p| format!("{}/config.json", p.display()))
                .unwrap_or_else(|| "~/.lingcorp-tui/config.json".to_string()),
        };

        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Review your configuration:",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Server:     ", Style::default().fg(Color::Cyan)),
                Span::raw(self.config.server_url.clone()),
            ]),
            Line::from(vec![
                Span::styled("Start text: ", Style::default().fg(Color::Cyan)),
                Span::raw(
                    self.config
                        .initial_text
                        .clone()
                        .unwrap_or_else(|| "(none)".to_string()),
                ),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Config will be saved to: ", Style::default().fg(Color::DarkGray)),
                Span::raw(config_file),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter or 'y' to save and continue...",
                Style::default().fg(Color::Yellow),
            )),
        ];

        lines.extend(self.error_lines());

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Confirm Configuration ")
                .border_style(Style::default().fg(Color::Green)),
        );
        frame.render_widget(paragraph, area);
    }
}
