//! Root application component
//!
//! The App struct implements the Component trait, acting as the root component
//! that delegates event handling and rendering to child components.
//! It owns the request sequencer: every server request goes out through
//! `submit`, and every completion comes back through `handle_message`.

use crate::action::Action;
use crate::component::Component;
use crate::components::{
    calculate_main_layout, AnnotationComponent, ChoiceDialog, ConcordanceComponent, HelpDialog,
    QuitDialog, SetupComponent,
};
use crate::config::{Config, SERVER_ENV};
use crate::model::modal::{Modal, ModalStack};
use crate::model::sequence::{RequestKey, Sequencer};
use crate::model::ui::{AppMode, Page};
use crate::services::{Dispatch, HttpCorpusClient, JobMessage, JobRunner, Outcome, Request};
use anyhow::Result;
use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Tabs},
    Frame,
};
use std::env;
use std::sync::Arc;
use std::time::Duration;

// ═══════════════════════════════════════════════════════════════════════════════
// Status Line
// ═══════════════════════════════════════════════════════════════════════════════

/// Last message shown under the page
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
    pub at: DateTime<Local>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates between components
pub struct App {
    /// Current application mode
    pub mode: AppMode,

    /// Page shown in the main area
    pub page: Page,

    /// Modal overlay stack
    pub modals: ModalStack,

    /// Current config
    pub config: Option<Config>,

    /// Background job runner, absent until a server is configured
    pub jobs: Option<JobRunner>,

    /// Last-issued-wins bookkeeping for completions
    pub sequencer: Sequencer,

    pub status: Option<StatusLine>,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub annotation: AnnotationComponent,
    pub concordance: ConcordanceComponent,
    pub quit_dialog: QuitDialog,
    pub help_dialog: HelpDialog,
    pub choice_dialog: ChoiceDialog,
    pub setup: SetupComponent,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// App Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    /// Create a new App instance from the saved config, or run setup
    pub fn new() -> App {
        let Some(config) = Config::load() else {
            tracing::info!("no configuration found, starting setup");
            return Self::create_app(AppMode::Setup);
        };

        let mut app = Self::create_app(AppMode::Running);
        match Self::connect(&config) {
            Ok(runner) => app.jobs = Some(runner),
            Err(e) => app.set_error(format!("Cannot use server '{}': {}", config.server_url, e)),
        }
        app.apply_config(config);
        app
    }

    /// An app talking through `runner`, already past setup
    #[cfg(test)]
    pub fn with_runner(config: Config, runner: JobRunner) -> App {
        let mut app = Self::create_app(AppMode::Running);
        app.jobs = Some(runner);
        app.apply_config(config);
        app
    }

    fn create_app(mode: AppMode) -> App {
        App {
            mode,
            page: Page::default(),
            modals: ModalStack::new(),
            config: None,
            jobs: None,
            sequencer: Sequencer::new(),
            status: None,
            should_quit: false,
            annotation: AnnotationComponent::new(),
            concordance: ConcordanceComponent::new(),
            quit_dialog: QuitDialog::default(),
            help_dialog: HelpDialog::default(),
            choice_dialog: ChoiceDialog::new(),
            setup: SetupComponent::new(),
        }
    }

    fn connect(config: &Config) -> Result<JobRunner> {
        config.validate()?;
        let client = HttpCorpusClient::new(
            &config.server_url,
            Duration::from_secs(config.request_timeout_secs),
        )?;
        tracing::info!(server = %client.base_url(), "using corpus server");
        Ok(JobRunner::new(Arc::new(client), Dispatch::Background))
    }

    /// Leave the wizard. The environment wins over the saved server, as it
    /// does on every later start.
    fn finish_setup(&mut self, mut config: Config, server_override: Option<String>) {
        config.apply_env_override(server_override);
        match Self::connect(&config) {
            Ok(runner) => self.jobs = Some(runner),
            Err(e) => self.set_error(format!("Cannot use server '{}': {}", config.server_url, e)),
        }
        self.apply_config(config);
        self.mode = AppMode::Running;
        self.start();
    }

    fn apply_config(&mut self, config: Config) {
        if let Some(page) = config.start_page.as_deref().and_then(Page::from_name) {
            self.page = page;
        }
        self.config = Some(config);
    }

    /// Fetch the text and data file lists, and the start-up text if any
    fn start(&mut self) {
        if self.jobs.is_none() {
            return;
        }
        self.submit(Request::ListTexts);
        self.submit(Request::ListFiles);
        let initial = self.config.as_ref().and_then(|c| c.initial_text.clone());
        if let Some(text_id) = initial {
            self.load_text(text_id);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Requests
    // ─────────────────────────────────────────────────────────────────────────

    /// Send a request with a fresh ticket. Returns false when offline.
    fn submit(&mut self, request: Request) -> bool {
        if self.jobs.is_none() {
            self.set_error(format!("Cannot {}: no corpus server configured", request.name()));
            return false;
        }
        let key = request.key();
        if key == RequestKey::Text {
            // the example list is about to be replaced
            self.sequencer.invalidate_examples();
        }
        let ticket = self.sequencer.issue(key);
        if let Some(jobs) = &self.jobs {
            jobs.submit(ticket, request);
        }
        true
    }

    fn load_text(&mut self, text_id: String) {
        self.annotation.texts.select(&text_id);
        self.set_info(format!("Loading {}...", text_id));
        self.submit(Request::LoadText { text_id });
    }

    fn poll_jobs(&mut self) {
        let messages = match &self.jobs {
            Some(jobs) => jobs.poll(),
            None => return,
        };
        for message in messages {
            self.handle_message(message);
        }
    }

    /// Apply a completion if its ticket is still the latest for its target
    pub fn handle_message(&mut self, message: JobMessage) {
        if !self.sequencer.is_current(&message.ticket) {
            tracing::debug!(ticket = ?message.ticket, "dropping stale completion");
            return;
        }

        match message.outcome {
            Outcome::TextsListed(texts) => self.annotation.set_texts(texts),
            Outcome::TextCleared { text_id, total } => {
                self.annotation.begin_load(&text_id);
                self.set_info(format!("Loading {} examples of {}...", total, text_id));
            }
            Outcome::ExampleAppended(example) => self.annotation.append_example(example),
            Outcome::ExampleSkipped { example_id, error } => {
                tracing::debug!(%example_id, %error, "example skipped during load");
            }
            Outcome::TextLoaded {
                text_id,
                count,
                skipped,
            } => {
                self.annotation.finish_load();
                if skipped > 0 {
                    self.set_error(format!(
                        "Loaded {} examples of {}, {} could not be shown (see log)",
                        count, text_id, skipped
                    ));
                } else {
                    self.set_info(format!("Loaded {} examples of {}", count, text_id));
                }
            }
            Outcome::FieldSaved { target } => {
                tracing::debug!(%target, "field saved");
            }
            Outcome::ExampleRefreshed {
                example_id,
                example,
            }
            | Outcome::ChoicePicked {
                example_id,
                example,
            } => {
                if !self.annotation.replace_example(&example_id, example) {
                    tracing::debug!(%example_id, "example no longer on the page");
                }
            }
            Outcome::Exported => self.set_info("Export finished".to_string()),
            Outcome::FilesListed(files) => self.concordance.set_files(files),
            Outcome::SearchCompleted {
                query,
                filename,
                results,
            } => {
                let rows = results.row_count();
                self.concordance.set_results(results);
                self.set_info(format!("{} rows for \"{}\" in {}", rows, query, filename));
            }
            Outcome::Failed { request, error } => {
                match request {
                    "search" => self.concordance.searching = false,
                    "load text" => self.annotation.loading = false,
                    _ => {}
                }
                self.set_error(format!("{} failed: {}", request, error));
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Status
    // ─────────────────────────────────────────────────────────────────────────

    fn set_info(&mut self, text: String) {
        self.status = Some(StatusLine {
            text,
            is_error: false,
            at: Local::now(),
        });
    }

    fn set_error(&mut self, text: String) {
        tracing::warn!(error = %text, "shown to user");
        self.status = Some(StatusLine {
            text,
            is_error: true,
            at: Local::now(),
        });
    }

    fn active_page(&mut self) -> &mut dyn Component {
        match self.page {
            Page::Annotation => &mut self.annotation,
            Page::Concordance => &mut self.concordance,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Component Implementation
// ═══════════════════════════════════════════════════════════════════════════════

impl Component for App {
    fn init(&mut self) -> Result<()> {
        if self.mode == AppMode::Running {
            self.start();
        }
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match self.mode {
            AppMode::Setup => self.setup.handle_key_event(key),
            AppMode::Running => {
                if let Some(modal) = self.modals.top().cloned() {
                    return self.handle_modal_key_event(&modal, key);
                }

                let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
                match key.code {
                    KeyCode::F(1) => Ok(Some(Action::OpenHelp)),
                    KeyCode::F(2) => Ok(Some(Action::SwitchPage)),
                    KeyCode::Char('e') if ctrl => Ok(Some(Action::Export)),
                    KeyCode::Char('q') | KeyCode::Char('c') if ctrl => {
                        Ok(Some(Action::OpenQuitDialog))
                    }
                    _ => self.active_page().handle_key_event(key),
                }
            }
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => self.poll_jobs(),
            Action::ForceQuit => {
                self.should_quit = true;
            }
            Action::Resize(_, _) => {}

            // ─────────────────────────────────────────────────────────────────
            // Navigation & Scrolling (delegate to the active page)
            // ─────────────────────────────────────────────────────────────────
            Action::NextItem
            | Action::PrevItem
            | Action::FocusNext
            | Action::FocusPrev
            | Action::ScrollUp
            | Action::ScrollDown
            | Action::PageUp
            | Action::PageDown
            | Action::SortColumnNext
            | Action::SortColumnPrev
            | Action::ToggleSort => return self.active_page().update(action),
            Action::SwitchPage => {
                self.page = self.page.next();
            }

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => {
                self.quit_dialog.unsent = self.annotation.pending_edits();
                self.modals.push(Modal::QuitConfirm);
            }
            Action::OpenHelp => {
                if self.modals.toggle_help() {
                    self.help_dialog.scroll_offset = 0;
                }
            }
            Action::CloseModal => {
                self.modals.pop();
            }
            Action::ConfirmModal => {
                if let Some(modal) = self.modals.top().cloned() {
                    match modal {
                        Modal::QuitConfirm => {
                            self.should_quit = true;
                        }
                        Modal::Choices { .. } => {
                            let pick = self.choice_dialog.pick_action();
                            self.modals.pop();
                            return Ok(pick);
                        }
                        Modal::Help => {}
                    }
                }
            }
            Action::ModalUp | Action::ModalDown => {
                self.modals.sync_choice(self.choice_dialog.selected_index);
            }

            // ─────────────────────────────────────────────────────────────────
            // Annotation
            // ─────────────────────────────────────────────────────────────────
            Action::LoadText(text_id) => self.load_text(text_id),
            Action::ChangeField { target, value } => {
                self.submit(Request::UpdateField { target, value });
            }
            Action::CommitField {
                target,
                value,
                example_id,
            } => {
                self.submit(Request::CommitField {
                    target,
                    value,
                    example_id,
                });
            }
            Action::OpenChoices {
                example_id,
                control,
            } => {
                self.choice_dialog.open(&example_id, control);
                self.modals.push(Modal::Choices {
                    example_id,
                    selected_index: 0,
                });
            }
            Action::PickChoice {
                target,
                choice,
                example_id,
            } => {
                self.submit(Request::PickChoice {
                    target,
                    choice,
                    example_id,
                });
            }
            Action::Export => {
                if self.submit(Request::Export) {
                    self.set_info("Exporting...".to_string());
                }
            }

            // ─────────────────────────────────────────────────────────────────
            // Concordance
            // ─────────────────────────────────────────────────────────────────
            Action::RunQuery { query, filename } => match filename {
                Some(filename) => {
                    if self.submit(Request::Search { query, filename }) {
                        self.concordance.searching = true;
                    }
                }
                None => self.set_error("Select a data file before searching".to_string()),
            },

            // ─────────────────────────────────────────────────────────────────
            // Setup Wizard
            // ─────────────────────────────────────────────────────────────────
            Action::SetupConfirm => {
                if let Some(config) = self.setup.get_config().cloned() {
                    self.finish_setup(config, env::var(SERVER_ENV).ok());
                }
            }
        }

        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        match self.mode {
            AppMode::Setup => self.setup.draw(frame, area)?,
            AppMode::Running => {
                let layout = calculate_main_layout(area);

                self.render_tabs(frame, layout.tabs);
                self.active_page().draw(frame, layout.content)?;
                self.render_status_bar(frame, layout.status);
                self.render_help_bar(frame, layout.help);

                if let Some(modal) = self.modals.top().cloned() {
                    self.draw_modal(frame, area, &modal)?;
                }
            }
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helper Methods
// ═══════════════════════════════════════════════════════════════════════════════

impl App {
    fn handle_modal_key_event(&mut self, modal: &Modal, key: KeyEvent) -> Result<Option<Action>> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.handle_key_event(key),
            Modal::Help => self.help_dialog.handle_key_event(key),
            Modal::Choices { .. } => self.choice_dialog.handle_key_event(key),
        }
    }

    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: &Modal) -> Result<()> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.draw(frame, area),
            Modal::Help => self.help_dialog.draw(frame, area),
            Modal::Choices { .. } => self.choice_dialog.draw(frame, area),
        }
    }

    fn render_tabs(&self, frame: &mut Frame, area: Rect) {
        let pages = [Page::Annotation, Page::Concordance];
        let titles: Vec<&str> = pages.iter().map(|p| p.name()).collect();
        let selected = pages.iter().position(|p| *p == self.page).unwrap_or(0);

        let tabs = Tabs::new(titles)
            .block(Block::default().borders(Borders::BOTTOM))
            .select(selected)
            .style(Style::default().fg(Color::DarkGray))
            .highlight_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![];

        if let Some(config) = &self.config {
            spans.push(Span::styled(
                format!(" {} ", config.server_url),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw(" "));
        }

        if let Some(text) = &self.annotation.loaded_text {
            spans.push(Span::styled(
                format!(" {} ", text),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Magenta)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::raw(" "));
        }

        if let Some(status) = &self.status {
            spans.push(Span::styled(
                format!("{} ", status.at.format("%H:%M:%S")),
                Style::default().fg(Color::DarkGray),
            ));
            let style = if status.is_error {
                Style::default().fg(Color::Red)
            } else {
                Style::default().fg(Color::Yellow)
            };
            spans.push(Span::styled(status.text.clone(), style));
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_help_bar(&self, frame: &mut Frame, area: Rect) {
        let key = |k: &'static str, color: Color| {
            Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
        };
        let mut spans = match self.page {
            Page::Annotation => vec![
                key(" Enter ", Color::Green),
                Span::raw("Load / Save "),
                key(" Tab ", Color::Cyan),
                Span::raw("Next field "),
                key(" Esc ", Color::Yellow),
                Span::raw("Texts "),
                key(" ^E ", Color::Magenta),
                Span::raw("Export "),
            ],
            Page::Concordance => vec![
                key(" Tab ", Color::Cyan),
                Span::raw("Files/Query/Results "),
                key(" Enter ", Color::Green),
                Span::raw("Search "),
                key(" [ ] ", Color::Cyan),
                Span::raw("Column "),
                key(" s ", Color::Cyan),
                Span::raw("Sort "),
            ],
        };
        spans.extend([
            key(" F1 ", Color::White),
            Span::raw("Help "),
            key(" F2 ", Color::White),
            Span::raw("Page "),
            key(" ^Q ", Color::Yellow),
            Span::raw("Quit"),
        ]);

        let paragraph = Paragraph::new(Line::from(spans))
            .block(Block::default().borders(Borders::TOP))
            .alignment(ratatui::layout::Alignment::Left);
        frame.render_widget(paragraph, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::results::ResultsView;
    use crate::model::sequence::Ticket;
    use crate::services::fake::{record, Call, FakeClient};

    fn start(fake: FakeClient, config: Config) -> (App, Arc<FakeClient>) {
        let fake = Arc::new(fake);
        let runner = JobRunner::new(fake.clone(), Dispatch::Inline);
        let mut app = App::with_runner(config, runner);
        app.init().unwrap();
        app.update(Action::Tick).unwrap();
        fake.clear_calls();
        (app, fake)
    }

    fn dispatch(app: &mut App, action: Action) {
        let mut current = Some(action);
        while let Some(a) = current {
            current = app.update(a).unwrap();
        }
        app.update(Action::Tick).unwrap();
    }

    fn press_key(app: &mut App, key: KeyEvent) {
        match app.handle_key_event(key).unwrap() {
            Some(action) => dispatch(app, action),
            None => {
                app.update(Action::Tick).unwrap();
            }
        }
    }

    fn press(app: &mut App, code: KeyCode) {
        press_key(app, KeyEvent::from(code));
    }

    fn loaded(fake: FakeClient) -> (App, Arc<FakeClient>) {
        let (mut app, fake) = start(fake, Config::default());
        dispatch(&mut app, Action::LoadText("t1".into()));
        fake.clear_calls();
        (app, fake)
    }

    fn example_ids(app: &App) -> Vec<String> {
        app.annotation.examples.iter().map(|e| e.id.clone()).collect()
    }

    fn gloss(app: &App, example_id: &str) -> String {
        let idx = app.annotation.examples.position(example_id).unwrap();
        let ex = app.annotation.examples.get(idx).unwrap();
        ex.input(&format!("{example_id}_gls_0")).unwrap().value.clone()
    }

    fn search_table() -> String {
        "<table border=\"1\" class=\"dataframe\"><thead><tr style=\"text-align: right;\">\
         <th>left</th><th>word</th></tr></thead><tbody>\
         <tr><td>a</td><td>ni</td></tr><tr><td>b</td><td>ni</td></tr></tbody></table>"
            .to_string()
    }

    #[test]
    fn test_start_lists_texts_and_files() {
        let mut fake = FakeClient::with_text(&["e1"]);
        fake.files = vec!["a.csv".into(), "b.csv".into()];
        let fake = Arc::new(fake);
        let mut app = App::with_runner(Config::default(), JobRunner::new(fake.clone(), Dispatch::Inline));
        app.init().unwrap();
        app.update(Action::Tick).unwrap();

        assert_eq!(fake.calls(), vec![Call::Texts, Call::DataFiles]);
        assert_eq!(app.annotation.texts.items(), ["t1".to_string()]);
        assert_eq!(app.concordance.files.active_item(), Some("a.csv"));
    }

    #[test]
    fn test_initial_text_loads_on_start() {
        let config = Config {
            initial_text: Some("t1".into()),
            start_page: Some("concordance".into()),
            ..Config::default()
        };
        let (app, _) = start(FakeClient::with_text(&["e1", "e2"]), config);
        assert_eq!(example_ids(&app), vec!["e1", "e2"]);
        assert_eq!(app.page, Page::Concordance);
        assert_eq!(app.annotation.texts.active_item(), Some("t1"));
    }

    #[test]
    fn test_load_text_appends_examples_in_order_and_fits() {
        let (app, _) = loaded(FakeClient::with_text(&["e1", "e2", "e3"]));
        assert_eq!(example_ids(&app), vec!["e1", "e2", "e3"]);
        assert!(!app.annotation.loading);

        let first = app.annotation.examples.get(0).unwrap();
        assert_eq!(first.input("e1_gls_0").unwrap().width, Some(4));
        // empty with a placeholder keeps the default width
        assert_eq!(first.input("e1_oft").unwrap().width, None);
    }

    #[test]
    fn test_reloading_replaces_the_list() {
        let (mut app, _) = loaded(FakeClient::with_text(&["e1", "e2"]));
        dispatch(&mut app, Action::LoadText("t1".into()));
        assert_eq!(example_ids(&app), vec!["e1", "e2"]);
    }

    #[test]
    fn test_unrenderable_example_is_skipped() {
        let fake = FakeClient::with_text(&["e1", "e2", "e3"]);
        fake.set_example("e2", "None".to_string());
        let (app, _) = loaded(fake);

        assert_eq!(example_ids(&app), vec!["e1", "e3"]);
        assert!(!app.annotation.loading);
        let status = app.status.clone().unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("1 could not be shown"));
    }

    #[test]
    fn test_blur_sends_one_update_and_keeps_example() {
        let (mut app, fake) = loaded(FakeClient::with_text(&["e1", "e2"]));
        fake.set_example("e1", record("e1", "ni", "SERVER"));

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::Tab);

        assert_eq!(
            fake.calls(),
            vec![Call::Update {
                target: "e1_gls_0".into(),
                value: "1SGx".into(),
            }]
        );
        assert_eq!(gloss(&app, "e1"), "1SGx");
    }

    #[test]
    fn test_enter_updates_then_rerenders_example() {
        let (mut app, fake) = loaded(FakeClient::with_text(&["e1", "e2"]));
        fake.set_example("e1", record("e1", "ni", "dog.PL"));

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);

        assert_eq!(
            fake.calls(),
            vec![
                Call::Update {
                    target: "e1_gls_0".into(),
                    value: "1S".into(),
                },
                Call::Example("e1".into()),
            ]
        );
        assert_eq!(example_ids(&app), vec!["e1", "e2"]);
        assert_eq!(gloss(&app, "e1"), "dog.PL");
        let refreshed = app.annotation.examples.get(0).unwrap();
        assert_eq!(refreshed.input("e1_gls_0").unwrap().width, Some(7));

        // Enter already saved; leaving the field sends nothing more
        press(&mut app, KeyCode::Tab);
        assert_eq!(fake.calls().len(), 2);
    }

    #[test]
    fn test_pick_replaces_only_enclosing_example() {
        let mut fake = FakeClient::with_text(&["e1", "e2", "e3"]);
        fake.picks
            .insert("e2_ana_0_0".into(), record("e2", "ni", "PICKED"));
        let (mut app, fake) = loaded(fake);

        press(&mut app, KeyCode::Tab);
        for _ in 0..4 {
            press(&mut app, KeyCode::Tab);
        }
        assert_eq!(app.annotation.cursor, Some((1, 1)));

        press(&mut app, KeyCode::Enter);
        assert!(matches!(app.modals.top(), Some(Modal::Choices { .. })));
        press(&mut app, KeyCode::Enter);

        assert!(app.modals.is_empty());
        assert_eq!(
            fake.calls(),
            vec![Call::Pick {
                target: "e2_ana_0_0".into(),
                choice: "1SG".into(),
            }]
        );
        assert_eq!(example_ids(&app), vec!["e1", "e2", "e3"]);
        assert_eq!(gloss(&app, "e1"), "1SG");
        assert_eq!(gloss(&app, "e2"), "PICKED");
        assert_eq!(gloss(&app, "e3"), "1SG");
    }

    #[test]
    fn test_choice_dialog_navigation_syncs_modal() {
        let (mut app, fake) = loaded(FakeClient::with_text(&["e1"]));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Down);

        assert!(matches!(
            app.modals.top(),
            Some(Modal::Choices { selected_index: 1, .. })
        ));
        press(&mut app, KeyCode::Esc);
        assert!(app.modals.is_empty());
        assert!(fake.calls().is_empty());
    }

    #[test]
    fn test_malformed_replacement_is_reported() {
        let mut fake = FakeClient::with_text(&["e1"]);
        fake.picks
            .insert("e1_ana_0_0".into(), "<li id=\"e1\">bare</li>".into());
        let (mut app, _) = loaded(fake);

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('1'));

        let status = app.status.clone().unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("pick failed"));
        assert_eq!(gloss(&app, "e1"), "1SG");
    }

    #[test]
    fn test_search_sends_encoded_query_once() {
        let mut fake = FakeClient::new();
        fake.files = vec!["a.csv".into(), "b.csv".into()];
        fake.search_body = search_table();
        let (mut app, fake) = start(fake, Config::default());

        press(&mut app, KeyCode::F(2));
        assert_eq!(app.page, Page::Concordance);
        for c in "say \"ni\"".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        press(&mut app, KeyCode::Enter);

        assert_eq!(
            fake.calls(),
            vec![Call::Search {
                query: "\"say \\\"ni\\\"\"".into(),
                filename: "\"a.csv\"".into(),
            }]
        );
        assert!(!app.concordance.searching);
        match &app.concordance.results.view {
            ResultsView::Table(table) => {
                assert_eq!(table.headers, vec!["left", "word"]);
                assert_eq!(table.rows.len(), 2);
            }
            other => panic!("expected a table, got {:?}", other),
        }
    }

    #[test]
    fn test_button_searches_with_selected_file() {
        let mut fake = FakeClient::new();
        fake.files = vec!["a.csv".into(), "b.csv".into()];
        let (mut app, fake) = start(fake, Config::default());
        press(&mut app, KeyCode::F(2));

        // Files: move to b.csv and activate it
        press(&mut app, KeyCode::BackTab);
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.concordance.files.active_item(), Some("b.csv"));

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('n'));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Enter);

        assert_eq!(
            fake.calls(),
            vec![Call::Search {
                query: "\"n\"".into(),
                filename: "\"b.csv\"".into(),
            }]
        );
    }

    #[test]
    fn test_search_without_file_is_refused() {
        let (mut app, fake) = start(FakeClient::new(), Config::default());
        press(&mut app, KeyCode::F(2));
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Enter);

        assert!(fake.calls().is_empty());
        assert!(app.status.as_ref().is_some_and(|s| s.is_error));
    }

    #[test]
    fn test_last_issued_search_wins() {
        let (mut app, _) = start(FakeClient::new(), Config::default());
        let older = app.sequencer.issue(RequestKey::Search);
        let newer = app.sequencer.issue(RequestKey::Search);

        let completed = |ticket: Ticket, query: &str| JobMessage {
            ticket,
            outcome: Outcome::SearchCompleted {
                query: query.into(),
                filename: "a.csv".into(),
                results: ResultsView::Text(query.into()),
            },
        };
        app.handle_message(completed(newer, "new"));
        app.handle_message(completed(older, "old"));

        assert_eq!(app.concordance.results.view, ResultsView::Text("new".into()));
    }

    #[test]
    fn test_refresh_after_reload_is_dropped() {
        let (mut app, _) = loaded(FakeClient::with_text(&["e1"]));
        let ticket = app.sequencer.issue(RequestKey::Example("e1".into()));
        dispatch(&mut app, Action::LoadText("t1".into()));

        let stale = crate::model::fragment::Fragment::parse(&record("e1", "ni", "STALE"))
            .replacement()
            .unwrap();
        app.handle_message(JobMessage {
            ticket,
            outcome: Outcome::ExampleRefreshed {
                example_id: "e1".into(),
                example: stale,
            },
        });
        assert_eq!(gloss(&app, "e1"), "1SG");
    }

    #[test]
    fn test_export_and_failures_reach_status() {
        let mut fake = FakeClient::new();
        fake.failing.insert("export");
        let (mut app, fake) = start(fake, Config::default());

        press_key(&mut app, KeyEvent::new(KeyCode::Char('e'), KeyModifiers::CONTROL));
        assert_eq!(fake.calls(), vec![Call::Export]);
        let status = app.status.clone().unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("export failed"));
    }

    #[test]
    fn test_quit_dialog_counts_unsent_edits() {
        let (mut app, _) = loaded(FakeClient::with_text(&["e1"]));
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('x'));

        press_key(&mut app, KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL));
        assert_eq!(app.modals.top(), Some(&Modal::QuitConfirm));
        assert_eq!(app.quit_dialog.unsent, vec!["e1_gls_0".to_string()]);

        press(&mut app, KeyCode::Char('y'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_setup_honours_server_override() {
        let mut app = App::create_app(AppMode::Setup);
        let saved = Config {
            server_url: "not a url".to_string(),
            ..Config::default()
        };

        app.finish_setup(saved, Some("http://127.0.0.1:9/".to_string()));

        assert_eq!(app.mode, AppMode::Running);
        assert_eq!(
            app.config.as_ref().map(|c| c.server_url.as_str()),
            Some("http://127.0.0.1:9/")
        );
        assert!(app.jobs.is_some());
    }

    #[test]
    fn test_help_toggles_with_f1() {
        let (mut app, _) = start(FakeClient::new(), Config::default());
        press(&mut app, KeyCode::F(1));
        assert!(matches!(app.modals.top(), Some(Modal::Help)));
        press(&mut app, KeyCode::F(1));
        assert!(app.modals.is_empty());
    }

    #[test]
    fn test_offline_requests_are_refused() {
        let mut app = App::create_app(AppMode::Running);
        app.update(Action::LoadText("t1".into())).unwrap();
        let status = app.status.clone().unwrap();
        assert!(status.is_error);
        assert!(status.text.contains("load text"));
    }
}
