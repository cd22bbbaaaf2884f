//! lingcorp-tui - A terminal client for a linguistic corpus server
//!
//! Annotate the examples of a text and run concordance searches against the
//! server's data files. It uses the Component Architecture pattern from ratatui.

mod action;
mod app;
mod component;
mod components;
mod config;
mod error;
mod logging;
mod model;
mod services;
mod tui;

use crate::action::Action;
use crate::app::App;
use crate::component::Component;
use crate::tui::Tui;
use anyhow::Result;
use crossterm::event::Event;
use std::time::Duration;

const TICK_RATE: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let log_path = logging::init()?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), log = %log_path.display(), "starting");

    Tui::install_panic_hook();
    let mut tui = Tui::new()?.with_tick_rate(TICK_RATE);
    tui.enter()?;

    let mut app = App::new();
    let result = app.init().and_then(|()| run_app(&mut tui, &mut app));
    tui.exit()?;

    match result {
        Ok(()) => {
            tracing::info!("bye");
            Ok(())
        }
        Err(err) => {
            tracing::error!(error = ?err, "exiting after error");
            eprintln!("Error: {:?}", err);
            std::process::exit(1);
        }
    }
}

/// Draw, wait one tick for input, apply what came in
fn run_app(tui: &mut Tui, app: &mut App) -> Result<()> {
    while !app.should_quit {
        tui.draw(|frame| {
            if let Err(e) = app.draw(frame, frame.area()) {
                tracing::error!(error = %e, "draw failed");
            }
        })?;

        let action = match tui.next_event()? {
            Some(Event::Key(key)) => app.handle_key_event(key)?,
            Some(Event::Resize(w, h)) => Some(Action::Resize(w, h)),
            Some(_) => None,
            // idle: apply finished server requests
            None => Some(Action::Tick),
        };
        dispatch(app, action)?;
    }

    Ok(())
}

/// Feed an action and each follow-up it produces back into the app
fn dispatch(app: &mut App, mut action: Option<Action>) -> Result<()> {
    while let Some(a) = action {
        if !matches!(a, Action::Tick) {
            tracing::trace!(action = %a, "update");
        }
        action = app.update(a)?;
    }
    Ok(())
}
