//! Action enum - All possible application actions
//!
//! Actions are discrete operations that the application can perform.
//! Components emit Actions in response to events, and the App processes
//! them to update state.

use crate::model::example::ChoiceControl;
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick, drains finished background requests
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Force quit without confirmation
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────────────────
    /// Move to next item in the focused list
    NextItem,
    /// Move to previous item in the focused list
    PrevItem,
    /// Move focus to the next pane
    FocusNext,
    /// Move focus to the previous pane
    FocusPrev,
    /// Toggle between the annotation and concordance pages
    SwitchPage,

    // ─────────────────────────────────────────────────────────────────────────
    // Scrolling
    // ─────────────────────────────────────────────────────────────────────────
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    /// Open quit confirmation dialog
    OpenQuitDialog,
    /// Open help dialog showing all keyboard shortcuts
    OpenHelp,
    /// Close the current modal
    CloseModal,
    /// Confirm the current modal action
    ConfirmModal,
    /// Navigate up in modal (e.g., previous option)
    ModalUp,
    /// Navigate down in modal (e.g., next option)
    ModalDown,

    // ─────────────────────────────────────────────────────────────────────────
    // Annotation
    // ─────────────────────────────────────────────────────────────────────────
    /// Load the examples of a text
    LoadText(String),
    /// A field lost focus with a modified value
    ChangeField { target: String, value: String },
    /// Enter was pressed in a field
    CommitField {
        target: String,
        value: String,
        example_id: String,
    },
    /// Open the dropdown of a choice control
    OpenChoices {
        example_id: String,
        control: ChoiceControl,
    },
    /// A dropdown option was chosen
    PickChoice {
        target: String,
        choice: String,
        example_id: String,
    },
    /// Trigger a server-side export
    Export,

    // ─────────────────────────────────────────────────────────────────────────
    // Concordance
    // ─────────────────────────────────────────────────────────────────────────
    /// Run a search with the query text and the selected data file
    RunQuery {
        query: String,
        filename: Option<String>,
    },
    /// Move the results sort column right
    SortColumnNext,
    /// Move the results sort column left
    SortColumnPrev,
    /// Sort results by the chosen column, flipping the order on repeat
    ToggleSort,

    // ─────────────────────────────────────────────────────────────────────────
    // Setup Wizard
    // ─────────────────────────────────────────────────────────────────────────
    /// Confirm setup configuration
    SetupConfirm,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::NextItem => write!(f, "NextItem"),
            Action::PrevItem => write!(f, "PrevItem"),
            Action::FocusNext => write!(f, "FocusNext"),
            Action::FocusPrev => write!(f, "FocusPrev"),
            Action::SwitchPage => write!(f, "SwitchPage"),
            Action::ScrollUp => write!(f, "ScrollUp"),
            Action::ScrollDown => write!(f, "ScrollDown"),
            Action::PageUp => write!(f, "PageUp"),
            Action::PageDown => write!(f, "PageDown"),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::CloseModal => write!(f, "CloseModal"),
            Action::ConfirmModal => write!(f, "ConfirmModal"),
            Action::ModalUp => write!(f, "ModalUp"),
            Action::ModalDown => write!(f, "ModalDown"),
            Action::LoadText(id) => write!(f, "LoadText({})", id),
            Action::ChangeField { target, .. } => write!(f, "ChangeField({})", target),
            Action::CommitField { target, .. } => write!(f, "CommitField({})", target),
            Action::OpenChoices { example_id, .. } => write!(f, "OpenChoices({})", example_id),
            Action::PickChoice { target, .. } => write!(f, "PickChoice({})", target),
            Action::Export => write!(f, "Export"),
            Action::RunQuery { filename, .. } => {
                write!(f, "RunQuery({})", filename.as_deref().unwrap_or("-"))
            }
            Action::SortColumnNext => write!(f, "SortColumnNext"),
            Action::SortColumnPrev => write!(f, "SortColumnPrev"),
            Action::ToggleSort => write!(f, "ToggleSort"),
            Action::SetupConfirm => write!(f, "SetupConfirm"),
        }
    }
}
