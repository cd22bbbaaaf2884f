//! UI Components
//!
//! Each component encapsulates its own state, event handling, and rendering logic.
//! Components communicate through Actions rather than direct state mutation.

pub mod annotation;
pub mod choice_dialog;
pub mod concordance;
pub mod help_dialog;
pub mod layout;
pub mod quit_dialog;
pub mod results_table;
pub mod setup;

pub use annotation::AnnotationComponent;
pub use choice_dialog::ChoiceDialog;
pub use concordance::ConcordanceComponent;
pub use help_dialog::HelpDialog;
pub use layout::{calculate_main_layout, centered_popup, fit_cell, split_sidebar};
pub use quit_dialog::QuitDialog;
pub use results_table::ResultsTableComponent;
pub use setup::SetupComponent;
