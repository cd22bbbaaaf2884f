//! Model layer - centralized state management
//!
//! This module contains all state-related types:
//! - `ExampleList` - The page model of the loaded text
//! - `Fragment` - Server HTML fragments and their contract
//! - `Selection` - Single-active lists (texts, data files)
//! - `Sequencer` - Last-issued-wins request tickets
//! - `ModalStack` - Modal overlay management

pub mod example;
pub mod fragment;
pub mod modal;
pub mod results;
pub mod selection;
pub mod sequence;
pub mod ui;

