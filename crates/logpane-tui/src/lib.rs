//! Terminal UI for logpane
//!
//! This crate provides the terminal front end of the log view: state
//! management, keybindings, event handling, and the widgets that render
//! a `logpane_core::LogView`.

pub mod app;
pub mod config;
pub mod tui;
pub mod ui;

pub use app::{Action, AppState, Column, ColumnVisibility, ScrollState, UiState};
pub use config::{KeyBinding, KeyBindings, KeyContext};
pub use tui::{Event, EventHandler, Tui};
pub use ui::components::{
    FilterBar, FilterBarState, HelpOverlay, StatusBar, StyleEditor, StyleEditorState, StyleField,
    log_viewer_hints,
};
pub use ui::screens::LogViewerScreen;
pub use ui::{Layout, Theme};
