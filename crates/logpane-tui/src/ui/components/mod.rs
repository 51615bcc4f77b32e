mod filter_bar;
mod help_overlay;
mod status_bar;
mod style_editor;

pub use filter_bar::{FilterBar, FilterBarState};
pub use help_overlay::HelpOverlay;
pub use status_bar::{StatusBar, log_viewer_hints};
pub use style_editor::{StyleEditor, StyleEditorState, StyleField};
