use logpane_core::Viewport;

use crate::ui::components::{FilterBarState, StyleEditorState};

/// Table columns, in display order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Column {
    Level,
    Logger,
    Time,
    Elapsed,
    Message,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Self::Level,
        Self::Logger,
        Self::Time,
        Self::Elapsed,
        Self::Message,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Level => "Level",
            Self::Logger => "Logger",
            Self::Time => "Time",
            Self::Elapsed => "Elapsed",
            Self::Message => "Message",
        }
    }

    fn slot(&self) -> usize {
        match self {
            Self::Level => 0,
            Self::Logger => 1,
            Self::Time => 2,
            Self::Elapsed => 3,
            Self::Message => 4,
        }
    }
}

/// Which table columns are shown
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ColumnVisibility {
    shown: [bool; 5],
}

impl Default for ColumnVisibility {
    fn default() -> Self {
        Self { shown: [true; 5] }
    }
}

impl ColumnVisibility {
    pub fn is_visible(&self, column: Column) -> bool {
        self.shown[column.slot()]
    }

    /// Flip a column. The last visible column cannot be hidden.
    pub fn toggle(&mut self, column: Column) -> bool {
        let slot = column.slot();
        if self.shown[slot] && self.visible().count() == 1 {
            return false;
        }
        self.shown[slot] = !self.shown[slot];
        true
    }

    /// Visible columns in display order
    pub fn visible(&self) -> impl Iterator<Item = Column> + '_ {
        Column::ALL.into_iter().filter(|c| self.is_visible(*c))
    }
}

/// Scroll position of the log table, in visible-row space
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollState {
    /// First visible-row index on screen
    pub offset: usize,

    /// Rows that fit on screen, updated on every render
    pub height: usize,
}

impl ScrollState {
    pub fn max_offset(&self, total: usize) -> usize {
        total.saturating_sub(self.height)
    }

    pub fn clamp(&mut self, total: usize) {
        self.offset = self.offset.min(self.max_offset(total));
    }

    pub fn scroll_up(&mut self, rows: usize) {
        self.offset = self.offset.saturating_sub(rows);
    }

    pub fn scroll_down(&mut self, rows: usize, total: usize) {
        self.offset = self.offset.saturating_add(rows).min(self.max_offset(total));
    }

    pub fn page(&self) -> usize {
        self.height.max(1)
    }

    pub fn to_top(&mut self) {
        self.offset = 0;
    }

    pub fn to_bottom(&mut self, total: usize) {
        self.offset = self.max_offset(total);
    }
}

impl Viewport for ScrollState {
    fn is_at_bottom(&self, visible_rows: usize) -> bool {
        self.offset + self.height >= visible_rows
    }
}

/// UI-specific transient state
#[derive(Default)]
pub struct UiState {
    /// Is help overlay visible?
    pub help_visible: bool,

    /// Show level statistics bar?
    pub stats_visible: bool,

    /// Error or info message to display (if any)
    pub error_message: Option<String>,

    /// Log table scroll position
    pub scroll: ScrollState,

    /// Shown table columns
    pub columns: ColumnVisibility,

    /// Filter bar inputs; also the toolbar the view syncs with
    pub filter_bar: FilterBarState,

    /// Open style editor popup, if any
    pub style_editor: Option<StyleEditorState>,
}

/// Top-level application state
#[derive(Default)]
pub struct AppState {
    pub ui_state: UiState,
    pub should_quit: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.ui_state.error_message = Some(message.into());
    }

    pub fn dismiss_error(&mut self) {
        self.ui_state.error_message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_clamps_to_content() {
        let mut scroll = ScrollState {
            offset: 0,
            height: 10,
        };
        scroll.scroll_down(100, 25);
        assert_eq!(scroll.offset, 15);

        scroll.scroll_up(20);
        assert_eq!(scroll.offset, 0);

        scroll.to_bottom(5);
        assert_eq!(scroll.offset, 0);
    }

    #[test]
    fn test_viewport_at_bottom() {
        let mut scroll = ScrollState {
            offset: 0,
            height: 10,
        };
        assert!(scroll.is_at_bottom(8));
        assert!(!scroll.is_at_bottom(11));

        scroll.to_bottom(30);
        assert!(scroll.is_at_bottom(30));
        assert!(!scroll.is_at_bottom(31));
    }

    #[test]
    fn test_last_column_stays_visible() {
        let mut columns = ColumnVisibility::default();
        for column in [Column::Level, Column::Logger, Column::Time, Column::Elapsed] {
            assert!(columns.toggle(column));
        }
        assert!(!columns.toggle(Column::Message));
        assert_eq!(columns.visible().collect::<Vec<_>>(), [Column::Message]);

        assert!(columns.toggle(Column::Time));
        assert!(columns.is_visible(Column::Time));
    }
}
