use crate::app::Column;

/// All possible actions in the application (command pattern)
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleHelp,
    /// Close whatever overlay or input is focused
    GoBack,

    // Scrolling
    ScrollUp(usize),
    ScrollDown(usize),
    PageUp,
    PageDown,
    ScrollToTop,
    ScrollToBottom,
    CycleAutoScroll,

    // Filter bar
    OpenFilter,
    CloseFilter,
    FilterInput(char),
    FilterBackspace,
    FilterClear,
    FilterComplete,
    CommitFilter,
    ClearFilter,
    ToggleRegex,
    ToggleCaseSensitive,
    ClearHistory,

    // Display
    ToggleColumn(Column),
    ToggleStats,
    ClearEntries,

    // Style editor
    OpenStyleEditor,
    StyleEditorNextField,
    StyleEditorPrevField,
    StyleEditorInput(char),
    StyleEditorBackspace,
    StyleEditorToggleBold,
    StyleEditorCommit,
    StyleEditorClose,

    // Demo traffic
    Generate,
    GenerateMultiple,

    // Error handling
    ShowError(String),
    DismissError,

    Tick,
    Render,
}
