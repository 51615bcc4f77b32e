use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

use crate::app::{Action, Column};

/// A key combination
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn ctrl(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::CONTROL,
        }
    }

    pub fn shift(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::SHIFT,
        }
    }

    pub fn from_event(event: &KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// Context for keybindings
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum KeyContext {
    Global,
    LogViewer,
    FilterInput,
    StyleEditor,
}

/// Keybinding configuration
pub struct KeyBindings {
    bindings: HashMap<KeyContext, HashMap<KeyBinding, Action>>,
}

impl KeyBindings {
    pub fn new() -> Self {
        let mut bindings = HashMap::new();

        // Global bindings
        let mut global = HashMap::new();
        global.insert(KeyBinding::new(KeyCode::Char('?')), Action::ToggleHelp);
        global.insert(KeyBinding::new(KeyCode::Esc), Action::GoBack);
        global.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::Quit);
        global.insert(KeyBinding::new(KeyCode::Char('q')), Action::Quit);
        bindings.insert(KeyContext::Global, global);

        // Log viewer bindings - less-like navigation
        let mut log_viewer = HashMap::new();
        log_viewer.insert(KeyBinding::new(KeyCode::Char('j')), Action::ScrollDown(1));
        log_viewer.insert(KeyBinding::new(KeyCode::Down), Action::ScrollDown(1));
        log_viewer.insert(KeyBinding::new(KeyCode::Char('k')), Action::ScrollUp(1));
        log_viewer.insert(KeyBinding::new(KeyCode::Up), Action::ScrollUp(1));
        log_viewer.insert(KeyBinding::ctrl(KeyCode::Char('f')), Action::PageDown);
        log_viewer.insert(KeyBinding::ctrl(KeyCode::Char('b')), Action::PageUp);
        log_viewer.insert(KeyBinding::ctrl(KeyCode::Char('d')), Action::PageDown);
        log_viewer.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::PageUp);
        log_viewer.insert(KeyBinding::new(KeyCode::PageDown), Action::PageDown);
        log_viewer.insert(KeyBinding::new(KeyCode::PageUp), Action::PageUp);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('g')), Action::ScrollToTop);
        log_viewer.insert(KeyBinding::shift(KeyCode::Char('G')), Action::ScrollToBottom);
        log_viewer.insert(KeyBinding::new(KeyCode::Home), Action::ScrollToTop);
        log_viewer.insert(KeyBinding::new(KeyCode::End), Action::ScrollToBottom);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('a')), Action::CycleAutoScroll);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('/')), Action::OpenFilter);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('n')), Action::ClearFilter);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('r')), Action::ToggleRegex);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('i')), Action::ToggleCaseSensitive);
        log_viewer.insert(KeyBinding::shift(KeyCode::Char('H')), Action::ClearHistory);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('c')), Action::ClearEntries);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('s')), Action::ToggleStats);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('e')), Action::OpenStyleEditor);
        log_viewer.insert(KeyBinding::new(KeyCode::Char('m')), Action::Generate);
        log_viewer.insert(KeyBinding::shift(KeyCode::Char('M')), Action::GenerateMultiple);
        for (key, column) in ('1'..='5').zip(Column::ALL) {
            log_viewer.insert(
                KeyBinding::new(KeyCode::Char(key)),
                Action::ToggleColumn(column),
            );
        }
        bindings.insert(KeyContext::LogViewer, log_viewer);

        // Filter input bindings (when filter bar is focused)
        let mut filter_input = HashMap::new();
        filter_input.insert(KeyBinding::new(KeyCode::Enter), Action::CommitFilter);
        filter_input.insert(KeyBinding::new(KeyCode::Esc), Action::CloseFilter);
        filter_input.insert(KeyBinding::new(KeyCode::Backspace), Action::FilterBackspace);
        filter_input.insert(KeyBinding::new(KeyCode::Tab), Action::FilterComplete);
        filter_input.insert(KeyBinding::ctrl(KeyCode::Char('u')), Action::FilterClear);
        filter_input.insert(KeyBinding::ctrl(KeyCode::Char('r')), Action::ToggleRegex);
        filter_input.insert(KeyBinding::ctrl(KeyCode::Char('a')), Action::ToggleCaseSensitive);
        filter_input.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::CloseFilter);
        bindings.insert(KeyContext::FilterInput, filter_input);

        // Style editor bindings
        let mut style_editor = HashMap::new();
        style_editor.insert(KeyBinding::new(KeyCode::Tab), Action::StyleEditorNextField);
        style_editor.insert(KeyBinding::new(KeyCode::Down), Action::StyleEditorNextField);
        style_editor.insert(KeyBinding::shift(KeyCode::BackTab), Action::StyleEditorPrevField);
        style_editor.insert(KeyBinding::new(KeyCode::BackTab), Action::StyleEditorPrevField);
        style_editor.insert(KeyBinding::new(KeyCode::Up), Action::StyleEditorPrevField);
        style_editor.insert(KeyBinding::new(KeyCode::Enter), Action::StyleEditorCommit);
        style_editor.insert(KeyBinding::new(KeyCode::Esc), Action::StyleEditorClose);
        style_editor.insert(KeyBinding::new(KeyCode::Backspace), Action::StyleEditorBackspace);
        style_editor.insert(KeyBinding::ctrl(KeyCode::Char('b')), Action::StyleEditorToggleBold);
        style_editor.insert(KeyBinding::ctrl(KeyCode::Char('c')), Action::StyleEditorClose);
        bindings.insert(KeyContext::StyleEditor, style_editor);

        Self { bindings }
    }

    /// Look up action for key event in given context
    pub fn get_action(&self, context: KeyContext, key: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        // First check context-specific bindings
        if let Some(action) = self
            .bindings
            .get(&context)
            .and_then(|context_bindings| context_bindings.get(&binding))
        {
            return Some(action.clone());
        }

        // Fall back to global bindings
        self.bindings
            .get(&KeyContext::Global)?
            .get(&binding)
            .cloned()
    }

    /// Handle key event while the filter bar is focused
    /// Returns Some(Action) for special keys and typed characters
    pub fn get_filter_input_action(&self, key: &KeyEvent) -> Option<Action> {
        self.text_input_action(KeyContext::FilterInput, key, Action::FilterInput)
    }

    /// Handle key event while the style editor is open
    pub fn get_style_editor_action(&self, key: &KeyEvent) -> Option<Action> {
        self.text_input_action(KeyContext::StyleEditor, key, Action::StyleEditorInput)
    }

    fn text_input_action(
        &self,
        context: KeyContext,
        key: &KeyEvent,
        input: fn(char) -> Action,
    ) -> Option<Action> {
        let binding = KeyBinding::from_event(key);

        if let Some(action) = self.bindings.get(&context).and_then(|b| b.get(&binding)) {
            return Some(action.clone());
        }

        // For regular characters, return the input action
        if let KeyCode::Char(c) = key.code {
            if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                return Some(input(c));
            }
        }

        None
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_log_viewer_falls_back_to_global() {
        let bindings = KeyBindings::new();
        assert_eq!(
            bindings.get_action(KeyContext::LogViewer, &key(KeyCode::Char('j'))),
            Some(Action::ScrollDown(1))
        );
        assert_eq!(
            bindings.get_action(KeyContext::LogViewer, &key(KeyCode::Char('q'))),
            Some(Action::Quit)
        );
        assert_eq!(
            bindings.get_action(KeyContext::LogViewer, &key(KeyCode::Char('3'))),
            Some(Action::ToggleColumn(Column::Time))
        );
    }

    #[test]
    fn test_filter_input_captures_characters() {
        let bindings = KeyBindings::new();
        assert_eq!(
            bindings.get_filter_input_action(&key(KeyCode::Char('q'))),
            Some(Action::FilterInput('q'))
        );
        assert_eq!(
            bindings.get_filter_input_action(&key(KeyCode::Tab)),
            Some(Action::FilterComplete)
        );
        assert_eq!(
            bindings.get_filter_input_action(&KeyEvent::new(
                KeyCode::Char('r'),
                KeyModifiers::CONTROL
            )),
            Some(Action::ToggleRegex)
        );
    }

    #[test]
    fn test_style_editor_input() {
        let bindings = KeyBindings::new();
        assert_eq!(
            bindings.get_style_editor_action(&key(KeyCode::Char('#'))),
            Some(Action::StyleEditorInput('#'))
        );
        assert_eq!(
            bindings.get_style_editor_action(&key(KeyCode::Enter)),
            Some(Action::StyleEditorCommit)
        );
    }
}
