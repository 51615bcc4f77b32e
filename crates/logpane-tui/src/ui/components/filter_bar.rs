use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use logpane_core::{FilterHistory, FilterStatus, Toolbar};
use logpane_types::{AutoScrollPolicy, FilterSpec};

use crate::ui::Theme;

/// Tab-completion cycle over history entries
#[derive(Clone, Debug, Default)]
struct Completion {
    /// Text typed before the first Tab
    prefix: String,
    index: usize,
}

/// Filter inputs plus the policy shown next to them
#[derive(Clone, Debug, Default)]
pub struct FilterBarState {
    /// Filter text
    pub input: String,

    /// Is the input focused?
    pub focused: bool,

    /// Interpret the text as a regular expression
    pub is_regex: bool,

    /// Match case exactly
    pub case_sensitive: bool,

    /// Rejection message for the current text
    pub error: Option<String>,

    /// Policy as last pushed by the view
    policy: AutoScrollPolicy,

    completion: Option<Completion>,
}

impl FilterBarState {
    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn unfocus(&mut self) {
        self.focused = false;
        self.completion = None;
    }

    pub fn input_char(&mut self, c: char) {
        self.input.push(c);
        self.completion = None;
    }

    pub fn backspace(&mut self) {
        self.input.pop();
        self.completion = None;
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.completion = None;
    }

    pub fn toggle_regex(&mut self) {
        self.is_regex = !self.is_regex;
    }

    pub fn toggle_case_sensitive(&mut self) {
        self.case_sensitive = !self.case_sensitive;
    }

    /// Replace the input with the next history entry matching the typed prefix.
    ///
    /// Returns false when nothing matches.
    pub fn complete(&mut self, history: &FilterHistory) -> bool {
        let (prefix, index) = match &self.completion {
            Some(c) => (c.prefix.clone(), c.index + 1),
            None => (self.input.clone(), 0),
        };

        let candidates = history.completions(&prefix);
        if candidates.is_empty() {
            return false;
        }

        let index = index % candidates.len();
        self.input = candidates[index].to_string();
        self.completion = Some(Completion { prefix, index });
        true
    }

    /// Reflect the outcome of the last filter change
    pub fn set_status(&mut self, status: &FilterStatus) {
        self.error = match status {
            FilterStatus::Applied { .. } => None,
            FilterStatus::Rejected(err) => Some(err.to_string()),
        };
    }

    pub fn policy(&self) -> AutoScrollPolicy {
        self.policy
    }
}

impl Toolbar for FilterBarState {
    fn filter_spec(&self) -> FilterSpec {
        FilterSpec {
            pattern: self.input.clone(),
            is_regex: self.is_regex,
            case_sensitive: self.case_sensitive,
        }
    }

    fn show_auto_scroll_policy(&mut self, policy: AutoScrollPolicy) {
        self.policy = policy;
    }
}

/// Filter bar widget
pub struct FilterBar<'a> {
    state: &'a FilterBarState,
}

impl<'a> FilterBar<'a> {
    pub fn new(state: &'a FilterBarState) -> Self {
        Self { state }
    }
}

impl Widget for FilterBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let state = self.state;
        let mut spans = Vec::new();

        if state.focused {
            spans.push(Span::styled(" /", Theme::text_highlight()));
        } else {
            spans.push(Span::styled(" Filter: ", Theme::text_dim()));
        }

        let input_style = if state.error.is_some() {
            Theme::error().add_modifier(Modifier::CROSSED_OUT)
        } else {
            Theme::text_highlight()
        };
        spans.push(Span::styled(state.input.clone(), input_style));

        if state.focused {
            spans.push(Span::styled(
                "█",
                Theme::text_highlight().add_modifier(Modifier::SLOW_BLINK),
            ));
        }

        spans.push(Span::raw("  "));
        spans.push(Span::styled(" .* ", Theme::toggle(state.is_regex)));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(" Aa ", Theme::toggle(state.case_sensitive)));
        spans.push(Span::styled("  │ ", Theme::text_dim()));
        spans.push(Span::styled(state.policy.label(), Theme::text()));

        if let Some(err) = &state.error {
            spans.push(Span::styled(format!("  ⚠ {err}"), Theme::error()));
        } else if state.focused {
            spans.push(Span::styled(
                "  [Enter] Keep  [Tab] History  [Esc] Close",
                Theme::text_dim(),
            ));
        }

        let border_style = if state.error.is_some() {
            Theme::border_error()
        } else if state.focused {
            Theme::border_focused()
        } else {
            Theme::border()
        };

        Paragraph::new(Line::from(spans))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(Span::styled(" Filter ", Theme::title())),
            )
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use logpane_core::{EntryStore, FilterEngine};

    fn history(items: &[&str]) -> FilterHistory {
        let mut history = FilterHistory::in_memory();
        for item in items {
            history.record(item).unwrap();
        }
        history
    }

    #[test]
    fn test_filter_spec_reflects_toggles() {
        let mut bar = FilterBarState::default();
        for c in "worker".chars() {
            bar.input_char(c);
        }
        bar.toggle_regex();
        bar.toggle_case_sensitive();

        assert_eq!(
            bar.filter_spec(),
            FilterSpec::regex("worker").case_sensitive(true)
        );
    }

    #[test]
    fn test_completion_cycles_matching_history() {
        let history = history(&["timeout", "thread", "TIMER"]);
        let mut bar = FilterBarState::default();
        bar.input_char('t');
        bar.input_char('i');

        assert!(bar.complete(&history));
        assert_eq!(bar.input, "timeout");
        assert!(bar.complete(&history));
        assert_eq!(bar.input, "TIMER");
        assert!(bar.complete(&history));
        assert_eq!(bar.input, "timeout");

        // Typing starts a new cycle from the edited text
        bar.backspace();
        bar.clear();
        bar.input_char('x');
        assert!(!bar.complete(&history));
        assert_eq!(bar.input, "x");
    }

    #[test]
    fn test_status_marks_invalid_pattern() {
        let store = EntryStore::new();
        let mut engine = FilterEngine::new();
        let mut bar = FilterBarState::default();

        bar.set_status(&engine.set_spec(FilterSpec::regex("("), &store));
        assert!(bar.error.is_some());

        bar.set_status(&engine.set_spec(FilterSpec::regex("ok"), &store));
        assert!(bar.error.is_none());
    }

    #[test]
    fn test_policy_is_shown_not_emitted() {
        let mut bar = FilterBarState::default();
        bar.show_auto_scroll_policy(AutoScrollPolicy::ScrollIfAtBottom);
        assert_eq!(bar.policy(), AutoScrollPolicy::ScrollIfAtBottom);
    }
}
