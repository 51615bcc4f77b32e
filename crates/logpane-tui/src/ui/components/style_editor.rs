use ratatui::{
    Frame,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use logpane_core::StyleRegistry;
use logpane_types::{Color, StyleEdit};

use crate::ui::{Layout, Theme};

/// Focusable fields of the style editor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StyleField {
    #[default]
    Logger,
    Background,
    Foreground,
    Bold,
}

impl StyleField {
    const ORDER: [StyleField; 4] = [
        Self::Logger,
        Self::Background,
        Self::Foreground,
        Self::Bold,
    ];

    fn position(&self) -> usize {
        Self::ORDER.iter().position(|f| f == self).unwrap_or(0)
    }

    fn next(&self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    fn prev(&self) -> Self {
        Self::ORDER[(self.position() + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Text fields of an open style editor
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleEditorState {
    pub logger: String,
    pub background: String,
    pub foreground: String,
    pub bold: bool,
    pub focus: StyleField,
    pub error: Option<String>,
}

impl StyleEditorState {
    /// Open for `logger_name`, prefilled with its current overrides
    pub fn open(logger_name: &str, styles: &StyleRegistry) -> Self {
        let color_text = |c: Option<Color>| c.map(|c| c.to_string()).unwrap_or_default();

        Self {
            logger: logger_name.to_string(),
            background: color_text(styles.background(logger_name)),
            foreground: color_text(styles.foreground(logger_name)),
            bold: styles.font(logger_name).is_some_and(|f| f.bold),
            focus: if logger_name.is_empty() {
                StyleField::Logger
            } else {
                StyleField::Background
            },
            error: None,
        }
    }

    /// Refill the attribute fields for the logger name typed so far
    pub fn reload(&mut self, styles: &StyleRegistry) {
        let focus = self.focus;
        *self = Self::open(self.logger.trim(), styles);
        self.focus = focus;
    }

    pub fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn prev_field(&mut self) {
        self.focus = self.focus.prev();
    }

    pub fn toggle_bold(&mut self) {
        self.bold = !self.bold;
    }

    pub fn input_char(&mut self, c: char) {
        self.error = None;
        match self.focus {
            StyleField::Bold if c == ' ' => self.toggle_bold(),
            StyleField::Bold => {}
            _ => {
                if let Some(text) = self.focused_text() {
                    text.push(c);
                }
            }
        }
    }

    pub fn backspace(&mut self) {
        self.error = None;
        if let Some(text) = self.focused_text() {
            text.pop();
        }
    }

    fn focused_text(&mut self) -> Option<&mut String> {
        match self.focus {
            StyleField::Logger => Some(&mut self.logger),
            StyleField::Background => Some(&mut self.background),
            StyleField::Foreground => Some(&mut self.foreground),
            StyleField::Bold => None,
        }
    }

    /// Build the edit, or keep the editor open with an error
    pub fn commit(&mut self) -> Option<StyleEdit> {
        if self.logger.trim().is_empty() {
            self.error = Some("logger name is required".to_string());
            self.focus = StyleField::Logger;
            return None;
        }

        match StyleEdit::parse(&self.logger, &self.background, &self.foreground, self.bold) {
            Ok(edit) => Some(edit),
            Err(err) => {
                self.error = Some(err);
                None
            }
        }
    }
}

/// Style editor popup
pub struct StyleEditor;

impl StyleEditor {
    pub fn render(frame: &mut Frame, state: &StyleEditorState) {
        let popup_area = Layout::centered_popup(frame.area(), 56, 11);
        frame.render_widget(Clear, popup_area);

        let bold_box = if state.bold { "[x]" } else { "[ ]" };
        let mut lines = vec![
            Line::from(""),
            Self::field_line("Logger", &state.logger, state.focus == StyleField::Logger),
            Self::field_line(
                "Background",
                &state.background,
                state.focus == StyleField::Background,
            ),
            Self::field_line(
                "Foreground",
                &state.foreground,
                state.focus == StyleField::Foreground,
            ),
            Self::field_line("Bold", bold_box, state.focus == StyleField::Bold),
            Line::from(""),
        ];

        match &state.error {
            Some(err) => lines.push(Line::from(Span::styled(format!("  ⚠ {err}"), Theme::error()))),
            None => lines.push(Line::from(Span::styled(
                "  Colors: name, #rrggbb or index. Empty = default.",
                Theme::text_dim(),
            ))),
        }
        lines.push(Line::from(Span::styled(
            "  [Tab] Next  [Ctrl+b] Bold  [Enter] Apply  [Esc] Cancel",
            Theme::text_dim(),
        )));

        let editor = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Theme::PRIMARY))
                .title(Span::styled(" Logger Style ", Theme::title())),
        );

        frame.render_widget(editor, popup_area);
    }

    fn field_line<'a>(label: &'a str, value: &'a str, focused: bool) -> Line<'a> {
        let value_style = if focused {
            Theme::text_highlight().add_modifier(Modifier::UNDERLINED)
        } else {
            Theme::text()
        };

        let mut spans = vec![
            Span::styled(format!("  {label:>10}: "), Theme::success()),
            Span::styled(value, value_style),
        ];
        if focused {
            spans.push(Span::styled("█", Theme::text_highlight()));
        }
        Line::from(spans)
    }
}
