use std::collections::HashMap;

use ratatui::style::{Modifier, Style};

use logpane_types::{Color, FontStyle, StyleKind};

/// One attribute mapping, logger name to value
#[derive(Debug, Clone)]
struct AttributeMap<V> {
    values: HashMap<String, V>,
}

impl<V: Clone + PartialEq> AttributeMap<V> {
    fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Insert, overwrite or remove. Returns whether anything observable happened.
    fn set(&mut self, logger_name: &str, value: Option<V>) -> bool {
        match value {
            Some(value) => {
                self.values.insert(logger_name.to_string(), value);
                true
            }
            None => self.values.remove(logger_name).is_some(),
        }
    }

    fn get(&self, logger_name: &str) -> Option<V> {
        self.values.get(logger_name).cloned()
    }
}

/// A style attribute change for one logger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleChange {
    pub kind: StyleKind,
    pub logger_name: String,
}

/// Per-logger display overrides, independent of the entry store
#[derive(Debug, Clone)]
pub struct StyleRegistry {
    background: AttributeMap<Color>,
    foreground: AttributeMap<Color>,
    font: AttributeMap<FontStyle>,
}

impl Default for StyleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleRegistry {
    pub fn new() -> Self {
        Self {
            background: AttributeMap::new(),
            foreground: AttributeMap::new(),
            font: AttributeMap::new(),
        }
    }

    /// Set or clear the background; `Some` change when a notification is due
    pub fn set_background(&mut self, logger_name: &str, color: Option<Color>) -> Option<StyleChange> {
        self.background
            .set(logger_name, color)
            .then(|| change(StyleKind::Background, logger_name))
    }

    pub fn background(&self, logger_name: &str) -> Option<Color> {
        self.background.get(logger_name)
    }

    /// Set or clear the foreground; `Some` change when a notification is due
    pub fn set_foreground(&mut self, logger_name: &str, color: Option<Color>) -> Option<StyleChange> {
        self.foreground
            .set(logger_name, color)
            .then(|| change(StyleKind::Foreground, logger_name))
    }

    pub fn foreground(&self, logger_name: &str) -> Option<Color> {
        self.foreground.get(logger_name)
    }

    /// Set or clear the font emphasis; `Some` change when a notification is due
    pub fn set_font(&mut self, logger_name: &str, font: Option<FontStyle>) -> Option<StyleChange> {
        self.font
            .set(logger_name, font)
            .then(|| change(StyleKind::Font, logger_name))
    }

    pub fn font(&self, logger_name: &str) -> Option<FontStyle> {
        self.font.get(logger_name)
    }

    /// Compose all overrides for a logger into a terminal style
    pub fn style_for(&self, logger_name: &str) -> Style {
        let mut style = Style::default();
        if let Some(bg) = self.background(logger_name) {
            style = style.bg(bg);
        }
        if let Some(fg) = self.foreground(logger_name) {
            style = style.fg(fg);
        }
        if self.font(logger_name).is_some_and(|f| f.bold) {
            style = style.add_modifier(Modifier::BOLD);
        }
        style
    }
}

fn change(kind: StyleKind, logger_name: &str) -> StyleChange {
    StyleChange {
        kind,
        logger_name: logger_name.to_string(),
    }
}
