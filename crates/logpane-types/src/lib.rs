//! Shared types for logpane
//!
//! This crate contains data structures used across multiple logpane crates.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use ratatui::style::Color;

// ============================================================================
// Log Types
// ============================================================================

/// Log severity, ordered from least to most severe
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// All severities in ascending order
    pub const ALL: [Severity; 4] = [Self::Info, Self::Warning, Self::Error, Self::Critical];

    /// Map a verbosity value where lower means more severe.
    ///
    /// `0` is Info, `-1` Warning, `-2` Error and anything at or below `-3`
    /// is Critical. Positive (debug) verbosities collapse into Info.
    pub fn from_verbosity(verbosity: i32) -> Self {
        match verbosity {
            v if v >= 0 => Self::Info,
            -1 => Self::Warning,
            -2 => Self::Error,
            _ => Self::Critical,
        }
    }

    /// Canonical verbosity for this severity
    pub fn verbosity(&self) -> i32 {
        match self {
            Self::Info => 0,
            Self::Warning => -1,
            Self::Error => -2,
            Self::Critical => -3,
        }
    }

    /// Map a tracing level; DEBUG and TRACE are below the display threshold
    pub fn from_tracing(level: tracing::Level) -> Option<Self> {
        if level == tracing::Level::ERROR {
            Some(Self::Error)
        } else if level == tracing::Level::WARN {
            Some(Self::Warning)
        } else if level == tracing::Level::INFO {
            Some(Self::Info)
        } else {
            None
        }
    }

    /// Column label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Info => "Info",
            Self::Warning => "Warning",
            Self::Error => "Error",
            Self::Critical => "Critical",
        }
    }

    /// Short display string (3 chars)
    pub fn short(&self) -> &'static str {
        match self {
            Self::Info => "INF",
            Self::Warning => "WRN",
            Self::Error => "ERR",
            Self::Critical => "CRT",
        }
    }

    /// Get display color for this level
    pub fn color(&self) -> Color {
        match self {
            Self::Info => Color::Green,
            Self::Warning => Color::Yellow,
            Self::Error => Color::Red,
            Self::Critical => Color::Magenta,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single log entry. Immutable once it has been handed to a store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    /// Arrival sequence number, assigned by the store
    pub seq: u64,

    /// Detected severity
    pub level: Severity,

    /// Producer/thread identifier, also the styling key
    pub logger_name: String,

    /// Wall-clock time, formatted upstream
    pub timestamp: String,

    /// Time since start, formatted upstream
    pub elapsed: String,

    /// Free text
    pub message: String,
}

impl LogEntry {
    pub fn new(
        level: Severity,
        logger_name: impl Into<String>,
        timestamp: impl Into<String>,
        elapsed: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            seq: 0,
            level,
            logger_name: logger_name.into(),
            timestamp: timestamp.into(),
            elapsed: elapsed.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Filtering
// ============================================================================

/// Active pattern configuration for the visible subset
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct FilterSpec {
    pub pattern: String,
    pub is_regex: bool,
    pub case_sensitive: bool,
}

impl FilterSpec {
    /// Plain substring filter, case-insensitive
    pub fn substring(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            is_regex: false,
            case_sensitive: false,
        }
    }

    /// Regular expression filter, case-insensitive
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            is_regex: true,
            case_sensitive: false,
        }
    }

    pub fn case_sensitive(mut self, yes: bool) -> Self {
        self.case_sensitive = yes;
        self
    }

    /// Check if this spec lets every entry through
    pub fn is_empty(&self) -> bool {
        self.pattern.is_empty()
    }
}

// ============================================================================
// Auto-scroll
// ============================================================================

/// Whether the view follows newly arrived entries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoScrollPolicy {
    #[serde(alias = "manual")]
    #[default]
    Disabled,
    #[serde(alias = "always")]
    AlwaysScroll,
    #[serde(alias = "smart")]
    ScrollIfAtBottom,
}

impl AutoScrollPolicy {
    pub const ALL: [AutoScrollPolicy; 3] =
        [Self::Disabled, Self::AlwaysScroll, Self::ScrollIfAtBottom];

    /// Policy at a selector index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Selector index of this policy
    pub fn index(&self) -> usize {
        match self {
            Self::Disabled => 0,
            Self::AlwaysScroll => 1,
            Self::ScrollIfAtBottom => 2,
        }
    }

    /// Get display label for this policy
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disabled => "Manual Scroll",
            Self::AlwaysScroll => "Scroll To Bottom",
            Self::ScrollIfAtBottom => "Smart Scroll",
        }
    }

    /// Cycle to the next policy
    pub fn next(&self) -> Self {
        match self {
            Self::Disabled => Self::AlwaysScroll,
            Self::AlwaysScroll => Self::ScrollIfAtBottom,
            Self::ScrollIfAtBottom => Self::Disabled,
        }
    }
}

impl FromStr for AutoScrollPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" | "disabled" | "off" => Ok(Self::Disabled),
            "always" | "alwaysscroll" | "bottom" => Ok(Self::AlwaysScroll),
            "smart" | "scrollifatbottom" | "follow" => Ok(Self::ScrollIfAtBottom),
            other => Err(format!("unknown auto-scroll policy '{other}'")),
        }
    }
}

// ============================================================================
// Styling
// ============================================================================

/// Font emphasis for a logger's rows
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FontStyle {
    pub bold: bool,
}

impl FontStyle {
    pub const BOLD: FontStyle = FontStyle { bold: true };
}

/// The three independent style attributes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StyleKind {
    Background,
    Foreground,
    Font,
}

/// A committed style edit for one logger
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StyleEdit {
    pub logger_name: String,
    pub background: Option<Color>,
    pub foreground: Option<Color>,
    pub bold: bool,
}

impl StyleEdit {
    /// Build an edit from editor text fields; empty text means "no color"
    pub fn parse(
        logger_name: &str,
        background: &str,
        foreground: &str,
        bold: bool,
    ) -> Result<Self, String> {
        Ok(Self {
            logger_name: logger_name.trim().to_string(),
            background: parse_color(background)?,
            foreground: parse_color(foreground)?,
            bold,
        })
    }
}

/// Parse a color name, `#rrggbb` or palette index; blank input is `None`
pub fn parse_color(text: &str) -> Result<Option<Color>, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    Color::from_str(text)
        .map(Some)
        .map_err(|_| format!("invalid color '{text}'"))
}
