use ratatui::{
    Frame,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::ui::{Layout, Theme};

const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("j/↓ k/↑", "Scroll one row"),
            ("^d ^u", "Page down / up"),
            ("g G", "Top / bottom"),
            ("a", "Cycle auto-scroll policy"),
        ],
    ),
    (
        "Filter",
        &[
            ("/", "Edit filter"),
            ("Enter", "Keep filter in history"),
            ("Tab", "Complete from history"),
            ("r i", "Regex / case sensitive"),
            ("n", "Clear filter"),
            ("H", "Clear filter history"),
        ],
    ),
    (
        "Display",
        &[
            ("1-5", "Show or hide a column"),
            ("e", "Style the top row's logger"),
            ("s", "Level counts"),
            ("c", "Clear entries"),
        ],
    ),
    (
        "Demo",
        &[("m", "Messages from this thread"), ("M", "Messages from threads")],
    ),
];

/// Keybinding reference popup
pub struct HelpOverlay;

impl HelpOverlay {
    pub fn render(frame: &mut Frame) {
        let popup_area = Layout::centered_popup(frame.area(), 52, 30);
        frame.render_widget(Clear, popup_area);

        let mut lines = Vec::new();
        for (title, keys) in SECTIONS {
            lines.push(Line::from(Span::styled(*title, Theme::text_highlight())));
            lines.extend(keys.iter().map(|(key, desc)| Self::key_line(key, desc)));
            lines.push(Line::from(""));
        }
        lines.push(Self::key_line("? Esc", "Close help"));
        lines.push(Self::key_line("q", "Quit"));

        let help = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border_focused())
                .title(Span::styled(" Help ", Theme::title())),
        );
        frame.render_widget(help, popup_area);
    }

    fn key_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
        Line::from(vec![
            Span::styled(format!("  {key:>8}"), Theme::success()),
            Span::styled(format!("  {desc}"), Theme::text()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn test_lists_every_section() {
        let mut terminal = Terminal::new(TestBackend::new(80, 40)).unwrap();
        terminal.draw(HelpOverlay::render).unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        for (title, _) in SECTIONS {
            assert!(text.contains(title), "missing section {title}");
        }
        assert!(text.contains("Cycle auto-scroll policy"));
    }
}
