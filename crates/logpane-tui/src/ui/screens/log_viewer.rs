use ratatui::{
    Frame,
    layout::{Constraint, Margin, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Table,
    },
};

use logpane_core::LogView;
use logpane_types::{LogEntry, Severity};

use crate::app::{AppState, Column};
use crate::ui::Layout;
use crate::ui::Theme;
use crate::ui::components::{FilterBar, HelpOverlay, StatusBar, StyleEditor, log_viewer_hints};

/// Log viewer screen
pub struct LogViewerScreen;

impl LogViewerScreen {
    /// Draw the whole screen. Also records the table height in the scroll
    /// state, which the view samples for smart scrolling.
    pub fn render(frame: &mut Frame, state: &mut AppState, view: &LogView, dropped_count: u64) {
        let areas = Layout::log_viewer(frame.area(), state.ui_state.stats_visible);

        Self::render_header(frame, areas.header, state, view);
        if let Some(stats) = areas.stats {
            Self::render_stats_bar(frame, stats, view, dropped_count);
        }
        frame.render_widget(FilterBar::new(&state.ui_state.filter_bar), areas.filter);
        Self::render_table(frame, areas.table, state, view);
        Self::render_status_bar(frame, areas.status, state, view, dropped_count);

        if let Some(editor) = &state.ui_state.style_editor {
            StyleEditor::render(frame, editor);
        }
        if state.ui_state.help_visible {
            HelpOverlay::render(frame);
        }
    }

    fn render_header(frame: &mut Frame, area: Rect, state: &AppState, view: &LogView) {
        let cap = match view.max_entries() {
            Some(cap) => format!("cap {cap}"),
            None => "unbounded".to_string(),
        };

        let mut spans = vec![
            Span::styled("logpane", Theme::title()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(format!("{} entries", view.count()), Theme::text()),
            Span::styled(" │ ", Theme::text_dim()),
            Span::styled(cap, Theme::text_dim()),
        ];

        if let Some(message) = &state.ui_state.error_message {
            spans.push(Span::styled(" │ ", Theme::text_dim()));
            spans.push(Span::styled(message.clone(), Theme::error()));
        }

        let header = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border()),
        );

        frame.render_widget(header, area);
    }

    fn render_stats_bar(frame: &mut Frame, area: Rect, view: &LogView, dropped_count: u64) {
        let counts = view.level_counts();

        let mut spans = vec![Span::styled(" ", Theme::text())];
        for level in Severity::ALL.into_iter().rev() {
            spans.push(Span::styled(format!("{}:", level.short()), Theme::level(level)));
            spans.push(Span::styled(format!("{} ", counts.get(level)), Theme::text()));
        }

        spans.push(Span::styled("│ ", Theme::text_dim()));
        spans.push(Span::styled("Total:", Theme::text_dim()));
        spans.push(Span::styled(format!("{} ", counts.total()), Theme::text()));

        if dropped_count > 0 {
            spans.push(Span::styled("│ ", Theme::text_dim()));
            spans.push(Span::styled(format!("Dropped:{dropped_count}"), Theme::error()));
        }

        let stats_widget = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Theme::border())
                .title(Span::styled(" Stats ", Theme::title())),
        );

        frame.render_widget(stats_widget, area);
    }

    fn render_table(frame: &mut Frame, area: Rect, state: &mut AppState, view: &LogView) {
        let total = view.visible_count();

        // Borders plus the header row
        let height = area.height.saturating_sub(3) as usize;
        let scroll = &mut state.ui_state.scroll;
        scroll.height = height;
        scroll.clamp(total);
        let offset = scroll.offset;

        let columns: Vec<Column> = state.ui_state.columns.visible().collect();
        let rows: Vec<Row> = (offset..total.min(offset + height))
            .filter_map(|i| view.visible(i).ok())
            .map(|entry| Self::entry_row(entry, &columns, view))
            .collect();

        let header = Row::new(columns.iter().map(|c| Cell::from(c.title())))
            .style(Theme::table_header());
        let widths: Vec<Constraint> = columns.iter().map(|c| Self::column_width(*c)).collect();

        let title = if view.current_filter_spec().is_empty() {
            format!(" Entries ({total}) ")
        } else {
            format!(" Entries ({total} matching) ")
        };

        let table = Table::new(rows, widths)
            .header(header)
            .column_spacing(1)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border())
                    .title(Span::styled(title, Theme::title())),
            );

        frame.render_widget(table, area);

        if total > height {
            let max_scroll = total.saturating_sub(height);
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"));
            let mut scrollbar_state = ScrollbarState::default()
                .content_length(max_scroll)
                .position(offset.min(max_scroll));

            frame.render_stateful_widget(
                scrollbar,
                area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }

    fn column_width(column: Column) -> Constraint {
        match column {
            Column::Level => Constraint::Length(3),
            Column::Logger => Constraint::Length(16),
            Column::Time => Constraint::Length(12),
            Column::Elapsed => Constraint::Length(9),
            Column::Message => Constraint::Min(10),
        }
    }

    /// One table row, styled by the logger's overrides
    fn entry_row<'a>(entry: &'a LogEntry, columns: &[Column], view: &'a LogView) -> Row<'a> {
        let cells = columns.iter().map(|column| match column {
            Column::Level => Cell::from(entry.level.short()).style(Theme::level(entry.level)),
            Column::Logger => Cell::from(entry.logger_name.as_str()),
            Column::Time => Cell::from(entry.timestamp.as_str()),
            Column::Elapsed => Cell::from(entry.elapsed.as_str()),
            Column::Message => Cell::from(highlight_matches(
                &entry.message,
                &view.filter().find_matches(&entry.message),
            )),
        });

        Row::new(cells).style(view.styles().style_for(&entry.logger_name))
    }

    fn render_status_bar(
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        view: &LogView,
        dropped_count: u64,
    ) {
        let mut right = format!(
            "{} │ {}/{}",
            view.auto_scroll_policy().label(),
            view.visible_count(),
            view.count()
        );
        let mut right_style = Style::default();
        if dropped_count > 0 {
            right.push_str(&format!(" │ {dropped_count} dropped"));
            right_style = Theme::error();
        }

        let status = StatusBar::new()
            .hints(if state.ui_state.filter_bar.focused {
                vec![
                    ("Enter", "Keep"),
                    ("Tab", "History"),
                    ("^r", "Regex"),
                    ("^a", "Case"),
                    ("Esc", "Close"),
                ]
            } else {
                log_viewer_hints()
            })
            .right(right)
            .right_style(right_style);

        frame.render_widget(status, area);
    }
}

/// Split `text` into plain and highlighted spans at the given byte ranges
fn highlight_matches<'a>(text: &'a str, matches: &[(usize, usize)]) -> Line<'a> {
    if matches.is_empty() {
        return Line::from(text);
    }

    let mut spans = Vec::with_capacity(matches.len() * 2 + 1);
    let mut last_end = 0;
    for &(start, end) in matches {
        if start < last_end || text.get(start..end).is_none() {
            continue;
        }
        if start > last_end {
            spans.push(Span::raw(&text[last_end..start]));
        }
        spans.push(Span::styled(&text[start..end], Theme::match_highlight()));
        last_end = end;
    }
    if last_end < text.len() {
        spans.push(Span::raw(&text[last_end..]));
    }
    Line::from(spans)
}
