use ratatui::layout::{Constraint, Direction, Layout as RatatuiLayout, Rect};

/// Areas of the log viewer screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogViewerAreas {
    pub header: Rect,
    pub stats: Option<Rect>,
    pub filter: Rect,
    pub table: Rect,
    pub status: Rect,
}

/// Layout helper for consistent screen layouts
pub struct Layout;

impl Layout {
    /// Header, optional stats bar, filter bar, table and status bar
    pub fn log_viewer(area: Rect, show_stats: bool) -> LogViewerAreas {
        let mut constraints = vec![Constraint::Length(3)]; // Header
        if show_stats {
            constraints.push(Constraint::Length(3)); // Stats bar
        }
        constraints.push(Constraint::Length(3)); // Filter bar
        constraints.push(Constraint::Min(1)); // Table
        constraints.push(Constraint::Length(1)); // Status bar

        let chunks = RatatuiLayout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        let mut next = chunks.iter().copied();
        let header = next.next().unwrap_or_default();
        let stats = if show_stats { next.next() } else { None };

        LogViewerAreas {
            header,
            stats,
            filter: next.next().unwrap_or_default(),
            table: next.next().unwrap_or_default(),
            status: next.next().unwrap_or_default(),
        }
    }

    /// A popup of at most `width` x `height`, centered in `area`
    pub fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
        let width = width.min(area.width.saturating_sub(4));
        let height = height.min(area.height.saturating_sub(4));

        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        Rect::new(x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_viewer_areas() {
        let area = Rect::new(0, 0, 80, 30);

        let plain = Layout::log_viewer(area, false);
        assert!(plain.stats.is_none());
        assert_eq!(plain.table.height, 30 - 3 - 3 - 1);

        let with_stats = Layout::log_viewer(area, true);
        assert_eq!(with_stats.stats.map(|r| r.height), Some(3));
        assert_eq!(with_stats.table.height, 30 - 3 - 3 - 3 - 1);
        assert_eq!(with_stats.status.y, 29);
    }

    #[test]
    fn test_popup_is_centered() {
        let popup = Layout::centered_popup(Rect::new(0, 0, 100, 40), 50, 10);
        assert_eq!(popup, Rect::new(25, 15, 50, 10));
    }
}
