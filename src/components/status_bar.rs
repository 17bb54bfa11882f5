use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};

use crate::theme::ThemeColors;

pub const LIST_HINTS: &str = " Enter:preview  d:del  Space:move  S:submit  ?:help ";
pub const HOLDING_HINTS: &str = " ↑/↓:move  j/k/Tab:target  Space:drop  Esc:cancel ";

/// Bottom line: session summary and key hints, or a transient status message.
pub struct StatusBarWidget<'a> {
    summary: &'a str,
    theme: &'a ThemeColors,
    status_message: Option<&'a str>,
    is_error: bool,
    announcement: Option<&'a str>,
    hints: &'a str,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(summary: &'a str, theme: &'a ThemeColors) -> Self {
        Self {
            summary,
            theme,
            status_message: None,
            is_error: false,
            announcement: None,
            hints: LIST_HINTS,
        }
    }

    pub fn status_message(mut self, msg: &'a str, is_error: bool) -> Self {
        self.status_message = Some(msg);
        self.is_error = is_error;
        self
    }

    /// Latest reorder/delete announcement, shown next to the summary.
    pub fn announcement(mut self, msg: Option<&'a str>) -> Self {
        self.announcement = msg;
        self
    }

    pub fn hints(mut self, hints: &'a str) -> Self {
        self.hints = hints;
        self
    }
}

fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count >= width {
        text.chars().take(width).collect()
    } else {
        format!("{:<width$}", text, width = width)
    }
}

impl<'a> Widget for StatusBarWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }

        let width = area.width as usize;

        if let Some(msg) = self.status_message {
            let style = if self.is_error {
                Style::default()
                    .bg(self.theme.error_fg)
                    .fg(self.theme.status_fg)
            } else {
                Style::default().fg(self.theme.success_fg)
            };
            let line = Line::from(Span::styled(fit(msg, width), style));
            buf.set_line(area.x, area.y, &line, area.width);
            return;
        }

        let hints_len = self.hints.chars().count();
        let remaining = width.saturating_sub(hints_len);

        let mut spans = vec![Span::styled(
            self.summary.to_string(),
            Style::default().fg(self.theme.status_fg),
        )];
        if let Some(msg) = self.announcement {
            spans.push(Span::raw("  "));
            spans.push(Span::styled(
                msg.to_string(),
                Style::default()
                    .fg(self.theme.info_fg)
                    .add_modifier(Modifier::ITALIC),
            ));
        }

        let used: usize = spans.iter().map(|s| s.content.chars().count()).sum();
        if used <= remaining {
            spans.push(Span::raw(" ".repeat(remaining - used)));
            spans.push(Span::styled(
                self.hints,
                Style::default()
                    .fg(self.theme.dim_fg)
                    .add_modifier(Modifier::DIM),
            ));
        }

        buf.set_style(area, Style::default().bg(self.theme.status_bg));
        buf.set_line(area.x, area.y, &Line::from(spans), area.width);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme;
    use ratatui::style::Color;

    fn content(buf: &Buffer, width: u16) -> String {
        (0..width)
            .map(|x| buf.cell((x, 0)).unwrap().symbol().to_string())
            .collect()
    }

    #[test]
    fn test_status_message_success() {
        let tc = theme::dark_theme();
        let widget = StatusBarWidget::new("3/10 attachments", &tc)
            .status_message("Added 2 file(s)", false);

        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        assert!(content(&buf, 80).contains("Added 2 file(s)"));
        assert_eq!(buf.cell((0, 0)).unwrap().fg, Color::Rgb(166, 227, 161));
    }

    #[test]
    fn test_status_message_error() {
        let tc = theme::dark_theme();
        let widget = StatusBarWidget::new("", &tc)
            .status_message("big.png is too large (max 5MB)", true);

        let area = Rect::new(0, 0, 80, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        assert!(content(&buf, 80).contains("too large"));
        let cell = buf.cell((0, 0)).unwrap();
        assert_eq!(cell.bg, Color::Rgb(243, 139, 168));
        assert_eq!(cell.fg, Color::Rgb(205, 214, 244));
    }

    #[test]
    fn test_normal_bar_shows_summary_and_hints() {
        let tc = theme::dark_theme();
        let widget = StatusBarWidget::new(" 3/10 attachments · 1.20 MB", &tc);

        let area = Rect::new(0, 0, 100, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        let text = content(&buf, 100);
        assert!(text.contains("3/10 attachments"));
        assert!(text.contains("Enter:preview"));
        assert!(text.contains("S:submit"));
    }

    #[test]
    fn test_announcement_and_custom_hints() {
        let tc = theme::dark_theme();
        let widget = StatusBarWidget::new(" 2/10", &tc)
            .announcement(Some("Cancelled move operation"))
            .hints(HOLDING_HINTS);

        let area = Rect::new(0, 0, 100, 1);
        let mut buf = Buffer::empty(area);
        widget.render(area, &mut buf);

        let text = content(&buf, 100);
        assert!(text.contains("Cancelled move operation"));
        assert!(text.contains("Space:drop"));
    }

    #[test]
    fn test_zero_area_does_not_panic() {
        let tc = theme::dark_theme();
        let area = Rect::new(0, 0, 0, 0);
        let mut buf = Buffer::empty(area);
        StatusBarWidget::new("x", &tc).render(area, &mut buf);
    }
}
