use ratatui::{
    layout::{Constraint, Layout},
    style::Style,
    widgets::{Block, BorderType, Borders},
    Frame,
};

use crate::app::{App, AppMode, PreviewFocus};
use crate::components::attachment_list::{format_size, AttachmentListWidget};
use crate::components::dialog::DialogWidget;
use crate::components::help::HelpOverlay;
use crate::components::preview_modal::{PreviewLayout, PreviewModal};
use crate::components::status_bar::{StatusBarWidget, HOLDING_HINTS, LIST_HINTS};
use crate::components::thumbnails::{scroll_into_view, thumb_rects, visible_count};

/// Render the application UI and record hit-test regions on `app`.
pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let [list_area, status_area] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);

    render_list(app, frame, list_area);
    render_status(app, frame, status_area);

    app.layout.thumbnails.clear();
    app.layout.image = Default::default();
    if app.preview.is_some() {
        render_preview(app, frame, list_area);
    }

    match app.mode {
        AppMode::ConfirmDelete { .. } => {
            frame.render_widget(DialogWidget::new(&app.mode, &app.theme), area);
        }
        AppMode::Help => {
            frame.render_widget(HelpOverlay::new(&app.theme, app.help_scroll), area);
        }
        AppMode::Normal => {}
    }
}

fn render_list(app: &mut App, frame: &mut Frame, area: ratatui::layout::Rect) {
    app.layout.list = area;
    let title = format!(
        " Attachments ({}/{}) ",
        app.store.len(),
        app.rules.max_files
    );
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(app.theme.border_fg));

    let hint = format!(
        "Paste or drop files here (up to {} files, {}MB each)",
        app.rules.max_files, app.rules.max_file_size_mb
    );
    let picked = if app.preview.is_none() {
        app.reorder.picked_up_index()
    } else {
        None
    };
    let widget = AttachmentListWidget::new(app.store.items(), app.selected, &app.theme)
        .picked(picked)
        .empty_hint(&hint)
        .block(block);
    frame.render_widget(widget, area);
}

fn render_status(app: &App, frame: &mut Frame, area: ratatui::layout::Rect) {
    let total: u64 = app
        .store
        .items()
        .iter()
        .filter_map(|item| item.size_bytes())
        .sum();
    let summary = format!(
        " {}/{} attachments · {}",
        app.store.len(),
        app.rules.max_files,
        format_size(total)
    );
    let hints = if app.reorder.picked_up_index().is_some() {
        HOLDING_HINTS
    } else {
        LIST_HINTS
    };
    let mut widget = StatusBarWidget::new(&summary, &app.theme).hints(hints);
    if app.preview.is_none() {
        widget = widget.announcement(app.announcer.message());
    }
    if let Some(msg) = &app.status_message {
        widget = widget.status_message(&msg.text, msg.is_error);
    }
    frame.render_widget(widget, area);
}

fn render_preview(app: &mut App, frame: &mut Frame, area: ratatui::layout::Rect) {
    let layout = PreviewLayout::compute(area);
    let len = app.store.len();
    let Some(preview) = app.preview.as_mut() else {
        return;
    };
    let current = preview.nav.current_index();
    let focused = match preview.focus {
        PreviewFocus::Thumbnails { focused } => Some(focused),
        PreviewFocus::Image => None,
    };
    let anchor = app
        .reorder
        .picked_up_index()
        .or(focused)
        .unwrap_or(current);
    preview.thumb_scroll = scroll_into_view(
        preview.thumb_scroll.min(len.saturating_sub(1)),
        anchor,
        visible_count(layout.strip.width),
    );
    let thumb_scroll = preview.thumb_scroll;

    app.layout.image = layout.image;
    app.layout.thumbnails = thumb_rects(layout.strip, len, thumb_scroll);

    let item = app.store.get(current);
    let decode = item.and_then(|i| app.preloader.state(&i.id));
    let url = item.and_then(|i| app.cache.url_for(&i.id));
    let held = app
        .reorder
        .picked_up_index()
        .or(app.reorder.dragged_index());

    let widget = PreviewModal::new(app.store.items(), current, &app.theme)
        .decode_state(decode)
        .url(url)
        .announcement(app.announcer.message())
        .held(held)
        .focused(focused)
        .thumb_scroll(thumb_scroll)
        .show_click_sides(app.config.show_click_sides());
    frame.render_widget(widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::app_with_images;
    use ratatui::{backend::TestBackend, Terminal};
    use std::time::Instant;

    fn draw(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buf = terminal.backend().buffer().clone();
        let mut s = String::new();
        for y in 0..height {
            for x in 0..width {
                s.push_str(buf.cell((x, y)).unwrap().symbol());
            }
            s.push('\n');
        }
        s
    }

    #[test]
    fn list_view_shows_items_and_summary() {
        let mut app = app_with_images(&["one.png", "two.png"]);
        let text = draw(&mut app, 80, 20);
        assert!(text.contains("Attachments (2/10)"));
        assert!(text.contains("one.png"));
        assert!(text.contains("2/10 attachments"));
        assert!(app.layout.thumbnails.is_empty());
    }

    #[test]
    fn preview_records_hit_regions() {
        let mut app = app_with_images(&["one.png", "two.png", "three.png"]);
        app.open_preview(1, Instant::now());
        let text = draw(&mut app, 100, 30);

        assert!(text.contains(" 2 / 3 "));
        assert_eq!(app.layout.thumbnails.len(), 3);
        assert!(app.layout.image.width > 0);
        let (_, second) = app.layout.thumbnails[1];
        assert_eq!(app.layout.thumbnail_at(second.x + 1, second.y + 1), Some(1));
    }

    #[test]
    fn thumbnail_strip_scrolls_to_current() {
        let names: Vec<String> = (0..10).map(|i| format!("img{}.png", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let mut app = app_with_images(&refs);
        app.open_preview(9, Instant::now());
        draw(&mut app, 60, 30);

        let indices: Vec<usize> = app.layout.thumbnails.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices.last(), Some(&9));
        assert!(app.preview.as_ref().unwrap().thumb_scroll > 0);
    }

    #[test]
    fn help_overlay_draws_on_top() {
        let mut app = app_with_images(&[]);
        app.open_help();
        let text = draw(&mut app, 100, 50);
        assert!(text.contains("Keybinding Reference"));
    }
}
