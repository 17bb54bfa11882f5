use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Widget},
};

use super::attachment_list::{format_size, kind_tag};
use super::image_view::ImageView;
use super::thumbnails::{ThumbnailStrip, STRIP_HEIGHT};
use crate::preview::cache::CachedUrl;
use crate::preview::preload::DecodeState;
use crate::staging::item::{ItemKind, StagedItem};
use crate::theme::ThemeColors;

/// Regions of the preview modal. Computed once per frame and kept by the app
/// for mouse hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewLayout {
    pub frame: Rect,
    pub image: Rect,
    pub caption: Rect,
    pub announcement: Rect,
    pub strip: Rect,
}

impl PreviewLayout {
    pub fn compute(area: Rect) -> Self {
        let width = (area.width as u32 * 9 / 10).max(20).min(area.width as u32) as u16;
        let height = (area.height as u32 * 9 / 10).max(10).min(area.height as u32) as u16;
        let frame = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );
        let inner = Block::default().borders(Borders::ALL).inner(frame);
        let [image, caption, announcement, strip] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(STRIP_HEIGHT),
        ])
        .areas(inner);
        Self {
            frame,
            image,
            caption,
            announcement,
            strip,
        }
    }
}

fn centered_text(area: Rect, y: u16, text: &str, style: Style, buf: &mut Buffer) {
    let width = text.chars().count() as u16;
    let x = area.x + area.width.saturating_sub(width) / 2;
    buf.set_line(x, y, &Line::from(Span::styled(text, style)), area.width);
}

/// Full-screen preview of the current attachment with navigation chrome.
pub struct PreviewModal<'a> {
    items: &'a [StagedItem],
    current: usize,
    theme: &'a ThemeColors,
    decode: Option<&'a DecodeState>,
    url: Option<&'a CachedUrl>,
    announcement: Option<&'a str>,
    held: Option<usize>,
    focused: Option<usize>,
    thumb_scroll: usize,
    show_click_sides: bool,
}

impl<'a> PreviewModal<'a> {
    pub fn new(items: &'a [StagedItem], current: usize, theme: &'a ThemeColors) -> Self {
        Self {
            items,
            current,
            theme,
            decode: None,
            url: None,
            announcement: None,
            held: None,
            focused: None,
            thumb_scroll: 0,
            show_click_sides: false,
        }
    }

    pub fn decode_state(mut self, state: Option<&'a DecodeState>) -> Self {
        self.decode = state;
        self
    }

    pub fn url(mut self, url: Option<&'a CachedUrl>) -> Self {
        self.url = url;
        self
    }

    pub fn announcement(mut self, message: Option<&'a str>) -> Self {
        self.announcement = message;
        self
    }

    pub fn held(mut self, index: Option<usize>) -> Self {
        self.held = index;
        self
    }

    pub fn focused(mut self, index: Option<usize>) -> Self {
        self.focused = index;
        self
    }

    pub fn thumb_scroll(mut self, scroll: usize) -> Self {
        self.thumb_scroll = scroll;
        self
    }

    pub fn show_click_sides(mut self, show: bool) -> Self {
        self.show_click_sides = show;
        self
    }

    fn render_click_sides(&self, area: Rect, buf: &mut Buffer) {
        let third = area.width / 3;
        if third == 0 {
            return;
        }
        let side_style = Style::default()
            .bg(self.theme.click_side_bg)
            .fg(self.theme.dim_fg);
        let left = Rect::new(area.x, area.y, third, area.height);
        let right = Rect::new(area.x + area.width - third, area.y, third, area.height);
        buf.set_style(left, side_style);
        buf.set_style(right, side_style);
        let mid = area.y + area.height / 2;
        buf.set_string(left.x + 1, mid, "‹", side_style);
        buf.set_string(right.x + right.width.saturating_sub(2), mid, "›", side_style);
    }

    fn render_body(&self, item: &StagedItem, area: Rect, buf: &mut Buffer) {
        let mid = area.y + area.height / 2;
        let dim = Style::default().fg(self.theme.dim_fg);

        if !item.is_image() {
            let title = format!("{} {}", kind_tag(item), item.name());
            centered_text(area, mid.saturating_sub(1), &title, Style::default().fg(self.theme.preview_fg), buf);
            centered_text(area, mid, "Preview not available for this file type", dim, buf);
            return;
        }

        match self.decode {
            Some(DecodeState::Ready(image)) => ImageView::new(image).render(area, buf),
            Some(DecodeState::Failed) => {
                centered_text(area, mid, "Preview not available", Style::default().fg(self.theme.error_fg), buf)
            }
            Some(DecodeState::Pending) => centered_text(area, mid, "Loading…", dim, buf),
            None => match (item.kind(), self.url) {
                (ItemKind::RemoteUrl { .. }, Some(url)) => {
                    centered_text(area, mid.saturating_sub(1), "Remote image", dim, buf);
                    centered_text(area, mid, url.as_str(), Style::default().fg(self.theme.info_fg), buf);
                }
                _ => centered_text(area, mid, "Loading…", dim, buf),
            },
        }
    }

    fn caption(&self, item: &StagedItem) -> String {
        let mut parts = vec![item.name().to_string(), item.mime_hint().to_string()];
        if let Some(size) = item.size_bytes() {
            parts.push(format_size(size));
        }
        if let Some(DecodeState::Ready(image)) = self.decode {
            parts.push(format!("{}×{}", image.width, image.height));
        }
        if let ItemKind::RemoteUrl { url } = item.kind() {
            parts.push(url.clone());
        }
        parts.join(" · ")
    }
}

impl<'a> Widget for PreviewModal<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(item) = self.items.get(self.current) else {
            return;
        };
        let layout = PreviewLayout::compute(area);
        Clear.render(layout.frame, buf);

        let counter = format!(" {} / {} ", self.current + 1, self.items.len());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.border_focused_fg))
            .style(Style::default().bg(self.theme.preview_bg).fg(self.theme.preview_fg))
            .title(Line::from(Span::styled(
                format!(" {} ", item.name()),
                Style::default().add_modifier(Modifier::BOLD),
            )))
            .title_top(Line::from(counter).right_aligned())
            .title_bottom(
                Line::from(Span::styled(
                    " ←/→ navigate · Tab thumbnails · s save · d delete · Esc close ",
                    Style::default().fg(self.theme.dim_fg),
                ))
                .centered(),
            );
        block.render(layout.frame, buf);

        if self.show_click_sides && self.items.len() > 1 {
            self.render_click_sides(layout.image, buf);
        }
        self.render_body(item, layout.image, buf);

        Line::from(Span::styled(
            self.caption(item),
            Style::default().fg(self.theme.dim_fg),
        ))
        .centered()
        .render(layout.caption, buf);
        if let Some(message) = self.announcement {
            centered_text(
                layout.announcement,
                layout.announcement.y,
                message,
                Style::default()
                    .fg(self.theme.info_fg)
                    .add_modifier(Modifier::ITALIC),
                buf,
            );
        }

        ThumbnailStrip::new(self.items, self.current, self.theme)
            .held(self.held)
            .focused(self.focused)
            .scroll(self.thumb_scroll)
            .render(layout.strip, buf);
    }
}
