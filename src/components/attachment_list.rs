use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Widget},
};

use crate::staging::item::{ItemKind, StagedItem};
use crate::theme::ThemeColors;

/// Format bytes into a human-readable size string.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Short type tag shown in front of each row.
pub fn kind_tag(item: &StagedItem) -> &'static str {
    if item.payload.is_remote() {
        "[URL]"
    } else if item.is_image() {
        "[IMG]"
    } else {
        "[DOC]"
    }
}

/// First visible row so that `selected` stays on screen.
pub fn scroll_for(selected: usize, visible_height: usize) -> usize {
    if visible_height == 0 {
        return 0;
    }
    (selected + 1).saturating_sub(visible_height)
}

/// The staged attachments, one per row, in submission order.
pub struct AttachmentListWidget<'a> {
    items: &'a [StagedItem],
    selected: usize,
    picked: Option<usize>,
    theme: &'a ThemeColors,
    empty_hint: &'a str,
    block: Option<Block<'a>>,
}

impl<'a> AttachmentListWidget<'a> {
    pub fn new(items: &'a [StagedItem], selected: usize, theme: &'a ThemeColors) -> Self {
        Self {
            items,
            selected,
            picked: None,
            theme,
            empty_hint: "",
            block: None,
        }
    }

    /// Row currently held for keyboard reordering.
    pub fn picked(mut self, picked: Option<usize>) -> Self {
        self.picked = picked;
        self
    }

    pub fn empty_hint(mut self, hint: &'a str) -> Self {
        self.empty_hint = hint;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }
}

impl<'a> Widget for AttachmentListWidget<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner = if let Some(block) = &self.block {
            let inner = block.inner(area);
            block.clone().render(area, buf);
            inner
        } else {
            area
        };

        let visible_height = inner.height as usize;
        if visible_height == 0 || inner.width == 0 {
            return;
        }

        if self.items.is_empty() {
            let hint = Line::from(Span::styled(
                self.empty_hint,
                Style::default()
                    .fg(self.theme.dim_fg)
                    .add_modifier(Modifier::ITALIC),
            ));
            buf.set_line(inner.x + 1, inner.y, &hint, inner.width.saturating_sub(1));
            return;
        }

        let width = inner.width as usize;
        let scroll = scroll_for(self.selected, visible_height);

        for (row, (index, item)) in self
            .items
            .iter()
            .enumerate()
            .skip(scroll)
            .take(visible_height)
            .enumerate()
        {
            let y = inner.y + row as u16;
            let is_selected = index == self.selected;
            let is_picked = self.picked == Some(index);

            let style = if is_picked {
                Style::default()
                    .bg(self.theme.list_selected_bg)
                    .fg(self.theme.thumb_picked_fg)
                    .add_modifier(Modifier::BOLD)
            } else if is_selected {
                Style::default()
                    .bg(self.theme.list_selected_bg)
                    .fg(self.theme.list_selected_fg)
                    .add_modifier(Modifier::BOLD)
            } else {
                match item.kind() {
                    ItemKind::RemoteUrl { .. } => Style::default().fg(self.theme.list_remote_fg),
                    ItemKind::BinaryFile { .. } if item.is_image() => {
                        Style::default().fg(self.theme.list_image_fg)
                    }
                    ItemKind::BinaryFile { .. } => Style::default().fg(self.theme.list_fg),
                }
            };

            let marker = if is_picked { "◆" } else { " " };
            let left = format!("{} {:>2}. {} {}", marker, index + 1, kind_tag(item), item.name());
            let right = item
                .size_bytes()
                .map(format_size)
                .unwrap_or_else(|| "remote".to_string());

            let left_width = left.chars().count();
            let right_width = right.chars().count() + 1;
            let content = if left_width + right_width <= width {
                format!("{}{:>pad$} ", left, right, pad = width - left_width - 1)
            } else {
                left
            };

            if is_selected || is_picked {
                buf.set_style(Rect::new(inner.x, y, inner.width, 1), style);
            }
            let line = Line::from(Span::styled(content, style));
            buf.set_line(inner.x, y, &line, inner.width);
        }
    }
}
