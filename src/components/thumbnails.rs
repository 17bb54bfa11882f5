use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Widget},
};

use crate::staging::item::StagedItem;
use crate::theme::ThemeColors;

pub const THUMB_WIDTH: u16 = 14;
pub const THUMB_GAP: u16 = 1;
/// Rows the strip needs: a bordered box with one label row.
pub const STRIP_HEIGHT: u16 = 3;

/// How many thumbnails fit side by side in `width` columns.
pub fn visible_count(width: u16) -> usize {
    (((width + THUMB_GAP) / (THUMB_WIDTH + THUMB_GAP)) as usize).max(1)
}

/// Smallest scroll change that brings `index` into a window of `visible`.
pub fn scroll_into_view(scroll: usize, index: usize, visible: usize) -> usize {
    if index < scroll {
        index
    } else if index >= scroll + visible {
        index + 1 - visible
    } else {
        scroll
    }
}

/// Screen rectangle of every visible thumbnail, keyed by list index.
pub fn thumb_rects(area: Rect, len: usize, scroll: usize) -> Vec<(usize, Rect)> {
    let visible = visible_count(area.width);
    (scroll..len.min(scroll + visible))
        .enumerate()
        .filter_map(|(slot, index)| {
            let x = area.x + slot as u16 * (THUMB_WIDTH + THUMB_GAP);
            let width = THUMB_WIDTH.min((area.x + area.width).saturating_sub(x));
            (width > 0).then(|| (index, Rect::new(x, area.y, width, STRIP_HEIGHT.min(area.height))))
        })
        .collect()
}

/// Clickable, draggable row of thumbnails under the preview image.
pub struct ThumbnailStrip<'a> {
    items: &'a [StagedItem],
    current: usize,
    held: Option<usize>,
    focused: Option<usize>,
    scroll: usize,
    theme: &'a ThemeColors,
}

impl<'a> ThumbnailStrip<'a> {
    pub fn new(items: &'a [StagedItem], current: usize, theme: &'a ThemeColors) -> Self {
        Self {
            items,
            current,
            held: None,
            focused: None,
            scroll: 0,
            theme,
        }
    }

    /// Thumbnail being dragged or held for a keyboard move.
    pub fn held(mut self, index: Option<usize>) -> Self {
        self.held = index;
        self
    }

    /// Keyboard focus, when the strip has it.
    pub fn focused(mut self, index: Option<usize>) -> Self {
        self.focused = index;
        self
    }

    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }
}

impl<'a> Widget for ThumbnailStrip<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width == 0 {
            return;
        }
        for (index, rect) in thumb_rects(area, self.items.len(), self.scroll) {
            let item = &self.items[index];
            let is_held = self.held == Some(index);
            let is_current = index == self.current;
            let is_focused = self.focused == Some(index);

            let border_style = if is_held {
                Style::default()
                    .fg(self.theme.thumb_picked_fg)
                    .add_modifier(Modifier::BOLD)
            } else if is_current {
                Style::default()
                    .fg(self.theme.thumb_current_fg)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(self.theme.thumb_fg)
            };
            let border_type = if is_current || is_held {
                BorderType::Thick
            } else {
                BorderType::Rounded
            };

            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(border_type)
                .border_style(border_style)
                .title(format!("{}", index + 1));
            let inner = block.inner(rect);
            block.render(rect, buf);

            if inner.width == 0 || inner.height == 0 {
                continue;
            }
            let mut label_style = Style::default().fg(self.theme.preview_fg);
            if is_focused {
                label_style = label_style.add_modifier(Modifier::REVERSED);
            }
            let label: String = item.name().chars().take(inner.width as usize).collect();
            buf.set_line(
                inner.x,
                inner.y,
                &Line::from(Span::styled(label, label_style)),
                inner.width,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::staging::item::{Attachment, Blob};
    use crate::theme;

    fn items(n: usize) -> Vec<StagedItem> {
        (0..n)
            .map(|i| {
                StagedItem::new(Attachment::binary(
                    format!("img{}.png", i),
                    "image/png",
                    Blob::new(vec![0; 4]),
                ))
            })
            .collect()
    }

    #[test]
    fn visible_count_rounds_down_with_minimum_one() {
        assert_eq!(visible_count(14), 1);
        assert_eq!(visible_count(29), 2);
        assert_eq!(visible_count(43), 2);
        assert_eq!(visible_count(44), 3);
        assert_eq!(visible_count(3), 1);
    }

    #[test]
    fn scroll_into_view_moves_minimally() {
        assert_eq!(scroll_into_view(0, 2, 3), 0);
        assert_eq!(scroll_into_view(0, 5, 3), 3);
        assert_eq!(scroll_into_view(4, 1, 3), 1);
    }

    #[test]
    fn rects_follow_scroll() {
        let area = Rect::new(2, 10, 45, 3);
        let rects = thumb_rects(area, 10, 4);
        let indices: Vec<usize> = rects.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![4, 5, 6]);
        assert_eq!(rects[0].1, Rect::new(2, 10, 14, 3));
        assert_eq!(rects[1].1.x, 17);
    }

    #[test]
    fn rects_stop_at_list_end() {
        let rects = thumb_rects(Rect::new(0, 0, 100, 3), 2, 0);
        assert_eq!(rects.len(), 2);
    }

    #[test]
    fn current_and_held_are_styled() {
        let tc = theme::dark_theme();
        let items = items(3);
        let area = Rect::new(0, 0, 45, 3);
        let mut buf = Buffer::empty(area);
        ThumbnailStrip::new(&items, 0, &tc)
            .held(Some(2))
            .focused(Some(1))
            .render(area, &mut buf);

        assert_eq!(buf.cell((0, 0)).unwrap().fg, tc.thumb_current_fg);
        assert_eq!(buf.cell((15, 0)).unwrap().fg, tc.thumb_fg);
        assert_eq!(buf.cell((30, 0)).unwrap().fg, tc.thumb_picked_fg);
        assert!(buf
            .cell((16, 1))
            .unwrap()
            .modifier
            .contains(Modifier::REVERSED));
        let label: String = (1..13)
            .map(|x| buf.cell((x, 1)).unwrap().symbol().to_string())
            .collect();
        assert_eq!(label.trim_end(), "img0.png");
    }
}
