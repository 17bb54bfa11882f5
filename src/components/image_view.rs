use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};

use crate::preview::preload::DecodedImage;

/// Upper half block: foreground paints the top pixel, background the bottom.
const HALF_BLOCK: &str = "▀";

/// Size in (columns, pixel rows) of an `width`x`height` image scaled to fit
/// `cols`x`pixel_rows` with its aspect ratio kept. Never returns zero for a
/// non-empty image and a non-empty box.
pub fn fit(width: u32, height: u32, cols: u16, pixel_rows: u16) -> (u16, u16) {
    if width == 0 || height == 0 || cols == 0 || pixel_rows == 0 {
        return (0, 0);
    }
    let scale = (cols as f64 / width as f64).min(pixel_rows as f64 / height as f64);
    let w = ((width as f64 * scale).floor() as u16).clamp(1, cols);
    let h = ((height as f64 * scale).floor() as u16).clamp(1, pixel_rows);
    (w, h)
}

/// Renders a decoded image with half-block characters, two pixels per cell,
/// centred in the given area.
pub struct ImageView<'a> {
    image: &'a DecodedImage,
}

impl<'a> ImageView<'a> {
    pub fn new(image: &'a DecodedImage) -> Self {
        Self { image }
    }

    fn sample(&self, x: u16, y: u16, w: u16, h: u16) -> Color {
        let src = &self.image.pixels;
        let sx = ((x as u32 * src.width()) / w as u32).min(src.width() - 1);
        let sy = ((y as u32 * src.height()) / h as u32).min(src.height() - 1);
        let [r, g, b] = src.get_pixel(sx, sy).0;
        Color::Rgb(r, g, b)
    }
}

impl<'a> Widget for ImageView<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let src = &self.image.pixels;
        let (w, h) = fit(
            src.width(),
            src.height(),
            area.width,
            area.height.saturating_mul(2),
        );
        if w == 0 || h == 0 {
            return;
        }

        let cell_rows = h.div_ceil(2);
        let x0 = area.x + (area.width - w) / 2;
        let y0 = area.y + (area.height - cell_rows) / 2;

        for row in 0..cell_rows {
            for col in 0..w {
                let top = self.sample(col, row * 2, w, h);
                let Some(cell) = buf.cell_mut((x0 + col, y0 + row)) else {
                    continue;
                };
                cell.set_symbol(HALF_BLOCK).set_fg(top);
                if row * 2 + 1 < h {
                    cell.set_bg(self.sample(col, row * 2 + 1, w, h));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn two_tone(width: u32, height: u32) -> DecodedImage {
        let pixels = RgbImage::from_fn(width, height, |_, y| {
            if y < height / 2 {
                Rgb([255, 0, 0])
            } else {
                Rgb([0, 0, 255])
            }
        });
        DecodedImage {
            width,
            height,
            pixels,
        }
    }

    #[test]
    fn fit_keeps_aspect_ratio() {
        assert_eq!(fit(100, 50, 40, 40), (40, 20));
        assert_eq!(fit(50, 100, 40, 40), (20, 40));
        assert_eq!(fit(10, 10, 40, 20), (20, 20));
    }

    #[test]
    fn fit_degenerate_inputs() {
        assert_eq!(fit(0, 10, 40, 40), (0, 0));
        assert_eq!(fit(10, 10, 0, 40), (0, 0));
        assert_eq!(fit(1000, 1, 10, 10), (10, 1));
    }

    #[test]
    fn paints_half_blocks_top_and_bottom() {
        let img = two_tone(4, 4);
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        ImageView::new(&img).render(area, &mut buf);

        let top = buf.cell((0, 0)).unwrap();
        assert_eq!(top.symbol(), HALF_BLOCK);
        assert_eq!(top.fg, Color::Rgb(255, 0, 0));
        assert_eq!(top.bg, Color::Rgb(255, 0, 0));
        let bottom = buf.cell((3, 1)).unwrap();
        assert_eq!(bottom.fg, Color::Rgb(0, 0, 255));
        assert_eq!(bottom.bg, Color::Rgb(0, 0, 255));
    }

    #[test]
    fn image_is_centred() {
        let img = two_tone(2, 2);
        let area = Rect::new(0, 0, 10, 1);
        let mut buf = Buffer::empty(area);
        ImageView::new(&img).render(area, &mut buf);

        // 2x2 pixels fit into 2 columns of one cell row, centred in 10.
        assert_eq!(buf.cell((3, 0)).unwrap().symbol(), " ");
        assert_eq!(buf.cell((4, 0)).unwrap().symbol(), HALF_BLOCK);
        assert_eq!(buf.cell((5, 0)).unwrap().symbol(), HALF_BLOCK);
        assert_eq!(buf.cell((6, 0)).unwrap().symbol(), " ");
    }
}
