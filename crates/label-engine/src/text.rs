//! Text measurement and drawing for label lines.
//!
//! The compositor goes through [`TextPainter`] so layout can be exercised
//! without a font file; [`GlyphPainter`] is the real `ab_glyph` backend.

use ab_glyph::{Font, PxScale, ScaleFont};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;

use crate::layout::TextBlock;

/// Measures and draws single lines of text at a fixed pixel size.
pub trait TextPainter {
    /// Extent of `text` when drawn by [`TextPainter::draw`].
    fn measure(&self, text: &str) -> TextBlock;

    /// Draw `text` with its top-left corner at `(x, y)`.
    fn draw(&self, img: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>);
}

/// `ab_glyph` font at a given pixel size.
#[derive(Clone)]
pub struct GlyphPainter<F> {
    font: F,
    scale: PxScale,
}

impl<F: Font> GlyphPainter<F> {
    pub fn new(font: F, px: f32) -> Self {
        Self {
            font,
            scale: PxScale::from(px),
        }
    }
}

impl<F: Font> TextPainter for GlyphPainter<F> {
    fn measure(&self, text: &str) -> TextBlock {
        TextBlock {
            width: measure_text_width(&self.font, self.scale, text),
            height: line_height(&self.font, self.scale),
        }
    }

    fn draw(&self, img: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>) {
        draw_text_mut(img, color, x, y, self.scale, &self.font, text);
    }
}

/// Advance width of `text` including pair kerning, rounded up to whole pixels.
pub fn measure_text_width(font: &impl Font, scale: PxScale, text: &str) -> u32 {
    let scaled = font.as_scaled(scale);
    let ids: Vec<_> = text.chars().map(|ch| scaled.glyph_id(ch)).collect();
    let advance: f32 = ids.iter().map(|&id| scaled.h_advance(id)).sum();
    let kerning: f32 = ids.windows(2).map(|pair| scaled.kern(pair[0], pair[1])).sum();
    (advance + kerning).ceil().max(0.0) as u32
}

/// Height of one line (ascent to descent) for the given font and scale.
pub fn line_height(font: &impl Font, scale: PxScale) -> u32 {
    let scaled = font.as_scaled(scale);
    (scaled.ascent() - scaled.descent()).ceil() as u32
}

/// Create a blank white square canvas.
pub fn blank_canvas(size: u32) -> RgbaImage {
    RgbaImage::from_pixel(size, size, Rgba([255, 255, 255, 255]))
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Monospace stand-in: every char is a `cell x height` filled box.
    pub struct BlockPainter {
        pub cell: u32,
        pub height: u32,
    }

    impl TextPainter for BlockPainter {
        fn measure(&self, text: &str) -> TextBlock {
            TextBlock {
                width: self.cell * text.chars().count() as u32,
                height: self.height,
            }
        }

        fn draw(&self, img: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>) {
            let TextBlock { width, height } = self.measure(text);
            for dy in 0..height as i32 {
                for dx in 0..width as i32 {
                    let (px, py) = (x + dx, y + dy);
                    if px >= 0 && py >= 0 && (px as u32) < img.width() && (py as u32) < img.height() {
                        img.put_pixel(px as u32, py as u32, color);
                    }
                }
            }
        }
    }
}
