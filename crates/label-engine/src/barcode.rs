//! UPC-A symbol rendering: module pattern, raster image, SVG, and terminal preview.
//!
//! The compositor only talks to [`BarcodeRenderer`], so another symbology
//! renderer can be dropped in without touching layout code.

use image::{Rgb, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use tracing::debug;

use crate::error::RenderError;
use crate::upc::Upc12;

/// Total modules in a UPC-A symbol without quiet zone.
pub const UPC_MODULES: usize = 95;

/// L-code run widths (space, bar, space, bar) for digits 0-9.
/// R-code uses the same widths starting with a bar.
const DIGIT_RUNS: [[u8; 4]; 10] = [
    [3, 2, 1, 1],
    [2, 2, 2, 1],
    [2, 1, 2, 2],
    [1, 4, 1, 1],
    [1, 1, 3, 2],
    [1, 2, 3, 1],
    [1, 1, 1, 4],
    [1, 3, 1, 2],
    [1, 2, 1, 3],
    [3, 1, 1, 2],
];

const EDGE_GUARD: [bool; 3] = [true, false, true];
const CENTER_GUARD: [bool; 5] = [false, true, false, true, false];

/// Visual settings handed to a barcode renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct BarcodeStyle {
    /// Pixels per module.
    pub bar_width: u32,
    /// Bar height in pixels.
    pub bar_height: u32,
    /// Blank border in pixels on every side.
    pub margin: u32,
    pub background: Rgb<u8>,
    pub line_color: Rgb<u8>,
}

impl BarcodeStyle {
    /// Small on-screen preview.
    pub fn preview() -> Self {
        Self {
            bar_width: 2,
            bar_height: 70,
            ..Self::export()
        }
    }

    /// High-resolution source image for label export.
    pub fn export() -> Self {
        Self {
            bar_width: 4,
            bar_height: 180,
            margin: 0,
            background: Rgb([255, 255, 255]),
            line_color: Rgb([0, 0, 0]),
        }
    }
}

impl Default for BarcodeStyle {
    fn default() -> Self {
        Self::export()
    }
}

/// Something that can turn a UPC-A value into a bar image.
pub trait BarcodeRenderer: Send + Sync {
    /// Pixel size the renderer will produce, when it can tell without rendering.
    fn intrinsic_size(&self, code: &Upc12, style: &BarcodeStyle) -> Option<(u32, u32)>;

    /// Render the bars (no human-readable text).
    fn render(&self, code: &Upc12, style: &BarcodeStyle) -> Result<RgbaImage, RenderError>;
}

/// Built-in UPC-A renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpcARenderer;

impl BarcodeRenderer for UpcARenderer {
    fn intrinsic_size(&self, _code: &Upc12, style: &BarcodeStyle) -> Option<(u32, u32)> {
        if style.bar_width == 0 || style.bar_height == 0 {
            return None;
        }
        Some((
            UPC_MODULES as u32 * style.bar_width + 2 * style.margin,
            style.bar_height + 2 * style.margin,
        ))
    }

    fn render(&self, code: &Upc12, style: &BarcodeStyle) -> Result<RgbaImage, RenderError> {
        if style.bar_width == 0 {
            return Err(RenderError::InvalidStyle("bar width must be positive"));
        }
        if style.bar_height == 0 {
            return Err(RenderError::InvalidStyle("bar height must be positive"));
        }
        let (w, h) = self
            .intrinsic_size(code, style)
            .ok_or(RenderError::InvalidStyle("no intrinsic size"))?;

        let modules = upc_modules(code);
        let mut img = RgbaImage::from_pixel(w, h, opaque(style.background));
        let line = opaque(style.line_color);
        for (start, len) in bar_runs(&modules) {
            let x = style.margin + start as u32 * style.bar_width;
            let rect = Rect::at(x as i32, style.margin as i32)
                .of_size(len as u32 * style.bar_width, style.bar_height);
            draw_filled_rect_mut(&mut img, rect, line);
        }

        debug!(code = %code, w, h, "Rendered UPC-A raster");
        Ok(img)
    }
}

/// The 95-module UPC-A pattern, `true` for a dark module.
pub fn upc_modules(code: &Upc12) -> [bool; UPC_MODULES] {
    let digits = code.digits();
    let mut out = [false; UPC_MODULES];
    let mut pos = 0usize;

    let mut push = |bits: &[bool]| {
        out[pos..pos + bits.len()].copy_from_slice(bits);
        pos += bits.len();
    };

    push(&EDGE_GUARD);
    for &d in &digits[..6] {
        push(&digit_bits(d, false));
    }
    push(&CENTER_GUARD);
    for &d in &digits[6..] {
        push(&digit_bits(d, true));
    }
    push(&EDGE_GUARD);

    out
}

fn digit_bits(digit: u8, right_half: bool) -> [bool; 7] {
    let mut bits = [false; 7];
    let mut i = 0usize;
    // left digits open with a space, right digits with a bar
    let mut dark = right_half;
    for run in DIGIT_RUNS[digit as usize] {
        for _ in 0..run {
            bits[i] = dark;
            i += 1;
        }
        dark = !dark;
    }
    bits
}

/// Contiguous dark runs as `(first_module, length)`.
pub fn bar_runs(modules: &[bool]) -> Vec<(usize, usize)> {
    let mut runs = Vec::new();
    let mut start: Option<usize> = None;
    for (i, &dark) in modules.iter().enumerate() {
        match (dark, start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i - s));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        runs.push((s, modules.len() - s));
    }
    runs
}

/// Scalable SVG markup of the bars, sized like the raster output.
pub fn render_svg(code: &Upc12, style: &BarcodeStyle) -> String {
    let bar_width = style.bar_width.max(1);
    let w = UPC_MODULES as u32 * bar_width + 2 * style.margin;
    let h = style.bar_height.max(1) + 2 * style.margin;

    let mut svg = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\" preserveAspectRatio=\"xMidYMid meet\">\n"
    );
    svg.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" fill=\"{}\"/>\n",
        hex_color(style.background)
    ));
    let fill = hex_color(style.line_color);
    for (start, len) in bar_runs(&upc_modules(code)) {
        svg.push_str(&format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{fill}\"/>\n",
            style.margin + start as u32 * bar_width,
            style.margin,
            len as u32 * bar_width,
            style.bar_height.max(1),
        ));
    }
    svg.push_str("</svg>\n");
    svg
}

/// Block-character preview for terminals, one column per module.
pub fn render_terminal(code: &Upc12, rows: usize) -> String {
    let quiet = "   ";
    let line: String = upc_modules(code)
        .iter()
        .map(|&dark| if dark { '█' } else { ' ' })
        .collect();
    let mut out = String::new();
    for _ in 0..rows.max(1) {
        out.push_str(quiet);
        out.push_str(&line);
        out.push_str(quiet);
        out.push('\n');
    }
    out
}

/// Parse `#rrggbb` or `rrggbb`.
pub fn parse_hex_color(s: &str) -> Option<Rgb<u8>> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some(Rgb([channel(0)?, channel(2)?, channel(4)?]))
}

pub fn hex_color(c: Rgb<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", c[0], c[1], c[2])
}

fn opaque(c: Rgb<u8>) -> Rgba<u8> {
    Rgba([c[0], c[1], c[2], 255])
}
