//! Styled QR code rendering with an optional centred logo.

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_filled_rect_mut};
use imageproc::rect::Rect;
use qrcode::{Color, EcLevel, QrCode};
use tracing::debug;

use crate::error::QrError;

/// Target of the badge-sheet QR code. Not user controlled.
pub const FIXED_QR_URL: &str = "https://needbadge.com/";

const FINDER: u32 = 7;
const DARK: Rgba<u8> = Rgba([0, 0, 0, 255]);
const LIGHT: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Shape of an individual data module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DotShape {
    #[default]
    Square,
    Dot,
}

/// Shape of the 7x7 finder ring in each corner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CornerSquareShape {
    Square,
    #[default]
    ExtraRounded,
}

/// Shape of the 3x3 centre of each finder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CornerDotShape {
    Square,
    #[default]
    Dot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QrStyle {
    /// Side of the output image.
    pub size_px: u32,
    /// White border around the symbol.
    pub margin_px: u32,
    pub dot_shape: DotShape,
    pub corner_square: CornerSquareShape,
    pub corner_dot: CornerDotShape,
    /// Logo side relative to the symbol side.
    pub logo_ratio: f32,
    /// White padding cleared around the logo.
    pub logo_margin_px: u32,
}

impl Default for QrStyle {
    fn default() -> Self {
        Self {
            size_px: 280,
            margin_px: 16,
            dot_shape: DotShape::Square,
            corner_square: CornerSquareShape::ExtraRounded,
            corner_dot: CornerDotShape::Dot,
            logo_ratio: 0.28,
            logo_margin_px: 6,
        }
    }
}

/// Render `data` as a styled QR image of exactly `style.size_px` pixels.
///
/// A logo raises error correction to `H` so the covered modules stay
/// recoverable.
pub fn render_qr(data: &str, style: &QrStyle, logo: Option<&DynamicImage>) -> Result<RgbaImage, QrError> {
    let level = error_correction(logo.is_some());
    let code = QrCode::with_error_correction_level(data.as_bytes(), level)?;
    let modules = code.to_colors();
    let module_count = code.width() as u32;

    let inner = style.size_px.saturating_sub(2 * style.margin_px);
    let scale = inner / module_count;
    if scale == 0 {
        return Err(QrError::TooSmall {
            size: style.size_px,
            modules: module_count,
            margin: style.margin_px,
        });
    }
    let symbol = module_count * scale;
    let origin = (style.size_px - symbol) / 2;

    let mut img = RgbaImage::from_pixel(style.size_px, style.size_px, LIGHT);

    for (i, color) in modules.iter().enumerate() {
        let mx = (i as u32) % module_count;
        let my = (i as u32) / module_count;
        if *color != Color::Dark || in_finder(mx, my, module_count) {
            continue;
        }
        let (x, y) = (origin + mx * scale, origin + my * scale);
        match style.dot_shape {
            DotShape::Square => fill_rect(&mut img, x, y, scale, scale, DARK),
            DotShape::Dot => {
                let r = (scale / 2).max(1) as i32;
                draw_filled_circle_mut(&mut img, ((x + scale / 2) as i32, (y + scale / 2) as i32), r, DARK);
            }
        }
    }

    let far = (module_count - FINDER) * scale;
    for (fx, fy) in [(0, 0), (far, 0), (0, far)] {
        draw_finder(&mut img, origin + fx, origin + fy, scale, style);
    }

    if let Some(logo) = logo {
        place_logo(&mut img, logo, symbol, style);
    }

    debug!(modules = module_count, scale, size = style.size_px, "Rendered QR code");
    Ok(img)
}

/// Error correction used by [`render_qr`]: `H` leaves room for a logo.
pub fn error_correction(with_logo: bool) -> EcLevel {
    if with_logo { EcLevel::H } else { EcLevel::M }
}

/// Half-block terminal rendering: each character covers two module rows.
///
/// Pass the level the raster used so both show the same symbol.
pub fn render_qr_terminal(data: &str, level: EcLevel) -> Result<String, QrError> {
    let code = QrCode::with_error_correction_level(data.as_bytes(), level)?;
    let colors = code.to_colors();
    let width = code.width();
    let dark = |x: usize, y: usize| colors.get(y * width + x).is_some_and(|c| *c == Color::Dark);

    // two-module quiet zone on each side
    let pad = "  ";
    let blank = format!("{pad}{}{pad}\n", " ".repeat(width));
    let mut out = blank.clone();
    for y in (0..width).step_by(2) {
        out.push_str(pad);
        for x in 0..width {
            let ch = match (dark(x, y), y + 1 < width && dark(x, y + 1)) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            };
            out.push(ch);
        }
        out.push_str(pad);
        out.push('\n');
    }
    out.push_str(&blank);
    Ok(out)
}

fn in_finder(x: u32, y: u32, n: u32) -> bool {
    let near = |v: u32| v < FINDER;
    let far = |v: u32| v >= n - FINDER;
    (near(x) && near(y)) || (far(x) && near(y)) || (near(x) && far(y))
}

fn draw_finder(img: &mut RgbaImage, x: u32, y: u32, scale: u32, style: &QrStyle) {
    let outer = FINDER * scale;
    match style.corner_square {
        CornerSquareShape::Square => {
            fill_rect(img, x, y, outer, outer, DARK);
            fill_rect(img, x + scale, y + scale, outer - 2 * scale, outer - 2 * scale, LIGHT);
        }
        CornerSquareShape::ExtraRounded => {
            fill_rounded_rect(img, x, y, outer, outer, outer / 2, DARK);
            let inner = outer - 2 * scale;
            fill_rounded_rect(img, x + scale, y + scale, inner, inner, inner / 2, LIGHT);
        }
    }

    let (cx, cy, side) = (x + 2 * scale, y + 2 * scale, 3 * scale);
    match style.corner_dot {
        CornerDotShape::Square => fill_rect(img, cx, cy, side, side, DARK),
        CornerDotShape::Dot => fill_rounded_rect(img, cx, cy, side, side, side / 2, DARK),
    }
}

fn place_logo(img: &mut RgbaImage, logo: &DynamicImage, symbol: u32, style: &QrStyle) {
    let max_side = (symbol as f32 * style.logo_ratio).floor() as u32;
    if max_side == 0 || logo.width() == 0 || logo.height() == 0 {
        return;
    }
    let ratio = (max_side as f32 / logo.width() as f32).min(max_side as f32 / logo.height() as f32);
    let w = ((logo.width() as f32 * ratio).round() as u32).max(1);
    let h = ((logo.height() as f32 * ratio).round() as u32).max(1);
    let resized = logo.resize_exact(w, h, FilterType::Lanczos3).to_rgba8();

    let size = img.width();
    let (x, y) = ((size - w) / 2, (size - h) / 2);
    let m = style.logo_margin_px;
    fill_rect(
        img,
        x.saturating_sub(m),
        y.saturating_sub(m),
        w + 2 * m,
        h + 2 * m,
        LIGHT,
    );
    imageops::overlay(img, &resized, i64::from(x), i64::from(y));
    debug!(w, h, "Placed QR logo");
}

fn fill_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, color: Rgba<u8>) {
    if w == 0 || h == 0 {
        return;
    }
    draw_filled_rect_mut(img, Rect::at(x as i32, y as i32).of_size(w, h), color);
}

fn fill_rounded_rect(img: &mut RgbaImage, x: u32, y: u32, w: u32, h: u32, radius: u32, color: Rgba<u8>) {
    let r = radius.min(w / 2).min(h / 2) as f32;
    for py in y..(y + h).min(img.height()) {
        for px in x..(x + w).min(img.width()) {
            // distance from the nearest corner-circle centre, in pixel centres
            let lx = (px - x) as f32 + 0.5;
            let ly = (py - y) as f32 + 0.5;
            let dx = (r - lx).max(lx - (w as f32 - r)).max(0.0);
            let dy = (r - ly).max(ly - (h as f32 - r)).max(0.0);
            if dx * dx + dy * dy <= r * r {
                img.put_pixel(px, py, color);
            }
        }
    }
}
