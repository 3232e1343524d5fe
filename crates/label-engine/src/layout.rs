//! Label geometry: where the barcode and the two text lines go on the canvas.
//!
//! Everything here is pure arithmetic so the placement can be checked
//! without fonts or a renderer.

use tracing::debug;

use crate::error::LayoutError;

/// Where the title and identifier lines sit relative to the barcode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TitlePlacement {
    /// Title centred above the barcode, identifier centred below it.
    #[default]
    Split,
    /// Title and identifier stacked together above the barcode.
    Stacked,
}

impl std::str::FromStr for TitlePlacement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "split" => Ok(Self::Split),
            "stacked" => Ok(Self::Stacked),
            other => Err(format!("unknown title placement: {other}")),
        }
    }
}

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn within(&self, size: u32) -> bool {
        self.right() <= size && self.bottom() <= size
    }
}

/// Measured extent of one line of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextBlock {
    pub width: u32,
    pub height: u32,
}

/// Geometry knobs shared by every label variant.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Side of the square canvas.
    pub canvas_size: u32,
    /// Quiet-zone box the barcode is scaled into.
    pub barcode_max_width: u32,
    pub barcode_max_height: u32,
    pub placement: TitlePlacement,
    /// Vertical space between title and identifier in [`TitlePlacement::Stacked`].
    pub text_gap: u32,
    /// Barcode size assumed when the renderer cannot report one.
    pub fallback_size: (u32, u32),
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_size: 3000,
            barcode_max_width: 2400,
            barcode_max_height: 1050,
            placement: TitlePlacement::Split,
            text_gap: 40,
            fallback_size: (2000, 600),
        }
    }
}

/// Resolved placement of every element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelLayout {
    pub canvas_size: u32,
    pub scale: f64,
    pub barcode: Rect,
    pub title: Rect,
    pub id: Rect,
}

/// Compute the label geometry.
///
/// `intrinsic` is the renderer-reported barcode size; `None` or a zero side
/// falls back to [`LayoutConfig::fallback_size`].
pub fn plan_layout(
    intrinsic: Option<(u32, u32)>,
    config: &LayoutConfig,
    title: TextBlock,
    id: TextBlock,
) -> Result<LabelLayout, LayoutError> {
    let size = config.canvas_size;
    if config.barcode_max_width > size || config.barcode_max_height > size {
        return Err(LayoutError::BoxExceedsCanvas {
            box_w: config.barcode_max_width,
            box_h: config.barcode_max_height,
            canvas: size,
        });
    }

    let (sw, sh) = match intrinsic {
        Some((w, h)) if w > 0 && h > 0 => (w, h),
        _ => {
            debug!(?intrinsic, fallback = ?config.fallback_size, "Using fallback barcode size");
            config.fallback_size
        }
    };
    let (sw, sh) = (f64::from(sw.max(1)), f64::from(sh.max(1)));

    let scale = (f64::from(config.barcode_max_width) / sw).min(f64::from(config.barcode_max_height) / sh);
    let bw = ((sw * scale).round() as u32).clamp(1, config.barcode_max_width.max(1));
    let bh = ((sh * scale).round() as u32).clamp(1, config.barcode_max_height.max(1));
    let bx = (f64::from(size - bw) / 2.0).round() as u32;
    let by = (f64::from(size - bh) / 2.0).round() as u32;
    let barcode = Rect {
        x: bx,
        y: by,
        width: bw,
        height: bh,
    };

    let top_band = by;
    let bottom_start = barcode.bottom();
    let bottom_band = size - bottom_start;

    let (title_y, id_y) = match config.placement {
        TitlePlacement::Split => {
            fits("title", title, top_band, size)?;
            fits("id", id, bottom_band, size)?;
            let title_y = centered_in(0, top_band, title.height);
            let id_y = centered_in(bottom_start, bottom_band, id.height);
            (title_y, id_y)
        }
        TitlePlacement::Stacked => {
            let block = TextBlock {
                width: title.width.max(id.width),
                height: title.height + config.text_gap + id.height,
            };
            fits("title", title, size, size)?;
            fits("id", id, size, size)?;
            fits("text block", block, top_band, size)?;
            let top = centered_in(0, top_band, block.height);
            (top, top + title.height + config.text_gap)
        }
    };

    let layout = LabelLayout {
        canvas_size: size,
        scale,
        barcode,
        title: line_rect(title, title_y, size),
        id: line_rect(id, id_y, size),
    };
    debug!(?layout, "Planned label layout");
    Ok(layout)
}

fn fits(line: &'static str, text: TextBlock, band: u32, size: u32) -> Result<(), LayoutError> {
    if text.height > band || text.width > size {
        return Err(LayoutError::TextDoesNotFit {
            line,
            width: text.width,
            height: text.height,
        });
    }
    Ok(())
}

fn centered_in(start: u32, band: u32, height: u32) -> u32 {
    start + (f64::from(band - height) / 2.0).round() as u32
}

fn line_rect(text: TextBlock, y: u32, size: u32) -> Rect {
    Rect {
        x: (size - text.width) / 2,
        y,
        width: text.width,
        height: text.height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(width: u32, height: u32) -> TextBlock {
        TextBlock { width, height }
    }

    fn check_invariants(l: &LabelLayout) {
        let s = l.canvas_size;
        assert!(l.barcode.within(s), "barcode {:?}", l.barcode);
        assert!(l.title.within(s), "title {:?}", l.title);
        assert!(l.id.within(s), "id {:?}", l.id);
        assert!(!l.title.intersects(&l.barcode));
        assert!(!l.id.intersects(&l.barcode));
        assert!(!l.title.intersects(&l.id));
    }

    #[test]
    fn default_label_matches_reference_geometry() {
        // 95 modules * 4px wide, 180px tall
        let l = plan_layout(
            Some((380, 180)),
            &LayoutConfig::default(),
            block(1500, 139),
            block(700, 84),
        )
        .unwrap();
        // width bound: 2400/380 = 6.315..., height bound: 1050/180 = 5.83...
        assert!((l.scale - 1050.0 / 180.0).abs() < 1e-9);
        assert_eq!(l.barcode.height, 1050);
        assert_eq!(l.barcode.width, 2217);
        assert_eq!(l.barcode.x, 392);
        assert_eq!(l.barcode.y, 975);
        assert_eq!(l.title.y, 418);
        assert_eq!(l.id.y, 2025 + 446);
        assert_eq!(l.title.x, 750);
        check_invariants(&l);
    }

    #[test]
    fn unknown_intrinsic_size_uses_fallback() {
        let config = LayoutConfig::default();
        let a = plan_layout(None, &config, block(10, 10), block(10, 10)).unwrap();
        let b = plan_layout(Some((0, 180)), &config, block(10, 10), block(10, 10)).unwrap();
        let c = plan_layout(Some((2000, 600)), &config, block(10, 10), block(10, 10)).unwrap();
        assert_eq!(a, c);
        assert_eq!(b, c);
    }

    #[test]
    fn containment_holds_across_sizes() {
        let intrinsic = [(1, 1), (95, 10), (380, 180), (4000, 50), (50, 4000), (2000, 600)];
        for size in [200u32, 1000, 3000] {
            for placement in [TitlePlacement::Split, TitlePlacement::Stacked] {
                let config = LayoutConfig {
                    canvas_size: size,
                    barcode_max_width: size * 4 / 5,
                    barcode_max_height: size / 3,
                    placement,
                    text_gap: size / 100,
                    fallback_size: (2000, 600),
                };
                for wh in intrinsic {
                    let l = plan_layout(Some(wh), &config, block(size / 4, size / 20), block(size / 5, size / 25))
                        .unwrap();
                    check_invariants(&l);
                }
            }
        }
    }

    #[test]
    fn stacked_puts_both_lines_above_barcode() {
        let config = LayoutConfig {
            placement: TitlePlacement::Stacked,
            ..LayoutConfig::default()
        };
        let l = plan_layout(Some((380, 180)), &config, block(1500, 139), block(700, 84)).unwrap();
        assert!(l.id.bottom() <= l.barcode.y);
        assert_eq!(l.id.y, l.title.bottom() + config.text_gap);
        check_invariants(&l);
    }

    #[test]
    fn oversized_text_is_rejected() {
        let config = LayoutConfig::default();
        let err = plan_layout(Some((380, 180)), &config, block(100, 2000), block(10, 10)).unwrap_err();
        assert!(matches!(err, LayoutError::TextDoesNotFit { line: "title", .. }));
        let err = plan_layout(Some((380, 180)), &config, block(10, 10), block(3001, 10)).unwrap_err();
        assert!(matches!(err, LayoutError::TextDoesNotFit { line: "id", .. }));
    }

    #[test]
    fn stacked_block_taller_than_band_names_the_block() {
        let config = LayoutConfig {
            placement: TitlePlacement::Stacked,
            ..LayoutConfig::default()
        };
        // each line fits on its own, together they overflow the band above the barcode
        let err = plan_layout(Some((380, 180)), &config, block(1000, 500), block(700, 500)).unwrap_err();
        assert_eq!(
            err,
            LayoutError::TextDoesNotFit {
                line: "text block",
                width: 1000,
                height: 500 + config.text_gap + 500,
            }
        );
    }

    #[test]
    fn box_larger_than_canvas_is_rejected() {
        let config = LayoutConfig {
            barcode_max_width: 3001,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            plan_layout(None, &config, block(1, 1), block(1, 1)),
            Err(LayoutError::BoxExceedsCanvas { .. })
        ));
    }

    #[test]
    fn planning_is_deterministic() {
        let config = LayoutConfig::default();
        let a = plan_layout(Some((380, 180)), &config, block(1500, 139), block(700, 84)).unwrap();
        let b = plan_layout(Some((380, 180)), &config, block(1500, 139), block(700, 84)).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.scale.to_bits(), b.scale.to_bits());
    }

    #[test]
    fn placement_from_str() {
        assert_eq!("split".parse::<TitlePlacement>(), Ok(TitlePlacement::Split));
        assert_eq!("stacked".parse::<TitlePlacement>(), Ok(TitlePlacement::Stacked));
        assert!("left".parse::<TitlePlacement>().is_err());
    }
}
