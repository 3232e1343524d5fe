//! Label composition: barcode plus title and identifier on a square canvas.

use std::io::Write;
use std::str::FromStr;

use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbImage, RgbaImage};
use tracing::{debug, info};

use crate::barcode::{BarcodeRenderer, BarcodeStyle};
use crate::error::{LabelError, RenderError};
use crate::layout::{LabelLayout, LayoutConfig, plan_layout};
use crate::text::{TextPainter, blank_canvas};
use crate::upc::Upc12;

/// Default heading printed above the barcode.
pub const DEFAULT_TITLE: &str = "Digital Employee ID Card";

/// Raster format of the exported label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Baseline JPEG at quality 100.
    #[default]
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Ok(Self::Jpeg),
            "png" => Ok(Self::Png),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Everything that shapes the exported label apart from fonts.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelConfig {
    pub layout: LayoutConfig,
    pub title_text: String,
    /// Style of the high-resolution source barcode.
    pub barcode_style: BarcodeStyle,
    pub text_color: Rgba<u8>,
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            layout: LayoutConfig::default(),
            title_text: DEFAULT_TITLE.to_string(),
            barcode_style: BarcodeStyle::export(),
            text_color: Rgba([0, 0, 0, 255]),
        }
    }
}

/// Painters for the two text lines (they usually differ in size and face).
#[derive(Clone, Copy)]
pub struct LabelPainters<'a> {
    pub title: &'a dyn TextPainter,
    pub id: &'a dyn TextPainter,
}

/// Plan the label without rendering anything.
pub fn plan_label(
    code: &Upc12,
    raw_id: &str,
    config: &LabelConfig,
    renderer: &dyn BarcodeRenderer,
    painters: LabelPainters<'_>,
) -> Result<LabelLayout, LabelError> {
    let intrinsic = renderer.intrinsic_size(code, &config.barcode_style);
    let title = painters.title.measure(&config.title_text);
    let id = painters.id.measure(raw_id);
    Ok(plan_layout(intrinsic, &config.layout, title, id)?)
}

/// Compose the exportable label image.
///
/// Fails without returning a partial image when the renderer errors or
/// hands back an empty raster.
pub fn compose_label(
    code: &Upc12,
    raw_id: &str,
    config: &LabelConfig,
    renderer: &dyn BarcodeRenderer,
    painters: LabelPainters<'_>,
) -> Result<RgbaImage, LabelError> {
    let layout = plan_label(code, raw_id, config, renderer, painters)?;
    let mut canvas = blank_canvas(layout.canvas_size);

    let bars = renderer.render(code, &config.barcode_style)?;
    if bars.width() == 0 || bars.height() == 0 {
        return Err(RenderError::EmptyImage {
            width: bars.width(),
            height: bars.height(),
        }
        .into());
    }

    // Nearest keeps bar edges hard after scaling; bars are opaque so a plain copy suffices.
    let scaled = imageops::resize(&bars, layout.barcode.width, layout.barcode.height, FilterType::Nearest);
    imageops::replace(&mut canvas, &scaled, i64::from(layout.barcode.x), i64::from(layout.barcode.y));

    painters.title.draw(
        &mut canvas,
        layout.title.x as i32,
        layout.title.y as i32,
        &config.title_text,
        config.text_color,
    );
    painters
        .id
        .draw(&mut canvas, layout.id.x as i32, layout.id.y as i32, raw_id, config.text_color);

    info!(code = %code, raw_id, size = layout.canvas_size, "Composed label");
    Ok(canvas)
}

/// Encode the label at maximum quality.
pub fn encode_label<W: Write>(img: &RgbaImage, format: OutputFormat, writer: W) -> Result<(), LabelError> {
    match format {
        OutputFormat::Jpeg => {
            let rgb: RgbImage = img.convert();
            rgb.write_with_encoder(JpegEncoder::new_with_quality(writer, 100))?;
        }
        OutputFormat::Png => {
            img.write_with_encoder(PngEncoder::new(writer))?;
        }
    }
    debug!(?format, w = img.width(), h = img.height(), "Encoded label");
    Ok(())
}

/// `EMPLOYEE_ID_123.jpg` style download name.
pub fn label_file_name(prefix: &str, raw_id: &str, format: OutputFormat) -> String {
    format!("{prefix}{raw_id}.{}", format.extension())
}
