//! Font loading for the label text lines.

use std::path::{Path, PathBuf};

use ab_glyph::FontArc;
use label_engine::text::{GlyphPainter, TextPainter};

use crate::config::AppConfig;

const MAX_FONT_SIZE: u64 = 50 * 1024 * 1024; // 50MB
const VALID_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

#[derive(Debug, thiserror::Error)]
pub enum FontError {
    #[error("Invalid font format (only TTF/OTF supported)")]
    InvalidFormat,
    #[error("Font file too large (max 50MB)")]
    FileTooLarge,
    #[error("Font data could not be parsed: {0}")]
    Parse(PathBuf),
    #[error("No usable {0} font found (set a font path or install system fonts)")]
    NotFound(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Painters for the title and identifier lines.
pub trait PainterSource: Send + Sync {
    fn title(&self) -> &dyn TextPainter;
    fn id(&self) -> &dyn TextPainter;
}

/// Real fonts loaded from disk.
pub struct FontSet {
    title: GlyphPainter<FontArc>,
    id: GlyphPainter<FontArc>,
}

impl FontSet {
    /// Load the configured fonts, falling back to system fonts.
    pub fn load(config: &AppConfig) -> Result<Self, FontError> {
        let title = load_font(config.title_font.as_deref(), "title", sans_candidates())?;
        let id = load_font(config.id_font.as_deref(), "identifier", mono_candidates())?;
        Ok(Self {
            title: GlyphPainter::new(title, config.title_font_px),
            id: GlyphPainter::new(id, config.id_font_px),
        })
    }
}

impl PainterSource for FontSet {
    fn title(&self) -> &dyn TextPainter {
        &self.title
    }

    fn id(&self) -> &dyn TextPainter {
        &self.id
    }
}

fn load_font(custom: Option<&Path>, role: &'static str, candidates: &[&str]) -> Result<FontArc, FontError> {
    let (path, data) = match custom {
        Some(path) => (path.to_path_buf(), read_font_file(path)?),
        None => load_system_font_data(role, candidates)?,
    };
    FontArc::try_from_vec(data).map_err(|_| FontError::Parse(path))
}

/// Read a user-supplied font file after checking extension and size.
pub fn read_font_file(path: &Path) -> Result<Vec<u8>, FontError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    if !VALID_EXTENSIONS.contains(&ext.as_str()) {
        return Err(FontError::InvalidFormat);
    }
    if std::fs::metadata(path)?.len() > MAX_FONT_SIZE {
        return Err(FontError::FileTooLarge);
    }
    Ok(std::fs::read(path)?)
}

fn load_system_font_data(role: &'static str, candidates: &[&str]) -> Result<(PathBuf, Vec<u8>), FontError> {
    for path in candidates {
        if let Ok(data) = std::fs::read(path) {
            tracing::info!(path = %path, role, "Using system font");
            return Ok((PathBuf::from(path), data));
        }
    }
    Err(FontError::NotFound(role))
}

fn sans_candidates() -> &'static [&'static str] {
    #[cfg(target_os = "macos")]
    {
        &[
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "/System/Library/Fonts/Supplemental/Helvetica.ttf",
            "/System/Library/Fonts/Helvetica.ttc",
        ]
    }
    #[cfg(target_os = "windows")]
    {
        &["C:\\Windows\\Fonts\\arial.ttf", "C:\\Windows\\Fonts\\segoeui.ttf"]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        &[
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/noto/NotoSans-Regular.ttf",
        ]
    }
}

fn mono_candidates() -> &'static [&'static str] {
    #[cfg(target_os = "macos")]
    {
        &[
            "/System/Library/Fonts/Supplemental/Courier New.ttf",
            "/System/Library/Fonts/Menlo.ttc",
            "/System/Library/Fonts/Supplemental/Arial.ttf",
        ]
    }
    #[cfg(target_os = "windows")]
    {
        &["C:\\Windows\\Fonts\\cour.ttf", "C:\\Windows\\Fonts\\consola.ttf", "C:\\Windows\\Fonts\\arial.ttf"]
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        &[
            "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
            "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        ]
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use image::{Rgba, RgbaImage};
    use label_engine::TextBlock;

    use super::*;

    /// Fixed-cell painter so tests run without font files.
    pub struct BoxPainter {
        pub cell: u32,
        pub height: u32,
    }

    impl TextPainter for BoxPainter {
        fn measure(&self, text: &str) -> TextBlock {
            TextBlock {
                width: self.cell * text.chars().count() as u32,
                height: self.height,
            }
        }

        fn draw(&self, img: &mut RgbaImage, x: i32, y: i32, text: &str, color: Rgba<u8>) {
            let TextBlock { width, height } = self.measure(text);
            for py in y.max(0) as u32..(y.max(0) as u32 + height).min(img.height()) {
                for px in x.max(0) as u32..(x.max(0) as u32 + width).min(img.width()) {
                    img.put_pixel(px, py, color);
                }
            }
        }
    }

    pub struct FakeFonts {
        pub title: BoxPainter,
        pub id: BoxPainter,
    }

    impl Default for FakeFonts {
        fn default() -> Self {
            Self {
                title: BoxPainter { cell: 30, height: 60 },
                id: BoxPainter { cell: 20, height: 40 },
            }
        }
    }

    impl PainterSource for FakeFonts {
        fn title(&self) -> &dyn TextPainter {
            &self.title
        }

        fn id(&self) -> &dyn TextPainter {
            &self.id
        }
    }
}
