//! The badge-sheet QR code with the company logo in the middle.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, RgbaImage};
use label_engine::error::QrError;
use label_engine::qr::{FIXED_QR_URL, QrStyle, error_correction, render_qr, render_qr_terminal};

use crate::config::AppConfig;
use crate::session::Session;

/// One rendering of the QR code in both output forms.
#[derive(Debug)]
pub struct QrSheet {
    pub image: RgbaImage,
    /// Same symbol as `image`, drawn with block characters.
    pub terminal: String,
    pub has_logo: bool,
}

/// Render the QR for the fixed URL, with the configured logo when it loads.
pub fn build_sheet(config: &AppConfig) -> Result<QrSheet, QrError> {
    let style = QrStyle {
        size_px: config.qr_size,
        ..QrStyle::default()
    };
    let logo = config.qr_logo.as_deref().and_then(load_logo);
    let image = render_qr(FIXED_QR_URL, &style, logo.as_ref())?;
    let terminal = render_qr_terminal(FIXED_QR_URL, error_correction(logo.is_some()))?;
    tracing::info!(size = config.qr_size, logo = logo.is_some(), "QR sheet rendered");
    Ok(QrSheet {
        image,
        terminal,
        has_logo: logo.is_some(),
    })
}

/// A missing or broken logo only costs the decoration.
fn load_logo(path: &Path) -> Option<DynamicImage> {
    match image::open(path) {
        Ok(img) => Some(img),
        Err(e) => {
            tracing::warn!(path = %path.display(), "QR logo unavailable, rendering without it: {e}");
            None
        }
    }
}

/// Write the session's QR image as PNG.
pub async fn write_qr_png(session: &Session, out: &Path) -> anyhow::Result<PathBuf> {
    let sheet = session.qr_sheet().await?;
    let out = out.to_path_buf();
    let path = out.clone();
    tokio::task::spawn_blocking(move || sheet.image.save_with_format(&out, ImageFormat::Png)).await??;
    tracing::info!(path = %path.display(), "QR code written");
    Ok(path)
}

/// The session's QR as terminal block characters.
pub async fn qr_text(session: &Session) -> Result<String, QrError> {
    Ok(session.qr_sheet().await?.terminal.clone())
}

#[cfg(test)]
mod tests {
    use image::Rgba;

    use super::*;

    #[test]
    fn missing_logo_degrades_to_plain_qr() {
        let config = AppConfig {
            qr_logo: Some(PathBuf::from("/nonexistent/logo.png")),
            ..AppConfig::default()
        };
        let sheet = build_sheet(&config).unwrap();
        assert_eq!(sheet.image.dimensions(), (280, 280));
        assert!(!sheet.has_logo);
        assert!(sheet.terminal.contains('█'));
    }

    #[test]
    fn logo_is_drawn_in_the_centre() {
        let dir = tempfile::tempdir().unwrap();
        let logo_path = dir.path().join("logo.png");
        RgbaImage::from_pixel(40, 40, Rgba([200, 0, 0, 255])).save(&logo_path).unwrap();

        let config = AppConfig {
            qr_logo: Some(logo_path),
            qr_size: 300,
            ..AppConfig::default()
        };
        let sheet = build_sheet(&config).unwrap();
        assert!(sheet.has_logo);
        let centre = sheet.image.get_pixel(150, 150);
        assert!(centre[0] > 150 && centre[1] < 60, "{centre:?}");
    }

    #[tokio::test]
    async fn writes_png_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            qr_logo: None,
            ..AppConfig::default()
        };
        let session = Session::new(config);
        let out = dir.path().join("qr.png");
        write_qr_png(&session, &out).await.unwrap();
        let decoded = image::open(&out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (280, 280));
    }
}
