//! On-screen preview of a generated barcode.

use std::path::Path;

use label_engine::barcode::{render_svg, render_terminal};
use label_engine::{BarcodeStyle, Upc12};

/// Rows of block characters in the terminal preview.
const PREVIEW_ROWS: usize = 4;

/// Terminal preview: bars followed by the UPC digits.
pub fn preview_text(code: &Upc12) -> String {
    let mut out = render_terminal(code, PREVIEW_ROWS);
    out.push_str(&format!("{:^101}\n", code.as_str()));
    out
}

/// Write the preview-sized SVG.
pub async fn write_svg(code: &Upc12, path: &Path) -> std::io::Result<()> {
    let svg = render_svg(code, &BarcodeStyle::preview());
    tokio::fs::write(path, svg).await?;
    tracing::info!(path = %path.display(), upc = %code, "SVG preview written");
    Ok(())
}
