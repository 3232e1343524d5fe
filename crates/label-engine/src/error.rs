//! Error types for barcode rendering, layout, and label composition.

use thiserror::Error;

/// The barcode renderer could not produce a usable image.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("UPC-A value must be 12 ASCII digits, got {0:?}")]
    InvalidCode(String),
    #[error("barcode renderer produced an empty image ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("barcode style is unusable: {0}")]
    InvalidStyle(&'static str),
}

/// The requested geometry cannot hold every element without overlap.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("quiet-zone box {box_w}x{box_h} exceeds canvas {canvas}")]
    BoxExceedsCanvas { box_w: u32, box_h: u32, canvas: u32 },
    #[error("{line} text ({width}x{height}) does not fit in the free space")]
    TextDoesNotFit {
        line: &'static str,
        width: u32,
        height: u32,
    },
}

#[derive(Debug, Error)]
pub enum QrError {
    #[error("QR encode error: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("QR canvas {size}px too small for {modules} modules plus {margin}px margin")]
    TooSmall { size: u32, modules: u32, margin: u32 },
}

/// Any failure while producing an exportable label.
#[derive(Debug, Error)]
pub enum LabelError {
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("image encode error: {0}")]
    Encode(#[from] image::ImageError),
}
