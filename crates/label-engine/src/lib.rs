//! Employee badge label engine.
//!
//! Turns a typed employee identifier into a UPC-A barcode and composes a
//! square, print-ready label around it. Also renders the badge-sheet QR
//! code and formats the wall clock.

pub mod barcode;
pub mod clock;
pub mod compose;
pub mod error;
pub mod layout;
pub mod normalize;
pub mod qr;
pub mod text;
pub mod upc;

// Re-exports for convenience
pub use barcode::{BarcodeRenderer, BarcodeStyle, UpcARenderer};
pub use compose::{LabelConfig, LabelPainters, OutputFormat, compose_label, encode_label, label_file_name};
pub use error::{LabelError, LayoutError, QrError, RenderError};
pub use layout::{LabelLayout, LayoutConfig, TextBlock, TitlePlacement, plan_layout};
pub use normalize::normalize;
pub use upc::{CheckDigitPolicy, Upc12, encode, encode_with};
