pub mod clock;
pub mod export;
pub mod font;
pub mod preview;
pub mod qr_sheet;
