//! Label export: compose, encode and write the print file.
//!
//! Rendering runs on the blocking pool under the configured timeout. The file
//! is staged in a [`ScratchFile`] and only appears under its final name once
//! fully written, so a failed export leaves nothing behind. A timed-out render
//! keeps the export slot until it actually stops.

use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use label_engine::{LabelError, LabelPainters, compose_label, encode_label, label_file_name};

use crate::scratch::ScratchFile;
use crate::services::font::FontError;
use crate::session::{Encoded, ExportPermit, Session};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Nothing to export (generate a barcode first)")]
    NothingToExport,
    #[error("An export is already in progress")]
    Busy,
    #[error("Font error: {0}")]
    Font(#[from] FontError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Label error: {0}")]
    Label(#[from] LabelError),
    #[error("Rendering took longer than {0:?}")]
    Timeout(Duration),
    #[error("Export abandoned after timeout")]
    Cancelled,
    #[error("Render task failed: {0}")]
    Join(String),
}

/// Export the session's current barcode as a label file.
///
/// Returns the path of the written file. The session state is left as is
/// whatever the outcome.
pub async fn export_current(session: &Session) -> Result<PathBuf, ExportError> {
    let encoded = session.current().await.ok_or(ExportError::NothingToExport)?;
    let permit = session.try_begin_export().ok_or(ExportError::Busy)?;

    match run_export(session, &encoded, permit).await {
        Ok(path) => {
            tracing::info!(path = %path.display(), upc = %encoded.upc, "Label exported");
            Ok(path)
        }
        Err(e) => {
            tracing::error!(raw_id = %encoded.raw_id, "Export failed: {e}");
            Err(e)
        }
    }
}

/// The permit travels into the render task, so export stays disabled until
/// that task has finished even when the caller gave up on it.
async fn run_export(session: &Session, encoded: &Encoded, permit: ExportPermit) -> Result<PathBuf, ExportError> {
    let config = session.config();
    let painters = session.painters().await?;

    tokio::fs::create_dir_all(&config.output_dir).await?;
    let name = label_file_name(&config.filename_prefix, &encoded.raw_id, config.output_format);
    let dest = config.output_dir.join(&name);
    let scratch = session.scratch().create(&config.output_dir, &name)?;

    // Whoever flips this first decides: the render task persists, or the timeout abandons.
    let settled = Arc::new(AtomicBool::new(false));

    let mut job = {
        let settled = Arc::clone(&settled);
        let renderer = session.renderer();
        let label = config.label.clone();
        let format = config.output_format;
        let encoded = encoded.clone();
        tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let painters = LabelPainters {
                title: painters.title(),
                id: painters.id(),
            };
            let img = compose_label(&encoded.upc, &encoded.raw_id, &label, renderer.as_ref(), painters)?;
            write_staged(scratch, &img, format, &dest, &settled)
        })
    };

    match tokio::time::timeout(config.render_timeout, &mut job).await {
        Ok(joined) => joined.map_err(|e| ExportError::Join(e.to_string()))?,
        Err(_) => {
            if settled.swap(true, Ordering::SeqCst) {
                // Already persisting; let it finish.
                return job.await.map_err(|e| ExportError::Join(e.to_string()))?;
            }
            tracing::warn!(timeout = ?config.render_timeout, "Render timed out, abandoning export");
            Err(ExportError::Timeout(config.render_timeout))
        }
    }
}

fn write_staged(
    mut scratch: ScratchFile,
    img: &image::RgbaImage,
    format: label_engine::OutputFormat,
    dest: &std::path::Path,
    settled: &AtomicBool,
) -> Result<PathBuf, ExportError> {
    {
        let file = scratch.file().ok_or(ExportError::Cancelled)?;
        let mut writer = BufWriter::new(file);
        encode_label(img, format, &mut writer)?;
        writer.flush()?;
    }
    if settled.swap(true, Ordering::SeqCst) {
        return Err(ExportError::Cancelled);
    }
    Ok(scratch.persist(dest)?)
}
