//! Per-session state: the last generated barcode, the export flag, and caches.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use label_engine::error::QrError;
use label_engine::{BarcodeRenderer, Upc12, UpcARenderer, encode_with, normalize};
use tokio::sync::{OnceCell, RwLock};

use crate::config::AppConfig;
use crate::scratch::ScratchRegistry;
use crate::services::font::{FontError, FontSet, PainterSource};
use crate::services::qr_sheet::{self, QrSheet};

/// A generated barcode and the digits it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    pub raw_id: String,
    pub upc: Upc12,
}

/// Cloneable session handle shared by the commands and services.
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    config: AppConfig,
    renderer: Arc<dyn BarcodeRenderer>,
    /// Last generated value; `None` means export is disabled.
    current: RwLock<Option<Encoded>>,
    exporting: AtomicBool,
    painters: OnceCell<Arc<dyn PainterSource>>,
    qr: OnceCell<Arc<QrSheet>>,
    qr_builds: AtomicUsize,
    scratch: ScratchRegistry,
}

impl Session {
    pub fn new(config: AppConfig) -> Self {
        Self::with_parts(config, Arc::new(UpcARenderer), None)
    }

    /// Session with an explicit renderer and, optionally, preloaded painters.
    pub fn with_parts(
        config: AppConfig,
        renderer: Arc<dyn BarcodeRenderer>,
        painters: Option<Arc<dyn PainterSource>>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                config,
                renderer,
                current: RwLock::new(None),
                exporting: AtomicBool::new(false),
                painters: OnceCell::new_with(painters),
                qr: OnceCell::new(),
                qr_builds: AtomicUsize::new(0),
                scratch: ScratchRegistry::new(),
            }),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn renderer(&self) -> Arc<dyn BarcodeRenderer> {
        Arc::clone(&self.inner.renderer)
    }

    pub fn scratch(&self) -> &ScratchRegistry {
        &self.inner.scratch
    }

    /// Normalize and encode `input`, replacing the current value.
    ///
    /// Input without digits clears the session and disables export.
    pub async fn generate(&self, input: &str) -> Option<Encoded> {
        let raw_id = normalize(input);
        let encoded = encode_with(&raw_id, self.inner.config.check_digit_policy).map(|upc| Encoded { raw_id, upc });

        match &encoded {
            Some(e) => tracing::debug!(raw_id = %e.raw_id, upc = %e.upc, "Generated barcode"),
            None => tracing::debug!("No digits in input, session cleared"),
        }
        *self.inner.current.write().await = encoded.clone();
        encoded
    }

    pub async fn current(&self) -> Option<Encoded> {
        self.inner.current.read().await.clone()
    }

    pub async fn reset(&self) {
        *self.inner.current.write().await = None;
    }

    /// Whether an export could start right now.
    pub async fn export_ready(&self) -> bool {
        !self.inner.exporting.load(Ordering::SeqCst) && self.inner.current.read().await.is_some()
    }

    /// Claim the export slot. `None` while another export is in flight.
    pub fn try_begin_export(&self) -> Option<ExportPermit> {
        self.inner
            .exporting
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| ExportPermit {
                inner: Arc::clone(&self.inner),
            })
    }

    /// Text painters, loaded on first use.
    pub async fn painters(&self) -> Result<Arc<dyn PainterSource>, FontError> {
        self.inner
            .painters
            .get_or_try_init(|| async {
                let fonts = FontSet::load(&self.inner.config)?;
                Ok::<_, FontError>(Arc::new(fonts) as Arc<dyn PainterSource>)
            })
            .await
            .map(Arc::clone)
    }

    /// The badge-sheet QR code, rendered once per session.
    pub async fn qr_sheet(&self) -> Result<Arc<QrSheet>, QrError> {
        self.inner
            .qr
            .get_or_try_init(|| async {
                self.inner.qr_builds.fetch_add(1, Ordering::SeqCst);
                qr_sheet::build_sheet(&self.inner.config).map(Arc::new)
            })
            .await
            .map(Arc::clone)
    }

    /// How many times the QR sheet has been rendered in this session.
    pub fn qr_builds(&self) -> usize {
        self.inner.qr_builds.load(Ordering::SeqCst)
    }
}

/// Held while an export runs; dropping it re-enables export.
pub struct ExportPermit {
    inner: Arc<SessionInner>,
}

impl Drop for ExportPermit {
    fn drop(&mut self) {
        self.inner.exporting.store(false, Ordering::SeqCst);
    }
}
