//! OCR Layer
//!
//! Wraps the character-recognition engine behind a scoped-acquisition
//! adapter: every recognition acquires a fresh engine, runs it, and releases
//! it on every exit path. There is no warm instance; the engine and its
//! language data resolve from bundled local assets only.

pub mod tesseract;

pub use tesseract::{OcrAssets, TesseractProvider};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::debug;

/// Coarse recognition phase, for display only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcrProgress {
    /// Locating the engine core.
    LoadingCore,
    /// Starting the engine.
    Initializing,
    /// Loading per-language trained data.
    LoadingLanguageData { percent: u8 },
    /// Recognition in progress.
    Recognizing { percent: u8 },
}

impl std::fmt::Display for OcrProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrProgress::LoadingCore => write!(f, "Loading OCR engine..."),
            OcrProgress::Initializing => write!(f, "Initializing OCR engine..."),
            OcrProgress::LoadingLanguageData { percent } => {
                write!(f, "Loading language data ({percent}%)...")
            }
            OcrProgress::Recognizing { percent } => write!(f, "Recognizing ({percent}%)..."),
        }
    }
}

/// OCR failure taxonomy.
#[derive(Debug, Error)]
pub enum OcrError {
    /// A bundled engine asset is unreachable. This is a packaging defect,
    /// not a transient recognition failure.
    #[error("OCR resource unreachable: {0}")]
    ResourceLoadFailed(String),
    /// The engine ran but produced no usable text.
    #[error("no text recognized in the selected region")]
    RecognitionEmpty,
    /// Any other internal engine failure.
    #[error("OCR engine error: {0}")]
    EngineError(String),
}

/// Progress event stream feeding the presentation layer.
pub type ProgressSender = mpsc::UnboundedSender<OcrProgress>;

pub(crate) fn emit(progress: &ProgressSender, event: OcrProgress) {
    // The consumer may already be gone (overlay dismissed); that is fine.
    let _ = progress.send(event);
}

/// A single-use recognition engine.
#[async_trait]
pub trait OcrEngine: Send + std::fmt::Debug {
    /// Recognize text in a PNG image.
    async fn recognize(&mut self, image_png: &[u8]) -> Result<String, OcrError>;

    /// Release engine resources. Called exactly once per acquired engine,
    /// whether recognition succeeded or failed.
    async fn teardown(&mut self);
}

/// Lazily acquires engines, one per recognition.
#[async_trait]
pub trait EngineProvider: Send + Sync {
    async fn acquire(&self, progress: &ProgressSender) -> Result<Box<dyn OcrEngine>, OcrError>;
}

/// OCR engine adapter.
///
/// `recognize` is the only entry point: acquire engine, recognize, tear the
/// engine down, then validate the text. Empty or whitespace-only output is a
/// failure, never an empty success.
pub struct OcrAdapter<P: EngineProvider> {
    provider: P,
}

impl OcrAdapter<TesseractProvider> {
    /// Adapter backed by the bundled tesseract engine.
    pub fn bundled(assets: OcrAssets) -> Self {
        Self::new(TesseractProvider::new(assets))
    }
}

impl<P: EngineProvider> OcrAdapter<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Run one recognition pass over a PNG image.
    pub async fn recognize(
        &self,
        image_png: &[u8],
        progress: &ProgressSender,
    ) -> Result<String, OcrError> {
        let mut engine = self.provider.acquire(progress).await?;

        let outcome = engine.recognize(image_png).await;
        // Release before inspecting the result so a failed recognition can
        // never leak the engine.
        engine.teardown().await;

        let text = outcome?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(OcrError::RecognitionEmpty);
        }

        debug!("OCR recognized {} characters", trimmed.chars().count());
        Ok(trimmed.to_string())
    }
}
