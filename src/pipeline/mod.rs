//! Capture Coordinator
//!
//! Orchestrates one screenshot pipeline run: privileged capture -> crop ->
//! OCR -> translation. Steps run strictly in sequence; the first failure
//! short-circuits and is reported with the kind of the step that produced it.

use thiserror::Error;
use tracing::info;

use crate::background::BackgroundHandle;
use crate::capture::crop::{crop_frame, CropError};
use crate::capture::CaptureUnavailable;
use crate::ocr::{EngineProvider, OcrAdapter, OcrError, ProgressSender};
use crate::selection::Rect;

/// First failure of a pipeline run, by originating step.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Capture(#[from] CaptureUnavailable),
    #[error(transparent)]
    Crop(#[from] CropError),
    #[error(transparent)]
    Ocr(#[from] OcrError),
    #[error(transparent)]
    Translate(#[from] crate::translate::TranslateError),
}

/// Successful pipeline output.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    /// Text recognized in the selection.
    pub recognized: String,
    /// Its translation.
    pub translated: String,
    /// Where the result bubble goes: bottom-left of the selection.
    pub anchor: (f32, f32),
}

/// Runs the capture -> crop -> OCR -> translate sequence.
pub struct CaptureCoordinator<P: EngineProvider> {
    background: BackgroundHandle,
    ocr: OcrAdapter<P>,
}

impl<P: EngineProvider> CaptureCoordinator<P> {
    pub fn new(background: BackgroundHandle, ocr: OcrAdapter<P>) -> Self {
        Self { background, ocr }
    }

    /// Run one pipeline over the selected rectangle.
    ///
    /// The rectangle has already passed the minimum-size gate in the
    /// selector; no capture request is ever issued for a sub-minimum rect.
    pub async fn run(
        &self,
        rect: Rect,
        progress: &ProgressSender,
    ) -> Result<PipelineOutput, PipelineError> {
        let frame = self.background.capture_tab().await?;
        let crop = crop_frame(&frame, &rect)?;
        let recognized = self.ocr.recognize(&crop.png, progress).await?;
        let translated = self.background.translate_text(recognized.clone()).await?;

        info!(
            "Pipeline complete: {} chars recognized, {} chars translated",
            recognized.chars().count(),
            translated.chars().count()
        );

        Ok(PipelineOutput {
            recognized,
            translated,
            anchor: rect.bottom_left(),
        })
    }
}
