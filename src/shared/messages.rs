//! Message types for communication between contexts

use tokio::sync::oneshot;

use crate::capture::{CaptureFrame, CaptureUnavailable};
use crate::translate::TranslateError;

/// Commands dispatched to the content controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentCommand {
    /// Translate the currently selected text.
    TriggerTranslation,
    /// Enter screenshot-selection mode.
    ShowScreenshotOverlay,
}

/// Requests served by the privileged background service.
///
/// Errors travel back as values over the reply channel; a failed request
/// never unwinds across contexts.
#[derive(Debug)]
pub enum BackgroundRequest {
    /// Capture the visible screen as a transportable frame.
    CaptureTab {
        reply: oneshot::Sender<Result<CaptureFrame, CaptureUnavailable>>,
    },
    /// Translate text using the persisted settings.
    TranslateText {
        text: String,
        reply: oneshot::Sender<Result<String, TranslateError>>,
    },
}
