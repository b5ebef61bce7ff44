//! Screen Capture Layer
//!
//! The privileged side of the pipeline: produces full-viewport frames of the
//! visible screen. Frames are transported between contexts as PNG data URLs
//! so the content side never shares memory with the capturing side.

pub mod crop;
pub mod frame;

pub use frame::CaptureFrame;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

/// Screen capture failure; the privileged context could not produce a frame.
#[derive(Debug, Error)]
#[error("screen capture unavailable: {0}")]
pub struct CaptureUnavailable(pub String);

/// Source of full-viewport frames.
///
/// Implemented by the real monitor grabber; tests substitute their own.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Capture the visible screen as a transportable frame.
    async fn capture(&self) -> Result<CaptureFrame, CaptureUnavailable>;
}

/// Captures the selected monitor through `xcap`.
pub struct MonitorSource {
    /// Monitor index; 0 selects the primary monitor.
    monitor: usize,
}

impl MonitorSource {
    pub fn new(monitor: usize) -> Self {
        Self { monitor }
    }
}

#[async_trait]
impl FrameSource for MonitorSource {
    async fn capture(&self) -> Result<CaptureFrame, CaptureUnavailable> {
        let index = self.monitor;

        // xcap talks to the display server; keep it off the async threads.
        let frame = tokio::task::spawn_blocking(move || {
            let monitors = xcap::Monitor::all()
                .map_err(|e| CaptureUnavailable(format!("monitor enumeration failed: {e}")))?;

            let monitor = if index == 0 {
                monitors
                    .iter()
                    .find(|m| m.is_primary())
                    .or_else(|| monitors.first())
            } else {
                monitors.get(index)
            }
            .ok_or_else(|| CaptureUnavailable(format!("monitor {index} not found")))?;

            let image = monitor
                .capture_image()
                .map_err(|e| CaptureUnavailable(format!("capture failed: {e}")))?;
            let scale = monitor.scale_factor();

            debug!(
                "Captured {}x{} frame from monitor {} (scale {})",
                image.width(),
                image.height(),
                index,
                scale
            );

            CaptureFrame::from_image(&image::DynamicImage::ImageRgba8(image), scale)
                .map_err(|e| CaptureUnavailable(format!("frame encode failed: {e}")))
        })
        .await
        .map_err(|e| CaptureUnavailable(format!("capture task failed: {e}")))??;

        Ok(frame)
    }
}
