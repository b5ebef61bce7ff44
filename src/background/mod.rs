//! Background service
//!
//! The privileged context: the only place with access to the screen grabber
//! and the translation endpoint. Serves typed requests from the content side
//! over an mpsc channel; each request carries its own oneshot reply.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::capture::{CaptureFrame, CaptureUnavailable, FrameSource};
use crate::config::Settings;
use crate::shared::BackgroundRequest;
use crate::translate::{TranslateError, TranslationClient};

/// Content-side handle to the background service.
#[derive(Clone)]
pub struct BackgroundHandle {
    tx: mpsc::Sender<BackgroundRequest>,
}

impl BackgroundHandle {
    /// Wrap a raw request channel. Useful for tests that serve the channel
    /// themselves.
    pub fn new(tx: mpsc::Sender<BackgroundRequest>) -> Self {
        Self { tx }
    }

    /// Request a full-viewport screenshot.
    pub async fn capture_tab(&self) -> Result<CaptureFrame, CaptureUnavailable> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(BackgroundRequest::CaptureTab { reply })
            .await
            .map_err(|_| CaptureUnavailable("background context not ready".to_string()))?;
        rx.await
            .map_err(|_| CaptureUnavailable("background context dropped the request".to_string()))?
    }

    /// Translate text with the persisted settings.
    pub async fn translate_text(&self, text: String) -> Result<String, TranslateError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(BackgroundRequest::TranslateText { text, reply })
            .await
            .map_err(|_| TranslateError::NetworkError("background context not ready".to_string()))?;
        rx.await.map_err(|_| {
            TranslateError::NetworkError("background context dropped the request".to_string())
        })?
    }
}

/// Privileged service owning capture and translation.
pub struct BackgroundService {
    frames: Box<dyn FrameSource>,
    client: TranslationClient,
    settings: Arc<RwLock<Settings>>,
}

impl BackgroundService {
    pub fn new(frames: Box<dyn FrameSource>, settings: Arc<RwLock<Settings>>) -> Self {
        Self {
            frames,
            client: TranslationClient::new(),
            settings,
        }
    }

    /// Spawn the service loop, returning the content-side handle.
    pub fn spawn(self) -> BackgroundHandle {
        let (tx, mut rx) = mpsc::channel::<BackgroundRequest>(16);

        tokio::spawn(async move {
            info!("Background service started");
            while let Some(request) = rx.recv().await {
                self.handle(request).await;
            }
            info!("Background service stopped");
        });

        BackgroundHandle::new(tx)
    }

    async fn handle(&self, request: BackgroundRequest) {
        match request {
            BackgroundRequest::CaptureTab { reply } => {
                debug!("Serving CaptureTab");
                let result = self.frames.capture().await;
                // The requester may have gone away (overlay dismissed).
                let _ = reply.send(result);
            }
            BackgroundRequest::TranslateText { text, reply } => {
                debug!("Serving TranslateText ({} chars)", text.chars().count());
                // Settings are re-read per request; a write during flight
                // yields at most one stale read.
                let settings = self.settings.read().clone();
                let result = self.client.translate(&text, &settings).await;
                let _ = reply.send(result);
            }
        }
    }
}
