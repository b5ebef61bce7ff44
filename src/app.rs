//! Content controller
//!
//! The page-side coordinator: owns the selection overlay, the bubble slot and
//! the pipeline, and reacts to dispatched commands. One overlay and one
//! pipeline run exist at a time; a second trigger while either is active is
//! dropped. Escape tears down visible state only; work already issued
//! settles in the background and its result is discarded.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::background::BackgroundHandle;
use crate::bubble::{BubbleContent, BubbleSlot, BubbleSurface};
use crate::ocr::EngineProvider;
use crate::pipeline::CaptureCoordinator;
use crate::selection::{Rect, RegionSelector, SelectionOutcome};
use crate::shared::ContentCommand;

/// Source of the user's current text selection. Out-of-scope collaborator;
/// only the interface is specified.
pub trait SelectionProvider: Send + Sync {
    /// Selected text plus the viewport point to anchor the bubble at.
    fn current_selection(&self) -> Option<(String, (f32, f32))>;
}

/// Provider for hosts without a text selection source.
pub struct NoSelection;

impl SelectionProvider for NoSelection {
    fn current_selection(&self) -> Option<(String, (f32, f32))> {
        None
    }
}

/// Overlay lifecycle. `Processing` keeps the overlay slot occupied while a
/// pipeline run is in flight so re-triggers stay no-ops.
enum OverlayPhase {
    Inactive,
    Selecting(RegionSelector),
    Processing,
}

struct ControllerState {
    overlay: OverlayPhase,
    /// Bumped on escape; results from older generations are discarded.
    generation: u64,
}

/// Page-side coordinator.
pub struct ContentController<P: EngineProvider + 'static, S: BubbleSurface + 'static> {
    state: Arc<Mutex<ControllerState>>,
    bubble: Arc<Mutex<BubbleSlot<S>>>,
    coordinator: Arc<CaptureCoordinator<P>>,
    background: BackgroundHandle,
}

impl<P: EngineProvider + 'static, S: BubbleSurface + 'static> Clone for ContentController<P, S> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
            bubble: self.bubble.clone(),
            coordinator: self.coordinator.clone(),
            background: self.background.clone(),
        }
    }
}

impl<P: EngineProvider + 'static, S: BubbleSurface + 'static> ContentController<P, S> {
    pub fn new(
        coordinator: CaptureCoordinator<P>,
        background: BackgroundHandle,
        surface: S,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(ControllerState {
                overlay: OverlayPhase::Inactive,
                generation: 0,
            })),
            bubble: Arc::new(Mutex::new(BubbleSlot::new(surface))),
            coordinator: Arc::new(coordinator),
            background,
        }
    }

    /// Whether a selection overlay or pipeline run is active.
    pub fn overlay_active(&self) -> bool {
        !matches!(self.state.lock().overlay, OverlayPhase::Inactive)
    }

    /// Whether a result bubble is currently shown.
    pub fn bubble_active(&self) -> bool {
        self.bubble.lock().is_active()
    }

    /// Enter screenshot-selection mode. No-op while an overlay is active.
    pub fn start_screenshot_mode(&self) {
        let mut state = self.state.lock();
        if !matches!(state.overlay, OverlayPhase::Inactive) {
            debug!("Screenshot overlay already active, ignoring trigger");
            return;
        }
        state.overlay = OverlayPhase::Selecting(RegionSelector::new());
    }

    /// Forward a pointer press into the active overlay.
    pub fn pointer_down(&self, x: f32, y: f32) {
        if let OverlayPhase::Selecting(selector) = &mut self.state.lock().overlay {
            selector.pointer_down(x, y);
        }
    }

    /// Forward a pointer move into the active overlay.
    pub fn pointer_move(&self, x: f32, y: f32) {
        if let OverlayPhase::Selecting(selector) = &mut self.state.lock().overlay {
            selector.pointer_move(x, y);
        }
    }

    /// Forward a pointer release; a finalized region launches the pipeline.
    pub fn pointer_up(&self, x: f32, y: f32) {
        let mut state = self.state.lock();
        let OverlayPhase::Selecting(selector) = &mut state.overlay else {
            return;
        };

        match selector.pointer_up(x, y) {
            SelectionOutcome::Cancelled => {
                // Accidental click; overlay goes away silently.
                state.overlay = OverlayPhase::Inactive;
            }
            SelectionOutcome::Finalized(rect) => {
                state.overlay = OverlayPhase::Processing;
                let generation = state.generation;
                drop(state);
                self.spawn_pipeline(rect, generation);
            }
        }
    }

    /// Escape: tear down the overlay, or dismiss the bubble when idle.
    /// In-flight work is not cancelled; its result is discarded.
    pub fn escape(&self) {
        let mut state = self.state.lock();
        match state.overlay {
            OverlayPhase::Inactive => {
                drop(state);
                self.bubble.lock().dismiss();
            }
            OverlayPhase::Selecting(_) => {
                state.overlay = OverlayPhase::Inactive;
            }
            OverlayPhase::Processing => {
                state.generation += 1;
                state.overlay = OverlayPhase::Inactive;
                drop(state);
                self.bubble.lock().dismiss();
            }
        }
    }

    /// Run the pipeline over an explicit region (scripted entry point).
    /// Applies the same minimum-size and single-overlay gates as the
    /// interactive path.
    pub fn request_pipeline(&self, rect: Rect) {
        if !rect.is_selectable() {
            debug!("Region below minimum size, not running pipeline");
            return;
        }
        let mut state = self.state.lock();
        if !matches!(state.overlay, OverlayPhase::Inactive) {
            debug!("Pipeline already active, ignoring request");
            return;
        }
        state.overlay = OverlayPhase::Processing;
        let generation = state.generation;
        drop(state);
        self.spawn_pipeline(rect, generation);
    }

    fn spawn_pipeline(&self, rect: Rect, generation: u64) {
        let controller = self.clone();
        let anchor = rect.bottom_left();

        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<crate::ocr::OcrProgress>();

        // Progress consumer: free-text status into the bubble while this run
        // is still the current one. The bubble update happens under the state
        // lock so a queued event can never land after the result task has
        // left Processing and shown the final bubble.
        {
            let controller = controller.clone();
            tokio::spawn(async move {
                while let Some(phase) = progress_rx.recv().await {
                    let state = controller.state.lock();
                    if state.generation != generation
                        || !matches!(state.overlay, OverlayPhase::Processing)
                    {
                        continue;
                    }
                    controller
                        .bubble
                        .lock()
                        .update(BubbleContent::Pending(phase.to_string()));
                }
            });
        }

        tokio::spawn(async move {
            controller
                .bubble
                .lock()
                .show(anchor, BubbleContent::Pending("Recognizing...".to_string()));

            let result = controller.coordinator.run(rect, &progress_tx).await;

            let mut state = controller.state.lock();
            if state.generation != generation {
                debug!("Pipeline result discarded: overlay was dismissed");
                return;
            }
            state.overlay = OverlayPhase::Inactive;
            drop(state);

            let mut bubble = controller.bubble.lock();
            match result {
                Ok(output) => bubble.show(
                    output.anchor,
                    BubbleContent::Translated {
                        source: output.recognized,
                        translated: output.translated,
                    },
                ),
                Err(e) => bubble.show(anchor, BubbleContent::Failed(e.to_string())),
            }
        });
    }

    /// Dispatch a routed command.
    pub fn handle_command(&self, command: ContentCommand, provider: &dyn SelectionProvider) {
        match command {
            ContentCommand::TriggerTranslation => self.trigger_translation(provider),
            ContentCommand::ShowScreenshotOverlay => self.start_screenshot_mode(),
        }
    }

    /// Translate the current text selection, bypassing capture and OCR.
    pub fn trigger_translation(&self, provider: &dyn SelectionProvider) {
        match provider.current_selection() {
            Some((text, anchor)) => self.translate_text_at(text, anchor),
            None => warn!("No text selection available to translate"),
        }
    }

    /// Translate explicit text and show the result at `anchor`.
    pub fn translate_text_at(&self, text: String, anchor: (f32, f32)) {
        let controller = self.clone();
        tokio::spawn(async move {
            controller
                .bubble
                .lock()
                .show(anchor, BubbleContent::Pending("Translating...".to_string()));

            let result = controller.background.translate_text(text.clone()).await;

            let mut bubble = controller.bubble.lock();
            match result {
                Ok(translated) => bubble.show(
                    anchor,
                    BubbleContent::Translated {
                        source: text,
                        translated,
                    },
                ),
                Err(e) => bubble.show(anchor, BubbleContent::Failed(e.to_string())),
            }
        });
    }
}
