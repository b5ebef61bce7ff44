//! Presentation bubble
//!
//! The on-screen surface showing pipeline status and results. Exactly one
//! bubble exists at a time: the slot owns the current handle and disposes it
//! before installing a new one. Actual rendering sits behind a trait; the
//! default backend writes to the log.

use tracing::info;

/// What the bubble is currently showing.
#[derive(Debug, Clone, PartialEq)]
pub enum BubbleContent {
    /// Work in flight; the string is free-text status (e.g. OCR progress).
    Pending(String),
    /// Pipeline finished: recognized source text and its translation.
    Translated { source: String, translated: String },
    /// Pipeline failed; readable message for the user.
    Failed(String),
}

/// Rendering backend for the bubble. Out-of-scope collaborator; only the
/// interface is specified.
pub trait BubbleSurface: Send {
    /// Draw the bubble at a viewport position.
    fn render(&mut self, position: (f32, f32), content: &BubbleContent);
    /// Remove the bubble from screen.
    fn clear(&mut self);
}

/// Backend that reports bubble state through the log.
#[derive(Debug, Default)]
pub struct LogSurface;

impl BubbleSurface for LogSurface {
    fn render(&mut self, position: (f32, f32), content: &BubbleContent) {
        match content {
            BubbleContent::Pending(status) => {
                info!("[bubble @{:.0},{:.0}] {}", position.0, position.1, status)
            }
            BubbleContent::Translated { source, translated } => {
                info!(
                    "[bubble @{:.0},{:.0}] {} => {}",
                    position.0, position.1, source, translated
                )
            }
            BubbleContent::Failed(message) => {
                info!("[bubble @{:.0},{:.0}] Error: {}", position.0, position.1, message)
            }
        }
    }

    fn clear(&mut self) {
        info!("[bubble] dismissed");
    }
}

/// A live bubble: position plus content.
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub position: (f32, f32),
    pub content: BubbleContent,
}

/// Single-owner bubble slot.
///
/// Installing a new bubble tears the previous one down first; listeners and
/// screen state for the old bubble are gone before the new one appears.
pub struct BubbleSlot<S: BubbleSurface> {
    surface: S,
    current: Option<Bubble>,
}

impl<S: BubbleSurface> BubbleSlot<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            current: None,
        }
    }

    /// Show a bubble, replacing any existing one.
    pub fn show(&mut self, position: (f32, f32), content: BubbleContent) {
        self.dismiss();
        self.surface.render(position, &content);
        self.current = Some(Bubble { position, content });
    }

    /// Update the current bubble's content in place. No-op without a bubble.
    pub fn update(&mut self, content: BubbleContent) {
        if let Some(bubble) = &mut self.current {
            bubble.content = content;
            self.surface.render(bubble.position, &bubble.content);
        }
    }

    /// Move the current bubble (drag). No-op without a bubble.
    pub fn drag_to(&mut self, x: f32, y: f32) {
        if let Some(bubble) = &mut self.current {
            bubble.position = (x, y);
            self.surface.render(bubble.position, &bubble.content);
        }
    }

    /// Dismiss the current bubble. Idempotent.
    pub fn dismiss(&mut self) {
        if self.current.take().is_some() {
            self.surface.clear();
        }
    }

    /// Whether a bubble is on screen.
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Current bubble, if any.
    pub fn current(&self) -> Option<&Bubble> {
        self.current.as_ref()
    }
}

impl<S: BubbleSurface> Drop for BubbleSlot<S> {
    fn drop(&mut self) {
        self.dismiss();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingSurface {
        renders: Arc<AtomicUsize>,
        clears: Arc<AtomicUsize>,
    }

    impl BubbleSurface for CountingSurface {
        fn render(&mut self, _position: (f32, f32), _content: &BubbleContent) {
            self.renders.fetch_add(1, Ordering::SeqCst);
        }

        fn clear(&mut self) {
            self.clears.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn slot() -> (BubbleSlot<CountingSurface>, Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let surface = CountingSurface::default();
        let renders = surface.renders.clone();
        let clears = surface.clears.clone();
        (BubbleSlot::new(surface), renders, clears)
    }

    #[test]
    fn test_show_replaces_and_disposes_previous_once() {
        let (mut slot, _renders, clears) = slot();

        slot.show((0.0, 0.0), BubbleContent::Pending("first".into()));
        slot.show((10.0, 10.0), BubbleContent::Pending("second".into()));

        // Only one bubble ever exists; the first was cleared exactly once.
        assert!(slot.is_active());
        assert_eq!(clears.load(Ordering::SeqCst), 1);
        assert_eq!(
            slot.current().unwrap().content,
            BubbleContent::Pending("second".into())
        );
    }

    #[test]
    fn test_dismiss_is_idempotent() {
        let (mut slot, _renders, clears) = slot();

        slot.show((0.0, 0.0), BubbleContent::Pending("x".into()));
        slot.dismiss();
        slot.dismiss();
        slot.dismiss();

        assert!(!slot.is_active());
        assert_eq!(clears.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_update_without_bubble_is_noop() {
        let (mut slot, renders, _clears) = slot();

        slot.update(BubbleContent::Failed("nothing to update".into()));
        assert_eq!(renders.load(Ordering::SeqCst), 0);
        assert!(!slot.is_active());
    }

    #[test]
    fn test_drag_moves_current_bubble() {
        let (mut slot, _renders, _clears) = slot();

        slot.show((5.0, 5.0), BubbleContent::Pending("drag me".into()));
        slot.drag_to(120.0, 240.0);

        assert_eq!(slot.current().unwrap().position, (120.0, 240.0));
    }

    #[test]
    fn test_drop_clears_active_bubble() {
        let (mut slot, _renders, clears) = slot();
        slot.show((0.0, 0.0), BubbleContent::Pending("x".into()));
        drop(slot);
        assert_eq!(clears.load(Ordering::SeqCst), 1);
    }
}
