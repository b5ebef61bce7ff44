//! Region selection overlay
//!
//! Pointer-driven rectangle selection over the captured surface. The state
//! machine is pure; whatever surface hosts it feeds pointer and key events in
//! and reacts to the emitted outcome. Selections smaller than 10x10 logical
//! pixels are treated as accidental clicks and discarded without ever
//! reaching the pipeline.

use tracing::debug;

/// Minimum selection edge in logical pixels; anything smaller is accidental.
pub const MIN_SELECTION_PX: f32 = 10.0;

/// An axis-aligned rectangle in logical (CSS) pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Bounding box of two corner points, in either drag direction.
    pub fn from_points(start: (f32, f32), end: (f32, f32)) -> Self {
        let x = start.0.min(end.0);
        let y = start.1.min(end.1);
        Self {
            x,
            y,
            width: (end.0 - start.0).abs(),
            height: (end.1 - start.1).abs(),
        }
    }

    /// Whether both edges meet the minimum selection size.
    pub fn is_selectable(&self) -> bool {
        self.width >= MIN_SELECTION_PX && self.height >= MIN_SELECTION_PX
    }

    /// Anchor point for the result bubble: bottom-left corner.
    pub fn bottom_left(&self) -> (f32, f32) {
        (self.x, self.y + self.height)
    }
}

/// Selector lifecycle.
#[derive(Debug, Clone, Copy, PartialEq)]
enum SelectorState {
    Idle,
    Selecting { start: (f32, f32), current: (f32, f32) },
}

/// Outcome of a pointer-up or cancel event.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionOutcome {
    /// A region of at least the minimum size was selected.
    Finalized(Rect),
    /// Selection was too small or explicitly cancelled; nothing to run.
    Cancelled,
}

/// Pointer-driven rectangle selector.
///
/// `Idle -> Selecting -> (Finalized | Cancelled) -> Idle`. The selector
/// returns to `Idle` after every outcome; the hosting overlay decides whether
/// to stay on screen.
#[derive(Debug)]
pub struct RegionSelector {
    state: SelectorState,
}

impl Default for RegionSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl RegionSelector {
    pub fn new() -> Self {
        Self {
            state: SelectorState::Idle,
        }
    }

    /// Whether a drag is currently in progress.
    pub fn is_selecting(&self) -> bool {
        matches!(self.state, SelectorState::Selecting { .. })
    }

    /// Begin a selection at the given point. Ignored while one is in progress.
    pub fn pointer_down(&mut self, x: f32, y: f32) {
        if self.is_selecting() {
            return;
        }
        self.state = SelectorState::Selecting {
            start: (x, y),
            current: (x, y),
        };
    }

    /// Update the live rectangle while dragging. Ignored when idle.
    pub fn pointer_move(&mut self, x: f32, y: f32) {
        if let SelectorState::Selecting { current, .. } = &mut self.state {
            *current = (x, y);
        }
    }

    /// Current live rectangle, if a drag is in progress.
    pub fn current_rect(&self) -> Option<Rect> {
        match self.state {
            SelectorState::Selecting { start, current } => {
                Some(Rect::from_points(start, current))
            }
            SelectorState::Idle => None,
        }
    }

    /// Finish the selection. Sub-minimum rectangles cancel silently.
    pub fn pointer_up(&mut self, x: f32, y: f32) -> SelectionOutcome {
        let SelectorState::Selecting { start, .. } = self.state else {
            return SelectionOutcome::Cancelled;
        };
        self.state = SelectorState::Idle;

        let rect = Rect::from_points(start, (x, y));
        if rect.is_selectable() {
            SelectionOutcome::Finalized(rect)
        } else {
            debug!(
                "Selection {:.0}x{:.0} below minimum, discarded",
                rect.width, rect.height
            );
            SelectionOutcome::Cancelled
        }
    }

    /// Cancel from any state (Escape or explicit stop).
    pub fn cancel(&mut self) -> SelectionOutcome {
        self.state = SelectorState::Idle;
        SelectionOutcome::Cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_from_points_forward_drag() {
        let rect = Rect::from_points((100.0, 200.0), (300.0, 400.0));
        assert_eq!(rect.x, 100.0);
        assert_eq!(rect.y, 200.0);
        assert_eq!(rect.width, 200.0);
        assert_eq!(rect.height, 200.0);
    }

    #[test]
    fn test_rect_from_points_reverse_drag() {
        // User dragged up and to the left.
        let rect = Rect::from_points((300.0, 400.0), (100.0, 200.0));
        assert_eq!(rect.x, 100.0);
        assert_eq!(rect.y, 200.0);
        assert_eq!(rect.width, 200.0);
        assert_eq!(rect.height, 200.0);
    }

    #[test]
    fn test_bottom_left_anchor() {
        let rect = Rect {
            x: 50.0,
            y: 60.0,
            width: 100.0,
            height: 40.0,
        };
        assert_eq!(rect.bottom_left(), (50.0, 100.0));
    }

    #[test]
    fn test_full_selection_flow() {
        let mut selector = RegionSelector::new();
        assert!(!selector.is_selecting());

        selector.pointer_down(10.0, 10.0);
        assert!(selector.is_selecting());

        selector.pointer_move(60.0, 80.0);
        let live = selector.current_rect().unwrap();
        assert_eq!(live.width, 50.0);
        assert_eq!(live.height, 70.0);

        let outcome = selector.pointer_up(60.0, 80.0);
        assert_eq!(
            outcome,
            SelectionOutcome::Finalized(Rect {
                x: 10.0,
                y: 10.0,
                width: 50.0,
                height: 70.0
            })
        );
        assert!(!selector.is_selecting());
    }

    #[test]
    fn test_tiny_selection_is_cancelled() {
        let mut selector = RegionSelector::new();
        selector.pointer_down(10.0, 10.0);
        // 9px wide: below the 10px minimum.
        let outcome = selector.pointer_up(19.0, 200.0);
        assert_eq!(outcome, SelectionOutcome::Cancelled);
    }

    #[test]
    fn test_tiny_height_is_cancelled() {
        let mut selector = RegionSelector::new();
        selector.pointer_down(0.0, 0.0);
        let outcome = selector.pointer_up(500.0, 5.0);
        assert_eq!(outcome, SelectionOutcome::Cancelled);
    }

    #[test]
    fn test_exactly_minimum_is_accepted() {
        let mut selector = RegionSelector::new();
        selector.pointer_down(0.0, 0.0);
        let outcome = selector.pointer_up(10.0, 10.0);
        assert!(matches!(outcome, SelectionOutcome::Finalized(_)));
    }

    #[test]
    fn test_cancel_mid_drag_returns_idle() {
        let mut selector = RegionSelector::new();
        selector.pointer_down(10.0, 10.0);
        selector.pointer_move(50.0, 50.0);

        let outcome = selector.cancel();
        assert_eq!(outcome, SelectionOutcome::Cancelled);
        assert!(!selector.is_selecting());
        assert!(selector.current_rect().is_none());
    }

    #[test]
    fn test_second_pointer_down_is_ignored() {
        let mut selector = RegionSelector::new();
        selector.pointer_down(10.0, 10.0);
        selector.pointer_down(500.0, 500.0);

        // Start point is still the first one.
        let outcome = selector.pointer_up(60.0, 60.0);
        assert_eq!(
            outcome,
            SelectionOutcome::Finalized(Rect {
                x: 10.0,
                y: 10.0,
                width: 50.0,
                height: 50.0
            })
        );
    }

    #[test]
    fn test_pointer_up_when_idle_is_cancelled() {
        let mut selector = RegionSelector::new();
        assert_eq!(selector.pointer_up(5.0, 5.0), SelectionOutcome::Cancelled);
    }
}
