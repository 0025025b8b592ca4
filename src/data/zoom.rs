//! X-axis zoom with an undo stack.

/// An x-axis range in axis units (milliseconds since the Unix epoch).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    /// Build a range from two ends in either order.
    pub fn between(a: f64, b: f64) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }
}

/// Applied zoom range plus previously applied ranges.
///
/// The stack grows only on [`ZoomState::select`] and shrinks only on
/// [`ZoomState::zoom_out`]. [`ZoomState::reset`] drops the applied range and
/// leaves the stack alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoomState {
    applied: Option<AxisRange>,
    stack: Vec<AxisRange>,
}

impl ZoomState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The range currently applied to the x-axis, if any.
    pub fn applied(&self) -> Option<AxisRange> {
        self.applied
    }

    /// Number of ranges that zoom-out can step back through.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// True if zoom-out would change anything.
    pub fn is_zoomed(&self) -> bool {
        self.applied.is_some() || !self.stack.is_empty()
    }

    /// Apply a user-selected range, remembering the current one.
    pub fn select(&mut self, range: AxisRange) {
        if let Some(current) = self.applied.take() {
            self.stack.push(current);
        }
        self.applied = Some(range);
    }

    /// Step back to the previous range, or clear the axis bounds entirely.
    pub fn zoom_out(&mut self) {
        self.applied = self.stack.pop();
    }

    /// Clear the applied range; the undo stack is kept.
    pub fn reset(&mut self) {
        self.applied = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(min: f64, max: f64) -> AxisRange {
        AxisRange { min, max }
    }

    #[test]
    fn select_then_zoom_out_restores_previous() {
        let mut zoom = ZoomState::new();
        zoom.select(range(10.0, 90.0));
        zoom.select(range(20.0, 30.0));

        zoom.zoom_out();

        assert_eq!(zoom.applied(), Some(range(10.0, 90.0)));
    }

    #[test]
    fn select_then_zoom_out_from_unzoomed_clears() {
        let mut zoom = ZoomState::new();
        zoom.select(range(10.0, 90.0));

        zoom.zoom_out();

        assert_eq!(zoom.applied(), None);
        assert_eq!(zoom.depth(), 0);
    }

    #[test]
    fn zoom_out_with_empty_stack_is_full_reset() {
        let mut zoom = ZoomState::new();
        zoom.zoom_out();
        assert_eq!(zoom.applied(), None);
    }

    #[test]
    fn reset_keeps_stack() {
        let mut zoom = ZoomState::new();
        zoom.select(range(1.0, 2.0));
        zoom.select(range(3.0, 4.0));

        zoom.reset();

        assert_eq!(zoom.applied(), None);
        assert_eq!(zoom.depth(), 1);
        zoom.zoom_out();
        assert_eq!(zoom.applied(), Some(range(1.0, 2.0)));
    }

    #[test]
    fn between_orders_ends() {
        assert_eq!(AxisRange::between(5.0, 2.0), range(2.0, 5.0));
        assert_eq!(AxisRange::between(5.0, 2.0).width(), 3.0);
    }
}
