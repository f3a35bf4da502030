use crate::geometry::{BezierKnot, BezierSpline, TangentMode};

use super::sampler::Frame;

/// The left and right rail curves, always holding the same number of knots.
#[derive(Debug, Clone, Default)]
pub struct RailPair {
    /// Rail on the `+normal` side of the reference curve.
    pub left: BezierSpline,
    /// Rail on the `-normal` side of the reference curve.
    pub right: BezierSpline,
}

impl RailPair {
    /// Creates an empty pair with room for `capacity` knots per rail.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            left: BezierSpline::with_capacity(capacity),
            right: BezierSpline::with_capacity(capacity),
        }
    }

    /// Returns the knot count of each rail.
    #[must_use]
    pub fn len(&self) -> usize {
        debug_assert_eq!(self.left.len(), self.right.len());
        self.left.len()
    }

    /// Returns whether both rails are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes all knots from both rails.
    pub fn clear(&mut self) {
        self.left.clear();
        self.right.clear();
    }
}

/// Builds the two rails by displacing each frame position along its normal.
///
/// Knot `i` of the left rail is `position + normal * half_width` of frame `i`,
/// knot `i` of the right rail is `position - normal * half_width`. Knots carry
/// the frame's up vector and start in [`TangentMode::Linear`].
#[derive(Debug, Clone, Copy)]
pub struct OffsetCurveBuilder {
    half_width: f64,
}

impl OffsetCurveBuilder {
    /// Creates a builder offsetting by `half_width` on each side.
    #[must_use]
    pub fn new(half_width: f64) -> Self {
        Self { half_width }
    }

    /// Builds a fresh rail pair with exactly one knot per frame.
    #[must_use]
    pub fn build(&self, frames: &[Frame]) -> RailPair {
        let mut rails = RailPair::with_capacity(frames.len());
        self.build_into(frames, &mut rails);
        rails
    }

    /// Clears `rails` and repopulates both sides from `frames`.
    pub fn build_into(&self, frames: &[Frame], rails: &mut RailPair) {
        rails.clear();
        let hw = self.half_width;
        rails.left.extend(
            frames
                .iter()
                .map(|f| BezierKnot::with_up(f.position + f.normal * hw, f.up)),
            TangentMode::Linear,
        );
        rails.right.extend(
            frames
                .iter()
                .map(|f| BezierKnot::with_up(f.position - f.normal * hw, f.up)),
            TangentMode::Linear,
        );
    }
}
