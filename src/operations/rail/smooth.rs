use crate::geometry::{BezierSpline, TangentMode};

use super::offset::RailPair;

/// Switches every knot of a curve to [`TangentMode::AutoSmooth`].
///
/// Tangents become a function of knot positions only, so smoothing is
/// idempotent. Curves with fewer than [`TangentSmoother::MIN_KNOTS`] knots
/// have no interior joint and are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct TangentSmoother;

impl TangentSmoother {
    /// Minimum knot count for smoothing to have any effect.
    pub const MIN_KNOTS: usize = 3;

    /// Smooths all knots of `curve` in place.
    pub fn smooth(curve: &mut BezierSpline) {
        if curve.len() < Self::MIN_KNOTS {
            return;
        }
        curve.set_tangent_mode(0..curve.len(), TangentMode::AutoSmooth);
    }

    /// Smooths both rails of a pair.
    pub fn smooth_pair(rails: &mut RailPair) {
        Self::smooth(&mut rails.left);
        Self::smooth(&mut rails.right);
    }
}
