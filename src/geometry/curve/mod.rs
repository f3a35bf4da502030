mod line;
mod spline;

pub use line::Line;
pub use spline::{BezierKnot, BezierSpline, TangentMode};

use crate::error::Result;
use crate::math::{Point3, Vector3};

/// Raw result of evaluating a curve at a normalized parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurvePoint {
    /// Interpolated position.
    pub position: Point3,
    /// Tangent direction. Not necessarily unit length, may be zero on degenerate curves.
    pub tangent: Vector3,
    /// Up reference vector associated with this point.
    pub up: Vector3,
}

/// Trait for knot-based curves in 3D space evaluated over `t` in `[0, 1]`.
pub trait Curve {
    /// Evaluates the curve at the normalized parameter `t`.
    ///
    /// # Errors
    ///
    /// Returns an error if `t` is outside `[0, 1]` or the curve has no knots.
    fn evaluate(&self, t: f64) -> Result<CurvePoint>;

    /// Returns the number of knots (control points) of the curve.
    fn knot_count(&self) -> usize;
}

/// Checks that `t` lies in the unit parameter range.
pub(crate) fn check_parameter(t: f64) -> Result<()> {
    if (0.0..=1.0).contains(&t) {
        Ok(())
    } else {
        Err(crate::error::GeometryError::ParameterOutOfRange {
            parameter: "t",
            value: t,
            min: 0.0,
            max: 1.0,
        }
        .into())
    }
}
