use crate::error::{GeometryError, Result};
use crate::math::{Point3, Vector3, TOLERANCE};

use super::{check_parameter, Curve, CurvePoint};

/// A straight segment with a constant up vector.
///
/// The parametric form is: `P(t) = start + t * (end - start)`.
#[derive(Debug, Clone)]
pub struct Line {
    start: Point3,
    end: Point3,
    up: Vector3,
}

impl Line {
    /// Creates a new segment from `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns an error if the segment is zero-length.
    pub fn new(start: Point3, end: Point3, up: Vector3) -> Result<Self> {
        if (end - start).norm() < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        Ok(Self { start, end, up })
    }

    /// Returns the start point of the segment.
    #[must_use]
    pub fn start(&self) -> &Point3 {
        &self.start
    }

    /// Returns the end point of the segment.
    #[must_use]
    pub fn end(&self) -> &Point3 {
        &self.end
    }

    /// Returns the up vector.
    #[must_use]
    pub fn up(&self) -> &Vector3 {
        &self.up
    }
}

impl Curve for Line {
    fn evaluate(&self, t: f64) -> Result<CurvePoint> {
        check_parameter(t)?;
        let direction = self.end - self.start;
        Ok(CurvePoint {
            position: self.start + direction * t,
            tangent: direction,
            up: self.up,
        })
    }

    fn knot_count(&self) -> usize {
        2
    }
}
