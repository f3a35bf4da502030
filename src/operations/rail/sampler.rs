use tracing::warn;

use crate::error::{FrameError, GeometryError, OperationError, Result};
use crate::geometry::Curve;
use crate::math::{any_perpendicular, orthonormalize, try_normalize, Point3, Vector3};

/// Minimum sine of the angle between tangent and up for the normal to be trusted.
const PARALLEL_TOLERANCE: f64 = 1e-6;

/// Number of samples taken from a reference curve with `knot_count` knots
/// when `extra_resolution` samples are inserted between each knot pair.
///
/// Returns `Some(0)` for an empty curve and `None` if the count overflows.
#[must_use]
pub fn sample_count(knot_count: usize, extra_resolution: usize) -> Option<usize> {
    match knot_count {
        0 => Some(0),
        n => (n - 1)
            .checked_mul(extra_resolution)
            .and_then(|extra| extra.checked_add(n)),
    }
}

/// Local frame of a reference curve at one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frame {
    /// Curve parameter of the sample.
    pub t: f64,
    /// Point on the curve at `t`.
    pub position: Point3,
    /// Unit tangent.
    pub tangent: Vector3,
    /// Up vector as reported by the curve.
    pub up: Vector3,
    /// Unit lateral direction, `normalize(tangent x up)`.
    pub normal: Vector3,
}

/// What to do when the tangent is parallel to the up vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegeneratePolicy {
    /// Continue the previous frame's normal, or a canonical perpendicular
    /// for the first frame, and log a warning.
    #[default]
    Fallback,
    /// Fail with [`FrameError::DegenerateNormal`].
    Error,
}

/// Samples a curve at evenly spaced parameters into a sequence of [`Frame`]s.
///
/// Sample `i` of `n` is taken at `t = i / (n - 1)`, so the first and last
/// samples sit exactly on the curve ends.
#[derive(Debug, Clone, Copy)]
pub struct CurveSampler {
    sample_count: usize,
    policy: DegeneratePolicy,
}

impl CurveSampler {
    /// Creates a sampler producing `sample_count` frames.
    #[must_use]
    pub fn new(sample_count: usize) -> Self {
        Self {
            sample_count,
            policy: DegeneratePolicy::default(),
        }
    }

    /// Sets the degenerate normal policy.
    #[must_use]
    pub fn with_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the number of frames this sampler produces.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Samples `curve`, returning exactly `sample_count` frames in increasing `t`.
    ///
    /// # Errors
    ///
    /// - `OperationError::InvalidConfiguration` if fewer than 2 samples are requested
    /// - `GeometryError::EmptyCurve` if the curve has no knots
    /// - `FrameError::DegenerateTangent` if the curve tangent vanishes at a sample
    /// - `FrameError::DegenerateNormal` if tangent and up are parallel under
    ///   [`DegeneratePolicy::Error`]
    #[allow(clippy::cast_precision_loss)]
    pub fn sample<C: Curve + ?Sized>(&self, curve: &C) -> Result<Vec<Frame>> {
        let n = self.sample_count;
        if n < 2 {
            return Err(OperationError::InvalidConfiguration(format!(
                "at least 2 samples are required, got {n}"
            ))
            .into());
        }
        if curve.knot_count() == 0 {
            return Err(GeometryError::EmptyCurve.into());
        }

        let last = (n - 1) as f64;
        let mut frames: Vec<Frame> = Vec::with_capacity(n);
        let mut fallbacks = 0_usize;
        for i in 0..n {
            let t = i as f64 / last;
            let point = curve.evaluate(t)?;
            let tangent =
                try_normalize(&point.tangent).ok_or(FrameError::DegenerateTangent { t })?;
            let previous = frames.last().map(|f| &f.normal);
            let normal = match lateral(&tangent, &point.up) {
                Some(normal) => normal,
                None => {
                    fallbacks += 1;
                    self.fallback_normal(t, &tangent, previous)?
                }
            };
            frames.push(Frame {
                t,
                position: point.position,
                tangent,
                up: point.up,
                normal,
            });
        }
        if fallbacks > 0 {
            warn!(
                fallbacks,
                samples = n,
                "tangent is parallel to up vector, using fallback normals"
            );
        }
        Ok(frames)
    }

    fn fallback_normal(
        &self,
        t: f64,
        tangent: &Vector3,
        previous: Option<&Vector3>,
    ) -> Result<Vector3> {
        match self.policy {
            DegeneratePolicy::Error => Err(FrameError::DegenerateNormal { t }.into()),
            DegeneratePolicy::Fallback => Ok(previous
                .and_then(|n| orthonormalize(n, tangent))
                .unwrap_or_else(|| any_perpendicular(tangent))),
        }
    }
}

/// Unit `tangent x up`, or `None` when `up` is zero or parallel to `tangent`.
fn lateral(tangent: &Vector3, up: &Vector3) -> Option<Vector3> {
    let up = try_normalize(up)?;
    let cross = tangent.cross(&up);
    if cross.norm() < PARALLEL_TOLERANCE {
        None
    } else {
        try_normalize(&cross)
    }
}
