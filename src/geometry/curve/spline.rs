use std::ops::Range;

use crate::error::{GeometryError, Result};
use crate::math::{try_normalize, Point3, Vector3, TOLERANCE};

use super::{check_parameter, Curve, CurvePoint};

/// Number of chords used to approximate the arc length of one segment.
const LENGTH_SUBDIVISIONS: usize = 32;

/// Exponent of the centripetal Catmull-Rom rule used by [`TangentMode::AutoSmooth`].
const AUTO_SMOOTH_TENSION: f64 = 0.5;

/// A control point of a [`BezierSpline`].
///
/// Tangents are offsets relative to `position`: the segment leaving this knot
/// uses `position + tangent_out` as its second control point, the segment
/// arriving at it uses `position + tangent_in` as its third.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BezierKnot {
    pub position: Point3,
    pub tangent_in: Vector3,
    pub tangent_out: Vector3,
    pub up: Vector3,
}

impl BezierKnot {
    /// Creates a knot with zero tangents and `+Y` as up vector.
    #[must_use]
    pub fn new(position: Point3) -> Self {
        Self::with_up(position, Vector3::y())
    }

    /// Creates a knot with zero tangents and the given up vector.
    #[must_use]
    pub fn with_up(position: Point3, up: Vector3) -> Self {
        Self {
            position,
            tangent_in: Vector3::zeros(),
            tangent_out: Vector3::zeros(),
            up,
        }
    }

    /// Creates a knot with explicit tangents.
    #[must_use]
    pub fn with_tangents(
        position: Point3,
        tangent_in: Vector3,
        tangent_out: Vector3,
        up: Vector3,
    ) -> Self {
        Self {
            position,
            tangent_in,
            tangent_out,
            up,
        }
    }
}

/// How the tangents of a knot are determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TangentMode {
    /// Tangents are kept exactly as stored on the knot.
    #[default]
    Manual,
    /// Tangents point a third of the way to each neighbour (straight segments).
    Linear,
    /// Tangents are derived from both neighbours for a smooth joint.
    AutoSmooth,
}

/// Cumulative chord lengths of one segment.
#[derive(Debug, Clone, Copy)]
struct SegmentLut {
    /// Arc length of the spline before this segment.
    start: f64,
    /// Cumulative length at each subdivision; the last entry is the segment length.
    samples: [f64; LENGTH_SUBDIVISIONS + 1],
}

impl SegmentLut {
    fn length(&self) -> f64 {
        self.samples[LENGTH_SUBDIVISIONS]
    }

    /// Maps a distance from the segment start to the local parameter `u`.
    #[allow(clippy::cast_precision_loss)]
    fn local_parameter(&self, distance: f64) -> f64 {
        let j = self
            .samples
            .partition_point(|&s| s <= distance)
            .clamp(1, LENGTH_SUBDIVISIONS);
        let (lo, hi) = (self.samples[j - 1], self.samples[j]);
        let frac = if hi - lo < TOLERANCE {
            0.0
        } else {
            ((distance - lo) / (hi - lo)).clamp(0.0, 1.0)
        };
        ((j - 1) as f64 + frac) / LENGTH_SUBDIVISIONS as f64
    }
}

/// An open piecewise cubic Bezier spline, parameterized by normalized arc length.
///
/// Mutating operations re-derive the tangents of affected knots according to
/// their [`TangentMode`] and rebuild the arc length tables, so evaluation always
/// reflects the current knots.
#[derive(Debug, Clone, Default)]
pub struct BezierSpline {
    knots: Vec<BezierKnot>,
    modes: Vec<TangentMode>,
    luts: Vec<SegmentLut>,
    length: f64,
}

impl BezierSpline {
    /// Creates an empty spline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty spline with room for `capacity` knots.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            knots: Vec::with_capacity(capacity),
            modes: Vec::with_capacity(capacity),
            luts: Vec::with_capacity(capacity.saturating_sub(1)),
            length: 0.0,
        }
    }

    /// Creates a spline through `points`, all sharing `up` and `mode`.
    #[must_use]
    pub fn from_points(points: &[Point3], up: Vector3, mode: TangentMode) -> Self {
        let mut spline = Self::with_capacity(points.len());
        spline.knots = points.iter().map(|p| BezierKnot::with_up(*p, up)).collect();
        spline.modes = vec![mode; points.len()];
        for i in 0..points.len() {
            spline.apply_mode(i);
        }
        spline.rebuild_luts();
        spline
    }

    /// Returns the number of knots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.knots.len()
    }

    /// Returns whether the spline has no knots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    /// Returns the knots in order.
    #[must_use]
    pub fn knots(&self) -> &[BezierKnot] {
        &self.knots
    }

    /// Returns the knot at `index`, if any.
    #[must_use]
    pub fn knot(&self, index: usize) -> Option<&BezierKnot> {
        self.knots.get(index)
    }

    /// Returns the tangent mode of the knot at `index`, if any.
    #[must_use]
    pub fn tangent_mode(&self, index: usize) -> Option<TangentMode> {
        self.modes.get(index).copied()
    }

    /// Returns the approximate arc length of the spline.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Appends a knot in [`TangentMode::Manual`].
    pub fn add(&mut self, knot: BezierKnot) {
        self.add_with_mode(knot, TangentMode::Manual);
    }

    /// Appends a knot with the given tangent mode.
    pub fn add_with_mode(&mut self, knot: BezierKnot, mode: TangentMode) {
        self.knots.push(knot);
        self.modes.push(mode);
        self.refresh_around(self.knots.len() - 1);
    }

    /// Appends several knots sharing one tangent mode, re-deriving tangents once.
    pub fn extend<I>(&mut self, knots: I, mode: TangentMode)
    where
        I: IntoIterator<Item = BezierKnot>,
    {
        let first_new = self.knots.len();
        self.knots.extend(knots);
        self.modes.resize(self.knots.len(), mode);
        for i in first_new.saturating_sub(1)..self.knots.len() {
            self.apply_mode(i);
        }
        self.rebuild_luts();
    }

    /// Inserts a knot before `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index > len`.
    pub fn insert(&mut self, index: usize, knot: BezierKnot, mode: TangentMode) -> Result<()> {
        if index > self.knots.len() {
            return Err(GeometryError::IndexOutOfRange {
                index,
                len: self.knots.len(),
            }
            .into());
        }
        self.knots.insert(index, knot);
        self.modes.insert(index, mode);
        self.refresh_around(index);
        Ok(())
    }

    /// Removes and returns the knot at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn remove(&mut self, index: usize) -> Result<BezierKnot> {
        self.check_index(index)?;
        let knot = self.knots.remove(index);
        self.modes.remove(index);
        if !self.knots.is_empty() {
            // Neighbours of the removed knot are now at index - 1 and index.
            self.refresh_around(index.min(self.knots.len() - 1));
        } else {
            self.rebuild_luts();
        }
        Ok(knot)
    }

    /// Moves the knot at `index`, keeping its tangent mode.
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn set_position(&mut self, index: usize, position: Point3) -> Result<()> {
        self.check_index(index)?;
        self.knots[index].position = position;
        self.refresh_around(index);
        Ok(())
    }

    /// Replaces the knot at `index` and switches it to [`TangentMode::Manual`].
    ///
    /// # Errors
    ///
    /// Returns an error if `index` is out of range.
    pub fn set_knot(&mut self, index: usize, knot: BezierKnot) -> Result<()> {
        self.check_index(index)?;
        self.knots[index] = knot;
        self.modes[index] = TangentMode::Manual;
        self.refresh_around(index);
        Ok(())
    }

    /// Removes all knots, keeping allocated capacity.
    pub fn clear(&mut self) {
        self.knots.clear();
        self.modes.clear();
        self.luts.clear();
        self.length = 0.0;
    }

    /// Sets the tangent mode of every knot in `range` and re-derives tangents.
    ///
    /// The range is clipped to the knot count.
    pub fn set_tangent_mode(&mut self, range: Range<usize>, mode: TangentMode) {
        let end = range.end.min(self.knots.len());
        if range.start >= end {
            return;
        }
        for m in &mut self.modes[range.start..end] {
            *m = mode;
        }
        let first = range.start.saturating_sub(1);
        let last = end.min(self.knots.len() - 1);
        for i in first..=last {
            self.apply_mode(i);
        }
        self.rebuild_luts();
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.knots.len() {
            Ok(())
        } else {
            Err(GeometryError::IndexOutOfRange {
                index,
                len: self.knots.len(),
            }
            .into())
        }
    }

    /// Re-derives tangents of `index` and its neighbours, then the length tables.
    fn refresh_around(&mut self, index: usize) {
        let last = self.knots.len().saturating_sub(1);
        for i in index.saturating_sub(1)..=(index + 1).min(last) {
            self.apply_mode(i);
        }
        self.rebuild_luts();
    }

    fn apply_mode(&mut self, i: usize) {
        let Some(&mode) = self.modes.get(i) else {
            return;
        };
        let cur = self.knots[i].position;
        let prev = i.checked_sub(1).map(|p| self.knots[p].position - cur);
        let next = self.knots.get(i + 1).map(|k| k.position - cur);

        let (tangent_in, tangent_out) = match mode {
            TangentMode::Manual => return,
            TangentMode::Linear => (
                prev.map_or_else(Vector3::zeros, |d| d / 3.0),
                next.map_or_else(Vector3::zeros, |d| d / 3.0),
            ),
            TangentMode::AutoSmooth => match (prev, next) {
                (Some(p), Some(n)) => {
                    let out = auto_smooth_tangent(&p, &n);
                    (-out, out)
                }
                (None, Some(n)) => (-n / 3.0, n / 3.0),
                (Some(p), None) => (p / 3.0, -p / 3.0),
                (None, None) => (Vector3::zeros(), Vector3::zeros()),
            },
        };
        let knot = &mut self.knots[i];
        knot.tangent_in = tangent_in;
        knot.tangent_out = tangent_out;
    }

    #[allow(clippy::cast_precision_loss)]
    fn rebuild_luts(&mut self) {
        self.luts.clear();
        let mut start = 0.0;
        for s in 0..self.knots.len().saturating_sub(1) {
            let mut samples = [0.0; LENGTH_SUBDIVISIONS + 1];
            let mut prev = self.segment_position(s, 0.0);
            let mut total = 0.0;
            for (j, sample) in samples.iter_mut().enumerate().skip(1) {
                let p = self.segment_position(s, j as f64 / LENGTH_SUBDIVISIONS as f64);
                total += (p - prev).norm();
                *sample = total;
                prev = p;
            }
            let lut = SegmentLut { start, samples };
            start += lut.length();
            self.luts.push(lut);
        }
        self.length = start;
    }

    /// Returns the four Bezier control points of segment `s`.
    fn control_points(&self, s: usize) -> [Point3; 4] {
        let k0 = &self.knots[s];
        let k1 = &self.knots[s + 1];
        [
            k0.position,
            k0.position + k0.tangent_out,
            k1.position + k1.tangent_in,
            k1.position,
        ]
    }

    fn segment_position(&self, s: usize, u: f64) -> Point3 {
        let [p0, p1, p2, p3] = self.control_points(s);
        let v = 1.0 - u;
        let coords = p0.coords * (v * v * v)
            + p1.coords * (3.0 * v * v * u)
            + p2.coords * (3.0 * v * u * u)
            + p3.coords * (u * u * u);
        Point3::from(coords)
    }

    /// Derivative of segment `s` at `u`.
    ///
    /// Where the derivative vanishes (zero-length handles at a segment end) the
    /// limiting direction is returned instead.
    fn segment_tangent(&self, s: usize, u: f64) -> Vector3 {
        let [p0, p1, p2, p3] = self.control_points(s);
        let v = 1.0 - u;
        let d = (p1 - p0) * (3.0 * v * v) + (p2 - p1) * (6.0 * v * u) + (p3 - p2) * (3.0 * u * u);
        if d.norm() >= TOLERANCE {
            return d;
        }
        let candidates = if u < 0.5 {
            [p1 - p0, p2 - p0, p3 - p0]
        } else {
            [p3 - p2, p3 - p1, p3 - p0]
        };
        candidates
            .into_iter()
            .find(|c| c.norm() >= TOLERANCE)
            .unwrap_or_else(Vector3::zeros)
    }

    /// Maps a global parameter to a segment index and local parameter.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    fn locate(&self, t: f64) -> (usize, f64) {
        let segments = self.luts.len();
        if self.length < TOLERANCE {
            let x = t * segments as f64;
            let s = (x.floor() as usize).min(segments - 1);
            return (s, (x - s as f64).clamp(0.0, 1.0));
        }
        let distance = t * self.length;
        let s = self
            .luts
            .partition_point(|lut| lut.start + lut.length() < distance)
            .min(segments - 1);
        let lut = &self.luts[s];
        (s, lut.local_parameter(distance - lut.start))
    }

    fn segment_up(&self, s: usize, u: f64) -> Vector3 {
        let a = self.knots[s].up;
        let b = self.knots[s + 1].up;
        try_normalize(&a.lerp(&b, u)).unwrap_or(if u < 0.5 { a } else { b })
    }
}

/// Out tangent of a knot from the offsets to its neighbours (`prev` and `next`
/// relative to the knot position), using centripetal Catmull-Rom weighting.
fn auto_smooth_tangent(prev: &Vector3, next: &Vector3) -> Vector3 {
    let d1 = prev.norm();
    let d2 = next.norm();
    if d1 < TOLERANCE {
        return next / 3.0;
    }
    if d2 < TOLERANCE {
        return -prev / 3.0;
    }
    let a1 = d1.powf(AUTO_SMOOTH_TENSION);
    let a2 = d2.powf(AUTO_SMOOTH_TENSION);
    let b1 = d1.powf(2.0 * AUTO_SMOOTH_TENSION);
    let b2 = d2.powf(2.0 * AUTO_SMOOTH_TENSION);
    (next * b1 - prev * b2) / (3.0 * a1 * (a1 + a2))
}

impl Curve for BezierSpline {
    fn evaluate(&self, t: f64) -> Result<CurvePoint> {
        check_parameter(t)?;
        match self.knots.as_slice() {
            [] => Err(GeometryError::EmptyCurve.into()),
            [only] => Ok(CurvePoint {
                position: only.position,
                tangent: Vector3::zeros(),
                up: only.up,
            }),
            _ => {
                let (s, u) = self.locate(t);
                Ok(CurvePoint {
                    position: self.segment_position(s, u),
                    tangent: self.segment_tangent(s, u),
                    up: self.segment_up(s, u),
                })
            }
        }
    }

    fn knot_count(&self) -> usize {
        self.knots.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn straight(mode: TangentMode) -> BezierSpline {
        BezierSpline::from_points(
            &[
                Point3::origin(),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(10.0, 0.0, 0.0),
            ],
            Vector3::y(),
            mode,
        )
    }

    fn bent() -> BezierSpline {
        BezierSpline::from_points(
            &[
                Point3::origin(),
                Point3::new(4.0, 0.0, 0.0),
                Point3::new(4.0, 0.0, 4.0),
                Point3::new(8.0, 0.0, 6.0),
            ],
            Vector3::y(),
            TangentMode::AutoSmooth,
        )
    }

    #[test]
    fn empty_spline_fails() {
        let s = BezierSpline::new();
        assert!(matches!(
            s.evaluate(0.0),
            Err(crate::RailError::Geometry(GeometryError::EmptyCurve))
        ));
    }

    #[test]
    fn single_knot_has_zero_tangent() {
        let mut s = BezierSpline::new();
        s.add(BezierKnot::new(Point3::new(1.0, 2.0, 3.0)));
        let p = s.evaluate(0.7).unwrap();
        assert!((p.position - Point3::new(1.0, 2.0, 3.0)).norm() < TOLERANCE);
        assert!(p.tangent.norm() < TOLERANCE);
    }

    #[test]
    fn endpoints_hit_first_and_last_knot() {
        let s = bent();
        let a = s.evaluate(0.0).unwrap();
        let b = s.evaluate(1.0).unwrap();
        assert!((a.position - Point3::origin()).norm() < 1e-9);
        assert!((b.position - Point3::new(8.0, 0.0, 6.0)).norm() < 1e-9);
    }

    #[test]
    fn linear_length_is_chord_sum() {
        let s = straight(TangentMode::Linear);
        assert_relative_eq!(s.length(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn parameter_is_arc_length() {
        // Knots are unevenly spaced, but t = 0.5 is halfway along the distance.
        let s = straight(TangentMode::Linear);
        let p = s.evaluate(0.5).unwrap();
        assert_relative_eq!(p.position.x, 5.0, epsilon = 1e-6);
        let q = s.evaluate(0.1).unwrap();
        assert_relative_eq!(q.position.x, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn manual_zero_handles_fall_back_to_chord() {
        let mut s = BezierSpline::new();
        s.add(BezierKnot::new(Point3::origin()));
        s.add(BezierKnot::new(Point3::new(0.0, 0.0, 5.0)));
        let p = s.evaluate(0.0).unwrap();
        assert!((p.tangent.normalize() - Vector3::z()).norm() < 1e-9);
        let q = s.evaluate(1.0).unwrap();
        assert!((q.tangent.normalize() - Vector3::z()).norm() < 1e-9);
    }

    #[test]
    fn coincident_knots_give_zero_tangent() {
        let s = BezierSpline::from_points(
            &[Point3::origin(), Point3::origin()],
            Vector3::y(),
            TangentMode::Linear,
        );
        assert!(s.length() < TOLERANCE);
        let p = s.evaluate(0.5).unwrap();
        assert!(p.tangent.norm() < TOLERANCE);
    }

    #[test]
    fn auto_smooth_interior_is_continuous() {
        let s = bent();
        let k = s.knot(1).unwrap();
        assert!((k.tangent_in + k.tangent_out).norm() < TOLERANCE);
        assert!(k.tangent_out.norm() > TOLERANCE);
    }

    #[test]
    fn auto_smooth_uniform_collinear_matches_linear() {
        let points = [
            Point3::origin(),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(6.0, 0.0, 0.0),
        ];
        let smooth = BezierSpline::from_points(&points, Vector3::y(), TangentMode::AutoSmooth);
        let linear = BezierSpline::from_points(&points, Vector3::y(), TangentMode::Linear);
        // Only the handles that shape a segment are compared.
        for i in 0..2 {
            let (a, b) = (smooth.knot(i).unwrap(), linear.knot(i).unwrap());
            assert!((a.tangent_out - b.tangent_out).norm() < 1e-9);
        }
        for i in 1..3 {
            let (a, b) = (smooth.knot(i).unwrap(), linear.knot(i).unwrap());
            assert!((a.tangent_in - b.tangent_in).norm() < 1e-9);
        }
    }

    #[test]
    fn set_position_updates_neighbours() {
        let mut s = straight(TangentMode::AutoSmooth);
        let before = s.knot(0).unwrap().tangent_out;
        s.set_position(1, Point3::new(2.0, 0.0, 3.0)).unwrap();
        let after = s.knot(0).unwrap().tangent_out;
        assert!((before - after).norm() > TOLERANCE);
    }

    #[test]
    fn set_knot_switches_to_manual() {
        let mut s = straight(TangentMode::AutoSmooth);
        let knot = BezierKnot::with_tangents(
            Point3::new(2.0, 0.0, 0.0),
            Vector3::new(-1.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::y(),
        );
        s.set_knot(1, knot).unwrap();
        assert_eq!(s.tangent_mode(1), Some(TangentMode::Manual));
        assert_eq!(s.knot(1), Some(&knot));
    }

    #[test]
    fn set_tangent_mode_clips_range() {
        let mut s = straight(TangentMode::Manual);
        s.set_tangent_mode(1..100, TangentMode::Linear);
        assert_eq!(s.tangent_mode(0), Some(TangentMode::Manual));
        assert_eq!(s.tangent_mode(2), Some(TangentMode::Linear));
    }

    #[test]
    fn insert_and_remove() {
        let mut s = straight(TangentMode::Linear);
        s.insert(1, BezierKnot::new(Point3::new(1.0, 0.0, 0.0)), TangentMode::Linear)
            .unwrap();
        assert_eq!(s.len(), 4);
        let removed = s.remove(1).unwrap();
        assert!((removed.position - Point3::new(1.0, 0.0, 0.0)).norm() < TOLERANCE);
        assert_eq!(s.len(), 3);
        assert!(s.remove(3).is_err());
        assert!(s
            .insert(9, BezierKnot::new(Point3::origin()), TangentMode::Linear)
            .is_err());
    }

    #[test]
    fn extend_matches_from_points() {
        let points = [
            Point3::origin(),
            Point3::new(4.0, 0.0, 0.0),
            Point3::new(4.0, 0.0, 4.0),
        ];
        let mut s = BezierSpline::new();
        s.add_with_mode(BezierKnot::new(points[0]), TangentMode::AutoSmooth);
        s.extend(points[1..].iter().map(|p| BezierKnot::new(*p)), TangentMode::AutoSmooth);
        let expected = BezierSpline::from_points(&points, Vector3::y(), TangentMode::AutoSmooth);
        assert_eq!(s.knots(), expected.knots());
        assert_relative_eq!(s.length(), expected.length(), epsilon = 1e-12);
    }

    #[test]
    fn clear_keeps_nothing() {
        let mut s = bent();
        s.clear();
        assert!(s.is_empty());
        assert!(s.length().abs() < TOLERANCE);
    }

    #[test]
    fn up_is_interpolated() {
        let mut s = BezierSpline::new();
        s.add_with_mode(
            BezierKnot::with_up(Point3::origin(), Vector3::y()),
            TangentMode::Linear,
        );
        s.add_with_mode(
            BezierKnot::with_up(Point3::new(10.0, 0.0, 0.0), Vector3::z()),
            TangentMode::Linear,
        );
        let up = s.evaluate(0.5).unwrap().up;
        let expected = Vector3::new(0.0, 1.0, 1.0).normalize();
        assert!((up - expected).norm() < 1e-9);
    }
}
