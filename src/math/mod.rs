/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Returns `v` scaled to unit length, or `None` when it is shorter than [`TOLERANCE`].
#[must_use]
pub fn try_normalize(v: &Vector3) -> Option<Vector3> {
    let len = v.norm();
    if len < TOLERANCE || !len.is_finite() {
        None
    } else {
        Some(v / len)
    }
}

/// Removes the component of `v` along the unit vector `axis` and normalizes the rest.
///
/// Returns `None` when `v` is (nearly) parallel to `axis`.
#[must_use]
pub fn orthonormalize(v: &Vector3, axis: &Vector3) -> Option<Vector3> {
    try_normalize(&(v - axis * axis.dot(v)))
}

/// Returns a unit vector perpendicular to the unit vector `dir`.
///
/// Uses `dir x +Y`, switching to `dir x +X` when `dir` is (nearly) vertical,
/// so the result is deterministic for a given input.
#[must_use]
pub fn any_perpendicular(dir: &Vector3) -> Vector3 {
    let axis = if dir.dot(&Vector3::y()).abs() > 0.999 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    // `dir` is not parallel to `axis`, so the cross product is non-zero.
    dir.cross(&axis).normalize()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn try_normalize_rejects_zero() {
        assert!(try_normalize(&Vector3::zeros()).is_none());
        assert!(try_normalize(&Vector3::new(1e-12, 0.0, 0.0)).is_none());
    }

    #[test]
    fn try_normalize_unit_length() {
        let n = try_normalize(&Vector3::new(3.0, 4.0, 0.0)).unwrap();
        assert!((n.norm() - 1.0).abs() < TOLERANCE);
        assert!((n - Vector3::new(0.6, 0.8, 0.0)).norm() < TOLERANCE);
    }

    #[test]
    fn orthonormalize_removes_axis_component() {
        let v = orthonormalize(&Vector3::new(1.0, 1.0, 0.0), &Vector3::x()).unwrap();
        assert!((v - Vector3::y()).norm() < TOLERANCE);
    }

    #[test]
    fn orthonormalize_parallel_is_none() {
        assert!(orthonormalize(&Vector3::new(-2.0, 0.0, 0.0), &Vector3::x()).is_none());
    }

    #[test]
    fn any_perpendicular_horizontal() {
        let p = any_perpendicular(&Vector3::x());
        assert!((p - Vector3::z()).norm() < TOLERANCE);
    }

    #[test]
    fn any_perpendicular_vertical() {
        let p = any_perpendicular(&Vector3::y());
        assert!(p.dot(&Vector3::y()).abs() < TOLERANCE);
        assert!((p.norm() - 1.0).abs() < TOLERANCE);
    }
}
