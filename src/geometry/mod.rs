pub mod curve;

pub use curve::{BezierKnot, BezierSpline, Curve, CurvePoint, Line, TangentMode};
