use thiserror::Error;

/// Top-level error type for rail curve generation.
#[derive(Debug, Error)]
pub enum RailError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Operation(#[from] OperationError),
}

/// Errors related to curve construction and evaluation.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("parameter {parameter} = {value} is out of range [{min}, {max}]")]
    ParameterOutOfRange {
        parameter: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("zero-length vector")]
    ZeroVector,

    #[error("curve has no knots")]
    EmptyCurve,

    #[error("knot index {index} is out of range for a curve with {len} knots")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Errors raised while deriving a local frame from a curve sample.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("zero-length tangent at t = {t}")]
    DegenerateTangent { t: f64 },

    #[error("tangent is parallel to up vector at t = {t}")]
    DegenerateNormal { t: f64 },
}

/// Errors related to rail building operations.
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("reference curve has {found} knots, at least {required} are required")]
    InsufficientPoints { found: usize, required: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Convenience type alias for results using [`RailError`].
pub type Result<T> = std::result::Result<T, RailError>;
