mod builder;
mod config;
mod offset;
mod sampler;
mod smooth;

pub use builder::{RailBuilder, RailState};
pub use config::{RailConfig, MAX_EXTRA_RESOLUTION, MAX_RAIL_WIDTH};
pub use offset::{OffsetCurveBuilder, RailPair};
pub use sampler::{sample_count, CurveSampler, DegeneratePolicy, Frame};
pub use smooth::TangentSmoother;
