//! Left/right rail curves derived from a reference spline.
//!
//! A reference [`geometry::Curve`] is resampled into local frames, each frame
//! position is displaced by half the rail width along its lateral normal, and
//! the two resulting splines get auto-smoothed tangents.
//! [`operations::rail::RailBuilder`] ties these steps together and rebuilds
//! the rails when the host reports a change.

pub mod error;
pub mod geometry;
pub mod math;
pub mod operations;

pub use error::{RailError, Result};
