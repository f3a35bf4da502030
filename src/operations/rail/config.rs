use crate::error::{OperationError, Result};

/// Upper bound for [`RailConfig::extra_resolution`] accepted by [`RailConfig::clamped`].
pub const MAX_EXTRA_RESOLUTION: usize = 10;

/// Upper bound for [`RailConfig::rail_width`] accepted by [`RailConfig::clamped`].
pub const MAX_RAIL_WIDTH: f64 = 10.0;

/// Parameters controlling rail generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RailConfig {
    /// Extra samples inserted between each pair of reference knots.
    pub extra_resolution: usize,
    /// Total lateral distance between the left and right rails.
    pub rail_width: f64,
}

impl Default for RailConfig {
    fn default() -> Self {
        Self {
            extra_resolution: 0,
            rail_width: 2.0,
        }
    }
}

impl RailConfig {
    /// Creates a new configuration.
    #[must_use]
    pub fn new(extra_resolution: usize, rail_width: f64) -> Self {
        Self {
            extra_resolution,
            rail_width,
        }
    }

    /// Creates a configuration with both values clamped to their editor ranges.
    ///
    /// A NaN width becomes `0`.
    #[must_use]
    pub fn clamped(extra_resolution: usize, rail_width: f64) -> Self {
        let rail_width = if rail_width.is_nan() {
            0.0
        } else {
            rail_width.clamp(0.0, MAX_RAIL_WIDTH)
        };
        Self {
            extra_resolution: extra_resolution.min(MAX_EXTRA_RESOLUTION),
            rail_width,
        }
    }

    /// Half of the rail width: the offset applied on each side.
    #[must_use]
    pub fn half_width(&self) -> f64 {
        self.rail_width / 2.0
    }

    /// Checks that the width is finite and non-negative and that the extra
    /// resolution does not exceed [`MAX_EXTRA_RESOLUTION`].
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidConfiguration` otherwise.
    pub fn validate(&self) -> Result<()> {
        if self.extra_resolution > MAX_EXTRA_RESOLUTION {
            return Err(OperationError::InvalidConfiguration(format!(
                "extra resolution must be at most {MAX_EXTRA_RESOLUTION}, got {}",
                self.extra_resolution
            ))
            .into());
        }
        if !self.rail_width.is_finite() || self.rail_width < 0.0 {
            return Err(OperationError::InvalidConfiguration(format!(
                "rail width must be finite and non-negative, got {}",
                self.rail_width
            ))
            .into());
        }
        Ok(())
    }
}
