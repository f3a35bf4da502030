use tracing::{debug, trace};

use crate::error::{OperationError, Result};
use crate::geometry::Curve;

use super::config::RailConfig;
use super::offset::{OffsetCurveBuilder, RailPair};
use super::sampler::{sample_count, CurveSampler, DegeneratePolicy, Frame};
use super::smooth::TangentSmoother;

/// Minimum knot count of a reference curve for rails to be built.
const MIN_REFERENCE_KNOTS: usize = 2;

/// Lifecycle state of a [`RailBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RailState {
    /// No rail buffers sized for the current sample count.
    Uninitialized,
    /// The published rails match the last known inputs.
    Ready,
    /// Inputs changed since the last rebuild.
    Stale,
}

/// Owns the left/right rails of one reference curve and rebuilds them on demand.
///
/// The host reports changes through [`RailBuilder::set_config`] and
/// [`RailBuilder::invalidate`] and calls [`RailBuilder::rebuild_if_needed`]
/// when convenient. A rebuild samples the reference curve, offsets the frames
/// into a scratch pair, smooths it and swaps it with the published pair, so
/// [`RailBuilder::rails`] never exposes a half-built pair and a failed rebuild
/// keeps the previous rails.
#[derive(Debug)]
pub struct RailBuilder {
    config: RailConfig,
    policy: DegeneratePolicy,
    state: RailState,
    sample_count: usize,
    published: Option<RailPair>,
    scratch: RailPair,
}

impl Default for RailBuilder {
    fn default() -> Self {
        Self::new(RailConfig::default())
    }
}

impl RailBuilder {
    /// Creates an uninitialized builder.
    #[must_use]
    pub fn new(config: RailConfig) -> Self {
        Self {
            config,
            policy: DegeneratePolicy::default(),
            state: RailState::Uninitialized,
            sample_count: 0,
            published: None,
            scratch: RailPair::default(),
        }
    }

    /// Sets the degenerate normal policy used when sampling.
    #[must_use]
    pub fn with_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the current configuration.
    #[must_use]
    pub fn config(&self) -> &RailConfig {
        &self.config
    }

    /// Offset applied on each side of the reference curve.
    #[must_use]
    pub fn half_width(&self) -> f64 {
        self.config.half_width()
    }

    /// Returns the lifecycle state.
    #[must_use]
    pub fn state(&self) -> RailState {
        self.state
    }

    /// Sample count the rail buffers are currently sized for.
    #[must_use]
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Returns the last published rails, if any rebuild has succeeded.
    #[must_use]
    pub fn rails(&self) -> Option<&RailPair> {
        self.published.as_ref()
    }

    /// Returns whether the host has reported a change since the last rebuild.
    #[must_use]
    pub fn needs_rebuild(&self) -> bool {
        self.state != RailState::Ready
    }

    /// Replaces the configuration.
    ///
    /// A different `extra_resolution` changes the sample count and releases the
    /// rail buffers; a width change alone only marks the rails stale.
    pub fn set_config(&mut self, config: RailConfig) {
        if config == self.config {
            return;
        }
        let resize = config.extra_resolution != self.config.extra_resolution;
        self.config = config;
        if resize {
            self.release();
        } else {
            self.invalidate();
        }
    }

    /// Sets the number of extra samples between reference knots.
    pub fn set_extra_resolution(&mut self, extra_resolution: usize) {
        self.set_config(RailConfig {
            extra_resolution,
            ..self.config
        });
    }

    /// Sets the total rail width.
    pub fn set_rail_width(&mut self, rail_width: f64) {
        self.set_config(RailConfig {
            rail_width,
            ..self.config
        });
    }

    /// Marks the rails stale, typically after the reference curve was edited.
    pub fn invalidate(&mut self) {
        if self.state == RailState::Ready {
            self.state = RailState::Stale;
        }
    }

    /// Samples `reference` at the density the current configuration implies.
    ///
    /// # Errors
    ///
    /// Returns an error if the reference has fewer than 2 knots or sampling fails.
    pub fn frames<C: Curve + ?Sized>(&self, reference: &C) -> Result<Vec<Frame>> {
        let n = self.required_samples(reference.knot_count())?;
        CurveSampler::new(n).with_policy(self.policy).sample(reference)
    }

    /// Rebuilds the rails only when the builder is not [`RailState::Ready`] or
    /// the reference knot count no longer matches the buffers.
    ///
    /// # Errors
    ///
    /// See [`RailBuilder::rebuild`].
    pub fn rebuild_if_needed<C: Curve + ?Sized>(
        &mut self,
        reference: &C,
    ) -> Result<Option<&RailPair>> {
        let resized = sample_count(reference.knot_count(), self.config.extra_resolution)
            != Some(self.sample_count);
        if !self.needs_rebuild() && !resized {
            return Ok(None);
        }
        self.rebuild(reference).map(Some)
    }

    /// Rebuilds and publishes both rails from `reference`.
    ///
    /// # Errors
    ///
    /// - `OperationError::InsufficientPoints` if the reference has fewer than 2 knots
    /// - `OperationError::InvalidConfiguration` if the width or the extra
    ///   resolution is out of range
    /// - any sampling error, see [`CurveSampler::sample`]
    ///
    /// On error the previously published rails are kept.
    pub fn rebuild<C: Curve + ?Sized>(&mut self, reference: &C) -> Result<&RailPair> {
        let knots = reference.knot_count();
        let n = match self.required_samples(knots) {
            Ok(n) => n,
            Err(e) => {
                debug!(knots, error = %e, "skipping rail rebuild");
                return Err(e);
            }
        };

        if self.state == RailState::Uninitialized || n != self.sample_count {
            self.allocate(n);
        }

        let frames = CurveSampler::new(n)
            .with_policy(self.policy)
            .sample(reference)?;
        OffsetCurveBuilder::new(self.config.half_width()).build_into(&frames, &mut self.scratch);
        TangentSmoother::smooth_pair(&mut self.scratch);

        let built = match self.published.take() {
            Some(mut previous) if previous.len() == n => {
                std::mem::swap(&mut previous, &mut self.scratch);
                previous
            }
            _ => std::mem::replace(&mut self.scratch, RailPair::with_capacity(n)),
        };
        self.state = RailState::Ready;
        trace!(samples = n, "published rails");
        Ok(&*self.published.insert(built))
    }

    fn required_samples(&self, knots: usize) -> Result<usize> {
        if knots < MIN_REFERENCE_KNOTS {
            return Err(OperationError::InsufficientPoints {
                found: knots,
                required: MIN_REFERENCE_KNOTS,
            }
            .into());
        }
        self.config.validate()?;
        match sample_count(knots, self.config.extra_resolution) {
            Some(n) if n > 1 => Ok(n),
            Some(n) => Err(OperationError::InvalidConfiguration(format!(
                "sample count {n} is too small"
            ))
            .into()),
            None => Err(OperationError::InvalidConfiguration(format!(
                "sample count overflows for {knots} knots with extra resolution {}",
                self.config.extra_resolution
            ))
            .into()),
        }
    }

    fn release(&mut self) {
        debug!("releasing rail buffers");
        self.state = RailState::Uninitialized;
        self.sample_count = 0;
        self.scratch = RailPair::default();
    }

    fn allocate(&mut self, n: usize) {
        if self.state != RailState::Uninitialized {
            self.release();
        }
        debug!(samples = n, "allocating rail buffers");
        self.sample_count = n;
        self.scratch = RailPair::with_capacity(n);
    }
}
