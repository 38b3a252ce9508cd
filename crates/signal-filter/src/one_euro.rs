//! One Euro Filter
//!
//! Adaptive low-pass smoother for interactive signals
//! (<https://gery.casiez.net/1euro/>). The cutoff frequency rises with the
//! signal's speed, so slow movements are de-jittered aggressively while
//! fast movements stay responsive.
//!
//! Tuning: start with `beta = 0` and a mid-range `min_cutoff` such as 1 Hz.
//! Lower `min_cutoff` until slow-speed jitter disappears, then raise `beta`
//! until fast movements stop lagging.

use serde::{Deserialize, Serialize};

/// First-order low-pass step: blend `x` into `x_prev` by `alpha`.
pub fn low_pass(x: f32, x_prev: f32, alpha: f32) -> f32 {
    alpha * x + (1.0 - alpha) * x_prev
}

/// One euro filter parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OneEuroConfig {
    /// Minimum cutoff frequency in Hz; decrease to remove slow-speed
    /// jitter (must stay above 0)
    pub min_cutoff: f32,
    /// Cutoff slope; increase to reduce high-speed lag
    pub beta: f32,
}

impl Default for OneEuroConfig {
    fn default() -> Self {
        Self {
            min_cutoff: 1.0,
            beta: 0.0,
        }
    }
}

/// Adaptive low-pass filter for de-jittering interactive input signals
pub struct OneEuroFilter {
    config: OneEuroConfig,
    x_filt: f32,
    dx_filt: f32,
    last_time_ms: u32,
    initialized: bool,
}

impl OneEuroFilter {
    /// Derivative estimates are smoothed at a fixed 1 Hz cutoff.
    const DERIVATIVE_CUTOFF: f32 = 1.0;

    /// Create a filter with the given parameters.
    pub fn new(config: OneEuroConfig) -> Self {
        Self {
            config,
            x_filt: 0.0,
            dx_filt: 0.0,
            last_time_ms: 0,
            initialized: false,
        }
    }

    /// Filter the sample `x` taken at time `t_ms` (milliseconds).
    ///
    /// The first sample initializes the filter and passes through
    /// unchanged; a repeated timestamp returns the previous output.
    pub fn process(&mut self, x: f32, t_ms: u32) -> f32 {
        if !self.initialized {
            self.initialized = true;
            self.dx_filt = 0.0;
            self.x_filt = x;
            self.last_time_ms = t_ms;
            return x;
        }
        if t_ms == self.last_time_ms {
            return self.x_filt;
        }

        let dt = t_ms.wrapping_sub(self.last_time_ms) as f32 * 0.001;
        let dx = (x - self.x_filt) / dt;
        self.last_time_ms = t_ms;

        self.dx_filt = low_pass(dx, self.dx_filt, Self::alpha(Self::DERIVATIVE_CUTOFF, dt));
        let cutoff = self.config.min_cutoff + self.config.beta * self.dx_filt.abs();
        self.x_filt = low_pass(x, self.x_filt, Self::alpha(cutoff, dt));
        self.x_filt
    }

    /// Forget all state; the next sample re-initializes the filter.
    pub fn reset(&mut self) {
        self.initialized = false;
    }

    fn alpha(cutoff: f32, dt: f32) -> f32 {
        let r = 2.0 * std::f32::consts::PI * cutoff * dt;
        r / (r + 1.0)
    }
}

impl Default for OneEuroFilter {
    fn default() -> Self {
        Self::new(OneEuroConfig::default())
    }
}
