//! Frame pacing for the fixed-timestep loop.
//!
//! The loop advances the animation by a constant `dt = 1 / refresh_rate`
//! every iteration and sleeps off whatever is left of the frame interval.
//! There is no catch-up: a slow frame just makes the effective frame rate
//! drop.

use std::time::Duration;

use log::{info, warn};

/// Used when the display can't tell us its refresh rate.
pub const DEFAULT_REFRESH_RATE: u32 = 60;

/// Something that knows the display's refresh rate in Hz.
pub trait RefreshRateProvider: Send + Sync {
    /// `None` (or `Some(0)`) when the rate can't be determined.
    fn refresh_rate(&self) -> Option<u32>;
}

/// A provider with a fixed answer, e.g. from a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedRefreshRate(pub Option<u32>);

impl RefreshRateProvider for FixedRefreshRate {
    fn refresh_rate(&self) -> Option<u32> {
        self.0
    }
}

/// Ask `provider` for the refresh rate, falling back to 60 Hz.
pub fn resolve_refresh_rate(provider: &dyn RefreshRateProvider) -> u32 {
    match provider.refresh_rate() {
        Some(rate) if rate > 0 => {
            info!("display refresh rate: {} Hz", rate);
            rate
        }
        _ => {
            warn!(
                "display refresh rate unavailable, using {} Hz",
                DEFAULT_REFRESH_RATE
            );
            DEFAULT_REFRESH_RATE
        }
    }
}

/// Fixed timestep and frame interval derived from a refresh rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePacer {
    dt: f64,
    interval: Duration,
}

impl FramePacer {
    /// `refresh_rate` of 0 is treated as unknown.
    pub fn new(refresh_rate: u32) -> Self {
        let rate = if refresh_rate == 0 {
            DEFAULT_REFRESH_RATE
        } else {
            refresh_rate
        };
        let dt = 1.0 / rate as f64;
        // Never spin: at least a millisecond per frame.
        let interval = Duration::from_secs_f64(dt).max(Duration::from_millis(1));
        Self { dt, interval }
    }

    /// Simulation step in seconds.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Target wall-clock time per frame.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// How long to sleep after a frame whose work took `elapsed`.
    pub fn sleep_after(&self, elapsed: Duration) -> Duration {
        self.interval.saturating_sub(elapsed)
    }

    /// True when a frame's work alone blew the budget.
    pub fn is_overrun(&self, elapsed: Duration) -> bool {
        elapsed > self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_sixty() {
        assert_eq!(resolve_refresh_rate(&FixedRefreshRate(None)), 60);
        assert_eq!(resolve_refresh_rate(&FixedRefreshRate(Some(0))), 60);
        assert_eq!(resolve_refresh_rate(&FixedRefreshRate(Some(144))), 144);
    }

    #[test]
    fn pacer_from_rate() {
        let pacer = FramePacer::new(50);
        assert!((pacer.dt() - 0.02).abs() < 1e-12);
        assert_eq!(pacer.interval(), Duration::from_millis(20));
    }

    #[test]
    fn zero_rate_uses_default() {
        let pacer = FramePacer::new(0);
        assert!((pacer.dt() - 1.0 / 60.0).abs() < 1e-12);
    }

    #[test]
    fn sleep_never_goes_negative() {
        let pacer = FramePacer::new(100);
        assert_eq!(pacer.sleep_after(Duration::from_millis(4)), Duration::from_millis(6));
        assert_eq!(pacer.sleep_after(Duration::from_millis(25)), Duration::ZERO);
        assert!(pacer.is_overrun(Duration::from_millis(11)));
        assert!(!pacer.is_overrun(Duration::from_millis(9)));
    }

    #[test]
    fn interval_has_a_floor() {
        let pacer = FramePacer::new(5000);
        assert_eq!(pacer.interval(), Duration::from_millis(1));
    }
}
