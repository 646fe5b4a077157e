//! Construction-time settings for a [`Soundboard`](crate::Soundboard)

use std::time::Duration;

use soundboard_api::client::{DEFAULT_COMMAND_SETTLE, DEFAULT_READ_TIMEOUT};

use crate::catalog::EnumerationStrategy;
use crate::volume::VolumeTarget;

/// Shortest accepted read timeout
pub const MIN_READ_TIMEOUT: Duration = Duration::from_millis(1);
/// Longest accepted read timeout, and the fallback for out-of-range values
pub const MAX_READ_TIMEOUT: Duration = Duration::from_millis(1000);
/// How long the reset pin is held low
pub const DEFAULT_RESET_PULSE: Duration = Duration::from_millis(10);
/// Wait between releasing reset and reading the boot banner
pub const DEFAULT_BOOT_DELAY: Duration = Duration::from_secs(1);
/// Wait between starting a probe track and querying its time and size
pub const DEFAULT_PROBE_SETTLE: Duration = Duration::from_millis(50);

/// Driver configuration
///
/// Invalid values never fail construction; they fall back to the documented
/// defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct SoundboardConfig {
    read_timeout: Duration,
    command_settle: Duration,
    reset_pulse: Duration,
    boot_delay: Duration,
    probe_settle: Duration,
    initial_volume: Option<VolumeTarget>,
    strategy: EnumerationStrategy,
    probe_limit: Option<usize>,
    debug: bool,
}

impl Default for SoundboardConfig {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            command_settle: DEFAULT_COMMAND_SETTLE,
            reset_pulse: DEFAULT_RESET_PULSE,
            boot_delay: DEFAULT_BOOT_DELAY,
            probe_settle: DEFAULT_PROBE_SETTLE,
            initial_volume: None,
            strategy: EnumerationStrategy::default(),
            probe_limit: None,
            debug: false,
        }
    }
}

impl SoundboardConfig {
    pub fn builder() -> SoundboardConfigBuilder {
        SoundboardConfigBuilder::default()
    }

    /// Default settings with every hardware delay removed
    ///
    /// Meant for simulated boards that answer instantly.
    pub fn immediate() -> Self {
        Self {
            read_timeout: MIN_READ_TIMEOUT,
            command_settle: Duration::ZERO,
            reset_pulse: Duration::ZERO,
            boot_delay: Duration::ZERO,
            probe_settle: Duration::ZERO,
            ..Self::default()
        }
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn command_settle(&self) -> Duration {
        self.command_settle
    }

    pub fn reset_pulse(&self) -> Duration {
        self.reset_pulse
    }

    pub fn boot_delay(&self) -> Duration {
        self.boot_delay
    }

    pub fn probe_settle(&self) -> Duration {
        self.probe_settle
    }

    pub fn initial_volume(&self) -> Option<VolumeTarget> {
        self.initial_volume
    }

    pub fn strategy(&self) -> EnumerationStrategy {
        self.strategy
    }

    pub fn probe_limit(&self) -> Option<usize> {
        self.probe_limit
    }

    pub fn debug(&self) -> bool {
        self.debug
    }
}

/// Fluent builder for [`SoundboardConfig`]
#[derive(Debug, Clone, Default)]
pub struct SoundboardConfigBuilder {
    config: SoundboardConfig,
}

impl SoundboardConfigBuilder {
    /// Start from [`SoundboardConfig::immediate`] instead of the hardware defaults
    pub fn immediate(mut self) -> Self {
        self.config = SoundboardConfig {
            initial_volume: self.config.initial_volume,
            strategy: self.config.strategy,
            probe_limit: self.config.probe_limit,
            debug: self.config.debug,
            ..SoundboardConfig::immediate()
        };
        self
    }

    /// Bound on each line read; outside [1 ms, 1000 ms] it becomes 1000 ms
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = if (MIN_READ_TIMEOUT..=MAX_READ_TIMEOUT).contains(&timeout) {
            timeout
        } else {
            tracing::debug!(?timeout, fallback = ?MAX_READ_TIMEOUT, "read timeout out of range");
            MAX_READ_TIMEOUT
        };
        self
    }

    pub fn command_settle(mut self, delay: Duration) -> Self {
        self.config.command_settle = delay;
        self
    }

    pub fn reset_pulse(mut self, pulse: Duration) -> Self {
        self.config.reset_pulse = pulse;
        self
    }

    pub fn boot_delay(mut self, delay: Duration) -> Self {
        self.config.boot_delay = delay;
        self
    }

    pub fn probe_settle(mut self, delay: Duration) -> Self {
        self.config.probe_settle = delay;
        self
    }

    /// Volume to step to as soon as the board is constructed
    pub fn initial_volume(mut self, volume: impl Into<VolumeTarget>) -> Self {
        self.config.initial_volume = Some(volume.into());
        self
    }

    pub fn strategy(mut self, strategy: EnumerationStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    /// Stop probe enumeration after this many indices even without `NoFile`
    pub fn probe_limit(mut self, limit: usize) -> Self {
        self.config.probe_limit = Some(limit);
        self
    }

    /// Turn on per-command debug output for this board
    pub fn debug(mut self, enabled: bool) -> Self {
        self.config.debug = enabled;
        self
    }

    pub fn build(self) -> SoundboardConfig {
        self.config
    }
}
