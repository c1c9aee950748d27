use embassy_time::Duration;

use crate::{DEBOUNCE_TICKS, LONG_TICKS, PRESS_REPEAT_MAX_NUM, SHORT_TICKS, TICKS_INTERVAL_MS};

/// Timing configuration of the button scanner.
///
/// The values are fixed at build time. They are generated by `build.rs` from the file pointed to
/// by the `MULTIBUTTON_CONFIG_PATH` environment variable, falling back to the defaults:
///
/// ```toml
/// [button]
/// ticks_interval = 5
/// debounce_ticks = 3
/// short_press_ms = 300
/// long_press_ms = 1000
/// repeat_max = 15
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonConfig {
    /// Interval between two calls of [`Buttons::tick`](crate::Buttons::tick), in ms
    pub ticks_interval_ms: u16,
    /// Consecutive disagreeing samples needed to accept a level change
    pub debounce_ticks: u8,
    /// Quiet window, in ticks, that closes a click sequence
    pub short_ticks: u16,
    /// Hold time, in ticks, after which a press becomes a long press
    pub long_ticks: u16,
    /// Upper bound of the repeat counter
    pub repeat_max: u8,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ButtonConfig {
    /// The configuration the crate was built with
    pub const fn new() -> Self {
        Self {
            ticks_interval_ms: TICKS_INTERVAL_MS,
            debounce_ticks: DEBOUNCE_TICKS,
            short_ticks: SHORT_TICKS,
            long_ticks: LONG_TICKS,
            repeat_max: PRESS_REPEAT_MAX_NUM,
        }
    }

    /// Scan period as a [`Duration`]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.ticks_interval_ms as u64)
    }

    /// Convert a number of ticks into wall time, e.g. for reporting how long a button was held
    pub const fn ticks_to_duration(&self, ticks: u16) -> Duration {
        Duration::from_millis(ticks as u64 * self.ticks_interval_ms as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_constants() {
        let config = ButtonConfig::default();
        assert_eq!(config.debounce_ticks, DEBOUNCE_TICKS);
        assert!(config.short_ticks < config.long_ticks);
        assert!(config.repeat_max <= 15);
        assert_eq!(
            config.tick_interval(),
            Duration::from_millis(TICKS_INTERVAL_MS as u64)
        );
        assert_eq!(
            config.ticks_to_duration(config.short_ticks),
            Duration::from_millis(SHORT_TICKS as u64 * TICKS_INTERVAL_MS as u64)
        );
    }
}
