use std::time::Duration;
use tracing::warn;

pub const INTERVAL_ENV: &str = "KUPSCORE_INTERVAL_SECS";
pub const TIMEOUT_ENV: &str = "KUPSCORE_RECOMPUTE_TIMEOUT_SECS";
pub const TOP_N_ENV: &str = "KUPSCORE_NOTIFY_TOP_N";

/// Configuration for the scoring scheduler
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// How often stale Kups are rebuilt
    pub recompute_interval: Duration,
    /// Wall-clock budget of a single Kup rebuild
    pub recompute_timeout: Duration,
    /// Entries carried by ranking-updated notifications
    pub notify_top_n: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            recompute_interval: Duration::from_secs(30 * 60), // 30 minutes
            recompute_timeout: Duration::from_secs(60),
            notify_top_n: 3,
        }
    }
}

impl SchedulerConfig {
    /// Reads overrides from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from a key lookup; unparsable values keep the default
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            recompute_interval: parse_or(&lookup, INTERVAL_ENV, defaults.recompute_interval.as_secs())
                .map(Duration::from_secs)
                .unwrap_or(defaults.recompute_interval),
            recompute_timeout: parse_or(&lookup, TIMEOUT_ENV, defaults.recompute_timeout.as_secs())
                .map(Duration::from_secs)
                .unwrap_or(defaults.recompute_timeout),
            notify_top_n: parse_or(&lookup, TOP_N_ENV, defaults.notify_top_n as u64)
                .map(|n| n as usize)
                .unwrap_or(defaults.notify_top_n),
        }
    }
}

/// Parses a positive integer setting, `None` when the default applies
fn parse_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Option<u64> {
    let raw = lookup(key)?;
    match raw.trim().parse::<u64>() {
        Ok(value) if value > 0 => Some(value),
        _ => {
            warn!(key, value = %raw, default, "Ignoring invalid scheduler setting");
            None
        }
    }
}
