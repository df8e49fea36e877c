//! Tunables for the time-bounded idempotency mechanisms.

use std::time::Duration;

/// Window and TTL settings shared by conversion dedup and export replay.
///
/// Values are clamped so a typo in deployment config cannot disable dedup
/// (zero window) or pin cache entries for days.
///
/// # Examples
/// ```
/// use clinic_newsletter::domain::IdempotencyConfig;
/// use std::time::Duration;
///
/// let config = IdempotencyConfig::default();
/// assert_eq!(config.dedup_window(), Duration::from_secs(60));
///
/// let clamped = IdempotencyConfig::from_secs(0, 999_999);
/// assert_eq!(clamped.dedup_window(), Duration::from_secs(1));
/// assert_eq!(clamped.export_ttl(), Duration::from_secs(86_400));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdempotencyConfig {
    dedup_window: Duration,
    export_ttl: Duration,
}

impl IdempotencyConfig {
    /// Default trailing window for conversion dedup, in seconds.
    pub const DEFAULT_DEDUP_WINDOW_SECS: u64 = 60;
    const MIN_DEDUP_WINDOW_SECS: u64 = 1;
    const MAX_DEDUP_WINDOW_SECS: u64 = 3_600;

    /// Default lifetime of a cached export response, in seconds.
    pub const DEFAULT_EXPORT_TTL_SECS: u64 = 300;
    const MIN_EXPORT_TTL_SECS: u64 = 1;
    const MAX_EXPORT_TTL_SECS: u64 = 86_400;

    /// Build a configuration from raw seconds, clamping out-of-range values.
    pub fn from_secs(dedup_window_secs: u64, export_ttl_secs: u64) -> Self {
        let window = dedup_window_secs.clamp(Self::MIN_DEDUP_WINDOW_SECS, Self::MAX_DEDUP_WINDOW_SECS);
        let ttl = export_ttl_secs.clamp(Self::MIN_EXPORT_TTL_SECS, Self::MAX_EXPORT_TTL_SECS);
        if window != dedup_window_secs {
            tracing::warn!(
                requested = dedup_window_secs,
                applied = window,
                "dedup window clamped"
            );
        }
        if ttl != export_ttl_secs {
            tracing::warn!(
                requested = export_ttl_secs,
                applied = ttl,
                "export cache ttl clamped"
            );
        }
        Self {
            dedup_window: Duration::from_secs(window),
            export_ttl: Duration::from_secs(ttl),
        }
    }

    /// Trailing window in which identical conversion events are suppressed.
    pub fn dedup_window(&self) -> Duration {
        self.dedup_window
    }

    /// Lifetime of replayable export responses.
    pub fn export_ttl(&self) -> Duration {
        self.export_ttl
    }
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self::from_secs(Self::DEFAULT_DEDUP_WINDOW_SECS, Self::DEFAULT_EXPORT_TTL_SECS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(60, 60)]
    #[case(0, 1)]
    #[case(7_200, 3_600)]
    fn dedup_window_is_clamped(#[case] requested: u64, #[case] expected: u64) {
        let config = IdempotencyConfig::from_secs(requested, 300);
        assert_eq!(config.dedup_window(), Duration::from_secs(expected));
    }

    #[rstest]
    #[case(300, 300)]
    #[case(0, 1)]
    #[case(u64::MAX, 86_400)]
    fn export_ttl_is_clamped(#[case] requested: u64, #[case] expected: u64) {
        let config = IdempotencyConfig::from_secs(60, requested);
        assert_eq!(config.export_ttl(), Duration::from_secs(expected));
    }
}
