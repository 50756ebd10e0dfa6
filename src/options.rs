// Freshness policy options.
// Process-wide defaults merged with caller-supplied overrides, field by field.

use std::time::Duration;

/// Default refresh interval: zero, meaning no periodic refresh.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::ZERO;

/// Policy controlling cache freshness and revalidation cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwrOptions {
    /// Period between automatic revalidations. Zero disables the timer.
    pub refresh_interval: Duration,
    /// Maximum age for a cached entry to count as fresh. `None` is unlimited.
    pub ttl: Option<Duration>,
}

impl Default for SwrOptions {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            ttl: None,
        }
    }
}

impl SwrOptions {
    /// Merge a patch over these options. Fields set in the patch win.
    pub fn merged(self, patch: SwrOptionsPatch) -> Self {
        Self {
            refresh_interval: patch.refresh_interval.unwrap_or(self.refresh_interval),
            ttl: patch.ttl.or(self.ttl),
        }
    }
}

/// Caller-supplied overrides for [`SwrOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SwrOptionsPatch {
    pub refresh_interval: Option<Duration>,
    pub ttl: Option<Duration>,
}
