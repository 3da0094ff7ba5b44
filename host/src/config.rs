use std::env;

pub const DEFAULT_MAX_TICKS: u32 = 3_600;
pub const DEFAULT_CHECKPOINT_INTERVAL: u32 = 60;

/// Run limits resolved from `ARES_*` environment variables. Unset, unparsable
/// and zero values fall back to the defaults; no `ARES_JOBS` leaves rayon's
/// default pool in charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunPolicy {
    pub max_ticks: u32,
    pub checkpoint_interval: u32,
    pub jobs: Option<usize>,
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self {
            max_ticks: DEFAULT_MAX_TICKS,
            checkpoint_interval: DEFAULT_CHECKPOINT_INTERVAL,
            jobs: None,
        }
    }
}

impl RunPolicy {
    pub fn from_env() -> Self {
        let mut checkpoint_interval =
            read_env_u32("ARES_CHECKPOINT_INTERVAL", DEFAULT_CHECKPOINT_INTERVAL);
        let max_ticks = read_env_u32("ARES_MAX_TICKS", DEFAULT_MAX_TICKS);

        if checkpoint_interval > max_ticks {
            tracing::warn!(
                "ARES_CHECKPOINT_INTERVAL ({}) > ARES_MAX_TICKS ({}). Checkpointing only the final tick.",
                checkpoint_interval,
                max_ticks
            );
            checkpoint_interval = max_ticks;
        }

        Self {
            max_ticks,
            checkpoint_interval,
            jobs: Some(read_env_usize("ARES_JOBS", 0)).filter(|jobs| *jobs > 0),
        }
    }

    /// Apply command-line overrides on top of the environment policy.
    pub fn with_overrides(
        mut self,
        max_ticks: Option<u32>,
        checkpoint_interval: Option<u32>,
        jobs: Option<usize>,
    ) -> Self {
        if let Some(max_ticks) = max_ticks.filter(|value| *value > 0) {
            self.max_ticks = max_ticks;
        }
        if let Some(interval) = checkpoint_interval.filter(|value| *value > 0) {
            self.checkpoint_interval = interval;
        }
        if jobs.is_some() {
            self.jobs = jobs.filter(|value| *value > 0);
        }
        self
    }
}

pub(crate) fn read_env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

pub(crate) fn read_env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_variables_fall_back_to_defaults() {
        assert_eq!(read_env_u32("ARES_TEST_UNSET_U32", 7), 7);
        assert_eq!(read_env_usize("ARES_TEST_UNSET_USIZE", 9), 9);
    }

    #[test]
    fn overrides_ignore_zero_values() {
        let policy = RunPolicy::default().with_overrides(Some(0), Some(25), Some(0));
        assert_eq!(policy.max_ticks, DEFAULT_MAX_TICKS);
        assert_eq!(policy.checkpoint_interval, 25);
        assert_eq!(policy.jobs, None);

        let policy = RunPolicy::default().with_overrides(Some(120), None, Some(4));
        assert_eq!(policy.max_ticks, 120);
        assert_eq!(policy.checkpoint_interval, DEFAULT_CHECKPOINT_INTERVAL);
        assert_eq!(policy.jobs, Some(4));
    }
}
