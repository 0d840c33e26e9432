use std::time::Duration;

/// Default number of execution attempts per job.
const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delays between attempts, in seconds (exponential: 1s, 2s, 4s).
const DEFAULT_BACKOFF_SECS: [u64; 3] = [1, 2, 4];

/// Retry settings for the job runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerConfig {
    /// Attempts before a job is given up on (at least 1).
    pub max_attempts: u32,
    /// Delay before each retry. The last entry repeats once exhausted; an
    /// empty list retries immediately.
    pub backoff: Vec<Duration>,
}

impl WorkerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default |
    /// |--------------------|---------|
    /// | `JOB_MAX_ATTEMPTS` | `3`     |
    /// | `JOB_BACKOFF_SECS` | `1,2,4` |
    ///
    /// Unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        let max_attempts = std::env::var("JOB_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_MAX_ATTEMPTS);

        let backoff = std::env::var("JOB_BACKOFF_SECS")
            .ok()
            .and_then(|v| parse_backoff(&v))
            .unwrap_or_else(default_backoff);

        Self {
            max_attempts,
            backoff,
        }
    }

    /// Delay to wait after the given (1-based) failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let index = attempt.saturating_sub(1) as usize;
        self.backoff
            .get(index)
            .or_else(|| self.backoff.last())
            .copied()
            .unwrap_or(Duration::ZERO)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff: default_backoff(),
        }
    }
}

fn default_backoff() -> Vec<Duration> {
    DEFAULT_BACKOFF_SECS
        .iter()
        .map(|s| Duration::from_secs(*s))
        .collect()
}

/// Parse a comma-separated list of seconds. `None` if any entry is invalid.
fn parse_backoff(raw: &str) -> Option<Vec<Duration>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<u64>().ok().map(Duration::from_secs))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_seconds() {
        assert_eq!(
            parse_backoff("5, 10,30"),
            Some(vec![
                Duration::from_secs(5),
                Duration::from_secs(10),
                Duration::from_secs(30)
            ])
        );
        assert_eq!(parse_backoff("5,x"), None);
    }

    #[test]
    fn delay_repeats_last_entry() {
        let config = WorkerConfig::default();
        assert_eq!(config.delay_after(1), Duration::from_secs(1));
        assert_eq!(config.delay_after(3), Duration::from_secs(4));
        assert_eq!(config.delay_after(9), Duration::from_secs(4));
    }

    #[test]
    fn empty_backoff_retries_immediately() {
        let config = WorkerConfig {
            max_attempts: 2,
            backoff: Vec::new(),
        };
        assert_eq!(config.delay_after(1), Duration::ZERO);
    }
}
