//! Log subscriber setup
//!
//! Filter precedence: `STAGEHAND_LOG`, then `[log] filter` from the config,
//! then `warn`. Output goes to stderr so command output stays clean.

use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "STAGEHAND_LOG";
const DEFAULT_FILTER: &str = "warn";

/// Pick the filter directive to use.
pub fn filter_directive(env_value: Option<String>, config_filter: Option<&str>) -> String {
    env_value
        .filter(|v| !v.trim().is_empty())
        .or_else(|| config_filter.map(str::to_string))
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(config_filter: Option<&str>) {
    let directive = filter_directive(std::env::var(LOG_ENV).ok(), config_filter);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_wins_over_config() {
        let directive = filter_directive(Some("debug".into()), Some("info"));
        assert_eq!(directive, "debug");
    }

    #[test]
    fn test_config_used_without_env() {
        assert_eq!(filter_directive(None, Some("stagehand=trace")), "stagehand=trace");
        assert_eq!(filter_directive(Some("  ".into()), Some("info")), "info");
    }

    #[test]
    fn test_default_is_warn() {
        assert_eq!(filter_directive(None, None), "warn");
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init(Some("off"));
        init(Some("off"));
    }
}
