//! Logging setup and timing helpers.
//!
//! Built on `tracing`: scopes are tracing targets (module paths), so child
//! scopes extend the parent path by construction. [`LogOptions`] compiles a
//! global minimum level, per-scope overrides, and a scope deny-list into an
//! `EnvFilter`. A per-target `EnvFilter` directive replaces the default
//! level for that target, so overrides are clamped to the global gate when
//! rendered: a record is emitted only if it clears both thresholds.

use std::fmt::Write as _;
use std::time::Instant;

use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

/// Filter configuration for the process-wide subscriber.
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Global minimum level; records below it are dropped.
    pub level: Level,
    /// Per-scope level overrides, e.g. `("clipfetch::cache", Level::WARN)`.
    /// An override can only restrict: one looser than the global level is
    /// clamped to it.
    pub overrides: Vec<(String, Level)>,
    /// Scopes whose output is suppressed entirely, regardless of level.
    pub quiet_scopes: Vec<String>,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            overrides: Vec::new(),
            quiet_scopes: Vec::new(),
        }
    }
}

impl LogOptions {
    pub fn verbose(verbose: bool) -> Self {
        Self {
            level: if verbose { Level::DEBUG } else { Level::INFO },
            ..Self::default()
        }
    }

    /// Render the options as an `EnvFilter` directive string.
    pub fn directives(&self) -> String {
        let mut out = self.level.to_string().to_lowercase();
        for (scope, level) in &self.overrides {
            // Level orders TRACE as the greatest, so min picks the less
            // verbose of the override and the global gate.
            let effective = std::cmp::min(*level, self.level);
            let _ = write!(out, ",{}={}", scope, effective.to_string().to_lowercase());
        }
        for scope in &self.quiet_scopes {
            let _ = write!(out, ",{scope}=off");
        }
        out
    }
}

/// Install the global subscriber. Errors if one is already set.
pub fn init(options: &LogOptions) -> Result<(), String> {
    let filter = EnvFilter::try_new(options.directives()).map_err(|e| e.to_string())?;
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber).map_err(|e| e.to_string())
}

/// Elapsed-time handle for a single operation.
///
/// Completion records the wall-clock duration and outcome, at info level for
/// success and error level for failure.
pub struct OpTimer {
    label: &'static str,
    started: Instant,
}

impl OpTimer {
    pub fn start(label: &'static str) -> Self {
        Self {
            label,
            started: Instant::now(),
        }
    }

    pub fn success(self) {
        info!(
            operation = self.label,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            "operation completed"
        );
    }

    pub fn failure(self, err: &dyn std::fmt::Display) {
        error!(
            operation = self.label,
            elapsed_ms = self.started.elapsed().as_millis() as u64,
            error = %err,
            "operation failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_combine_level_overrides_and_denials() {
        let options = LogOptions {
            level: Level::INFO,
            overrides: vec![("clipfetch::cache".to_owned(), Level::WARN)],
            quiet_scopes: vec!["hyper".to_owned()],
        };
        assert_eq!(options.directives(), "info,clipfetch::cache=warn,hyper=off");
    }

    #[test]
    fn default_directives_are_just_the_level() {
        assert_eq!(LogOptions::default().directives(), "info");
    }

    #[test]
    fn looser_override_is_clamped_to_the_global_gate() {
        let options = LogOptions {
            level: Level::INFO,
            overrides: vec![("clipfetch::cache".to_owned(), Level::DEBUG)],
            quiet_scopes: Vec::new(),
        };
        assert_eq!(options.directives(), "info,clipfetch::cache=info");

        let filter = EnvFilter::try_new(options.directives()).unwrap();
        let subscriber = tracing_subscriber::fmt().with_env_filter(filter).finish();
        tracing::subscriber::with_default(subscriber, || {
            assert!(!tracing::enabled!(
                target: "clipfetch::cache",
                Level::DEBUG
            ));
            assert!(tracing::enabled!(target: "clipfetch::cache", Level::INFO));
        });
    }

    #[test]
    fn stricter_override_is_kept() {
        let options = LogOptions {
            level: Level::DEBUG,
            overrides: vec![("clipfetch::cache".to_owned(), Level::WARN)],
            quiet_scopes: Vec::new(),
        };
        assert_eq!(options.directives(), "debug,clipfetch::cache=warn");
    }
}
