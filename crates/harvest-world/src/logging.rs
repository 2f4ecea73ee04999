//! Structured logging setup
//!
//! Library code only emits `tracing` events. Binaries and integration harnesses
//! call [`init_tracing`] once to print them.

use serde::{Deserialize, Serialize};
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Log level for the harvest engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Filter directive enabling this level for every harvest crate
    pub fn harvest_filter(&self) -> String {
        ["harvest_core", "harvest_schema", "harvest_world", "harvest_journal"]
            .iter()
            .map(|target| format!("{}={}", target, self.as_str()))
            .collect::<Vec<_>>()
            .join(",")
    }
}

static TRACING_INIT: Once = Once::new();

/// Initialize tracing at `info` (idempotent)
pub fn init_tracing_default() {
    init_tracing(LogLevel::Info.as_str());
}

/// Initialize tracing with a default filter directive (first call wins)
///
/// `RUST_LOG`, when set, overrides `filter`.
pub fn init_tracing(filter: &str) {
    let filter_str = filter.to_string();
    TRACING_INIT.call_once(move || {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .compact();

        // another global subscriber may already be installed
        let _ = subscriber.try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_names() {
        assert_eq!(LogLevel::Trace.as_str(), "trace");
        assert_eq!(LogLevel::Error.as_str(), "error");
    }

    #[test]
    fn test_harvest_filter() {
        let filter = LogLevel::Debug.harvest_filter();
        assert!(filter.starts_with("harvest_core=debug,"));
        assert!(filter.ends_with("harvest_journal=debug"));
    }

    #[test]
    fn test_init_is_idempotent() {
        init_tracing("warn");
        init_tracing_default();
        tracing::info!("still fine after repeated init");
    }
}
