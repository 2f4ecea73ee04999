//! World Configuration - seeding, worker threads and log filter
//!
//! Every Instance gets its own sampler, seeded from the world's global seed
//! and its instance id. Replaying the same actions against a world built with
//! the same seed therefore yields the same harvest events.

use crate::error::{Error, Result};
use harvest_core::InstanceId;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Global seed used when none is configured
pub const DEFAULT_GLOBAL_SEED: u64 = 0x5EED_0F_7EA5_u64;

/// Configuration for a [`World`](crate::World)
///
/// # Example
///
/// ```
/// use harvest_world::WorldConfig;
///
/// let config = WorldConfig::default().with_global_seed(42).with_core_count(4);
/// assert_eq!(config.global_seed(), 42);
/// assert_eq!(config.core_count(), 4.min(harvest_world::max_cores()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed combined with each instance id to seed that Instance's sampler
    global_seed: u64,
    /// Worker threads for area damage, clamped to `[1, max_cores()]`
    core_count: usize,
    /// Default `EnvFilter` directive for [`init_tracing`](crate::init_tracing)
    log_filter: String,
}

impl WorldConfig {
    pub fn with_global_seed(mut self, seed: u64) -> Self {
        self.global_seed = seed;
        self
    }

    /// The value is clamped to `[1, max_cores()]`.
    pub fn with_core_count(mut self, n: usize) -> Self {
        self.core_count = n.clamp(1, max_cores());
        self
    }

    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    pub fn global_seed(&self) -> u64 {
        self.global_seed
    }

    pub fn core_count(&self) -> usize {
        self.core_count
    }

    pub fn is_single_core(&self) -> bool {
        self.core_count == 1
    }

    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }

    /// Parsed form of the configured log filter
    pub fn env_filter(&self) -> Result<EnvFilter> {
        EnvFilter::try_new(&self.log_filter)
            .map_err(|e| Error::Config(format!("invalid log_filter {:?}: {}", self.log_filter, e)))
    }

    /// Install the global subscriber with this config's log filter
    ///
    /// Same rules as [`init_tracing`](crate::init_tracing): first call wins and
    /// `RUST_LOG` overrides the configured filter.
    pub fn init_tracing(&self) {
        crate::logging::init_tracing(&self.log_filter);
    }

    /// Seed for one Instance's sampler
    pub fn instance_seed(&self, id: InstanceId) -> u64 {
        hash_seed(self.global_seed, id.raw())
    }

    /// Parse from RON, e.g. `(global_seed: 7, core_count: 2)`
    ///
    /// Missing fields take their defaults; `core_count` is clamped.
    pub fn from_ron_str(content: &str) -> Result<Self> {
        let config: WorldConfig = ron::from_str(content)?;
        config.validated()
    }

    /// Load from a RON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron_str(&content)
    }

    fn validated(self) -> Result<Self> {
        if self.log_filter.trim().is_empty() {
            return Err(Error::Config("log_filter must not be empty".to_string()));
        }
        self.env_filter()?;
        let core_count = self.core_count;
        Ok(self.with_core_count(core_count))
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            global_seed: DEFAULT_GLOBAL_SEED,
            core_count: 1,
            log_filter: "info".to_string(),
        }
    }
}

/// Get the maximum available cores on this system
pub fn max_cores() -> usize {
    num_cpus::get()
}

/// Mix a global seed with a per-instance key (splitmix64 finalizer)
///
/// Never returns 0, which the xorshift sampler cannot leave.
pub fn hash_seed(seed: u64, key: u64) -> u64 {
    let mut z = seed ^ key.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^= z >> 31;
    if z == 0 {
        0x9E37_79B9_7F4A_7C15
    } else {
        z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorldConfig::default();
        assert_eq!(config.global_seed(), DEFAULT_GLOBAL_SEED);
        assert!(config.is_single_core());
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn test_core_count_clamped() {
        assert_eq!(WorldConfig::default().with_core_count(0).core_count(), 1);
        assert_eq!(
            WorldConfig::default().with_core_count(10000).core_count(),
            max_cores()
        );
    }

    #[test]
    fn test_from_ron_str() {
        let config = WorldConfig::from_ron_str("(global_seed: 7, core_count: 0)").unwrap();
        assert_eq!(config.global_seed(), 7);
        assert_eq!(config.core_count(), 1);
        assert_eq!(config.log_filter(), "info");

        let config = WorldConfig::from_ron_str(r#"(log_filter: "harvest_core=trace")"#).unwrap();
        assert_eq!(config.global_seed(), DEFAULT_GLOBAL_SEED);
        assert_eq!(config.log_filter(), "harvest_core=trace");
    }

    #[test]
    fn test_from_ron_str_errors() {
        assert!(matches!(
            WorldConfig::from_ron_str("(global_seed: \"seven\")"),
            Err(Error::Ron(_))
        ));
        assert!(matches!(
            WorldConfig::from_ron_str(r#"(log_filter: "  ")"#),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_log_filter_parsed() {
        let config = WorldConfig::default().with_log_filter("harvest_world=debug,warn");
        assert!(config.env_filter().is_ok());

        assert!(matches!(
            WorldConfig::from_ron_str(r#"(log_filter: "harvest_world=loud")"#),
            Err(Error::Config(_))
        ));
        assert!(WorldConfig::default()
            .with_log_filter("harvest_world=loud")
            .env_filter()
            .is_err());
    }

    #[test]
    fn test_init_tracing_from_config() {
        let config = WorldConfig::from_ron_str(r#"(log_filter: "harvest_world=debug")"#).unwrap();
        config.init_tracing();
        config.init_tracing();
        tracing::debug!(seed = config.global_seed(), "tracing installed from config");
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            WorldConfig::from_file("/no/such/world.ron"),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_ron_roundtrip() {
        let config = WorldConfig::default().with_global_seed(99);
        let text = ron::to_string(&config).unwrap();
        assert_eq!(WorldConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_hash_seed() {
        assert_eq!(hash_seed(1, 2), hash_seed(1, 2));
        assert_ne!(hash_seed(1, 2), hash_seed(1, 3));
        assert_ne!(hash_seed(1, 2), hash_seed(2, 2));
        for key in 0..1000 {
            assert_ne!(hash_seed(0, key), 0);
        }
    }

    #[test]
    fn test_instance_seed() {
        let config = WorldConfig::default().with_global_seed(5);
        assert_eq!(
            config.instance_seed(InstanceId::new(3)),
            hash_seed(5, 3)
        );
    }
}
