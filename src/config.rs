//! Host-supplied configuration (`spec.md` §6). This is a typed object the
//! core accepts directly; loading it from a file or environment is an
//! external-collaborator concern and lives outside this crate.

use serde::{Deserialize, Serialize};

/// Which storage backend to instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    Memory,
    Sql,
    Kv,
}

impl Default for StorageBackendKind {
    fn default() -> Self {
        StorageBackendKind::Memory
    }
}

/// Typed configuration accepted by the core. Every field has a default
/// matching `spec.md` §6 / §4.7, so a host can override only what it cares
/// about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sti_fund: i64,
    pub lti_fund: i64,
    pub forgetting_threshold_sti: i16,
    pub rent_rate_sti: f64,
    pub rent_rate_lti: f64,
    pub spread_fraction: f64,
    pub sti_threshold_spread: i16,
    pub storage_backend: StorageBackendKind,
    pub pool_size: usize,
    pub chain_step_budget: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sti_fund: 10_000,
            lti_fund: 10_000,
            forgetting_threshold_sti: -50,
            rent_rate_sti: 0.05,
            rent_rate_lti: 0.05,
            spread_fraction: 0.1,
            sti_threshold_spread: 10,
            storage_backend: StorageBackendKind::Memory,
            pool_size: 10,
            chain_step_budget: 1_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_funds_match_spec() {
        let cfg = Config::default();
        assert_eq!(cfg.sti_fund, 10_000);
        assert_eq!(cfg.lti_fund, 10_000);
        assert_eq!(cfg.pool_size, 10);
    }

    #[test]
    fn round_trips_through_json() {
        let cfg = Config::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg, back);
    }
}
