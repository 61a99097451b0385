use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::gate::DEFAULT_CAPACITY;

pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 2_000;

pub const ENV_GATE_CAPACITY: &str = "CATALOG_GATE_CAPACITY";
pub const ENV_QUERY_TIMEOUT_MS: &str = "CATALOG_QUERY_TIMEOUT_MS";

/// Catalog tuning knobs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Max concurrent queries admitted by the gate (default: 10).
    pub gate_capacity: usize,
    /// How long a query waits for a gate slot, in milliseconds (default: 2000).
    pub query_timeout_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            gate_capacity: DEFAULT_CAPACITY,
            query_timeout_ms: DEFAULT_QUERY_TIMEOUT_MS,
        }
    }
}

impl CatalogConfig {
    /// Defaults overridden by `CATALOG_GATE_CAPACITY` and
    /// `CATALOG_QUERY_TIMEOUT_MS`. Unparseable values are ignored.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(capacity) = parse_var(&lookup, ENV_GATE_CAPACITY) {
            config.gate_capacity = capacity;
        }
        if let Some(timeout) = parse_var(&lookup, ENV_QUERY_TIMEOUT_MS) {
            config.query_timeout_ms = timeout;
        }
        config
    }

    pub fn with_gate_capacity(mut self, capacity: usize) -> Self {
        self.gate_capacity = capacity;
        self
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_millis(self.query_timeout_ms)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable config value");
            None
        }
    }
}
