//! Service and query configuration.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::Id;

/// Configuration for a seqindex service instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Network the node runs on.
    #[serde(default = "default_network_id")]
    pub network_id: u32,
    /// Chain id used by the transaction parser.
    #[serde(default)]
    pub chain_id: Id,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_network_id() -> u32 {
    1
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            network_id: default_network_id(),
            chain_id: Id::EMPTY,
            query: QueryConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// Behavior of a start-timestamp query when no block has that exact timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingTimestamp {
    /// Fail with a not-found error.
    #[default]
    Reject,
    /// Start the window at height 0.
    FromGenesis,
}

/// Tuning for the header-window queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default)]
    pub missing_timestamp: MissingTimestamp,
    /// Cap on blocks per window; `None` = bounded only by the end timestamp.
    /// `Some(0)` would never advance a pager and is read as `None`.
    #[serde(default)]
    pub max_page_size: Option<usize>,
}

impl QueryConfig {
    /// The effective per-window cap.
    pub fn page_limit(&self) -> Option<usize> {
        self.max_page_size.filter(|&n| n > 0)
    }
}

/// Log level per component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Global default level: "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default = "default_level")]
    pub level: String,
    /// Override per component: component_name → level
    #[serde(default)]
    pub components: HashMap<String, String>,
    /// Emit JSON structured logs (true) or human-readable text (false)
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: HashMap::new(),
            json: false,
        }
    }
}

impl LogConfig {
    /// Filter directives, e.g. `"info,seqindex_storage=debug"`.
    pub fn directives(&self) -> String {
        let mut directives = self.level.clone();
        let mut components: Vec<_> = self.components.iter().collect();
        components.sort();
        for (component, level) in components {
            directives.push_str(&format!(",{}={}", component.replace('-', "_"), level));
        }
        directives
    }
}
