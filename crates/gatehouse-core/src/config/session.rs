//! Session management configuration.

use serde::{Deserialize, Serialize};

/// Session record retention configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Hours an expired or terminated session row is kept before a purge
    /// removes it.
    #[serde(default = "default_retention")]
    pub retention_hours: u64,
    /// Minimum blocklist TTL in seconds for revoked sessions.
    #[serde(default = "default_blocklist_floor")]
    pub blocklist_min_ttl_seconds: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            retention_hours: default_retention(),
            blocklist_min_ttl_seconds: default_blocklist_floor(),
        }
    }
}

fn default_retention() -> u64 {
    72
}

fn default_blocklist_floor() -> u64 {
    60
}
