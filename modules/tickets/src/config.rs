//! Configuration for the tickets module.

use serde::{Deserialize, Serialize};

/// Configuration for the tickets module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct TicketsConfig {
    /// Maximum number of tickets per `GET /tickets` page.
    /// Default: 1000
    pub page_size: u64,

    /// bcrypt work factor for new password hashes.
    /// Default: 10
    pub bcrypt_cost: u32,
}

impl Default for TicketsConfig {
    fn default() -> Self {
        Self {
            page_size: 1000,
            bcrypt_cost: 10,
        }
    }
}

impl TicketsConfig {
    /// Rejects values the services cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.page_size == 0 {
            anyhow::bail!("tickets.page_size must be greater than zero");
        }
        if !(4..=31).contains(&self.bcrypt_cost) {
            anyhow::bail!(
                "tickets.bcrypt_cost must be between 4 and 31, got {}",
                self.bcrypt_cost
            );
        }
        Ok(())
    }
}
