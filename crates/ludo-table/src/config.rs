//! Table configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings shared by every table a [`TableManager`](crate::TableManager)
/// spawns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    /// Capacity of each table's command mailbox. Callers wait when it is
    /// full.
    pub mailbox_size: usize,

    /// How long a table waits for the randomness port before giving up.
    /// `None` waits forever.
    pub randomness_timeout: Option<Duration>,

    /// Start the game as soon as the last seat is taken, on behalf of the
    /// player who took it.
    pub auto_start: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            mailbox_size: 64,
            randomness_timeout: Some(Duration::from_secs(10)),
            auto_start: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_config_default() {
        let config = TableConfig::default();
        assert_eq!(config.mailbox_size, 64);
        assert_eq!(config.randomness_timeout, Some(Duration::from_secs(10)));
        assert!(!config.auto_start);
    }
}
