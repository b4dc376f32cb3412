//! [`CacheConfig`] – tunables for the observation cache.
//!
//! Every field has a default so that partial configuration files work:
//!
//! ```toml
//! close_range = 20.0
//!
//! [blacklist]
//! decay_ticks = 600
//! ```

use scout_perception::BlacklistConfig;
use scout_types::{ItemKind, ScoutError};
use serde::{Deserialize, Serialize};

/// Configuration bundle for [`ObservationCache`][crate::ObservationCache].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Radius around the observer for the close-range and hostile lists.
    pub close_range: f64,
    /// Item that, held by a piglin, marks it as trading.
    pub trade_item: ItemKind,
    /// Keep a player's last known position after they leave the snapshot.
    /// Off by default: the history is rebuilt on every refresh.
    pub retain_player_history: bool,
    /// Unreachable-object blacklist policy.
    pub blacklist: BlacklistConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            close_range: 26.0,
            trade_item: ItemKind::new("gold_ingot"),
            retain_player_history: false,
            blacklist: BlacklistConfig::default(),
        }
    }
}

impl CacheConfig {
    /// Reject values the cache cannot work with.
    pub fn validate(&self) -> Result<(), ScoutError> {
        if !self.close_range.is_finite() || self.close_range < 0.0 {
            return Err(ScoutError::Config(format!(
                "close_range must be a non-negative number, got {}",
                self.close_range
            )));
        }
        if self.trade_item.as_str().is_empty() {
            return Err(ScoutError::Config("trade_item must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = CacheConfig::default();
        assert_eq!(cfg.close_range, 26.0);
        assert_eq!(cfg.trade_item, ItemKind::new("gold_ingot"));
        assert_eq!(cfg.blacklist.failures_allowed, 2);
        assert_eq!(cfg.blacklist.decay_ticks, 1200);
        assert!(!cfg.retain_player_history);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let raw = r#"
            close_range = 12.5

            [blacklist]
            decay_ticks = 40
        "#;
        let cfg: CacheConfig = toml::from_str(raw).unwrap();
        assert_eq!(cfg.close_range, 12.5);
        assert_eq!(cfg.blacklist.decay_ticks, 40);
        assert_eq!(cfg.blacklist.failures_allowed, 2);
        assert_eq!(cfg.trade_item, ItemKind::new("gold_ingot"));
    }

    #[test]
    fn negative_or_nan_range_is_rejected() {
        let mut cfg = CacheConfig {
            close_range: -1.0,
            ..CacheConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ScoutError::Config(_))));
        cfg.close_range = f64::NAN;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn empty_trade_item_is_rejected() {
        let cfg = CacheConfig {
            trade_item: ItemKind::new(""),
            ..CacheConfig::default()
        };
        assert!(cfg.validate().is_err());
    }
}
