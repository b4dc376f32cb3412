//! Configuration file handling – reads/writes `~/.scout/config.toml`.
//!
//! The file holds a [`CacheConfig`]; every key is optional. A missing file
//! means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use scout_tracker::CacheConfig;
use scout_types::{ItemKind, ScoutError};

/// Return the path to `~/.scout/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".scout").join("config.toml")
}

/// Load the configuration for this run.
///
/// An explicit `path` must exist; the default location may be absent, in
/// which case defaults are used. Environment overrides apply either way.
pub fn resolve(path: Option<&Path>) -> Result<CacheConfig, ScoutError> {
    let mut cfg = match path {
        Some(p) => load_from(p)?
            .ok_or_else(|| ScoutError::Config(format!("no config file at {}", p.display())))?,
        None => load_from(&config_path())?.unwrap_or_default(),
    };
    apply_env_overrides(&mut cfg);
    cfg.validate()?;
    Ok(cfg)
}

/// Load a config file. Returns `None` if it does not exist.
pub(crate) fn load_from(path: &Path) -> Result<Option<CacheConfig>, ScoutError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)?;
    let cfg = toml::from_str(&raw)
        .map_err(|e| ScoutError::Config(format!("failed to parse {}: {e}", path.display())))?;
    Ok(Some(cfg))
}

/// Apply `SCOUT_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `SCOUT_CLOSE_RANGE` | `close_range` |
/// | `SCOUT_TRADE_ITEM` | `trade_item` |
/// | `SCOUT_BLACKLIST_DECAY_TICKS` | `blacklist.decay_ticks` |
///
/// Unparseable numbers are ignored.
pub fn apply_env_overrides(cfg: &mut CacheConfig) {
    if let Ok(v) = std::env::var("SCOUT_CLOSE_RANGE")
        && let Ok(range) = v.parse::<f64>()
    {
        cfg.close_range = range;
    }
    if let Ok(v) = std::env::var("SCOUT_TRADE_ITEM") {
        cfg.trade_item = ItemKind::new(v);
    }
    if let Ok(v) = std::env::var("SCOUT_BLACKLIST_DECAY_TICKS")
        && let Ok(ticks) = v.parse::<u64>()
    {
        cfg.blacklist.decay_ticks = ticks;
    }
}

/// Write `cfg` to `path`, creating parent directories as needed.
pub(crate) fn save_to(cfg: &CacheConfig, path: &Path) -> Result<(), ScoutError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| ScoutError::Config(format!("failed to serialize config: {e}")))?;
    fs::write(path, raw)?;
    Ok(())
}
