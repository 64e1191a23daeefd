//! Application configuration.
//!
//! Values are layered: built-in defaults, then `config.toml` under the
//! user's config directory, then `RENTSHOP__*` environment variables
//! (e.g. `RENTSHOP__SHOP__SKIS=40`).

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{clock::Clock, menu::NavigationKeys};

/// Directory under `~/.config` holding the configuration file.
pub const CONFIG_DIR: &str = "rentshop";
/// Name of the configuration file.
pub const CONFIG_FILE: &str = "config.toml";
/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "RENTSHOP";

const DEFAULT_CONFIG: &str = r#"# Rental shop configuration

[shop]
# Equipment available when the shop opens.
skis = 100
snowboards = 100

[navigation]
back_key = "b"
forward_key = "f"
main_menu_key = "m"
show_headers = true

[clock]
# Ask for every start/return time instead of using the system clock.
manual = false

# Directory for rentshop.log; defaults to ./logs
# log_dir = "/tmp/rentshop-logs"
"#;

/// Top-level settings.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Opening inventory.
    pub shop: ShopConfig,
    /// Menu navigation keys and headers.
    pub navigation: NavigationConfig,
    /// Timestamp source.
    pub clock: ClockConfig,
    /// Where log files are written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

/// Opening inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopConfig {
    /// Skis owned by the shop.
    pub skis: u32,
    /// Snowboards owned by the shop.
    pub snowboards: u32,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            skis: 100,
            snowboards: 100,
        }
    }
}

/// Navigation keys and header toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    /// Key for "back".
    pub back_key: String,
    /// Key for "forward".
    pub forward_key: String,
    /// Key for "main menu".
    pub main_menu_key: String,
    /// Print the navigation legend above menus.
    pub show_headers: bool,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        let keys = NavigationKeys::default();
        Self {
            back_key: keys.back,
            forward_key: keys.forward,
            main_menu_key: keys.main_menu,
            show_headers: true,
        }
    }
}

impl NavigationConfig {
    /// Reserved keys for the menu system.
    pub fn keys(&self) -> NavigationKeys {
        NavigationKeys {
            back: self.back_key.clone(),
            forward: self.forward_key.clone(),
            main_menu: self.main_menu_key.clone(),
        }
    }
}

/// Timestamp source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Type timestamps in by hand.
    pub manual: bool,
}

impl ClockConfig {
    /// Clock selected by this setting.
    pub fn clock(&self) -> Clock {
        Clock::from_manual_flag(self.manual)
    }
}

impl AppConfig {
    /// Default location of the configuration file.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(CONFIG_DIR)
            .join(CONFIG_FILE)
    }

    /// Load from the default location plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load from `path` plus environment overrides. A missing file is fine.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let defaults = config::Config::try_from(&AppConfig::default())
            .context("failed to build default configuration")?;
        let settings = config::Config::builder()
            .add_source(defaults)
            .add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        let config: AppConfig = settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Directory for log files, falling back to `./logs`.
    pub fn log_dir(&self) -> Result<PathBuf> {
        match &self.log_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()
                .context("failed to resolve working directory")?
                .join("logs")),
        }
    }
}

/// Write a commented default configuration if none exists yet.
pub fn ensure_default_config() -> Result<PathBuf> {
    let path = AppConfig::default_path();
    ensure_default_config_at(&path)?;
    Ok(path)
}

/// Write the default configuration to `path` unless it already exists.
pub fn ensure_default_config_at(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, DEFAULT_CONFIG)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "wrote default configuration");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        env,
        sync::{Mutex, MutexGuard, PoisonError},
    };
    use tempfile::tempdir;

    // Loading reads the process environment, so tests that load take turns.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn env_lock() -> MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
    }

    struct EnvVar(&'static str);

    impl EnvVar {
        fn set(key: &'static str, value: &str) -> Self {
            env::set_var(key, value);
            Self(key)
        }
    }

    impl Drop for EnvVar {
        fn drop(&mut self) {
            env::remove_var(self.0);
        }
    }

    #[test]
    fn missing_file_yields_defaults() -> Result<()> {
        let _env = env_lock();
        let dir = tempdir()?;
        let config = AppConfig::load_from(dir.path().join("absent.toml"))?;
        assert_eq!(config.shop, ShopConfig::default());
        assert_eq!(config.navigation.keys(), NavigationKeys::default());
        assert_eq!(config.clock.clock(), Clock::System);
        Ok(())
    }

    #[test]
    fn default_file_round_trips() -> Result<()> {
        let _env = env_lock();
        let dir = tempdir()?;
        let path = dir.path().join("nested").join(CONFIG_FILE);

        assert!(ensure_default_config_at(&path)?);
        assert!(!ensure_default_config_at(&path)?);

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.shop.skis, 100);
        assert!(config.navigation.show_headers);
        assert_eq!(config.log_dir, None);
        Ok(())
    }

    #[test]
    fn file_values_override_defaults() -> Result<()> {
        let _env = env_lock();
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"
log_dir = "/tmp/shop-logs"

[shop]
skis = 12

[navigation]
back_key = "<"
show_headers = false

[clock]
manual = true
"#,
        )?;

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.shop.skis, 12);
        assert_eq!(config.shop.snowboards, 100);
        assert_eq!(config.navigation.keys().back, "<");
        assert_eq!(config.navigation.keys().forward, "f");
        assert!(!config.navigation.show_headers);
        assert!(config.clock.clock().is_manual());
        assert_eq!(config.log_dir()?, PathBuf::from("/tmp/shop-logs"));
        Ok(())
    }

    #[test]
    fn environment_overrides_file_values() -> Result<()> {
        let _env = env_lock();
        let dir = tempdir()?;
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[shop]\nskis = 12\nsnowboards = 7\n")?;

        let _skis = EnvVar::set("RENTSHOP__SHOP__SKIS", "40");
        let _manual = EnvVar::set("RENTSHOP__CLOCK__MANUAL", "true");

        let config = AppConfig::load_from(&path)?;
        assert_eq!(config.shop.skis, 40);
        assert_eq!(config.shop.snowboards, 7);
        assert!(config.clock.clock().is_manual());
        Ok(())
    }
}
