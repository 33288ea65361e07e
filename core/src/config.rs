//! Application settings loaded from `<config_dir>/settings.yaml`.
//!
//! Every field has a default, so a missing file or a partial file is fine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::variant::Variant;


pub const SETTINGS_FILE: &str = "settings.yaml";
pub const CONFIG_DIR_ENV: &str = "DASHDECK_CONFIG_DIR";


#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Which dashboard to open.
    pub variant: Variant,

    /// Where snapshots are kept. Defaults to `<config_dir>/data`.
    pub data_dir: Option<PathBuf>,

    /// Where exports are written. Defaults to the working directory.
    pub export_dir: Option<PathBuf>,

    /// How long a banner stays up.
    pub banner_ttl_ms: u64,

    /// Event loop tick; also how often a pending import is polled.
    pub tick_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            variant: Variant::default(),
            data_dir: None,
            export_dir: None,
            banner_ttl_ms: 3000,
            tick_ms: 100,
        }
    }
}

impl Settings {
    /// Load `<config_dir>/settings.yaml`, or defaults if it does not exist.
    pub fn load(config_dir: &Path) -> Result<Settings, ConfigError> {
        let path = config_dir.join(SETTINGS_FILE);
        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content, &path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Settings::default()),
            Err(source) => Err(ConfigError::Read { path, source }),
        }
    }

    /// Parse settings YAML. `origin` is only used in error messages.
    pub fn parse(content: &str, origin: &Path) -> Result<Settings, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }
        serde_yaml::from_str(content).map_err(|e| ConfigError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn data_dir(&self, config_dir: &Path) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| config_dir.join("data"))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }
}


/// Pick the config directory: explicit flag, then `DASHDECK_CONFIG_DIR`,
/// then `$HOME/.config/dashdeck`.
pub fn resolve_config_dir(flag: Option<&Path>) -> PathBuf {
    resolve_from(
        flag,
        std::env::var(CONFIG_DIR_ENV).ok(),
        std::env::var("HOME").ok(),
    )
}

fn resolve_from(flag: Option<&Path>, env_dir: Option<String>, home: Option<String>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    if let Some(dir) = env_dir.filter(|d| !d.is_empty()) {
        return PathBuf::from(dir);
    }
    let home = home.unwrap_or_else(|| "/tmp".into());
    PathBuf::from(home).join(".config").join("dashdeck")
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = Settings::default();
        assert_eq!(s.variant, Variant::Brokerage);
        assert_eq!(s.banner_ttl_ms, 3000);
        assert_eq!(s.data_dir(Path::new("/cfg")), PathBuf::from("/cfg/data"));
        assert_eq!(s.export_dir(), PathBuf::from("."));
    }

    #[test]
    fn parse_partial_file() {
        let yaml = "variant: financial\nbanner_ttl_ms: 1500\n";
        let s = Settings::parse(yaml, Path::new("settings.yaml")).unwrap();
        assert_eq!(s.variant, Variant::Financial);
        assert_eq!(s.banner_ttl_ms, 1500);
        assert_eq!(s.tick_ms, 100);
    }

    #[test]
    fn parse_dirs() {
        let yaml = "data_dir: /var/lib/dashdeck\nexport_dir: /home/me/exports\n";
        let s = Settings::parse(yaml, Path::new("settings.yaml")).unwrap();
        assert_eq!(s.data_dir(Path::new("/cfg")), PathBuf::from("/var/lib/dashdeck"));
        assert_eq!(s.export_dir(), PathBuf::from("/home/me/exports"));
    }

    #[test]
    fn parse_empty_is_default() {
        assert_eq!(Settings::parse("\n", Path::new("x")).unwrap(), Settings::default());
    }

    #[test]
    fn parse_bad_variant_names_file() {
        let err = Settings::parse("variant: crypto\n", Path::new("/cfg/settings.yaml")).unwrap_err();
        assert!(err.to_string().contains("/cfg/settings.yaml"));
    }

    #[test]
    fn load_missing_file_is_default() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(Settings::load(tmp.path()).unwrap(), Settings::default());
    }

    #[test]
    fn load_reads_file() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(SETTINGS_FILE), "tick_ms: 50\n").unwrap();
        assert_eq!(Settings::load(tmp.path()).unwrap().tick_ms, 50);
    }

    #[test]
    fn resolve_prefers_flag() {
        let dir = resolve_from(Some(Path::new("/flag")), Some("/env".into()), Some("/home/u".into()));
        assert_eq!(dir, PathBuf::from("/flag"));
    }

    #[test]
    fn resolve_then_env() {
        let dir = resolve_from(None, Some("/env".into()), Some("/home/u".into()));
        assert_eq!(dir, PathBuf::from("/env"));
    }

    #[test]
    fn resolve_then_home() {
        let dir = resolve_from(None, None, Some("/home/u".into()));
        assert_eq!(dir, PathBuf::from("/home/u/.config/dashdeck"));
        let dir = resolve_from(None, Some(String::new()), Some("/home/u".into()));
        assert_eq!(dir, PathBuf::from("/home/u/.config/dashdeck"));
    }
}
