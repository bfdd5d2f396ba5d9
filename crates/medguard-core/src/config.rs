//! Service configuration
//!
//! Loaded from an optional YAML file, then overridden from the environment.

use crate::error::{MedguardError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the YAML config file
pub const DEFAULT_CONFIG_PATH: &str = "config/medguard.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Socket address the HTTP server binds to
    pub listen_addr: String,

    /// Manufacturer registry JSON; built-in dataset when unset
    pub registry_path: Option<PathBuf>,

    /// Brand catalog JSON; built-in dataset when unset
    pub brands_path: Option<PathBuf>,

    /// Seed document for the in-memory store; empty store when unset
    pub seed_path: Option<PathBuf>,

    /// Per-lookup timeout for collaborator calls
    pub lookup_timeout_ms: u64,

    /// tracing-subscriber filter directive
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8787".to_string(),
            registry_path: None,
            brands_path: None,
            seed_path: None,
            lookup_timeout_ms: 1500,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Parse settings from YAML; missing keys take their defaults
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| MedguardError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml(&raw)
    }

    /// File (from `MEDGUARD_CONFIG` or the default path, if present) plus
    /// environment overrides
    pub fn load() -> Result<Self> {
        let explicit = std::env::var("MEDGUARD_CONFIG").ok();
        let mut settings = match explicit {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => Self::from_file(DEFAULT_CONFIG_PATH)?,
            None => Self::default(),
        };
        settings.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Apply overrides from a key lookup (the process environment in production)
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("MEDGUARD_ADDR") {
            self.listen_addr = addr;
        }
        if let Some(path) = lookup("MEDGUARD_REGISTRY") {
            self.registry_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("MEDGUARD_BRANDS") {
            self.brands_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("MEDGUARD_SEED") {
            self.seed_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup("MEDGUARD_LOOKUP_TIMEOUT_MS") {
            self.lookup_timeout_ms = raw.trim().parse().map_err(|_| {
                MedguardError::Config(format!("MEDGUARD_LOOKUP_TIMEOUT_MS is not a number: {}", raw))
            })?;
        }
        if let Some(filter) = lookup("RUST_LOG") {
            self.log_filter = filter;
        }
        Ok(())
    }

    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.listen_addr, "0.0.0.0:8787");
        assert_eq!(settings.lookup_timeout(), Duration::from_millis(1500));
        assert_eq!(settings.log_filter, "info");
        assert!(settings.registry_path.is_none());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings = Settings::from_yaml("listen_addr: 127.0.0.1:9000\nlookup_timeout_ms: 250\n").unwrap();
        assert_eq!(settings.listen_addr, "127.0.0.1:9000");
        assert_eq!(settings.lookup_timeout_ms, 250);
        assert_eq!(settings.log_filter, "info");
    }

    #[test]
    fn test_invalid_yaml_is_config_error() {
        let err = Settings::from_yaml("lookup_timeout_ms: [nope").unwrap_err();
        assert!(matches!(err, MedguardError::Config(_)));
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("MEDGUARD_ADDR", "127.0.0.1:1"),
            ("MEDGUARD_SEED", "testing/fixtures/seed.json"),
            ("MEDGUARD_LOOKUP_TIMEOUT_MS", "75"),
            ("RUST_LOG", "debug"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings
            .apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(settings.listen_addr, "127.0.0.1:1");
        assert_eq!(settings.seed_path, Some(PathBuf::from("testing/fixtures/seed.json")));
        assert_eq!(settings.lookup_timeout_ms, 75);
        assert_eq!(settings.log_filter, "debug");
        assert!(settings.brands_path.is_none());
    }

    #[test]
    fn test_bad_timeout_override() {
        let mut settings = Settings::default();
        let result = settings.apply_overrides(|key| {
            (key == "MEDGUARD_LOOKUP_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert!(matches!(result, Err(MedguardError::Config(_))));
    }
}
