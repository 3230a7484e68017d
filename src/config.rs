//! Compiler configuration from `bytehouse-sql.toml`.
//!
//! ```toml
//! [capabilities]
//! server_version = "21.8.1"
//! supports_delete = true
//!
//! [compile]
//! literal_binds = false
//! param_style = "pyformat"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DialectError, DialectResult};
use crate::transpiler::{Capabilities, CompileOptions, ServerVersion};

/// File looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "bytehouse-sql.toml";

/// `[capabilities]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapabilitiesConfig {
    /// Server version string; derives `supports_delete` when set.
    pub server_version: Option<String>,
    /// Explicit override, wins over the version.
    pub supports_delete: Option<bool>,
}

/// Full configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectConfig {
    pub capabilities: CapabilitiesConfig,
    pub compile: CompileOptions,
}

impl DialectConfig {
    pub fn from_toml(content: &str) -> DialectResult<Self> {
        toml::from_str(content).map_err(|e| DialectError::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> DialectResult<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml(&content)
            .map_err(|e| DialectError::Config(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// `<config dir>/bytehouse-sql/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("bytehouse-sql").join("config.toml"))
    }

    /// Load `explicit` if given, else the first existing file among
    /// `./bytehouse-sql.toml` and [`default_path`](Self::default_path), else
    /// defaults.
    pub fn discover(explicit: Option<&Path>) -> DialectResult<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let candidates = std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE)).chain(Self::default_path());
        for candidate in candidates {
            if candidate.is_file() {
                return Self::load(&candidate);
            }
        }
        Ok(Self::default())
    }

    pub fn capabilities(&self) -> DialectResult<Capabilities> {
        let mut caps = match &self.capabilities.server_version {
            Some(version) => Capabilities::for_server_version(version.parse::<ServerVersion>()?),
            None => Capabilities::default(),
        };
        if let Some(supports_delete) = self.capabilities.supports_delete {
            caps.supports_delete = supports_delete;
        }
        Ok(caps)
    }

    pub fn compile_options(&self) -> CompileOptions {
        self.compile
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transpiler::ParamStyle;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DialectConfig::from_toml("").unwrap();
        assert_eq!(config, DialectConfig::default());
        assert_eq!(config.capabilities().unwrap(), Capabilities::default());
        assert_eq!(config.compile_options(), CompileOptions::default());
    }

    #[test]
    fn test_full_config() {
        let config = DialectConfig::from_toml(
            r#"
            [capabilities]
            server_version = "1.1.54300"

            [compile]
            literal_binds = true
            param_style = "named"
            "#,
        )
        .unwrap();
        let caps = config.capabilities().unwrap();
        assert!(!caps.supports_delete);
        assert_eq!(caps.server_version, Some(ServerVersion::new(1, 1, 54300)));
        assert!(config.compile_options().literal_binds);
        assert_eq!(config.compile_options().param_style, ParamStyle::Named);
    }

    #[test]
    fn test_explicit_override_wins() {
        let config = DialectConfig::from_toml(
            r#"
            [capabilities]
            server_version = "1.1.54300"
            supports_delete = true
            "#,
        )
        .unwrap();
        assert!(config.capabilities().unwrap().supports_delete);
    }

    #[test]
    fn test_bad_values_are_config_errors() {
        let err = DialectConfig::from_toml("[compile]\nparam_style = \"dollar\"").unwrap_err();
        assert!(matches!(err, DialectError::Config(_)));

        let config = DialectConfig::from_toml("[capabilities]\nserver_version = \"x.y\"").unwrap();
        assert!(matches!(config.capabilities(), Err(DialectError::Config(_))));
    }

    #[test]
    fn test_missing_explicit_file_is_io_error() {
        let err = DialectConfig::discover(Some(Path::new("/nonexistent/bytehouse-sql.toml"))).unwrap_err();
        assert!(matches!(err, DialectError::Io(_)));
    }
}
