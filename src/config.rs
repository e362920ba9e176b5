use crate::error::{Result, TagVersionError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Project-local configuration file name
pub const CONFIG_FILE_NAME: &str = "tagversion.toml";

/// Represents the complete configuration for git-tag-version.
///
/// Contains version fallbacks, tag publication settings, the version record
/// location and the build backend invocation.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub version: VersionConfig,

    #[serde(default)]
    pub tags: TagsConfig,

    #[serde(default)]
    pub record: RecordConfig,

    #[serde(default)]
    pub build: BuildConfig,
}

fn default_version() -> String {
    "0.0.1-dev0".to_string()
}

fn default_dev_base() -> String {
    "0.0.1".to_string()
}

/// Fallback versions used when no tag resolves.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct VersionConfig {
    /// Returned by version queries when neither tags nor a record exist
    #[serde(default = "default_version")]
    pub default: String,

    /// Base of development versions when the repository has no tags
    #[serde(default = "default_dev_base")]
    pub dev_base: String,
}

impl Default for VersionConfig {
    fn default() -> Self {
        VersionConfig {
            default: default_version(),
            dev_base: default_dev_base(),
        }
    }
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_true() -> bool {
    true
}

/// Tag publication behavior.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TagsConfig {
    #[serde(default = "default_remote")]
    pub remote: String,

    /// Push tags created during a build
    #[serde(default)]
    pub push: bool,

    /// Delete stale floating tags after building from one
    #[serde(default = "default_true")]
    pub cleanup_floating: bool,
}

impl Default for TagsConfig {
    fn default() -> Self {
        TagsConfig {
            remote: default_remote(),
            push: false,
            cleanup_floating: true,
        }
    }
}

fn default_record_path() -> String {
    "version.json".to_string()
}

/// Location of the version record, relative to the package directory.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct RecordConfig {
    #[serde(default = "default_record_path")]
    pub path: String,
}

impl Default for RecordConfig {
    fn default() -> Self {
        RecordConfig {
            path: default_record_path(),
        }
    }
}

fn default_build_command() -> String {
    "python3".to_string()
}

fn default_build_args() -> Vec<String> {
    vec![
        "-m".to_string(),
        "build".to_string(),
        "--outdir".to_string(),
        "{output_dir}".to_string(),
        "{package_dir}".to_string(),
    ]
}

/// Build backend invocation.
///
/// `{version}`, `{package_dir}` and `{output_dir}` in `args` are substituted
/// before the command runs.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BuildConfig {
    #[serde(default = "default_build_command")]
    pub command: String,

    #[serde(default = "default_build_args")]
    pub args: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            command: default_build_command(),
            args: default_build_args(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `tagversion.toml` in the current directory
/// 3. `.tagversion.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        fs::read_to_string(CONFIG_FILE_NAME)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(format!(".{}", CONFIG_FILE_NAME));
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    toml::from_str(&config_str).map_err(|e| TagVersionError::config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.version.default, "0.0.1-dev0");
        assert_eq!(config.version.dev_base, "0.0.1");
        assert_eq!(config.tags.remote, "origin");
        assert!(!config.tags.push);
        assert!(config.tags.cleanup_floating);
        assert_eq!(config.record.path, "version.json");
        assert_eq!(config.build.command, "python3");
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: Config = toml::from_str(
            r#"
[tags]
push = true
"#,
        )
        .unwrap();
        assert!(config.tags.push);
        assert_eq!(config.tags.remote, "origin");
        assert_eq!(config.version, VersionConfig::default());
    }
}
