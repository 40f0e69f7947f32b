use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

const VERSION_CONTROL_DIRS: &[&str] = &[".git", ".hg", ".svn"];
const VIRTUAL_ENV_DIRS: &[&str] = &[".venv", "venv", "env", ".env"];
const DEPENDENCY_CACHE_DIRS: &[&str] = &["__pycache__", "node_modules"];
const PACKAGE_INIT_FILES: &[&str] = &["__init__.py"];

/// Settings for a project scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which directories and files discovery skips
    pub ignore: IgnoreConfig,
    /// Source file extension, without the leading dot
    pub extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ignore: IgnoreConfig::default(),
            extension: "py".to_string(),
        }
    }
}

impl Config {
    /// Load a config from a YAML file. Missing keys fall back to their defaults.
    pub fn from_yaml_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml_str(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    pub fn from_yaml_str(content: &str) -> anyhow::Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).context("Failed to parse YAML config")
    }
}

/// Ignore policy: a fixed set of switches plus free-form additions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IgnoreConfig {
    pub version_control: bool,
    pub virtual_env: bool,
    pub dependency_cache: bool,
    pub package_init: bool,
    pub extra_dirs: Vec<String>,
    pub extra_files: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            version_control: true,
            virtual_env: true,
            dependency_cache: true,
            package_init: true,
            extra_dirs: Vec::new(),
            extra_files: Vec::new(),
        }
    }
}

impl IgnoreConfig {
    /// Directory names pruned during discovery.
    pub fn ignored_dirs(&self) -> BTreeSet<String> {
        let mut dirs = BTreeSet::new();
        let groups = [
            (self.version_control, VERSION_CONTROL_DIRS),
            (self.virtual_env, VIRTUAL_ENV_DIRS),
            (self.dependency_cache, DEPENDENCY_CACHE_DIRS),
        ];
        for (enabled, names) in groups {
            if enabled {
                dirs.extend(names.iter().map(|name| name.to_string()));
            }
        }
        dirs.extend(self.extra_dirs.iter().cloned());
        dirs
    }

    /// File names skipped during discovery.
    pub fn ignored_files(&self) -> BTreeSet<String> {
        let mut files = BTreeSet::new();
        if self.package_init {
            files.extend(PACKAGE_INIT_FILES.iter().map(|name| name.to_string()));
        }
        files.extend(self.extra_files.iter().cloned());
        files
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ignores_cover_every_group() {
        let ignore = IgnoreConfig::default();
        let dirs = ignore.ignored_dirs();
        for name in [".git", ".venv", "venv", "__pycache__", "node_modules"] {
            assert!(dirs.contains(name), "{name} should be ignored");
        }
        assert!(ignore.ignored_files().contains("__init__.py"));
    }

    #[test]
    fn switches_disable_their_group() {
        let ignore = IgnoreConfig {
            virtual_env: false,
            package_init: false,
            extra_dirs: vec!["old".to_string()],
            ..IgnoreConfig::default()
        };
        let dirs = ignore.ignored_dirs();
        assert!(!dirs.contains("venv"));
        assert!(dirs.contains(".git"));
        assert!(dirs.contains("old"));
        assert!(ignore.ignored_files().is_empty());
    }

    #[test]
    fn yaml_keys_are_optional() {
        let config = Config::from_yaml_str("ignore:\n  version_control: false\n").unwrap();
        assert!(!config.ignore.version_control);
        assert!(config.ignore.virtual_env);
        assert_eq!(config.extension, "py");

        assert_eq!(Config::from_yaml_str("").unwrap(), Config::default());
    }

    #[test]
    fn loads_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pymesh.yml");
        fs::write(
            &path,
            "ignore:\n  package_init: false\n  extra_dirs: [old, build]\nextension: pyx\n",
        )
        .unwrap();

        let config = Config::from_yaml_file(&path).unwrap();
        assert_eq!(config.extension, "pyx");
        assert!(!config.ignore.package_init);
        assert!(config.ignore.ignored_dirs().contains("build"));

        let err = Config::from_yaml_file(&dir.path().join("absent.yml")).unwrap_err();
        assert!(format!("{err}").contains("absent.yml"));
    }

    #[test]
    fn yaml_rejects_wrong_types() {
        assert!(Config::from_yaml_str("ignore:\n  extra_dirs: 3\n").is_err());
    }
}
