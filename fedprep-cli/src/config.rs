// Config file handling

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// "tfhe" or "mock"
    #[serde(default = "default_backend")]
    pub backend: String,
    /// Rayon pool size for cell encryption; rayon's default when unset
    pub threads: Option<usize>,
    #[serde(default)]
    pub self_test: bool,
    /// Where `encrypt` writes submissions when no --output is given
    pub output_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            threads: None,
            self_test: false,
            output_dir: None,
        }
    }
}

fn default_backend() -> String {
    "tfhe".into()
}

impl Config {
    /// Load defaults, then the config file, then `FEDPREP_*` environment
    /// variables
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };

        let config: Config = Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(&path))
            .merge(Env::prefixed("FEDPREP_").only(&["backend", "threads", "self_test", "output_dir"]))
            .extract()
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::default_path()?,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    pub fn default_path() -> Result<PathBuf> {
        // Uses platform-specific config directories:
        //   macOS:   ~/Library/Application Support/io.fedprep.fedprep/
        //   Linux:   ~/.config/fedprep/
        //   Windows: C:\Users\<user>\AppData\Roaming\fedprep\fedprep\
        let dirs = ProjectDirs::from("io", "fedprep", "fedprep")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("absent.toml"))).unwrap();
        assert_eq!(config.backend, "tfhe");
        assert!(!config.self_test);
        assert_eq!(config.threads, None);
    }

    #[test]
    fn reads_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "backend = \"mock\"\nthreads = 3\nself_test = true\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.backend, "mock");
        assert_eq!(config.threads, Some(3));
        assert!(config.self_test);
        assert_eq!(config.output_dir, None);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config {
            backend: "mock".into(),
            threads: Some(2),
            self_test: true,
            output_dir: Some("/tmp/out".into()),
        };
        config.save(Some(&path)).unwrap();

        assert_eq!(Config::load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn rejects_malformed_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "threads = \"many\"\n").unwrap();

        assert!(Config::load(Some(&path)).is_err());
    }
}
