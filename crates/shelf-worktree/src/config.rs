//! Tracked-root configuration, persisted as `config.toml`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use shelf_index::path;
use tracing::{debug, info};

/// Errors raised while loading or updating the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read or write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    roots: Vec<String>,
}

/// The set of tracked roots, in declaration order.
///
/// Roots are canonical paths (relative to the canonical root). No root is
/// an ancestor of another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    file: PathBuf,
    roots: Vec<String>,
}

impl Config {
    /// Load `file`; a missing file yields a config with no roots.
    pub fn load(file: &Path) -> ConfigResult<Self> {
        let text = match fs::read_to_string(file) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %file.display(), "no config file; no tracked roots");
                return Ok(Self {
                    file: file.to_path_buf(),
                    roots: Vec::new(),
                });
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: file.to_path_buf(),
                    source,
                })
            }
        };
        let parsed: ConfigFile = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: file.to_path_buf(),
            source,
        })?;
        Ok(Self {
            file: file.to_path_buf(),
            roots: parsed.roots,
        })
    }

    /// Write the config back to its file.
    pub fn save(&self) -> ConfigResult<()> {
        let text = toml::to_string_pretty(&ConfigFile {
            roots: self.roots.clone(),
        })?;
        fs::write(&self.file, text).map_err(|source| ConfigError::Io {
            path: self.file.clone(),
            source,
        })?;
        debug!(path = %self.file.display(), roots = self.roots.len(), "config saved");
        Ok(())
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// The tracked root `canonical` lies under, if any.
    pub fn root_of(&self, canonical: &str) -> Option<&str> {
        self.roots
            .iter()
            .find(|root| path::is_under(canonical, root))
            .map(String::as_str)
    }

    /// Add a tracked root and persist the change.
    ///
    /// A path already covered by a root changes nothing and returns `false`.
    /// Roots beneath `root` are absorbed into it: `root` takes the slot of
    /// the first of them and the rest are dropped.
    pub fn add_root(&mut self, root: &str) -> ConfigResult<bool> {
        if self.root_of(root).is_some() {
            return Ok(false);
        }
        let before = self.roots.len();
        let slot = self
            .roots
            .iter()
            .position(|r| path::is_under(r, root))
            .unwrap_or(before);
        self.roots.retain(|r| !path::is_under(r, root));
        let absorbed = before - self.roots.len();
        self.roots.insert(slot, root.to_string());
        self.save()?;
        info!(root, absorbed, "tracking new root");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_has_no_roots() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("config.toml")).unwrap();
        assert!(config.roots().is_empty());
    }

    #[test]
    fn roots_persist_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.toml");
        let mut config = Config::load(&file).unwrap();
        assert!(config.add_root("home/u/.config").unwrap());
        assert!(config.add_root("etc").unwrap());

        let reloaded = Config::load(&file).unwrap();
        assert_eq!(reloaded.roots(), &["home/u/.config", "etc"]);
    }

    #[test]
    fn adding_existing_root_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.toml");
        let mut config = Config::load(&file).unwrap();
        config.add_root("etc").unwrap();
        fs::remove_file(&file).unwrap();

        assert!(!config.add_root("etc").unwrap());
        assert!(!file.exists());
    }

    #[test]
    fn path_under_a_root_is_already_covered() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::load(&dir.path().join("config.toml")).unwrap();
        config.add_root("home/u").unwrap();

        assert!(!config.add_root("home/u/.vimrc").unwrap());
        assert!(config.add_root("home/uv").unwrap());
        assert_eq!(config.roots(), &["home/u", "home/uv"]);
    }

    #[test]
    fn ancestor_root_absorbs_descendants() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.toml");
        let mut config = Config::load(&file).unwrap();
        config.add_root("etc").unwrap();
        config.add_root("home/u/.vimrc").unwrap();
        config.add_root("opt").unwrap();
        config.add_root("home/u/.config/nvim").unwrap();

        assert!(config.add_root("home/u").unwrap());
        assert_eq!(config.roots(), &["etc", "home/u", "opt"]);
        assert_eq!(Config::load(&file).unwrap().roots(), config.roots());
    }

    #[test]
    fn root_of_is_component_wise() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::load(&dir.path().join("config.toml")).unwrap();
        config.add_root("home/a").unwrap();
        assert_eq!(config.root_of("home/a/x"), Some("home/a"));
        assert_eq!(config.root_of("home/ab/x"), None);
    }

    #[test]
    fn garbage_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("config.toml");
        fs::write(&file, "roots = 7").unwrap();
        assert!(matches!(Config::load(&file), Err(ConfigError::Parse { .. })));
    }
}
