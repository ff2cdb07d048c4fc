//! Profile configuration for Igloo
//!
//! Profiles name remote targets (`user@host:path`). The store is a small
//! TOML file loaded at startup and rewritten atomically on every mutation,
//! so a crash mid-write never leaves a corrupt profile set behind.
//!
//! Location: `$IGLOO_CONFIG` if set, otherwise
//! `<config dir>/igloo/profiles.toml`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{IglooError, IglooResult};

/// Environment variable overriding the profile file location
pub const CONFIG_ENV: &str = "IGLOO_CONFIG";

/// A named remote target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub user: String,
    pub host: String,
    pub path: String,
    /// Exactly one profile in a store carries this flag
    #[serde(default)]
    pub default: bool,
}

impl Profile {
    /// The `user@host` part handed to ssh
    pub fn login(&self) -> String {
        format!("{}@{}", self.user, self.host)
    }

    /// Display form, `user@host:path`
    pub fn url(&self) -> String {
        format!("{}@{}:{}", self.user, self.host, self.path)
    }
}

/// Parse a remote url of the form `user@host:path`
///
/// A missing `user@` falls back to the invoking user; a missing `:path`
/// means the remote home directory (`.`). An empty host is an error.
pub fn parse_url(url: &str) -> IglooResult<(String, String, String)> {
    let (user, rest) = match url.split_once('@') {
        Some((user, rest)) => (user.to_string(), rest),
        None => (current_user(url)?, url),
    };
    let (host, path) = match rest.split_once(':') {
        Some((host, path)) if !path.is_empty() => (host.to_string(), path.to_string()),
        Some((host, _)) => (host.to_string(), ".".to_string()),
        None => (rest.to_string(), ".".to_string()),
    };
    if host.is_empty() {
        return Err(IglooError::InvalidUrl {
            url: url.to_string(),
            message: "empty host".to_string(),
        });
    }
    if user.is_empty() {
        return Err(IglooError::InvalidUrl {
            url: url.to_string(),
            message: "empty user".to_string(),
        });
    }
    Ok((user, host, path))
}

fn current_user(url: &str) -> IglooResult<String> {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .map_err(|_| IglooError::InvalidUrl {
            url: url.to_string(),
            message: "no user given and $USER is unset".to_string(),
        })
}

/// Serialized shape of the profile file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ProfileFile {
    #[serde(default, rename = "profile")]
    profiles: Vec<Profile>,
}

/// Persistent set of remote-target profiles
///
/// Insertion order is preserved both in memory and on disk, so
/// `config list` output is stable across invocations.
#[derive(Debug)]
pub struct ProfileStore {
    path: PathBuf,
    profiles: Vec<Profile>,
}

impl ProfileStore {
    /// The well-known profile file location for this process
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("igloo")
            .join("profiles.toml")
    }

    /// Load the store from its well-known location
    pub fn load() -> IglooResult<Self> {
        Self::load_from(Self::default_path())
    }

    /// Load the store from an explicit path (missing file = empty store)
    pub fn load_from(path: impl Into<PathBuf>) -> IglooResult<Self> {
        let path = path.into();
        let profiles = match fs::read_to_string(&path) {
            Ok(content) => toml::from_str::<ProfileFile>(&content)?.profiles,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, profiles })
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert or replace a profile; `None` targets the implicit default
    ///
    /// Writes through to disk before returning.
    pub fn add(
        &mut self,
        name: Option<&str>,
        user: String,
        host: String,
        path: String,
    ) -> IglooResult<&Profile> {
        let default = name.is_none();
        let name = name.unwrap_or("default").to_string();
        let profile = Profile {
            name: name.clone(),
            user,
            host,
            path,
            default,
        };
        let pos = match self.profiles.iter().position(|p| p.name == name) {
            Some(i) => {
                self.profiles[i] = profile;
                i
            }
            None => {
                self.profiles.push(profile);
                self.profiles.len() - 1
            }
        };
        self.store()?;
        Ok(&self.profiles[pos])
    }

    /// Delete a profile by name; writes through to disk
    pub fn remove(&mut self, name: &str) -> IglooResult<()> {
        let before = self.profiles.len();
        self.profiles.retain(|p| p.name != name);
        if self.profiles.len() == before {
            return Err(IglooError::ProfileNotFound {
                name: name.to_string(),
            });
        }
        self.store()
    }

    /// All profiles in insertion order
    pub fn list(&self) -> &[Profile] {
        &self.profiles
    }

    /// Resolve the active profile for this invocation
    ///
    /// An explicit name wins; otherwise the profile marked default, or
    /// failing that one literally named `default`.
    pub fn resolve(&self, explicit: Option<&str>) -> IglooResult<&Profile> {
        let found = match explicit {
            Some(name) => self.profiles.iter().find(|p| p.name == name),
            None => self
                .profiles
                .iter()
                .find(|p| p.default)
                .or_else(|| self.profiles.iter().find(|p| p.name == "default")),
        };
        found.ok_or_else(|| IglooError::ProfileNotFound {
            name: explicit.unwrap_or("default").to_string(),
        })
    }

    /// Rewrite the backing file atomically (temp file + rename)
    fn store(&self) -> IglooResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = ProfileFile {
            profiles: self.profiles.clone(),
        };
        let content = toml::to_string_pretty(&file)?;
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}
