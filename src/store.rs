use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::identity::{fresh_seed, generate_for, IdentityProfile, Platform};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read profile {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("profile {} is not valid: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode profile: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write profile {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One JSON profile file per installation.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
    platform: Platform,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            platform: Platform::current(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `Ok(None)` when no profile has been written yet.
    pub fn load(&self) -> Result<Option<IdentityProfile>, StoreError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Existing profile unchanged, or a fresh one. Unreadable files count as
    /// absent.
    pub fn load_or_create(&self) -> IdentityProfile {
        match self.load() {
            Ok(Some(profile)) => {
                info!(target: "identity", machine = profile.short_id(), "loaded existing profile");
                profile
            }
            Ok(None) => self.create(),
            Err(e) => {
                warn!(target: "identity", error = %e, "discarding unreadable profile");
                self.create()
            }
        }
    }

    /// Pretty JSON via a temp file in the same directory, then rename.
    pub fn save(&self, profile: &IdentityProfile) -> Result<(), StoreError> {
        let write_err = |source: std::io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(write_err)?;

        let json = serde_json::to_string_pretty(profile)?;
        let mut temp = NamedTempFile::new_in(&dir).map_err(write_err)?;
        temp.write_all(json.as_bytes()).map_err(write_err)?;
        temp.as_file().sync_all().map_err(write_err)?;
        temp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }

    /// Always generates and persists a new profile.
    pub fn reset(&self) -> IdentityProfile {
        let profile = self.create();
        info!(target: "identity", machine = profile.short_id(), "profile reset");
        profile
    }

    fn create(&self) -> IdentityProfile {
        let profile = generate_for(&fresh_seed(), self.platform);
        if let Err(e) = self.save(&profile) {
            error!(target: "identity", error = %e, "profile not persisted; continuing in memory");
        } else {
            info!(target: "identity", machine = profile.short_id(), path = %self.path.display(), "created profile");
        }
        profile
    }
}
