//! Load/save of [`GatewaySettings`] at a fixed path below a root directory.

use std::fs;
use std::io::{self, Write};

use camino::{Utf8Path, Utf8PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::defaults::{PORT_RANGE, SETTINGS_RELATIVE_PATH};
use crate::settings::GatewaySettings;

/// Persists gateway settings as a sectioned key/value document.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: Utf8PathBuf,
}

impl SettingsStore {
    /// Store rooted at `root`; the file lives at [`SETTINGS_RELATIVE_PATH`].
    #[must_use]
    pub fn new(root: impl AsRef<Utf8Path>) -> Self {
        Self {
            path: root.as_ref().join(SETTINGS_RELATIVE_PATH),
        }
    }

    /// Path of the settings file.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Reads the settings, falling back to defaults when nothing was saved.
    pub fn load(&self) -> Result<GatewaySettings, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(GatewaySettings::default());
            }
            Err(source) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let settings: GatewaySettings =
            toml::from_str(&text).map_err(|source| StoreError::Parse {
                path: self.path.clone(),
                source: Box::new(source),
            })?;
        if !settings.port_is_valid() {
            return Err(StoreError::PortOutOfRange {
                path: self.path.clone(),
                port: settings.tcp.port,
            });
        }
        Ok(settings)
    }

    /// Atomically replaces the settings file.
    pub fn save(&self, settings: &GatewaySettings) -> Result<(), StoreError> {
        let text = toml::to_string(settings).map_err(StoreError::Serialise)?;
        let parent = self
            .path
            .parent()
            .filter(|parent| !parent.as_str().is_empty())
            .unwrap_or_else(|| Utf8Path::new("."));
        fs::create_dir_all(parent).map_err(|source| self.write_error(source))?;

        let mut staged =
            NamedTempFile::new_in(parent).map_err(|source| self.write_error(source))?;
        staged
            .write_all(text.as_bytes())
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|source| self.write_error(source))?;
        staged
            .persist(&self.path)
            .map_err(|error| self.write_error(error.error))?;
        Ok(())
    }

    fn write_error(&self, source: io::Error) -> StoreError {
        StoreError::Write {
            path: self.path.clone(),
            source,
        }
    }
}

/// Errors raised while loading or saving settings.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The settings file exists but could not be read.
    #[error("failed to read settings '{path}': {source}")]
    Read {
        /// Settings file path.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// The settings file is not a valid settings document.
    #[error("failed to parse settings '{path}': {source}")]
    Parse {
        /// Settings file path.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: Box<toml::de::Error>,
    },
    /// The persisted port violates the accepted range.
    #[error(
        "port {port} in '{path}' is outside {min}..={max}",
        min = PORT_RANGE.start(),
        max = PORT_RANGE.end()
    )]
    PortOutOfRange {
        /// Settings file path.
        path: Utf8PathBuf,
        /// Rejected port value.
        port: u16,
    },
    /// Settings could not be rendered.
    #[error("failed to serialise settings: {0}")]
    Serialise(#[source] toml::ser::Error),
    /// Writing or persisting the settings file failed.
    #[error("failed to write settings '{path}': {source}")]
    Write {
        /// Settings file path.
        path: Utf8PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}
