//! Configuration management for marginalia

use serde::Deserialize;
use std::env;
use std::path::PathBuf;

use crate::annotations::{IdentityProvider, SequentialIdentity, UuidIdentity};
use crate::persistence::{FileKeyValue, KeyValueBridge, DEFAULT_STORAGE_KEY};

pub const DEFAULT_DATA_DIR: &str = "./.marginalia";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct IdentityConfig {
    /// Issue `prefix-N` ids instead of UUIDs
    pub prefix: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            storage: StorageConfig {
                data_dir: PathBuf::from(DEFAULT_DATA_DIR),
                key: DEFAULT_STORAGE_KEY.to_string(),
            },
            identity: IdentityConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source; blank values count as unset
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        Config {
            storage: StorageConfig {
                data_dir: var("MARGINALIA_DATA_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
                key: var("MARGINALIA_STORAGE_KEY")
                    .unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string()),
            },
            identity: IdentityConfig {
                prefix: var("MARGINALIA_ID_PREFIX"),
            },
        }
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, data_dir: Option<PathBuf>, key: Option<String>) -> Self {
        if let Some(dir) = data_dir {
            self.storage.data_dir = dir;
        }
        if let Some(key) = key {
            self.storage.key = key;
        }
        self
    }

    pub fn identity(&self) -> Box<dyn IdentityProvider> {
        match &self.identity.prefix {
            Some(prefix) => Box::new(SequentialIdentity::new(prefix.clone())),
            None => Box::new(UuidIdentity),
        }
    }

    pub fn file_store(&self) -> FileKeyValue {
        FileKeyValue::new(self.storage.data_dir.clone())
    }

    /// Synchronous bridge over the configured slot
    pub fn bridge(&self) -> KeyValueBridge<FileKeyValue> {
        KeyValueBridge::new(self.file_store(), self.storage.key.clone())
    }
}
