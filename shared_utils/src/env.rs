use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::config::ConfigError;

/// Key/value pairs parsed from a dotenv-style file.
///
/// Unlike `dotenvy::from_path`, loading does not touch the process
/// environment; values are only reachable through this struct.
#[derive(Debug, Clone)]
pub struct EnvFile {
    path: PathBuf,
    values: IndexMap<String, String>,
}

impl EnvFile {
    /// Parses the file at `path`.
    ///
    /// # Arguments
    /// * `path` - Location of the env file (usually `.env`).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let unreadable = |source| ConfigError::Unreadable {
            path: path.clone(),
            source,
        };

        let mut values = IndexMap::new();
        for item in dotenvy::from_path_iter(&path).map_err(unreadable)? {
            let (key, value) = item.map_err(unreadable)?;
            values.insert(key, value);
        }

        Ok(Self { path, values })
    }

    /// Location the values were read from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Looks up a key, returning `None` when it is absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Looks up a key, returning a structured error if it's missing.
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        self.get(key)
            .ok_or_else(|| ConfigError::MissingKey(key.to_string()))
    }
}

/// Reads an environment variable, returning a structured error if it's missing.
///
/// This is a thin wrapper around `std::env::var` that provides a more
/// ergonomic and specific error type for missing variables.
///
/// # Arguments
/// * `name` - The name of the environment variable to read.
pub fn get_env_var(name: &str) -> Result<String, ConfigError> {
    std::env::var(name).map_err(|_| ConfigError::MissingKey(name.to_string()))
}
