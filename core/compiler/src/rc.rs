//! Resource file (`as2js.rc`) of the compiler.
//!
//! The file is a JSON object of strings, or `null` to keep every default:
//!
//! ```text
//! // comments are accepted
//! {
//!     "scripts": "/usr/share/as2js/scripts",
//!     "db": "/var/lib/as2js/packages.db",
//!     "temporary_variable_name": "@temp"
//! }
//! ```

use std::env;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::errors::ConfigError;
use crate::json;

pub const RC_FILENAME: &str = "as2js.rc";

pub(crate) const NOT_AN_OBJECT: &str =
    "A resource file (.rc) must be defined as a JSON object, or set to 'null'.";
pub(crate) const NOT_A_STRING: &str =
    "A resource file is expected to be an object of string elements.";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Directory holding the `native`, `global` and `system` script modules.
    pub scripts: String,
    /// Path of the package database.
    pub db: String,
    pub temporary_variable_name: String,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            scripts: "as2js/scripts".to_string(),
            db: "/tmp/as2js_packages.db".to_string(),
            temporary_variable_name: "@temp".to_string(),
        }
    }
}

impl ResourceConfig {
    /// Directories searched for `as2js.rc`, in order: `$AS2JS_RC`, `as2js`,
    /// `~/.config/as2js`, `/etc/as2js`. Unset variables are skipped.
    #[must_use]
    pub fn default_directories() -> Vec<PathBuf> {
        let mut directories = Vec::with_capacity(4);
        if let Some(dir) = env::var_os("AS2JS_RC").filter(|d| !d.is_empty()) {
            directories.push(PathBuf::from(dir));
        }
        directories.push(PathBuf::from("as2js"));
        if let Some(home) = env::var_os("HOME").filter(|h| !h.is_empty()) {
            directories.push(PathBuf::from(home).join(".config/as2js"));
        }
        directories.push(PathBuf::from("/etc/as2js"));
        directories
    }

    /// Loads the first `as2js.rc` found in the default directories.
    ///
    /// # Errors
    ///
    /// See [`ResourceConfig::find`].
    pub fn load(accept_if_missing: bool) -> Result<Self, ConfigError> {
        Self::find(&Self::default_directories(), accept_if_missing)
    }

    /// Loads the first `as2js.rc` found in `directories`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::NotFound`] when no directory has the file and
    /// `accept_if_missing` is false, otherwise whatever
    /// [`ResourceConfig::from_file`] reports for the file found.
    pub fn find(directories: &[PathBuf], accept_if_missing: bool) -> Result<Self, ConfigError> {
        for dir in directories {
            let path = dir.join(RC_FILENAME);
            match fs::read_to_string(&path) {
                Ok(content) => {
                    tracing::debug!(path = %path.display(), "loading resource file");
                    return Self::parse(&path, &content);
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {}
                Err(source) => return Err(ConfigError::Io { path, source }),
            }
        }
        if accept_if_missing {
            tracing::debug!("no resource file found, using defaults");
            Ok(Self::default())
        } else {
            Err(ConfigError::NotFound)
        }
    }

    /// # Errors
    ///
    /// [`ConfigError::Io`] when the file cannot be read, then see
    /// [`ResourceConfig::parse`].
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    /// Parses the content of a resource file. Unknown keys are ignored.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Json`] for invalid JSON and [`ConfigError::Unexpected`]
    /// when the document is not `null` nor an object of strings.
    pub fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let root = json::parse(content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        let unexpected = |reason| ConfigError::Unexpected {
            path: path.to_path_buf(),
            reason,
        };
        match &root {
            Value::Null => return Ok(Self::default()),
            Value::Object(members) => {
                if !members.values().all(Value::is_string) {
                    return Err(unexpected(NOT_A_STRING));
                }
            }
            _ => return Err(unexpected(NOT_AN_OBJECT)),
        }
        serde_json::from_value(root).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}
