//! Error types of the compiler crate.
//!
//! Only conditions that abort a compilation become an `Err`. Unresolved
//! names, visibility violations and malformed database entries are reported
//! through [`as2js_ast::Diagnostics`] and the operation returns `false` or
//! `None`.

use std::path::PathBuf;

use as2js_ast::NodeError;
use thiserror::Error;

/// Failures of the package database.
#[derive(Debug, Error)]
#[must_use = "errors must not be silently ignored"]
pub enum DatabaseError {
    /// The database was modified before [`crate::Database::load`] ran.
    #[error("attempting to add a package to the database before the database was loaded")]
    NotLoaded,

    #[error("cannot access database file \"{}\": {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize the database: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while reading the resource file.
#[derive(Debug, Error)]
#[must_use = "errors must not be silently ignored"]
pub enum ConfigError {
    #[error(
        "cannot find the as2js.rc file; the system default is usually put in /etc/as2js/as2js.rc"
    )]
    NotFound,

    /// The file parsed but does not have the expected shape.
    #[error("{}: {reason}", .path.display())]
    Unexpected { path: PathBuf, reason: &'static str },

    #[error("cannot read resource file \"{}\": {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in resource file \"{}\": {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Conditions that abort a compilation.
///
/// [`CompileError::exit_code`] separates the two families: `1` for the
/// "exit" family (a required file is missing or broken, the installation is
/// incomplete) and `2` for internal invariant violations.
#[derive(Debug, Error)]
#[must_use = "errors must not be silently ignored"]
pub enum CompileError {
    #[error("cannot open module file \"{filename}\": {reason}")]
    ModuleLoadFailed { filename: String, reason: String },

    #[error("could not compile module file \"{filename}\"{}", .reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default())]
    ModuleParseFailed {
        filename: String,
        reason: Option<String>,
    },

    /// The database lists the package but the module it points to does not
    /// define it.
    #[error("cannot find package '{package}' in any of the previously registered packages")]
    PackageMustExist { package: String },

    #[error("installation problem: {reason}")]
    Installation { reason: String },

    /// A well known native type such as `Object` could not be resolved.
    #[error("cannot find internal type \"{name}\"")]
    MissingType { name: String },

    #[error("internal error: {0}")]
    InternalInvariantViolation(String),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error on \"{}\": {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl CompileError {
    pub(crate) fn internal(message: impl Into<String>) -> Self {
        CompileError::InternalInvariantViolation(message.into())
    }

    /// Process exit code matching the failure.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            CompileError::InternalInvariantViolation(_) | CompileError::Node(_) => 2,
            _ => 1,
        }
    }

    /// Every variant stops the compilation.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        true
    }
}

pub type CompileResult<T> = Result<T, CompileError>;
