//! Error types shared by both editors.
//!
//! Validation problems are kept apart from I/O so callers can tell "fix your input" from
//! "the file is bad" without matching on strings.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Rejected user input. Raised before any state is touched.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum Invalid {
    #[error("name cannot be empty")]
    EmptyName,

    #[error("`{0}` is not a #rrggbb color")]
    Color(String),

    #[error("no terrain with id {0}")]
    UnknownTerrain(String),

    #[error("no character with id {0}")]
    UnknownCharacter(String),

    #[error("{0} must be at least 1")]
    NotPositive(&'static str),

    #[error("every terrain id up to 4294967295 is taken")]
    IdSpaceExhausted,

    #[error("there are no characters to export")]
    NothingToExport,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Invalid(#[from] Invalid),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: malformed JSON: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{}: {reason}", .path.display())]
    Format { path: PathBuf, reason: String },

    #[error("image not found: {}", .0.display())]
    ImageNotFound(PathBuf),

    #[error("{}: could not decode image: {source}", .path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl Error {
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Error::Io { path: path.to_owned(), source }
    }

    pub fn json(path: &Path, source: serde_json::Error) -> Self {
        Error::Json { path: path.to_owned(), source }
    }

    pub fn format(path: &Path, reason: impl Into<String>) -> Self {
        Error::Format { path: path.to_owned(), reason: reason.into() }
    }

    /// True when the error only means "there was no file yet".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
