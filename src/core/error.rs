use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("cannot parse a page number from '{name}'")]
    IdentityParse { name: String },

    #[error("{capability} failed on primary page {primary} / secondary page {secondary}: {reason}")]
    Capability {
        capability: &'static str,
        primary: usize,
        secondary: usize,
        reason: String,
    },

    #[error("image error on {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AlignError {
    pub fn config(msg: impl Into<String>) -> Self {
        AlignError::Configuration(msg.into())
    }

    pub fn image(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        AlignError::Image {
            path: path.into(),
            source,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AlignError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type AlignResult<T> = Result<T, AlignError>;
