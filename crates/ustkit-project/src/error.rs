//! Error types for the project container.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] ustkit_core::Error),

    #[error("attribute line {0:?} has no '='")]
    MalformedLine(String),

    #[error("note is missing required attribute {0:?}")]
    MissingAttribute(&'static str),

    #[error("attribute {key} has invalid value {value:?}")]
    InvalidAttribute { key: String, value: String },

    #[error("project has no {0} section")]
    MissingSection(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
