//! Errors raised by the scene library.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SceneError {
    /// A photo reference was empty or otherwise unusable
    #[error("invalid photo reference {value:?}: {reason}")]
    InvalidPhoto { value: String, reason: String },

    /// Scene configuration out of range
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// The rendering backend could not present a frame
    #[error("render backend error: {reason}")]
    Render { reason: String },
}

pub type Result<T> = std::result::Result<T, SceneError>;

impl SceneError {
    pub fn invalid_photo(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPhoto { value: value.into(), reason: reason.into() }
    }

    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config { reason: reason.into() }
    }

    pub fn render(reason: impl Into<String>) -> Self {
        Self::Render { reason: reason.into() }
    }
}
