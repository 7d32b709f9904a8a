/// Crate-wide result alias.
pub type VitrineResult<T> = Result<T, VitrineError>;

/// Error type for all fallible vitrine operations.
///
/// Most of the preview pipeline deliberately degrades instead of failing (a
/// snippet that cannot be measured still renders, a snapshot that cannot be
/// captured still pauses playback), so errors here mark the boundaries where
/// a caller genuinely has to react.
#[derive(thiserror::Error, Debug)]
pub enum VitrineError {
    /// A request or configuration value failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// Rasterizing a snapshot failed, e.g. the surface was tainted by
    /// cross-origin content inside the snippet.
    #[error("capture error: {0}")]
    Capture(String),

    /// The control channel to a sandbox instance is gone.
    #[error("channel error: {0}")]
    Channel(String),

    /// Encoding or decoding a boundary value failed.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Any other underlying failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl VitrineError {
    /// Build a [`VitrineError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`VitrineError::Capture`].
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture(msg.into())
    }

    /// Build a [`VitrineError::Channel`].
    pub fn channel(msg: impl Into<String>) -> Self {
        Self::Channel(msg.into())
    }

    /// Build a [`VitrineError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}
