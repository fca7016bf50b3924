/// Convenience result type used across the studio.
pub type StudioResult<T> = Result<T, StudioError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum StudioError {
    /// Invalid caller-provided configuration or input.
    #[error("validation error: {0}")]
    Validation(String),

    /// A template, logo, sticker or font could not be fetched or decoded.
    ///
    /// Terminal for the render/export call in progress; partial output is discarded.
    #[error("asset load error: '{asset_ref}': {reason}")]
    AssetLoad {
        /// The reference that failed to resolve.
        asset_ref: String,
        /// Human-readable cause.
        reason: String,
    },

    /// Errors while rasterizing a document.
    #[error("render error: {0}")]
    Render(String),

    /// Errors while encoding a raster into an image container.
    #[error("encode error: {0}")]
    Encode(String),

    /// Failure reported by the persistence collaborator, carried unchanged.
    #[error("upload error: {0:#}")]
    Upload(anyhow::Error),

    /// Errors when serializing or deserializing documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StudioError {
    /// Build a [`StudioError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`StudioError::AssetLoad`] value.
    pub fn asset_load(asset_ref: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::AssetLoad {
            asset_ref: asset_ref.into(),
            reason: reason.to_string(),
        }
    }

    /// Build a [`StudioError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`StudioError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`StudioError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return the failing asset reference for [`StudioError::AssetLoad`].
    pub fn asset_ref(&self) -> Option<&str> {
        match self {
            Self::AssetLoad { asset_ref, .. } => Some(asset_ref.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
