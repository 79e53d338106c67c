//! Rendering errors.

/// A collaborator failed while rendering a fragment.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Image bytes could not be obtained.
    #[error("failed to load image {location}: {message}")]
    ImageLoad {
        /// Path or URL that was requested.
        location: String,
        message: String,
    },

    /// Code could not be rendered as an image.
    #[error("failed to render code image: {0}")]
    CodeImage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
