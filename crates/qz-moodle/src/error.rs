//! Export errors.

use qz_renderer::RenderError;

/// Error from exporting a quiz document.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The document was not scored.
    #[error("quiz is not marked as valid for export")]
    NotValidated,

    /// A question field could not be rendered.
    #[error("section {section}, question {question}: {source}")]
    Render {
        section: String,
        /// 1-based position of the question in its section.
        question: usize,
        #[source]
        source: RenderError,
    },

    #[error("XML write error: {0}")]
    Xml(String),
}
