//! Ordered substitution pipelines for question, answer and feedback text.
//!
//! Every pass consumes the previous pass's output. Earlier passes emit HTML
//! or entity-escaped text that later passes must not match again, so the
//! order below is significant.

use std::fmt;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::code::{render_fenced_code, render_inline_code};
use crate::code_image::{CodeImageRenderer, UnavailableCodeImages};
use crate::emoticon::neutralize_emoticons;
use crate::error::RenderError;
use crate::image::{ImageLoader, SourceImageLoader, embed_images};
use crate::markdown::render_markdown;
use crate::math::{render_display_math, render_inline_math};
use crate::table::render_tables;

static HTML_COMMENT_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!--(?s:.*?)-->").expect("invalid comment regex"));

/// Options affecting rendered output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Draw borders around table cells.
    pub table_border: bool,
}

/// Rendered HTML for one question, answer or feedback field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment(String);

impl Fragment {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Renders quiz markdown into [`Fragment`]s.
///
/// Image loading and code-image rendering are delegated to the `L` and `C`
/// collaborators.
///
/// # Example
///
/// ```
/// use qz_renderer::{ContentRenderer, RenderOptions};
///
/// let renderer = ContentRenderer::new(RenderOptions::default());
/// let answer = renderer.render_answer("`x < y` :)");
/// assert_eq!(answer.as_str(), "<p><code>x &lt; y</code> :\u{200B})</p>");
/// ```
pub struct ContentRenderer<L = SourceImageLoader, C = UnavailableCodeImages> {
    options: RenderOptions,
    images: L,
    code_images: C,
}

impl ContentRenderer {
    /// Renderer loading images from disk or network, without code images.
    #[must_use]
    pub fn new(options: RenderOptions) -> Self {
        Self::with_collaborators(options, SourceImageLoader::new(), UnavailableCodeImages)
    }
}

impl<L: ImageLoader, C: CodeImageRenderer> ContentRenderer<L, C> {
    pub fn with_collaborators(options: RenderOptions, images: L, code_images: C) -> Self {
        Self {
            options,
            images,
            code_images,
        }
    }

    #[must_use]
    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Render question text. Relative image paths resolve against `doc_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if an image or a code image cannot be produced.
    pub fn render_question(&mut self, text: &str, doc_dir: &Path) -> Result<Fragment, RenderError> {
        let text = HTML_COMMENT_PATTERN.replace_all(text, "");
        let text = render_fenced_code(&text, &mut self.code_images)?;
        let text = render_inline_code(&text);
        let text = embed_images(&text, doc_dir, &self.images)?;
        let text = render_display_math(&text);
        let text = render_inline_math(&text);
        let text = render_tables(&text, self.options.table_border);
        let text = neutralize_emoticons(&text);
        Ok(Fragment(render_markdown(&text, true)))
    }

    /// Render answer text.
    #[must_use]
    pub fn render_answer(&self, text: &str) -> Fragment {
        let text = render_inline_code(text);
        let text = render_inline_math(&text);
        let text = neutralize_emoticons(&text);
        Fragment(render_markdown(&text, false))
    }

    /// Render feedback text, which uses the answer pipeline.
    #[must_use]
    pub fn render_feedback(&self, text: &str) -> Fragment {
        self.render_answer(text)
    }
}
