//! Rendering code snippets to raster images.
//!
//! Fences whose language tag carries the `{img}` marker are rendered to PNG by
//! a [`CodeImageRenderer`] and embedded as data URIs.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::RenderError;

/// Marker in a fence language tag requesting an image.
pub const IMAGE_MARKER: &str = "{img}";

/// Lexer used when the fence names none, or names one the highlighter rejects.
pub const FALLBACK_LEXER: &str = "pascal";

/// Turns source code into PNG bytes.
pub trait CodeImageRenderer {
    /// Render `code` highlighted with `lexer`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if no image could be produced.
    fn render(&mut self, lexer: &str, code: &str) -> Result<Vec<u8>, RenderError>;
}

impl<R: CodeImageRenderer + ?Sized> CodeImageRenderer for Box<R> {
    fn render(&mut self, lexer: &str, code: &str) -> Result<Vec<u8>, RenderError> {
        (**self).render(lexer, code)
    }
}

/// Lexer name for a fence language tag: marker removed, empty means [`FALLBACK_LEXER`].
#[must_use]
pub fn lexer_name(tag: &str) -> String {
    let name = tag.replace(IMAGE_MARKER, "");
    let name = name.trim();
    if name.is_empty() {
        FALLBACK_LEXER.to_owned()
    } else {
        name.to_owned()
    }
}

/// Renders images with an external highlighter speaking the `pygmentize` CLI.
#[derive(Debug, Clone)]
pub struct HighlighterCodeImages {
    command: String,
    font_size: u32,
    line_numbers: bool,
}

impl HighlighterCodeImages {
    #[must_use]
    pub fn new(command: impl Into<String>, font_size: u32, line_numbers: bool) -> Self {
        Self {
            command: command.into(),
            font_size,
            line_numbers,
        }
    }

    fn run(&self, lexer: &str, code: &str) -> Result<Vec<u8>, RenderError> {
        let options = format!(
            "font_size={},line_numbers={}",
            self.font_size,
            if self.line_numbers { "True" } else { "False" }
        );

        let mut child = Command::new(&self.command)
            .args(["-l", lexer, "-f", "png", "-O", &options])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| RenderError::CodeImage(format!("failed to run {}: {e}", self.command)))?;

        if let Some(mut stdin) = child.stdin.take()
            && let Err(e) = stdin.write_all(code.as_bytes())
        {
            let _ = child.kill();
            let _ = child.wait();
            return Err(RenderError::CodeImage(format!(
                "failed to write code to {}: {e}",
                self.command
            )));
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::CodeImage(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(RenderError::CodeImage(format!(
                "{} produced no image",
                self.command
            )));
        }
        Ok(output.stdout)
    }
}

impl CodeImageRenderer for HighlighterCodeImages {
    fn render(&mut self, lexer: &str, code: &str) -> Result<Vec<u8>, RenderError> {
        tracing::debug!(lexer, command = %self.command, "Rendering code image");
        match self.run(lexer, code) {
            Err(e) if lexer != FALLBACK_LEXER => {
                tracing::warn!(lexer, error = %e, "Retrying code image with fallback lexer");
                self.run(FALLBACK_LEXER, code)
            }
            result => result,
        }
    }
}

/// Always fails; used when code images are not available.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableCodeImages;

impl CodeImageRenderer for UnavailableCodeImages {
    fn render(&mut self, lexer: &str, _code: &str) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::CodeImage(format!(
            "no code image renderer configured (lexer {lexer})"
        )))
    }
}

/// Writes every image produced by the inner renderer to `<dir>/<n>.png`.
///
/// Numbering starts at 1 and is owned by this value.
#[derive(Debug)]
pub struct ImageDump<R> {
    inner: R,
    dir: PathBuf,
    next_id: u32,
}

impl<R> ImageDump<R> {
    pub fn new(inner: R, dir: impl Into<PathBuf>) -> Self {
        Self {
            inner,
            dir: dir.into(),
            next_id: 1,
        }
    }

    /// Identifier the next dumped image will get.
    #[must_use]
    pub fn next_id(&self) -> u32 {
        self.next_id
    }
}

impl<R: CodeImageRenderer> CodeImageRenderer for ImageDump<R> {
    fn render(&mut self, lexer: &str, code: &str) -> Result<Vec<u8>, RenderError> {
        let bytes = self.inner.render(lexer, code)?;

        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.png", self.next_id));
        std::fs::write(&path, &bytes)?;
        tracing::debug!(path = %path.display(), "Dumped code image");

        self.next_id += 1;
        Ok(bytes)
    }
}
