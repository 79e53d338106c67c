//! Inline images embedded as base64 data URIs.

use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use base64::Engine;
use base64::prelude::BASE64_STANDARD;
use regex::{Captures, Regex};
use ureq::Agent;

use crate::error::RenderError;

static IMAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[[^\]\n]*\]\(([^)\s]+)\)").expect("invalid image regex"));

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Obtains raw image bytes for a path or URL.
pub trait ImageLoader {
    /// # Errors
    ///
    /// Returns [`RenderError::ImageLoad`] if the bytes cannot be obtained.
    fn load(&self, location: &str) -> Result<Vec<u8>, RenderError>;
}

/// Loads `http://` and `https://` locations over the network, anything else from disk.
#[derive(Debug, Clone)]
pub struct SourceImageLoader {
    agent: Agent,
}

impl SourceImageLoader {
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a loader whose network requests give up after `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .build()
            .into();
        Self { agent }
    }

    fn fetch(&self, url: &str) -> Result<Vec<u8>, RenderError> {
        let load_error = |message: String| RenderError::ImageLoad {
            location: url.to_owned(),
            message,
        };

        let response = self
            .agent
            .get(url)
            .call()
            .map_err(|e| load_error(e.to_string()))?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(load_error(format!("HTTP {status}")));
        }
        response
            .into_body()
            .read_to_vec()
            .map_err(|e| load_error(e.to_string()))
    }
}

impl Default for SourceImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader for SourceImageLoader {
    fn load(&self, location: &str) -> Result<Vec<u8>, RenderError> {
        tracing::debug!(location, "Loading image");
        if is_url(location) {
            self.fetch(location)
        } else {
            std::fs::read(location).map_err(|e| RenderError::ImageLoad {
                location: location.to_owned(),
                message: e.to_string(),
            })
        }
    }
}

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Resolve an image reference against the document directory.
///
/// Absolute paths and anything containing `://` are returned unchanged.
#[must_use]
pub fn resolve_location(location: &str, doc_dir: &Path) -> String {
    if location.contains("://") || Path::new(location).is_absolute() {
        location.to_owned()
    } else {
        doc_dir.join(location).to_string_lossy().into_owned()
    }
}

/// MIME subtype for an image location, taken from its extension.
#[must_use]
pub fn image_subtype(location: &str) -> String {
    let path = location.split(['?', '#']).next().unwrap_or(location);
    let extension = Path::new(path)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase());
    match extension.as_deref() {
        Some("jpg") => "jpeg".to_owned(),
        Some("svg") => "svg+xml".to_owned(),
        Some(ext) if !ext.is_empty() => ext.to_owned(),
        _ => "png".to_owned(),
    }
}

/// Block-level `<img>` tag carrying `bytes` as a data URI.
#[must_use]
pub fn image_tag(subtype: &str, bytes: &[u8]) -> String {
    let encoded = BASE64_STANDARD.encode(bytes);
    format!(r#"<img style="display:block;" src="data:image/{subtype};base64,{encoded}" />"#)
}

/// Replace every `![alt](path)` in `text` with an embedded image tag.
pub(crate) fn embed_images<L: ImageLoader + ?Sized>(
    text: &str,
    doc_dir: &Path,
    loader: &L,
) -> Result<String, RenderError> {
    let mut result = String::with_capacity(text.len());
    let mut last = 0;
    for caps in IMAGE_PATTERN.captures_iter(text) {
        let (range, location) = match_parts(&caps);
        let location = resolve_location(location, doc_dir);
        let bytes = loader.load(&location)?;

        result.push_str(&text[last..range.start]);
        result.push_str(&image_tag(&image_subtype(&location), &bytes));
        last = range.end;
    }
    result.push_str(&text[last..]);
    Ok(result)
}

fn match_parts<'t>(caps: &Captures<'t>) -> (std::ops::Range<usize>, &'t str) {
    let whole = caps.get(0).map_or(0..0, |m| m.range());
    let location = caps.get(1).map_or("", |m| m.as_str());
    (whole, location)
}
