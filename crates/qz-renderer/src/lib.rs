//! Rendering of quiz markdown into embeddable HTML fragments.
//!
//! [`ContentRenderer`] runs two pipelines of ordered text substitutions:
//!
//! - Questions: HTML comments, fenced code (optionally as images), inline
//!   code, images, display math, inline math, table blocks, emoticons, then
//!   markdown with hard line breaks.
//! - Answers and feedback: inline code, inline math, emoticons, then markdown.
//!
//! Obtaining image bytes and rendering code to images are collaborator
//! capabilities behind the [`ImageLoader`] and [`CodeImageRenderer`] traits.

mod code;
mod code_image;
mod emoticon;
mod error;
mod escape;
mod image;
mod markdown;
mod math;
mod pipeline;
mod table;

pub use code_image::{
    CodeImageRenderer, FALLBACK_LEXER, HighlighterCodeImages, IMAGE_MARKER, ImageDump,
    UnavailableCodeImages, lexer_name,
};
pub use emoticon::{ZERO_WIDTH_SPACE, neutralize_emoticons};
pub use error::RenderError;
pub use escape::{escape_html, sanitize_entities};
pub use image::{ImageLoader, SourceImageLoader, image_subtype, image_tag, resolve_location};
pub use pipeline::{ContentRenderer, Fragment, RenderOptions};
