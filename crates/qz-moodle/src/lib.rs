//! Moodle XML export for quiz documents.
//!
//! [`MoodleXmlExporter`] renders every question, answer and feedback field
//! through a [`qz_renderer::ContentRenderer`] and writes one XML quiz per
//! section. Rendered HTML is embedded as CDATA.
//!
//! # Example
//!
//! ```
//! use qz_core::parse_quiz;
//! use qz_moodle::{Exporter, MoodleOptions, MoodleXmlExporter};
//! use qz_renderer::{ContentRenderer, RenderOptions};
//!
//! let doc = parse_quiz("# Math\n---\nWhat is 1+1?\n- !2\n- 3\n", 0.0).unwrap();
//! let renderer = ContentRenderer::new(RenderOptions::default());
//! let mut exporter = MoodleXmlExporter::new(renderer, MoodleOptions::default(), ".");
//!
//! let sections = exporter.export_all(&doc).unwrap();
//! assert_eq!(sections[0].0, "Math");
//! assert!(sections[0].1.contains(r#"<answer fraction="100" format="html">"#));
//! ```

mod error;
mod exporter;
mod ids;
mod naming;
mod xml;

pub use error::ExportError;
pub use exporter::{Exporter, MoodleOptions, MoodleXmlExporter, format_weight};
pub use ids::QuestionIds;
pub use naming::output_file_name;
