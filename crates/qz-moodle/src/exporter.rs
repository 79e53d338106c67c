//! Moodle XML export.
//!
//! Each section becomes one `<quiz>` document: a category entry named after
//! the section caption, followed by one `multichoice` question per question.

use std::path::{Path, PathBuf};

use qz_config::{AnswerNumbering, MoodleConfig};
use qz_core::{Answer, Question, QuizDocument, Section};
use qz_renderer::{CodeImageRenderer, ContentRenderer, ImageLoader};

use crate::error::ExportError;
use crate::ids::QuestionIds;
use crate::xml::XmlWriter;

/// Question-level flags written into every exported question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoodleOptions {
    pub answer_numbering: AnswerNumbering,
    pub shuffle_answers: bool,
    /// Fixed salt for question names; random per run when `None`.
    pub question_id_seed: Option<u64>,
}

impl Default for MoodleOptions {
    fn default() -> Self {
        Self::from(&MoodleConfig::default())
    }
}

impl From<&MoodleConfig> for MoodleOptions {
    fn from(config: &MoodleConfig) -> Self {
        Self {
            answer_numbering: config.answer_numbering,
            shuffle_answers: config.shuffle_answers,
            question_id_seed: config.question_id_seed,
        }
    }
}

/// Serializes validated quiz sections.
pub trait Exporter {
    /// Serialize one section.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError`] if a field cannot be rendered or written.
    fn export_section(&mut self, section: &Section) -> Result<String, ExportError>;

    /// Serialize every section in declaration order, as `(caption, output)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::NotValidated`] for a document that was not
    /// scored, or the first section error.
    fn export_all(&mut self, document: &QuizDocument) -> Result<Vec<(String, String)>, ExportError> {
        if !document.is_valid() {
            return Err(ExportError::NotValidated);
        }
        document
            .sections()
            .map(|section| Ok((section.caption().to_owned(), self.export_section(section)?)))
            .collect()
    }
}

/// Writes sections in Moodle's XML quiz format.
pub struct MoodleXmlExporter<L, C> {
    renderer: ContentRenderer<L, C>,
    options: MoodleOptions,
    ids: QuestionIds,
    doc_dir: PathBuf,
}

impl<L: ImageLoader, C: CodeImageRenderer> MoodleXmlExporter<L, C> {
    /// Exporter resolving relative image paths against `doc_dir`.
    pub fn new(renderer: ContentRenderer<L, C>, options: MoodleOptions, doc_dir: impl Into<PathBuf>) -> Self {
        Self {
            renderer,
            ids: QuestionIds::from_seed(options.question_id_seed),
            options,
            doc_dir: doc_dir.into(),
        }
    }

    #[must_use]
    pub fn doc_dir(&self) -> &Path {
        &self.doc_dir
    }

    fn write_category(xml: &mut XmlWriter, caption: &str) -> Result<(), ExportError> {
        xml.start("question", &[("type", "category")])?;
        xml.start("category", &[])?;
        xml.text_element("text", caption)?;
        xml.end("category")?;
        xml.end("question")
    }

    fn write_question(
        &mut self,
        xml: &mut XmlWriter,
        section: &Section,
        index: usize,
        question: &Question,
    ) -> Result<(), ExportError> {
        let text = question.text();
        let rendered = self
            .renderer
            .render_question(&text, &self.doc_dir)
            .map_err(|source| ExportError::Render {
                section: section.caption().to_owned(),
                question: index + 1,
                source,
            })?;

        xml.start("question", &[("type", "multichoice")])?;

        xml.start("name", &[])?;
        xml.text_element("text", &self.ids.question_id(index, &text))?;
        xml.end("name")?;

        xml.start("questiontext", &[("format", "html")])?;
        xml.cdata_text(rendered.as_str())?;
        xml.end("questiontext")?;

        for answer in question.answers() {
            self.write_answer(xml, answer)?;
        }

        let shuffle = if self.options.shuffle_answers { "1" } else { "0" };
        let single = if question.is_single_correct() { "true" } else { "false" };
        xml.text_element("shuffleanswers", shuffle)?;
        xml.text_element("single", single)?;
        xml.text_element("answernumbering", self.options.answer_numbering.as_str())?;

        xml.end("question")
    }

    fn write_answer(&self, xml: &mut XmlWriter, answer: &Answer) -> Result<(), ExportError> {
        let weight = answer.weight().ok_or(ExportError::NotValidated)?;
        let fraction = format_weight(weight);

        xml.start("answer", &[("fraction", fraction.as_str()), ("format", "html")])?;
        xml.cdata_text(self.renderer.render_answer(answer.text()).as_str())?;
        if let Some(feedback) = answer.feedback() {
            xml.start("feedback", &[("format", "html")])?;
            xml.cdata_text(self.renderer.render_feedback(feedback).as_str())?;
            xml.end("feedback")?;
        }
        xml.end("answer")
    }
}

impl<L: ImageLoader, C: CodeImageRenderer> Exporter for MoodleXmlExporter<L, C> {
    fn export_section(&mut self, section: &Section) -> Result<String, ExportError> {
        let mut xml = XmlWriter::new()?;
        xml.start("quiz", &[])?;
        Self::write_category(&mut xml, section.caption())?;
        for (index, question) in section.questions().iter().enumerate() {
            self.write_question(&mut xml, section, index, question)?;
        }
        xml.end("quiz")?;

        tracing::info!(
            section = section.caption(),
            questions = section.questions().len(),
            "Exported section"
        );
        xml.finish()
    }
}

/// Answer fraction as written to XML: shortest decimal form, no negative zero.
#[must_use]
pub fn format_weight(weight: f64) -> String {
    if weight.abs() < f64::EPSILON {
        "0".to_owned()
    } else {
        weight.to_string()
    }
}
