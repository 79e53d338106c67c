//! `qz convert` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use qz_config::{AnswerNumbering, CliSettings, CodeImagesConfig, Config};
use qz_core::QuizParser;
use qz_moodle::{Exporter, MoodleOptions, MoodleXmlExporter, output_file_name};
use qz_renderer::{
    CodeImageRenderer, ContentRenderer, HighlighterCodeImages, ImageDump, RenderOptions,
    SourceImageLoader,
};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Markdown quiz file.
    file: PathBuf,

    /// Path to configuration file (default: auto-discover qz.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print a JSON object of section caption to XML instead of writing files.
    #[arg(long)]
    stdout: bool,

    /// Answer numbering style: none, abc, ABCD or 123 (overrides config).
    #[arg(long)]
    answer_numbering: Option<AnswerNumbering>,

    /// Keep answers in document order.
    #[arg(long)]
    no_shuffle: bool,

    /// Penalty for a wrong answer on single-answer questions, 0 to 1 (overrides config).
    #[arg(long, env = "QZ_PENALTY")]
    penalty: Option<f64>,

    /// Draw borders around tables.
    #[arg(long)]
    table_border: bool,

    /// Fixed seed for question names, for reproducible output.
    #[arg(long)]
    seed: Option<u64>,

    /// Also write every generated code image to the dump directory.
    #[arg(long)]
    dump_images: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Trace every parser step.
    #[arg(long)]
    pub debug: bool,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, parsing, rendering or writing fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let config = Config::load(self.config.as_deref(), Some(&self.cli_settings()))?;

        let text = std::fs::read_to_string(&self.file).map_err(|source| CliError::Read {
            path: self.file.clone(),
            source,
        })?;
        let document = QuizParser::new()
            .with_penalty(config.scoring.single_answer_penalty_weight)
            .parse(&text)?;
        tracing::info!(
            file = %self.file.display(),
            questions = document.question_count(),
            "Parsed quiz"
        );

        let renderer = ContentRenderer::with_collaborators(
            RenderOptions {
                table_border: config.render.table_border,
            },
            SourceImageLoader::new(),
            code_images(&config.code_images_resolved),
        );
        let mut exporter =
            MoodleXmlExporter::new(renderer, MoodleOptions::from(&config.moodle), doc_dir(&self.file));
        let sections = exporter.export_all(&document)?;

        if self.stdout {
            output.data(&sections_json(&sections)?)?;
        } else {
            for path in write_sections(&self.file, &sections)? {
                output.info(&format!("Wrote {}", path.display()));
            }
            output.success(&format!(
                "Converted {} section(s) from {}",
                sections.len(),
                self.file.display()
            ));
        }
        Ok(())
    }

    /// Build CLI settings from args.
    fn cli_settings(&self) -> CliSettings {
        CliSettings {
            answer_numbering: self.answer_numbering,
            shuffle_answers: self.no_shuffle.then_some(false),
            single_answer_penalty_weight: self.penalty,
            table_border: self.table_border.then_some(true),
            question_id_seed: self.seed,
            dump_images: self.dump_images.then_some(true),
        }
    }
}

/// Code image renderer for `{img}` fences, dumping images when configured.
fn code_images(config: &CodeImagesConfig) -> Box<dyn CodeImageRenderer> {
    let highlighter =
        HighlighterCodeImages::new(config.highlighter.clone(), config.font_size, config.line_numbers);
    if config.dump_images {
        Box::new(ImageDump::new(highlighter, config.dump_dir.clone()))
    } else {
        Box::new(highlighter)
    }
}

/// Directory relative image paths are resolved against.
fn doc_dir(file: &Path) -> PathBuf {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// JSON object of caption to XML, in section order.
fn sections_json(sections: &[(String, String)]) -> Result<String, serde_json::Error> {
    let map: serde_json::Map<String, serde_json::Value> = sections
        .iter()
        .map(|(caption, xml)| (caption.clone(), serde_json::Value::String(xml.clone())))
        .collect();
    serde_json::to_string_pretty(&map)
}

/// Write one XML file per section next to the quiz file.
fn write_sections(file: &Path, sections: &[(String, String)]) -> std::io::Result<Vec<PathBuf>> {
    sections
        .iter()
        .map(|(caption, xml)| {
            let path = output_file_name(file, caption);
            std::fs::write(&path, xml)?;
            Ok(path)
        })
        .collect()
}
