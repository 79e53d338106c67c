//! Configuration management for qz.
//!
//! Parses `qz.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `code_images.dump_dir` and `code_images.highlighter` support environment
//! variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

mod expand;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override answer numbering style.
    pub answer_numbering: Option<AnswerNumbering>,
    /// Override answer shuffling.
    pub shuffle_answers: Option<bool>,
    /// Override the single-answer penalty weight.
    pub single_answer_penalty_weight: Option<f64>,
    /// Override bordered table rendering.
    pub table_border: Option<bool>,
    /// Override the question id seed.
    pub question_id_seed: Option<u64>,
    /// Override dumping of generated code images.
    pub dump_images: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "qz.toml";

/// Largest accepted code image font size.
const MAX_FONT_SIZE: u32 = 128;

const DEFAULT_HIGHLIGHTER: &str = "pygmentize";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Moodle output configuration.
    pub moodle: MoodleConfig,
    /// Scoring configuration.
    pub scoring: ScoringConfig,
    /// Content rendering configuration.
    pub render: RenderConfig,
    /// Code image configuration (paths are relative strings from TOML).
    code_images: CodeImagesConfigRaw,

    /// Resolved code image configuration (set after loading).
    #[serde(skip)]
    pub code_images_resolved: CodeImagesConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Answer numbering style shown by Moodle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum AnswerNumbering {
    #[serde(rename = "none")]
    None,
    #[default]
    #[serde(rename = "abc")]
    LowerAlpha,
    #[serde(rename = "ABCD")]
    UpperAlpha,
    #[serde(rename = "123")]
    Numeric,
}

impl AnswerNumbering {
    /// Value written to `<answernumbering>`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::LowerAlpha => "abc",
            Self::UpperAlpha => "ABCD",
            Self::Numeric => "123",
        }
    }
}

impl fmt::Display for AnswerNumbering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerNumbering {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "abc" => Ok(Self::LowerAlpha),
            "ABCD" => Ok(Self::UpperAlpha),
            "123" => Ok(Self::Numeric),
            other => Err(ConfigError::Validation(format!(
                "answer_numbering must be one of none, abc, ABCD, 123 (got {other:?})"
            ))),
        }
    }
}

/// Moodle output configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct MoodleConfig {
    /// Answer numbering style.
    pub answer_numbering: AnswerNumbering,
    /// Whether Moodle shuffles answers.
    pub shuffle_answers: bool,
    /// Fixed salt for question ids. Random per run when unset.
    pub question_id_seed: Option<u64>,
}

impl Default for MoodleConfig {
    fn default() -> Self {
        Self {
            answer_numbering: AnswerNumbering::default(),
            shuffle_answers: true,
            question_id_seed: None,
        }
    }
}

/// Scoring configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Fraction of full credit removed for a wrong answer on a
    /// single-correct-answer question.
    pub single_answer_penalty_weight: f64,
}

/// Content rendering configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Wrap rendered tables in a bordered style block.
    pub table_border: bool,
}

/// Raw code image configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct CodeImagesConfigRaw {
    font_size: Option<u32>,
    line_numbers: Option<bool>,
    dump_images: Option<bool>,
    dump_dir: Option<String>,
    highlighter: Option<String>,
}

/// Resolved code image configuration with absolute paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeImagesConfig {
    /// Font size passed to the code image renderer.
    pub font_size: u32,
    /// Whether rendered code shows line numbers.
    pub line_numbers: bool,
    /// Whether generated images are also written to disk.
    pub dump_images: bool,
    /// Directory receiving dumped images.
    pub dump_dir: PathBuf,
    /// Highlighter executable that turns code into PNG bytes.
    pub highlighter: String,
}

impl CodeImagesConfig {
    fn with_base(base: &Path) -> Self {
        Self {
            font_size: 16,
            line_numbers: false,
            dump_images: false,
            dump_dir: base.to_path_buf(),
            highlighter: DEFAULT_HIGHLIGHTER.to_owned(),
        }
    }
}

impl Default for CodeImagesConfig {
    fn default() -> Self {
        Self::with_base(Path::new("."))
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`code_images.dump_dir`").
        field: String,
        /// Error message (e.g., "${`QZ_DUMP`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `qz.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the effective configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(numbering) = settings.answer_numbering {
            self.moodle.answer_numbering = numbering;
        }
        if let Some(shuffle) = settings.shuffle_answers {
            self.moodle.shuffle_answers = shuffle;
        }
        if let Some(seed) = settings.question_id_seed {
            self.moodle.question_id_seed = Some(seed);
        }
        if let Some(penalty) = settings.single_answer_penalty_weight {
            self.scoring.single_answer_penalty_weight = penalty;
        }
        if let Some(table_border) = settings.table_border {
            self.render.table_border = table_border;
        }
        if let Some(dump_images) = settings.dump_images {
            self.code_images_resolved.dump_images = dump_images;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            moodle: MoodleConfig::default(),
            scoring: ScoringConfig::default(),
            render: RenderConfig::default(),
            code_images: CodeImagesConfigRaw::default(),
            code_images_resolved: CodeImagesConfig::with_base(base),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let penalty = self.scoring.single_answer_penalty_weight;
        if !penalty.is_finite() || !(0.0..=1.0).contains(&penalty) {
            return Err(ConfigError::Validation(format!(
                "scoring.single_answer_penalty_weight must be within [0, 1] (got {penalty})"
            )));
        }

        let font_size = self.code_images_resolved.font_size;
        if font_size == 0 {
            return Err(ConfigError::Validation(
                "code_images.font_size must be greater than 0".to_owned(),
            ));
        }
        if font_size > MAX_FONT_SIZE {
            return Err(ConfigError::Validation(format!(
                "code_images.font_size cannot exceed {MAX_FONT_SIZE}"
            )));
        }
        if self.code_images_resolved.highlighter.trim().is_empty() {
            return Err(ConfigError::Validation(
                "code_images.highlighter cannot be empty".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        expand::expand_field(&mut self.code_images.dump_dir, "code_images.dump_dir")?;
        expand::expand_field(&mut self.code_images.highlighter, "code_images.highlighter")
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let raw = &self.code_images;
        let defaults = CodeImagesConfig::with_base(config_dir);
        self.code_images_resolved = CodeImagesConfig {
            font_size: raw.font_size.unwrap_or(defaults.font_size),
            line_numbers: raw.line_numbers.unwrap_or(defaults.line_numbers),
            dump_images: raw.dump_images.unwrap_or(defaults.dump_images),
            dump_dir: raw
                .dump_dir
                .as_deref()
                .map_or(defaults.dump_dir, |dir| config_dir.join(dir)),
            highlighter: raw.highlighter.clone().unwrap_or(defaults.highlighter),
        };
    }
}
