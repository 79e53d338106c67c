//! Quiz document model.
//!
//! A [`QuizDocument`] is built incrementally by the parser (sections, then
//! questions, then answers and feedback) and then scored once by
//! [`QuizDocument::validate`]. After validation the document is read-only.

use std::collections::HashMap;

use crate::error::{BuildError, ValidationError};

/// Caption of the section that receives questions declared before any header.
pub const DEFAULT_SECTION: &str = "default";

/// Decimal digits kept in answer weights.
const WEIGHT_DIGITS: i32 = 7;

/// One candidate answer.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    text: String,
    correct: bool,
    feedback: Option<String>,
    weight: Option<f64>,
}

impl Answer {
    fn new(text: &str, correct: bool) -> Self {
        Self {
            text: text.to_owned(),
            correct,
            feedback: None,
            weight: None,
        }
    }

    /// Raw markdown text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        self.correct
    }

    /// Raw markdown feedback, if any.
    #[must_use]
    pub fn feedback(&self) -> Option<&str> {
        self.feedback.as_deref()
    }

    /// Signed percentage credit. `None` until the document is validated.
    #[must_use]
    pub fn weight(&self) -> Option<f64> {
        self.weight
    }
}

/// One question: markdown body plus answers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Question {
    lines: Vec<String>,
    answers: Vec<Answer>,
    correct_count: usize,
    single_correct: bool,
}

impl Question {
    /// Raw markdown body, lines joined with `\n`.
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    #[must_use]
    pub fn answers(&self) -> &[Answer] {
        &self.answers
    }

    /// Whether the question has at least one correct answer.
    #[must_use]
    pub fn has_correct_answer(&self) -> bool {
        self.answers.iter().any(Answer::is_correct)
    }

    /// Number of correct answers (populated by validation).
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    /// Whether exactly one answer is correct (populated by validation).
    #[must_use]
    pub fn is_single_correct(&self) -> bool {
        self.single_correct
    }

    /// Populate derived fields. Caller guarantees at least one correct answer.
    #[allow(clippy::cast_precision_loss)]
    fn score(&mut self, penalty: f64) {
        let correct_count = self.answers.iter().filter(|a| a.correct).count();
        self.correct_count = correct_count;
        self.single_correct = correct_count == 1;

        let correct_weight = round_weight(100.0 / correct_count as f64);
        let wrong_weight = if self.single_correct && penalty > 0.0 {
            -round_weight(penalty * 100.0)
        } else {
            0.0
        };

        for answer in &mut self.answers {
            answer.weight = Some(if answer.correct {
                correct_weight
            } else {
                wrong_weight
            });
        }
    }
}

/// A named group of questions, exported as one Moodle category.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    caption: String,
    questions: Vec<Question>,
}

impl Section {
    #[must_use]
    pub fn caption(&self) -> &str {
        &self.caption
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

/// Ordered quiz document: sections of questions of answers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuizDocument {
    sections: Vec<Section>,
    index: HashMap<String, usize>,
    current_section: Option<usize>,
    valid: bool,
}

impl QuizDocument {
    /// Create an empty document in the building phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sections in declaration order.
    pub fn sections(&self) -> impl Iterator<Item = &Section> {
        self.sections.iter()
    }

    /// Look up a section by caption.
    #[must_use]
    pub fn section(&self, caption: &str) -> Option<&Section> {
        self.index.get(caption).map(|&i| &self.sections[i])
    }

    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    /// Total number of questions across all sections.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    /// Whether validation succeeded.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Make `caption` the current section, creating it if needed.
    ///
    /// Re-declaring an existing caption continues that section; its position
    /// stays where it was first declared.
    pub fn begin_section(&mut self, caption: &str) -> Result<(), BuildError> {
        self.ensure_building()?;
        let index = match self.index.get(caption) {
            Some(&index) => index,
            None => {
                self.sections.push(Section {
                    caption: caption.to_owned(),
                    questions: Vec::new(),
                });
                let index = self.sections.len() - 1;
                self.index.insert(caption.to_owned(), index);
                index
            }
        };
        tracing::debug!(caption, "Begin section");
        self.current_section = Some(index);
        Ok(())
    }

    /// Start a new question with an empty body in the current section.
    ///
    /// Without a current section, the question goes to [`DEFAULT_SECTION`].
    pub fn begin_question(&mut self) -> Result<(), BuildError> {
        self.ensure_building()?;
        if self.current_section.is_none() {
            self.begin_section(DEFAULT_SECTION)?;
        }
        let section = self.current_section_mut()?;
        section.questions.push(Question::default());
        Ok(())
    }

    /// Append one line to the current question's body.
    pub fn append_question_text(&mut self, line: &str) -> Result<(), BuildError> {
        self.current_question_mut()?.lines.push(line.to_owned());
        Ok(())
    }

    /// Append an answer to the current question.
    pub fn append_answer(&mut self, text: &str, correct: bool) -> Result<(), BuildError> {
        self.current_question_mut()?
            .answers
            .push(Answer::new(text, correct));
        Ok(())
    }

    /// Attach feedback to the most recently appended answer.
    pub fn attach_feedback(&mut self, text: &str) -> Result<(), BuildError> {
        let answer = self
            .current_question_mut()?
            .answers
            .last_mut()
            .ok_or(BuildError::NoCurrentAnswer)?;
        if answer.feedback.is_some() {
            return Err(BuildError::FeedbackAlreadyAttached);
        }
        answer.feedback = Some(text.to_owned());
        Ok(())
    }

    /// Whether the current question has at least one correct answer.
    #[must_use]
    pub fn current_question_has_correct_answer(&self) -> bool {
        self.current_section
            .and_then(|i| self.sections[i].questions.last())
            .is_some_and(Question::has_correct_answer)
    }

    /// Score every question and mark the document valid.
    ///
    /// `penalty` is the fraction of full credit removed for a wrong answer on a
    /// single-correct-answer question. Fails without modifying anything if any
    /// question lacks a correct answer.
    pub fn validate(&mut self, penalty: f64) -> Result<(), ValidationError> {
        if let Some(question) = self
            .sections
            .iter()
            .flat_map(|s| s.questions.iter())
            .find(|q| !q.has_correct_answer())
        {
            self.valid = false;
            return Err(ValidationError {
                question: question.text(),
            });
        }

        for question in self.sections.iter_mut().flat_map(|s| s.questions.iter_mut()) {
            question.score(penalty);
        }
        self.valid = true;
        tracing::debug!(
            sections = self.sections.len(),
            questions = self.question_count(),
            "Quiz validated"
        );
        Ok(())
    }

    fn ensure_building(&self) -> Result<(), BuildError> {
        if self.valid {
            return Err(BuildError::AlreadyValidated);
        }
        Ok(())
    }

    fn current_section_mut(&mut self) -> Result<&mut Section, BuildError> {
        let index = self.current_section.ok_or(BuildError::NoCurrentQuestion)?;
        Ok(&mut self.sections[index])
    }

    fn current_question_mut(&mut self) -> Result<&mut Question, BuildError> {
        self.ensure_building()?;
        self.current_section_mut()?
            .questions
            .last_mut()
            .ok_or(BuildError::NoCurrentQuestion)
    }
}

/// Round a percentage to [`WEIGHT_DIGITS`] decimal digits.
fn round_weight(value: f64) -> f64 {
    let scale = 10f64.powi(WEIGHT_DIGITS);
    (value * scale).round() / scale
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-7
    }

    fn question_with(answers: &[(&str, bool)]) -> QuizDocument {
        let mut doc = QuizDocument::new();
        doc.begin_section("S").unwrap();
        doc.begin_question().unwrap();
        doc.append_question_text("Q").unwrap();
        for (text, correct) in answers {
            doc.append_answer(text, *correct).unwrap();
        }
        doc
    }

    fn weights(doc: &QuizDocument) -> Vec<f64> {
        doc.sections().next().unwrap().questions()[0]
            .answers()
            .iter()
            .map(|a| a.weight().unwrap())
            .collect()
    }

    #[test]
    fn test_single_correct_no_penalty() {
        let mut doc = question_with(&[("2", true), ("3", false)]);
        doc.validate(0.0).unwrap();

        let question = &doc.section("S").unwrap().questions()[0];
        assert!(question.is_single_correct());
        assert_eq!(question.correct_count(), 1);
        let w = weights(&doc);
        assert!(approx(w[0], 100.0));
        assert!(approx(w[1], 0.0));
        assert!(w[1].is_sign_positive());
        assert!(doc.is_valid());
    }

    #[test]
    fn test_single_correct_with_penalty() {
        let mut doc = question_with(&[("a", false), ("b", true), ("c", false)]);
        doc.validate(0.25).unwrap();
        let w = weights(&doc);
        assert!(approx(w[0], -25.0));
        assert!(approx(w[1], 100.0));
        assert!(approx(w[2], -25.0));
    }

    #[test]
    fn test_multiple_correct_ignores_penalty() {
        let mut doc = question_with(&[("a", true), ("b", true), ("c", false)]);
        doc.validate(0.25).unwrap();
        let question = &doc.section("S").unwrap().questions()[0];
        assert!(!question.is_single_correct());
        assert_eq!(question.correct_count(), 2);
        assert_eq!(weights(&doc), vec![50.0, 50.0, 0.0]);
    }

    #[test]
    fn test_three_correct_rounds_to_seven_digits() {
        let mut doc = question_with(&[("a", true), ("b", true), ("c", true)]);
        doc.validate(0.0).unwrap();
        let w = weights(&doc);
        assert_eq!(w, vec![33.333_333_3, 33.333_333_3, 33.333_333_3]);
        let sum: f64 = w.iter().sum();
        assert!((sum - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_weights_sum_to_hundred() {
        for n in 1..=12 {
            let answers: Vec<(String, bool)> = (0..n).map(|i| (i.to_string(), true)).collect();
            let refs: Vec<(&str, bool)> = answers.iter().map(|(t, c)| (t.as_str(), *c)).collect();
            let mut doc = question_with(&refs);
            doc.validate(0.0).unwrap();
            let sum: f64 = weights(&doc).iter().sum();
            assert!((sum - 100.0).abs() < 1e-5, "n={n} sum={sum}");
        }
    }

    #[test]
    fn test_validation_fails_atomically() {
        let mut doc = QuizDocument::new();
        doc.begin_section("A").unwrap();
        doc.begin_question().unwrap();
        doc.append_question_text("good").unwrap();
        doc.append_answer("x", true).unwrap();
        doc.begin_section("B").unwrap();
        doc.begin_question().unwrap();
        doc.append_question_text("bad").unwrap();
        doc.append_answer("y", false).unwrap();

        let err = doc.validate(0.0).unwrap_err();
        assert_eq!(err.question, "bad");
        assert!(!doc.is_valid());
        let first = &doc.section("A").unwrap().questions()[0];
        assert_eq!(first.answers()[0].weight(), None);
        assert_eq!(first.correct_count(), 0);
    }

    #[test]
    fn test_question_text_joins_lines() {
        let mut doc = QuizDocument::new();
        doc.begin_question().unwrap();
        doc.append_question_text("line one").unwrap();
        doc.append_question_text("").unwrap();
        doc.append_question_text("line three").unwrap();
        let question = &doc.section(DEFAULT_SECTION).unwrap().questions()[0];
        assert_eq!(question.text(), "line one\n\nline three");
    }

    #[test]
    fn test_feedback_attaches_to_last_answer() {
        let mut doc = question_with(&[("a", true), ("b", false)]);
        doc.attach_feedback("about b").unwrap();
        let answers = doc.section("S").unwrap().questions()[0].answers();
        assert_eq!(answers[0].feedback(), None);
        assert_eq!(answers[1].feedback(), Some("about b"));
    }

    #[test]
    fn test_feedback_twice_fails() {
        let mut doc = question_with(&[("a", true)]);
        doc.attach_feedback("one").unwrap();
        assert_eq!(
            doc.attach_feedback("two"),
            Err(BuildError::FeedbackAlreadyAttached)
        );
    }

    #[test]
    fn test_feedback_without_answer_fails() {
        let mut doc = question_with(&[]);
        assert_eq!(doc.attach_feedback("x"), Err(BuildError::NoCurrentAnswer));
    }

    #[test]
    fn test_answer_without_question_fails() {
        let mut doc = QuizDocument::new();
        doc.begin_section("S").unwrap();
        assert_eq!(
            doc.append_answer("x", true),
            Err(BuildError::NoCurrentQuestion)
        );
    }

    #[test]
    fn test_redeclared_section_keeps_position() {
        let mut doc = QuizDocument::new();
        doc.begin_section("A").unwrap();
        doc.begin_question().unwrap();
        doc.begin_section("B").unwrap();
        doc.begin_question().unwrap();
        doc.begin_section("A").unwrap();
        doc.begin_question().unwrap();

        let captions: Vec<&str> = doc.sections().map(Section::caption).collect();
        assert_eq!(captions, vec!["A", "B"]);
        assert_eq!(doc.section("A").unwrap().questions().len(), 2);
        assert_eq!(doc.question_count(), 3);
    }

    #[test]
    fn test_mutation_after_validation_fails() {
        let mut doc = question_with(&[("a", true)]);
        doc.validate(0.0).unwrap();
        assert_eq!(doc.begin_question(), Err(BuildError::AlreadyValidated));
        assert_eq!(
            doc.append_answer("b", false),
            Err(BuildError::AlreadyValidated)
        );
    }

    #[test]
    fn test_current_question_has_correct_answer() {
        let mut doc = QuizDocument::new();
        assert!(!doc.current_question_has_correct_answer());
        doc.begin_section("S").unwrap();
        doc.begin_question().unwrap();
        doc.append_answer("no", false).unwrap();
        assert!(!doc.current_question_has_correct_answer());
        doc.append_answer("yes", true).unwrap();
        assert!(doc.current_question_has_correct_answer());
    }

    #[test]
    fn test_empty_document_validates() {
        let mut doc = QuizDocument::new();
        doc.validate(0.0).unwrap();
        assert!(doc.is_valid());
        assert_eq!(doc.question_count(), 0);
    }
}
