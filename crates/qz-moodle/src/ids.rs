//! Question names.

use rand::RngExt;
use sha2::{Digest, Sha256};

/// Hex digits of the content hash kept in a question name.
const HASH_DIGITS: usize = 32;

/// Generates question names: a 4-digit position plus a salted content hash.
///
/// With a random salt, names differ between runs for identical input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionIds {
    salt: String,
}

impl QuestionIds {
    /// Ids salted with a fresh random value.
    #[must_use]
    pub fn random() -> Self {
        Self {
            salt: rand::rng().random::<u64>().to_string(),
        }
    }

    /// Ids that are stable across runs for the same `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            salt: seed.to_string(),
        }
    }

    /// Seeded ids if `seed` is given, random ones otherwise.
    #[must_use]
    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::random, Self::seeded)
    }

    /// Name of the question at 0-based `index` with raw `text`.
    #[must_use]
    pub fn question_id(&self, index: usize, text: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        hasher.update(self.salt.as_bytes());
        let digest = hex::encode(hasher.finalize());
        format!("{:04}{}", index + 1, &digest[..HASH_DIGITS])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_question_id_shape() {
        let id = QuestionIds::seeded(1).question_id(0, "What?");
        assert_eq!(id.len(), 4 + HASH_DIGITS);
        assert!(id.starts_with("0001"));
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_question_id_index_is_padded() {
        let ids = QuestionIds::seeded(1);
        assert!(ids.question_id(41, "q").starts_with("0042"));
        assert!(ids.question_id(9999, "q").starts_with("10000"));
    }

    #[test]
    fn test_seeded_ids_are_stable() {
        let a = QuestionIds::seeded(7).question_id(3, "text");
        let b = QuestionIds::seeded(7).question_id(3, "text");
        assert_eq!(a, b);
    }

    #[test]
    fn test_salt_and_text_change_hash() {
        let ids = QuestionIds::seeded(7);
        assert_ne!(ids.question_id(0, "a"), ids.question_id(0, "b"));
        assert_ne!(ids.question_id(0, "a"), QuestionIds::seeded(8).question_id(0, "a"));
    }

    #[test]
    fn test_from_seed() {
        assert_eq!(QuestionIds::from_seed(Some(5)), QuestionIds::seeded(5));
    }
}
