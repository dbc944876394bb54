// src/models/question.rs

use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Static question bank, embedded at compile time. Parsed once, never mutated.
static QUESTION_BANK: LazyLock<Vec<Question>> = LazyLock::new(|| {
    let bank: Vec<Question> = serde_json::from_str(include_str!("../../data/questions.json"))
        .expect("embedded question bank is valid JSON");
    for q in &bank {
        assert!(
            q.correct_answer_index < q.options.len(),
            "question {}: correct answer index out of range",
            q.id
        );
        assert!(
            (2..=5).contains(&q.options.len()),
            "question {}: expected 2-5 options",
            q.id
        );
    }
    bank
});

/// Returns the immutable question bank.
pub fn question_bank() -> &'static [Question] {
    &QUESTION_BANK
}

/// One question definition with its answer key.
/// Field names stay camelCase on the wire, matching the exam UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: i64,

    /// The text content of the question.
    pub text: String,

    /// Ordered answer options (2 to 5 entries).
    pub options: Vec<String>,

    /// Index of the correct option within `options`.
    pub correct_answer_index: usize,

    /// Optional tag telling the UI to render an illustration next to the text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visual_type: Option<String>,
}

/// Per-session copy of a question with its options permuted and the correct
/// index remapped to keep pointing at the same answer text.
#[derive(Debug, Clone)]
pub struct ShuffledQuestion {
    pub id: i64,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer_index: usize,
    pub visual_type: Option<String>,
}

/// DTO for sending a shuffled question to the student (excludes the answer key).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperQuestion {
    pub id: i64,
    pub text: String,
    pub options: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual_type: Option<String>,
}

impl From<&ShuffledQuestion> for PaperQuestion {
    fn from(q: &ShuffledQuestion) -> Self {
        Self {
            id: q.id,
            text: q.text.clone(),
            options: q.options.clone(),
            visual_type: q.visual_type.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_RAW_SCORE;

    #[test]
    fn bank_holds_one_question_per_point() {
        let bank = question_bank();
        assert_eq!(bank.len(), MAX_RAW_SCORE as usize);
    }

    #[test]
    fn bank_ids_are_unique() {
        let bank = question_bank();
        let mut ids: Vec<i64> = bank.iter().map(|q| q.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), bank.len());
    }

    #[test]
    fn paper_question_hides_answer_key() {
        let q = ShuffledQuestion {
            id: 1,
            text: "q".to_string(),
            options: vec!["a".to_string(), "b".to_string()],
            correct_answer_index: 1,
            visual_type: None,
        };
        let json = serde_json::to_value(PaperQuestion::from(&q)).unwrap();
        assert!(json.get("correctAnswerIndex").is_none());
    }
}
