// src/models/session.rs

use std::collections::HashMap;

use rand::Rng;

use crate::error::AppError;
use crate::models::exam_record::AttemptResult;
use crate::models::question::{PaperQuestion, Question, ShuffledQuestion};
use crate::models::student::StudentIdentity;
use crate::utils::shuffle::shuffle_paper;

/// Where one session currently is. There is no separate "result" state flag
/// beyond Submitted: a submitted session holds its result until the student
/// retries or goes home (which destroys the session).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Answering,
    Submitted,
}

/// One student's in-flight exam: identity, the shuffled paper, the answer map
/// and the tab-switch counter. Every transition is a stage-guarded method, so
/// e.g. the switch counter can only move while the student is answering —
/// visibility events arriving in any other stage are rejected instead of
/// leaking into unrelated views.
#[derive(Debug)]
pub struct ExamSession {
    student: StudentIdentity,
    questions: Vec<ShuffledQuestion>,
    answers: HashMap<i64, usize>,
    switch_count: u32,
    stage: Stage,
}

impl ExamSession {
    /// Starts a fresh session: shuffles the bank, empty answers, zeroed
    /// switch counter.
    pub fn start(student: StudentIdentity, bank: &[Question], rng: &mut impl Rng) -> Self {
        Self {
            student,
            questions: shuffle_paper(bank, rng),
            answers: HashMap::new(),
            switch_count: 0,
            stage: Stage::Answering,
        }
    }

    pub fn student(&self) -> &StudentIdentity {
        &self.student
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn switch_count(&self) -> u32 {
        self.switch_count
    }

    /// The answer-free view of the shuffled paper, for the UI.
    pub fn paper(&self) -> Vec<PaperQuestion> {
        self.questions.iter().map(PaperQuestion::from).collect()
    }

    /// Records (or overwrites) the chosen option for one question.
    /// Indices are in shuffled-option space.
    pub fn select_answer(&mut self, question_id: i64, option_index: usize) -> Result<(), AppError> {
        if self.stage != Stage::Answering {
            return Err(AppError::BadRequest(
                "Exam already submitted".to_string(),
            ));
        }
        let question = self
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown question id {}", question_id)))?;
        if option_index >= question.options.len() {
            return Err(AppError::BadRequest(format!(
                "Option index {} out of range for question {}",
                option_index, question_id
            )));
        }
        self.answers.insert(question_id, option_index);
        Ok(())
    }

    /// Counts one visible-to-hidden transition of the exam tab. Inert outside
    /// the answering stage.
    pub fn record_tab_switch(&mut self) -> Result<u32, AppError> {
        if self.stage != Stage::Answering {
            return Err(AppError::BadRequest(
                "Not in an active exam".to_string(),
            ));
        }
        self.switch_count += 1;
        tracing::warn!(
            student = %self.student.record_id(),
            count = self.switch_count,
            "tab switch detected during exam"
        );
        Ok(self.switch_count)
    }

    /// Scores the sitting and moves to the submitted stage. Guarded: every
    /// loaded question must have an answer.
    pub fn submit(&mut self) -> Result<AttemptResult, AppError> {
        if self.stage != Stage::Answering {
            return Err(AppError::BadRequest(
                "Exam already submitted".to_string(),
            ));
        }
        let missing = self.questions.len() - self.answers.len();
        if missing > 0 {
            return Err(AppError::IncompleteExam { missing });
        }
        let raw = score(&self.questions, &self.answers);
        self.stage = Stage::Submitted;
        Ok(AttemptResult::from_raw_score(raw, self.switch_count))
    }

    /// Re-enters the answering stage after a submission: fresh shuffle,
    /// cleared answers, zeroed switch counter, same identity.
    pub fn retry(&mut self, bank: &[Question], rng: &mut impl Rng) -> Result<(), AppError> {
        if self.stage != Stage::Submitted {
            return Err(AppError::BadRequest(
                "Nothing to retry: exam not submitted".to_string(),
            ));
        }
        self.questions = shuffle_paper(bank, rng);
        self.answers.clear();
        self.switch_count = 0;
        self.stage = Stage::Answering;
        Ok(())
    }
}

/// One point per question whose chosen index matches the post-shuffle correct
/// index. No partial credit; unanswered questions score zero (submission is
/// gated on completeness, so that path is defensive only).
pub fn score(questions: &[ShuffledQuestion], answers: &HashMap<i64, usize>) -> u32 {
    questions
        .iter()
        .filter(|q| answers.get(&q.id) == Some(&q.correct_answer_index))
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::question_bank;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn student() -> StudentIdentity {
        StudentIdentity {
            name: "Test Student".to_string(),
            room: "5/1".to_string(),
            number: 1,
        }
    }

    /// Answers the first `correct` questions right and the rest wrong.
    fn fill_answers(session: &mut ExamSession, correct: usize) {
        let plan: Vec<(i64, usize, usize)> = session
            .questions
            .iter()
            .map(|q| (q.id, q.correct_answer_index, q.options.len()))
            .collect();
        for (i, (id, correct_idx, len)) in plan.into_iter().enumerate() {
            let pick = if i < correct {
                correct_idx
            } else {
                (correct_idx + 1) % len
            };
            session.select_answer(id, pick).unwrap();
        }
    }

    #[test]
    fn score_counts_exact_matches_only() {
        let questions = vec![
            ShuffledQuestion {
                id: 1,
                text: "a".to_string(),
                options: vec!["x".to_string(), "y".to_string()],
                correct_answer_index: 0,
                visual_type: None,
            },
            ShuffledQuestion {
                id: 2,
                text: "b".to_string(),
                options: vec!["x".to_string(), "y".to_string()],
                correct_answer_index: 1,
                visual_type: None,
            },
        ];
        let mut answers = HashMap::new();
        answers.insert(1, 0usize);
        answers.insert(2, 0usize);
        assert_eq!(score(&questions, &answers), 1);

        // Unanswered scores zero, never negative.
        assert_eq!(score(&questions, &HashMap::new()), 0);
    }

    #[test]
    fn submit_is_gated_on_completeness() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut session = ExamSession::start(student(), question_bank(), &mut rng);
        let err = session.submit().unwrap_err();
        assert!(matches!(err, AppError::IncompleteExam { missing: 30 }));

        fill_answers(&mut session, 16);
        let result = session.submit().unwrap();
        assert_eq!(result.raw_score, 16);
        assert_eq!(result.weighted_score, 8.0);
        assert!(result.passed);
    }

    #[test]
    fn reanswering_overwrites_without_growing_the_map() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut session = ExamSession::start(student(), question_bank(), &mut rng);
        let qid = session.questions[0].id;
        session.select_answer(qid, 0).unwrap();
        session.select_answer(qid, 1).unwrap();
        assert_eq!(session.answered_count(), 1);
    }

    #[test]
    fn answer_validation_rejects_bad_input() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut session = ExamSession::start(student(), question_bank(), &mut rng);
        assert!(session.select_answer(9999, 0).is_err());
        let qid = session.questions[0].id;
        let len = session.questions[0].options.len();
        assert!(session.select_answer(qid, len).is_err());
    }

    #[test]
    fn switch_counter_only_moves_while_answering() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut session = ExamSession::start(student(), question_bank(), &mut rng);
        assert_eq!(session.record_tab_switch().unwrap(), 1);
        assert_eq!(session.record_tab_switch().unwrap(), 2);

        fill_answers(&mut session, 0);
        let result = session.submit().unwrap();
        assert_eq!(result.switch_count, 2);

        // Submitted stage: visibility events no longer count.
        assert!(session.record_tab_switch().is_err());
    }

    #[test]
    fn retry_reshuffles_and_resets() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut session = ExamSession::start(student(), question_bank(), &mut rng);

        // Retry before submitting is not a valid transition.
        assert!(session.retry(question_bank(), &mut rng).is_err());

        session.record_tab_switch().unwrap();
        fill_answers(&mut session, 3);
        session.submit().unwrap();

        session.retry(question_bank(), &mut rng).unwrap();
        assert_eq!(session.stage(), Stage::Answering);
        assert_eq!(session.answered_count(), 0);
        assert_eq!(session.switch_count(), 0);
        assert_eq!(session.total_questions(), 30);

        // Double submit after a retry cycle still guarded.
        fill_answers(&mut session, 30);
        let result = session.submit().unwrap();
        assert_eq!(result.raw_score, 30);
        assert!(session.submit().is_err());
    }
}
