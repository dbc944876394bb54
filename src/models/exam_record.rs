// src/models/exam_record.rs

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::config::PASS_SCORE;
use crate::models::student::StudentIdentity;

/// Spreadsheets auto-convert values like "5/7" into dates. The room is stored
/// behind a leading apostrophe so downstream sheet tooling keeps it as text.
const ROOM_TEXT_MARKER: char = '\'';

/// Rows that went through the sheet before the marker existed come back as
/// ISO timestamps ("2025-07-05T...").
static ISO_DATE_ROOM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})T").expect("valid regex")
});

/// Outcome of one submitted sitting. Computed once, never mutated.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResult {
    pub raw_score: u32,
    pub weighted_score: f64,
    pub passed: bool,
    pub switch_count: u32,
}

impl AttemptResult {
    pub fn from_raw_score(raw_score: u32, switch_count: u32) -> Self {
        Self {
            raw_score,
            weighted_score: raw_score as f64 / 2.0,
            passed: raw_score >= PASS_SCORE,
            switch_count,
        }
    }
}

/// One student's persisted record, keyed by room + seat number. Serialized
/// camelCase so the sheet webhook sees the same payload the original UI sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamRecord {
    /// Composite key: room + "-" + number.
    pub id: String,
    pub student_name: String,
    /// Room with the literal-text marker applied, e.g. "'5/7".
    pub room: String,
    pub number: u32,
    pub raw_score: u32,
    pub weighted_score: f64,
    pub passed: bool,
    /// Total sittings by this identity, >= 1.
    pub attempts: u32,
    /// Epoch millis of the latest sitting.
    pub timestamp: i64,
    /// Tab switches during the latest sitting. Older sheet rows lack the field.
    #[serde(default)]
    pub switch_count: u32,
}

impl ExamRecord {
    /// Creates the record for a first submission by this identity.
    pub fn from_attempt(student: &StudentIdentity, attempt: &AttemptResult, timestamp: i64) -> Self {
        Self {
            id: student.record_id(),
            student_name: student.name.clone(),
            room: mark_room_as_text(&student.room),
            number: student.number,
            raw_score: attempt.raw_score,
            weighted_score: attempt.weighted_score,
            passed: attempt.passed,
            attempts: 1,
            timestamp,
            switch_count: attempt.switch_count,
        }
    }

    /// Merges a new sitting into an existing record for the same identity.
    ///
    /// Best-of policy: the raw score only ever improves, the weighted score is
    /// recomputed from the merged raw score (never maxed independently), and a
    /// pass is never revoked. Attempt count grows by one. Timestamp and switch
    /// count describe the latest sitting, not the best one, and the display
    /// name/room take the latest submission's values.
    pub fn merged_with(
        &self,
        student: &StudentIdentity,
        attempt: &AttemptResult,
        timestamp: i64,
    ) -> Self {
        let best_raw = self.raw_score.max(attempt.raw_score);
        Self {
            id: self.id.clone(),
            student_name: student.name.clone(),
            room: mark_room_as_text(&student.room),
            number: self.number,
            raw_score: best_raw,
            weighted_score: best_raw as f64 / 2.0,
            passed: self.passed || attempt.passed,
            attempts: self.attempts + 1,
            timestamp,
            switch_count: attempt.switch_count,
        }
    }

    /// Human-readable room label with the text marker stripped and
    /// date-mangled sheet values repaired back to "5/<month>".
    pub fn display_room(&self) -> String {
        display_room(&self.room)
    }
}

/// Applies the literal-text marker.
pub fn mark_room_as_text(room: &str) -> String {
    format!("{}{}", ROOM_TEXT_MARKER, room)
}

/// Normalizes a stored room value back to its display form.
pub fn display_room(stored: &str) -> String {
    if let Some(caps) = ISO_DATE_ROOM.captures(stored) {
        // "2025-07-05T..." was once "5/7": the month digit survives.
        let month: u32 = caps[2].parse().unwrap_or(0);
        return format!("5/{}", month);
    }
    stored.strip_prefix(ROOM_TEXT_MARKER).unwrap_or(stored).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(name: &str, room: &str, number: u32) -> StudentIdentity {
        StudentIdentity {
            name: name.to_string(),
            room: room.to_string(),
            number,
        }
    }

    #[test]
    fn first_attempt_creates_record_verbatim() {
        let s = student("A", "5/3", 14);
        let attempt = AttemptResult::from_raw_score(10, 1);
        let record = ExamRecord::from_attempt(&s, &attempt, 1_700_000_000_000);

        assert_eq!(record.id, "5/3-14");
        assert_eq!(record.room, "'5/3");
        assert_eq!(record.raw_score, 10);
        assert_eq!(record.weighted_score, 5.0);
        assert!(!record.passed);
        assert_eq!(record.attempts, 1);
        assert_eq!(record.switch_count, 1);
    }

    #[test]
    fn pass_threshold_scenario() {
        // 30 questions, PASS_SCORE = 16: scoring exactly 16 passes with 8.0.
        let attempt = AttemptResult::from_raw_score(16, 0);
        assert!(attempt.passed);
        assert_eq!(attempt.weighted_score, 8.0);

        let attempt = AttemptResult::from_raw_score(15, 0);
        assert!(!attempt.passed);
        assert_eq!(attempt.weighted_score, 7.5);
    }

    #[test]
    fn merge_improves_on_better_score() {
        let s = student("A", "5/3", 14);
        let first = ExamRecord::from_attempt(&s, &AttemptResult::from_raw_score(10, 0), 1);
        let merged = first.merged_with(&s, &AttemptResult::from_raw_score(20, 2), 2);

        assert_eq!(merged.raw_score, 20);
        assert_eq!(merged.weighted_score, 10.0);
        assert!(merged.passed);
        assert_eq!(merged.attempts, 2);
        assert_eq!(merged.timestamp, 2);
        assert_eq!(merged.switch_count, 2);
    }

    #[test]
    fn merge_with_worse_score_keeps_best_but_tracks_latest_sitting() {
        let s = student("A", "5/3", 14);
        let first = ExamRecord::from_attempt(&s, &AttemptResult::from_raw_score(20, 5), 1);
        let merged = first.merged_with(&s, &AttemptResult::from_raw_score(8, 1), 2);

        assert_eq!(merged.raw_score, 20);
        assert_eq!(merged.weighted_score, 10.0);
        assert!(merged.passed, "a pass is never revoked");
        assert_eq!(merged.attempts, 2);
        assert_eq!(merged.timestamp, 2);
        assert_eq!(merged.switch_count, 1, "switch count follows the latest sitting");
    }

    #[test]
    fn passed_is_monotone_over_merge_sequences() {
        let s = student("A", "5/1", 1);
        let mut record = ExamRecord::from_attempt(&s, &AttemptResult::from_raw_score(16, 0), 1);
        assert!(record.passed);
        for (i, raw) in [3u32, 0, 12, 15].iter().enumerate() {
            record = record.merged_with(&s, &AttemptResult::from_raw_score(*raw, 0), i as i64 + 2);
            assert!(record.passed);
        }
        assert_eq!(record.attempts, 5);
        assert_eq!(record.raw_score, 16);
    }

    #[test]
    fn merge_overwrites_display_name_with_latest() {
        let s1 = student("Somchai", "5/3", 14);
        let s2 = student("Somchai J.", "5/3", 14);
        let first = ExamRecord::from_attempt(&s1, &AttemptResult::from_raw_score(5, 0), 1);
        let merged = first.merged_with(&s2, &AttemptResult::from_raw_score(5, 0), 2);
        assert_eq!(merged.student_name, "Somchai J.");
        assert_eq!(merged.id, "5/3-14", "identity key never changes");
    }

    #[test]
    fn record_round_trips_and_room_normalizes() {
        let s = student("A", "5/7", 22);
        let record = ExamRecord::from_attempt(&s, &AttemptResult::from_raw_score(17, 3), 99);
        let json = serde_json::to_string(&record).unwrap();
        let back: ExamRecord = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id, record.id);
        assert_eq!(back.room, "'5/7");
        assert_eq!(back.display_room(), "5/7");
        assert_eq!(back.raw_score, record.raw_score);
        assert_eq!(back.switch_count, record.switch_count);
    }

    #[test]
    fn sheet_mangled_room_dates_are_repaired() {
        assert_eq!(display_room("2025-07-05T00:00:00.000Z"), "5/7");
        assert_eq!(display_room("'5/12"), "5/12");
        assert_eq!(display_room("5/2"), "5/2");
    }

    #[test]
    fn missing_switch_count_defaults_to_zero() {
        let json = r#"{
            "id": "5/1-2", "studentName": "B", "room": "'5/1", "number": 2,
            "rawScore": 9, "weightedScore": 4.5, "passed": false,
            "attempts": 1, "timestamp": 0
        }"#;
        let record: ExamRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.switch_count, 0);
    }
}
