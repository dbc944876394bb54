// src/models/exam_info.rs

use serde::{Deserialize, Serialize};

/// Header text shown above the exam: school, exam title, subject line,
/// scoring note and instructions. Students and the admin panel both read it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamInfo {
    pub school: String,
    pub title: String,
    pub subject: String,
    pub score_info: String,
    pub instruction: String,
}

impl Default for ExamInfo {
    fn default() -> Self {
        Self {
            school: "โรงเรียนหนองบัวแดงวิทยา อำเภอหนองบัวแดง จังหวัดชัยภูมิ".to_string(),
            title: "แบบทดสอบวัดผลกลางภาค ประจำภาคเรียนที่ 2 ปีการศึกษา 2568".to_string(),
            subject: "รายวิชา อินโฟกราฟิก 2 รหัสวิชา ว32207 ชั้นมัธยมศึกษาปีที่ 5".to_string(),
            score_info: "คะแนนเต็ม 15 คะแนน เวลาที่ใช้ 40 นาที".to_string(),
            instruction:
                "คำชี้แจง : แบบทดสอบแบบปรนัย 5 ตัวเลือก จำนวน 30 ข้อ (คะแนนเต็ม 15 คะแนน)"
                    .to_string(),
        }
    }
}

/// Partial ExamInfo, as it arrives from the local cache or the remote store.
/// Both sources may carry only a subset of fields; missing fields keep the
/// value from the layer below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamInfoPatch {
    pub school: Option<String>,
    pub title: Option<String>,
    pub subject: Option<String>,
    pub score_info: Option<String>,
    pub instruction: Option<String>,
}

impl ExamInfoPatch {
    /// A remote settings payload is only accepted when it carries a non-empty
    /// school and title; anything else is ignored as wrong-shaped.
    pub fn is_valid_settings(&self) -> bool {
        matches!(&self.school, Some(s) if !s.trim().is_empty())
            && matches!(&self.title, Some(t) if !t.trim().is_empty())
    }

    fn apply_to(&self, info: &mut ExamInfo) {
        if let Some(school) = &self.school {
            info.school = school.clone();
        }
        if let Some(title) = &self.title {
            info.title = title.clone();
        }
        if let Some(subject) = &self.subject {
            info.subject = subject.clone();
        }
        if let Some(score_info) = &self.score_info {
            info.score_info = score_info.clone();
        }
        if let Some(instruction) = &self.instruction {
            info.instruction = instruction.clone();
        }
    }
}

impl ExamInfo {
    /// Priority-ordered configuration resolution: compiled defaults, overridden
    /// by the locally cached copy, overridden by the remote fetch result.
    /// Either layer may be absent or partial.
    pub fn resolve(cached: Option<&ExamInfoPatch>, remote: Option<&ExamInfoPatch>) -> Self {
        let mut info = ExamInfo::default();
        if let Some(patch) = cached {
            patch.apply_to(&mut info);
        }
        if let Some(patch) = remote {
            patch.apply_to(&mut info);
        }
        info
    }

    /// Shallow-merges a patch over the current value, returning the result.
    pub fn merged_with(&self, patch: &ExamInfoPatch) -> Self {
        let mut info = self.clone();
        patch.apply_to(&mut info);
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patch(school: Option<&str>, title: Option<&str>) -> ExamInfoPatch {
        ExamInfoPatch {
            school: school.map(str::to_string),
            title: title.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn resolve_without_sources_yields_defaults() {
        assert_eq!(ExamInfo::resolve(None, None), ExamInfo::default());
    }

    #[test]
    fn remote_overrides_cached_overrides_default() {
        let cached = patch(Some("cached school"), Some("cached title"));
        let remote = patch(Some("remote school"), None);
        let info = ExamInfo::resolve(Some(&cached), Some(&remote));

        assert_eq!(info.school, "remote school");
        assert_eq!(info.title, "cached title");
        assert_eq!(info.subject, ExamInfo::default().subject);
    }

    #[test]
    fn shallow_merge_retains_missing_fields() {
        // Remote payload with school and title but no subject: the
        // previously-held subject survives.
        let current = ExamInfo {
            subject: "kept subject".to_string(),
            ..ExamInfo::default()
        };
        let merged = current.merged_with(&patch(Some("X"), Some("Y")));
        assert_eq!(merged.school, "X");
        assert_eq!(merged.title, "Y");
        assert_eq!(merged.subject, "kept subject");
    }

    #[test]
    fn settings_validation_requires_school_and_title() {
        assert!(patch(Some("X"), Some("Y")).is_valid_settings());
        assert!(!patch(Some("X"), None).is_valid_settings());
        assert!(!patch(Some("  "), Some("Y")).is_valid_settings());
        assert!(!ExamInfoPatch::default().is_valid_settings());
    }

    #[test]
    fn wire_format_is_camel_case() {
        let json = serde_json::to_value(ExamInfo::default()).unwrap();
        assert!(json.get("scoreInfo").is_some());
    }
}
