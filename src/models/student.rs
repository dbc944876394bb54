// src/models/student.rs

use serde::{Deserialize, Serialize};

/// Identity captured on the entry form. Immutable for the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentIdentity {
    pub name: String,
    /// Display room label, e.g. "5/7".
    pub room: String,
    /// Seat number within the room.
    pub number: u32,
}

impl StudentIdentity {
    /// Composite key identifying one student's record across attempts.
    /// Room and seat number together pin the record; the display name does not
    /// participate, so a student fixing a name typo on retry keeps their record.
    pub fn record_id(&self) -> String {
        format!("{}-{}", self.room, self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_id_is_room_dash_number() {
        let student = StudentIdentity {
            name: "สมชาย ใจดี".to_string(),
            room: "5/7".to_string(),
            number: 12,
        };
        assert_eq!(student.record_id(), "5/7-12");
    }
}
