use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{AssignmentId, CourseId, SessionId, StudentId, UserId};

/// A scheduled class meeting for a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSession {
    pub id: SessionId,
    pub course: CourseId,
    pub instructor: UserId,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub cancelled: bool,
}

/// A graded unit of work; progress is measured against these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub course: CourseId,
    pub title: String,
    pub due_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub assignment: AssignmentId,
    pub student: StudentId,
    pub submitted_at: DateTime<Utc>,
    pub score: Option<f32>,
    pub graded_at: Option<DateTime<Utc>>,
}

impl Submission {
    pub fn is_graded(&self) -> bool {
        self.score.is_some() && self.graded_at.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
    Excused,
}

impl AttendanceStatus {
    /// Late arrivals still count as attended.
    pub const fn attended(self) -> bool {
        matches!(self, AttendanceStatus::Present | AttendanceStatus::Late)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub session: SessionId,
    pub student: StudentId,
    pub status: AttendanceStatus,
}
