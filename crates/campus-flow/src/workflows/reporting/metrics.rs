use crate::workflows::enrollment::{Enrollment, EnrollmentStatus};
use crate::workflows::school::academics::{AttendanceRecord, AttendanceStatus};

/// Mean progress across active and completed enrollments, two decimals.
pub fn overall_progress(enrollments: &[Enrollment]) -> f32 {
    let counted: Vec<f32> = enrollments
        .iter()
        .filter(|enrollment| {
            matches!(
                enrollment.status,
                EnrollmentStatus::Active | EnrollmentStatus::Completed
            )
        })
        .map(|enrollment| enrollment.progress_percentage)
        .collect();
    if counted.is_empty() {
        return 0.0;
    }
    let mean = counted.iter().sum::<f32>() / counted.len() as f32;
    (mean * 100.0).round() / 100.0
}

/// Share of countable sessions attended; late counts as attended, excused is not counted.
pub fn attendance_rate(records: &[AttendanceRecord]) -> f32 {
    let countable = records
        .iter()
        .filter(|record| record.status != AttendanceStatus::Excused)
        .count();
    if countable == 0 {
        return 0.0;
    }
    let attended = records
        .iter()
        .filter(|record| record.status.attended())
        .count();
    let rate = attended as f32 / countable as f32 * 100.0;
    (rate * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::workflows::school::domain::{CourseId, SessionId, StudentId};

    fn enrollment(status: EnrollmentStatus, progress: f32) -> Enrollment {
        Enrollment {
            progress_percentage: progress,
            status,
            ..Enrollment::start(
                StudentId::from("stu-1"),
                CourseId::from("crs-1"),
                None,
                Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap(),
            )
        }
    }

    fn record(status: AttendanceStatus) -> AttendanceRecord {
        AttendanceRecord {
            session: SessionId::generate(),
            student: StudentId::from("stu-1"),
            status,
        }
    }

    #[test]
    fn overall_progress_ignores_dropped_enrollments() {
        let enrollments = vec![
            enrollment(EnrollmentStatus::Active, 40.0),
            enrollment(EnrollmentStatus::Completed, 100.0),
            enrollment(EnrollmentStatus::Dropped, 5.0),
        ];
        assert_eq!(overall_progress(&enrollments), 70.0);
        assert_eq!(overall_progress(&[]), 0.0);
    }

    #[test]
    fn attendance_counts_late_and_skips_excused() {
        let records = vec![
            record(AttendanceStatus::Present),
            record(AttendanceStatus::Late),
            record(AttendanceStatus::Absent),
            record(AttendanceStatus::Excused),
        ];
        assert_eq!(attendance_rate(&records), 66.7);
        assert_eq!(attendance_rate(&[record(AttendanceStatus::Excused)]), 0.0);
    }
}
