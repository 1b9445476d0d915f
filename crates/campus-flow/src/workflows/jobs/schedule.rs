use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

/// The recurring jobs the service runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    ClassReminders,
    AssignmentDueReminders,
    SubscriptionExpiry,
    PendingGradingReminders,
    WeeklyParentReports,
}

/// When a job fires, in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobSchedule {
    Daily { at: NaiveTime },
    Weekly { on: Weekday, at: NaiveTime },
}

impl JobKind {
    pub const ALL: [JobKind; 5] = [
        JobKind::ClassReminders,
        JobKind::AssignmentDueReminders,
        JobKind::SubscriptionExpiry,
        JobKind::PendingGradingReminders,
        JobKind::WeeklyParentReports,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            JobKind::ClassReminders => "class-reminders",
            JobKind::AssignmentDueReminders => "assignment-due-reminders",
            JobKind::SubscriptionExpiry => "subscription-expiry",
            JobKind::PendingGradingReminders => "pending-grading-reminders",
            JobKind::WeeklyParentReports => "weekly-parent-reports",
        }
    }

    pub fn schedule(self) -> JobSchedule {
        let at = |hour| NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
        match self {
            JobKind::ClassReminders => JobSchedule::Daily { at: at(8) },
            JobKind::AssignmentDueReminders | JobKind::SubscriptionExpiry => {
                JobSchedule::Daily { at: at(9) }
            }
            JobKind::PendingGradingReminders => JobSchedule::Daily { at: at(17) },
            JobKind::WeeklyParentReports => JobSchedule::Weekly {
                on: Weekday::Sun,
                at: at(20),
            },
        }
    }

    /// First fire time strictly after `after`.
    pub fn next_run_after(self, after: DateTime<Utc>) -> DateTime<Utc> {
        self.schedule().next_after(after)
    }
}

impl JobSchedule {
    pub fn next_after(self, after: DateTime<Utc>) -> DateTime<Utc> {
        let today = after.date_naive();
        match self {
            JobSchedule::Daily { at } => {
                let candidate = today.and_time(at).and_utc();
                if candidate > after {
                    candidate
                } else {
                    (today + Days::new(1)).and_time(at).and_utc()
                }
            }
            JobSchedule::Weekly { on, at } => {
                let ahead = (7 + on.num_days_from_monday() - today.weekday().num_days_from_monday()) % 7;
                let candidate = (today + Days::new(u64::from(ahead))).and_time(at).and_utc();
                if candidate > after {
                    candidate
                } else {
                    (today + Days::new(u64::from(ahead) + 7)).and_time(at).and_utc()
                }
            }
        }
    }
}

impl fmt::Display for JobSchedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobSchedule::Daily { at } => write!(f, "daily at {} UTC", at.format("%H:%M")),
            JobSchedule::Weekly { on, at } => {
                write!(f, "every {on} at {} UTC", at.format("%H:%M"))
            }
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job `{0}`")]
pub struct UnknownJob(pub String);

impl FromStr for JobKind {
    type Err = UnknownJob;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        JobKind::ALL
            .into_iter()
            .find(|kind| kind.label() == value)
            .ok_or_else(|| UnknownJob(value.to_string()))
    }
}
