use crate::infra::{parse_date, Workflows};
use campus_flow::config::WorkflowConfig;
use campus_flow::error::AppError;
use campus_flow::workflows::enrollment::ParentInfo;
use campus_flow::workflows::jobs::{JobKind, JobReport};
use campus_flow::workflows::linking::LinkRequestDetails;
use campus_flow::workflows::payments::{
    Payer, PaymentMethod, PaymentRepository, PaymentSubmission,
};
use campus_flow::workflows::promotion::PromotionType;
use campus_flow::workflows::school::{
    AcademicLevel, AccountDirectory, Assignment, AssignmentId, ClassSession, ContactPreferences,
    Course, CourseId, Frequency, FrequencyPricing, InMemorySchoolStore, LevelId, LinkPermissions,
    ParentAccount, ParentId, ParentStudentLink, RecordingNotifier, Relationship,
    SessionId, Student, StudentId, StudentStatus, Submission, UserId,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::Args;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

const ALGEBRA: &str = "crs-algebra";
const PIANO: &str = "crs-piano";
const NOAH: &str = "stu-noah";
const MAYA: &str = "stu-maya";
const LINA: &str = "stu-lina";
const JORDAN: &str = "par-jordan";
const INSTRUCTOR: &str = "usr-instructor";
const REGISTRAR: &str = "usr-registrar";
const BURSAR: &str = "usr-bursar";

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Date the walk-through runs on (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print the closing parent dashboard as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct JobRunArgs {
    /// Job to run: class-reminders, assignment-due-reminders, subscription-expiry,
    /// pending-grading-reminders or weekly-parent-reports
    pub(crate) job: JobKind,
    /// Date the job runs on (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) fn demo_workflows(config: &WorkflowConfig) -> Workflows<RecordingNotifier> {
    let now = Utc::now();
    Workflows::new(seed_demo_school(now), RecordingNotifier::new(), config)
}

pub(crate) fn run_job_once(args: JobRunArgs) -> Result<(), AppError> {
    let now = demo_clock(args.today);
    let notifier = RecordingNotifier::new();
    let workflows = Workflows::new(
        seed_demo_school(now),
        notifier.clone(),
        &WorkflowConfig::default(),
    );

    let report = workflows.jobs.run(args.job, now)?;
    println!("{} at {}", args.job, now.format("%Y-%m-%d %H:%M UTC"));
    print_report(&report);
    print_notification_tally(&notifier);
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let now = demo_clock(args.today);
    let today = now.date_naive();
    let notifier = RecordingNotifier::new();
    let workflows = Workflows::new(
        seed_demo_school(now),
        notifier.clone(),
        &WorkflowConfig::default(),
    );
    let registrar = UserId::from(REGISTRAR);
    let bursar = UserId::from(BURSAR);

    println!("Campus workflow demo ({today})");

    println!("\n1. Minor enrollment without a linked parent");
    let noah_request = workflows.enrollment.submit_request(
        &StudentId::from(NOAH),
        &CourseId::from(ALGEBRA),
        Frequency::TwiceWeekly,
        Some(ParentInfo {
            name: "Sam Rivera".to_string(),
            email: "sam.rivera@example.test".to_string(),
            phone: None,
            relationship: Relationship::Father,
        }),
        now,
    )?;
    println!(
        "   request {} is {} (quoted {} {})",
        noah_request.id,
        noah_request.status.label(),
        noah_request.quoted_price,
        noah_request.currency
    );
    if let Some(parent) = workflows
        .store
        .find_parent_by_email("sam.rivera@example.test")
        .map_err(|err| AppError::Io(std::io::Error::other(err)))?
    {
        println!("   provisioned parent account {} for {}", parent.id, parent.email);
    }

    println!("\n2. Adult enrollment, payment and approval");
    let maya = StudentId::from(MAYA);
    let maya_request = workflows.enrollment.submit_request(
        &maya,
        &CourseId::from(ALGEBRA),
        Frequency::ThriceWeekly,
        None,
        now,
    )?;
    println!(
        "   request {} is {} (quoted {} {})",
        maya_request.id,
        maya_request.status.label(),
        maya_request.quoted_price,
        maya_request.currency
    );
    let payment = workflows.payments.submit_payment(
        PaymentSubmission {
            payer: Payer::Student(maya.clone()),
            student: maya.clone(),
            course: CourseId::from(ALGEBRA),
            amount: maya_request.quoted_price,
            currency: None,
            payment_date: today,
            method: PaymentMethod::BankTransfer,
            receipt_ref: "receipts/demo/maya.pdf".to_string(),
            payer_notes: None,
        },
        now,
    )?;
    workflows
        .payments
        .verify(&payment.id, &bursar, Some("matched statement".to_string()), now)?;
    let enrollment = workflows
        .enrollment
        .approve(&maya_request.id, &registrar, now)?;
    println!("   payment {} verified, enrollment {} active", payment.id, enrollment.id);
    if let Some(subscription) = workflows
        .store
        .subscription_for(&maya, &CourseId::from(ALGEBRA))
        .map_err(|err| AppError::Io(std::io::Error::other(err)))?
    {
        println!(
            "   subscription runs {} to {}",
            subscription.start_date, subscription.end_date
        );
    }

    println!("\n3. Parent link request");
    let link_request = workflows.linking.request_link(
        &ParentId::from(JORDAN),
        &StudentId::from(NOAH),
        LinkRequestDetails {
            relationship: Relationship::Guardian,
            permissions: LinkPermissions {
                is_primary_contact: false,
                can_view_grades: true,
                can_view_attendance: false,
            },
            parent_message: Some("I pick Noah up on Thursdays".to_string()),
        },
        now,
    )?;
    let first = workflows
        .linking
        .approve(&link_request.id, &registrar, None, now)?;
    let second = workflows
        .linking
        .approve(&link_request.id, &registrar, None, now)?;
    println!("   first approval applied: {first}, repeated approval applied: {second}");

    println!("\n4. Promotion");
    let promotion = workflows.promotion.propose(
        &StudentId::from(LINA),
        &LevelId::from("grade-6"),
        PromotionType::Regular,
        &registrar,
        Some("end of year review".to_string()),
        now,
    )?;
    let applied = workflows.promotion.approve(&promotion.id, &registrar, now)?;
    println!("   promotion {} to grade-6 applied: {applied}", promotion.id);

    println!("\n5. Scheduled jobs");
    for kind in JobKind::ALL {
        let report = workflows.jobs.run(kind, now)?;
        print!("   {:<26} ", kind.label());
        print_report(&report);
    }

    println!("\n6. Dashboard for {JORDAN}");
    let dashboard = workflows
        .reporting
        .get_parent_dashboard(&ParentId::from(JORDAN), today)?;
    if args.json {
        let rendered = serde_json::to_string_pretty(&dashboard)
            .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
        println!("{rendered}");
    } else {
        for child in &dashboard.children {
            let attendance = child
                .attendance_rate
                .map(|rate| format!("{rate:.1}%"))
                .unwrap_or_else(|| "hidden".to_string());
            println!(
                "   {} ({}): {:.2}% progress, attendance {}",
                child.name, child.relationship, child.overall_progress, attendance
            );
        }
        println!(
            "   {} pending link requests, {} open enrollment requests, {} pending payments",
            dashboard.pending_link_requests.len(),
            dashboard.open_enrollment_requests.len(),
            dashboard.pending_payments.len()
        );
    }

    println!();
    print_notification_tally(&notifier);
    Ok(())
}

fn demo_clock(today: Option<NaiveDate>) -> DateTime<Utc> {
    match today {
        Some(date) => date
            .and_hms_opt(10, 0, 0)
            .map(|time| time.and_utc())
            .unwrap_or_else(Utc::now),
        None => Utc::now(),
    }
}

fn print_report(report: &JobReport) {
    match report {
        JobReport::Batch(outcome) => println!(
            "processed {}, notified {}, failed {}",
            outcome.processed, outcome.notified, outcome.failed
        ),
        JobReport::Expiry(sweep) => println!(
            "expired {}, warned {}, failed {}",
            sweep.expired, sweep.warned, sweep.failed
        ),
    }
}

fn print_notification_tally(notifier: &RecordingNotifier) {
    let mut tally: BTreeMap<&'static str, usize> = BTreeMap::new();
    for event in notifier.events() {
        *tally.entry(event.kind.label()).or_default() += 1;
    }
    println!("Notifications sent: {}", tally.values().sum::<usize>());
    for (kind, count) in tally {
        println!("   {kind:<28} {count}");
    }
}

/// A small school whose calendar is laid out around `now`: a session and an assignment due
/// within the reminder horizon, an ungraded submission, and a subscription ending soon.
fn seed_demo_school(now: DateTime<Utc>) -> InMemorySchoolStore {
    let store = InMemorySchoolStore::new();
    let today = now.date_naive();

    for grade in 1..=8u8 {
        store.insert_level(AcademicLevel {
            id: LevelId(format!("grade-{grade}")),
            name: format!("Grade {grade}"),
            grade_number: grade,
        });
    }

    store.insert_course(Course {
        id: CourseId::from(ALGEBRA),
        title: "Algebra".to_string(),
        instructor: UserId::from(INSTRUCTOR),
        is_active: true,
        pricing: FrequencyPricing {
            price_1x_weekly: Some(Decimal::new(6000, 2)),
            price_2x_weekly: Some(Decimal::new(11000, 2)),
            price_3x_weekly: Some(Decimal::new(15000, 2)),
        },
        currency: "USD".to_string(),
        subscription_duration_weeks: 4,
    });
    store.insert_course(Course {
        id: CourseId::from(PIANO),
        title: "Piano".to_string(),
        instructor: UserId::from(INSTRUCTOR),
        is_active: true,
        pricing: FrequencyPricing {
            price_1x_weekly: Some(Decimal::new(8000, 2)),
            ..FrequencyPricing::default()
        },
        currency: "USD".to_string(),
        subscription_duration_weeks: 4,
    });

    let minor_birthday = today - Duration::days(15 * 365);
    let adult_birthday = today - Duration::days(22 * 365);
    for (id, name, born, level) in [
        (NOAH, "Noah", minor_birthday, "grade-6"),
        (MAYA, "Maya", adult_birthday, "grade-8"),
        (LINA, "Lina", minor_birthday + Duration::days(365), "grade-5"),
    ] {
        store.insert_student(Student {
            id: StudentId::from(id),
            user: UserId(format!("usr-{id}")),
            name: name.to_string(),
            email: format!("{}@students.example.test", name.to_ascii_lowercase()),
            date_of_birth: born,
            enrollment_status: StudentStatus::Active,
            current_level: Some(LevelId::from(level)),
        });
    }

    store.insert_parent(ParentAccount {
        id: ParentId::from(JORDAN),
        user: UserId::from("usr-par-jordan"),
        name: "Jordan Lee".to_string(),
        email: "jordan.lee@example.test".to_string(),
        phone: Some("+1 555 0142".to_string()),
        preferences: ContactPreferences::default(),
    });
    store.insert_link(ParentStudentLink {
        parent: ParentId::from(JORDAN),
        student: StudentId::from(LINA),
        relationship: Relationship::Mother,
        permissions: LinkPermissions::full(),
        linked_at: now,
    });

    store.insert_session(ClassSession {
        id: SessionId::from("ses-algebra-next"),
        course: CourseId::from(ALGEBRA),
        instructor: UserId::from(INSTRUCTOR),
        title: "Linear equations".to_string(),
        starts_at: now + Duration::hours(20),
        cancelled: false,
    });
    store.insert_assignment(Assignment {
        id: AssignmentId::from("asg-algebra-1"),
        course: CourseId::from(ALGEBRA),
        title: "Worksheet 1".to_string(),
        due_at: now + Duration::hours(12),
    });
    store.insert_assignment(Assignment {
        id: AssignmentId::from("asg-piano-scales"),
        course: CourseId::from(PIANO),
        title: "Scales recording".to_string(),
        due_at: now - Duration::days(3),
    });
    store.insert_submission(Submission {
        assignment: AssignmentId::from("asg-piano-scales"),
        student: StudentId::from(LINA),
        submitted_at: now - Duration::days(4),
        score: None,
        graded_at: None,
    });

    store
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_flow::workflows::enrollment::EnrollmentRequestStatus;
    use campus_flow::workflows::school::NotificationKind;

    fn clock() -> DateTime<Utc> {
        demo_clock(NaiveDate::from_ymd_opt(2025, 9, 1))
    }

    #[test]
    fn demo_school_routes_minors_and_adults_differently() {
        let now = clock();
        let workflows = Workflows::new(
            seed_demo_school(now),
            RecordingNotifier::new(),
            &WorkflowConfig::default(),
        );

        let minor = workflows
            .enrollment
            .submit_request(
                &StudentId::from(NOAH),
                &CourseId::from(PIANO),
                Frequency::OnceWeekly,
                Some(ParentInfo {
                    name: "Sam Rivera".to_string(),
                    email: "sam.rivera@example.test".to_string(),
                    phone: None,
                    relationship: Relationship::Father,
                }),
                now,
            )
            .expect("minor request");
        assert_eq!(minor.status, EnrollmentRequestStatus::ParentNotified);

        let adult = workflows
            .enrollment
            .submit_request(
                &StudentId::from(MAYA),
                &CourseId::from(ALGEBRA),
                Frequency::ThriceWeekly,
                None,
                now,
            )
            .expect("adult request");
        assert_eq!(adult.status, EnrollmentRequestStatus::PaymentPending);
        assert_eq!(adult.quoted_price, Decimal::new(15000, 2));
    }

    #[test]
    fn demo_walkthrough_completes() {
        run_demo(DemoArgs {
            today: NaiveDate::from_ymd_opt(2025, 9, 1),
            json: true,
        })
        .expect("demo runs");
    }

    #[test]
    fn demo_jobs_find_work() {
        let notifier = RecordingNotifier::new();
        let workflows = Workflows::new(
            seed_demo_school(clock()),
            notifier.clone(),
            &WorkflowConfig::default(),
        );
        let report = workflows
            .jobs
            .run(JobKind::PendingGradingReminders, clock())
            .expect("grading job");
        match report {
            JobReport::Batch(outcome) => assert_eq!(outcome.notified, 1),
            other => panic!("unexpected report {other:?}"),
        }
        assert_eq!(notifier.events()[0].kind, NotificationKind::PendingGrading);
    }
}
