use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::workflows::school::domain::{
    CourseId, InvalidTransition, ParentId, PaymentId, StudentId, SubscriptionId, UserId,
};
use crate::workflows::school::notify::Recipient;

/// Account that handed over the money. The beneficiary student is tracked separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Payer {
    Parent(ParentId),
    Student(StudentId),
}

impl Payer {
    pub fn recipient(&self) -> Recipient {
        match self {
            Payer::Parent(parent) => Recipient::Parent(parent.clone()),
            Payer::Student(student) => Recipient::Student(student.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BankTransfer,
    Cash,
    Card,
    MobileMoney,
    Other,
}

impl PaymentMethod {
    pub const fn label(self) -> &'static str {
        match self {
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::MobileMoney => "mobile_money",
            PaymentMethod::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Verified,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentDecision {
    Verify,
    Reject,
}

impl PaymentDecision {
    pub const fn label(self) -> &'static str {
        match self {
            PaymentDecision::Verify => "verify",
            PaymentDecision::Reject => "reject",
        }
    }
}

impl PaymentStatus {
    pub const fn label(self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Verified => "verified",
            PaymentStatus::Rejected => "rejected",
        }
    }

    pub fn apply(self, decision: PaymentDecision) -> Result<Self, InvalidTransition> {
        match (self, decision) {
            (PaymentStatus::Pending, PaymentDecision::Verify) => Ok(PaymentStatus::Verified),
            (PaymentStatus::Pending, PaymentDecision::Reject) => Ok(PaymentStatus::Rejected),
            (from, decision) => Err(InvalidTransition {
                from: from.label(),
                event: decision.label(),
            }),
        }
    }
}

/// Receipt details supplied by whoever paid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSubmission {
    pub payer: Payer,
    pub student: StudentId,
    pub course: CourseId,
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    /// Opaque reference to the uploaded receipt.
    pub receipt_ref: String,
    #[serde(default)]
    pub payer_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub payer: Payer,
    pub student: StudentId,
    pub course: CourseId,
    pub amount: Decimal,
    pub currency: String,
    pub payment_date: NaiveDate,
    pub method: PaymentMethod,
    pub receipt_ref: String,
    pub status: PaymentStatus,
    pub verifier: Option<UserId>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub admin_notes: Option<String>,
    pub payer_notes: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Expired,
    Cancelled,
}

impl SubscriptionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }
}

/// Paid access of one student to one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub student: StudentId,
    pub course: CourseId,
    pub status: SubscriptionStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Day the holder was last told the term is ending.
    pub last_warned_on: Option<NaiveDate>,
    pub last_payment: PaymentId,
}

impl Subscription {
    /// Start a term on the payment date.
    pub fn open(payment: &Payment, weeks: u32) -> Self {
        Self {
            id: SubscriptionId::generate(),
            student: payment.student.clone(),
            course: payment.course.clone(),
            status: SubscriptionStatus::Active,
            start_date: payment.payment_date,
            end_date: add_weeks(payment.payment_date, weeks),
            last_warned_on: None,
            last_payment: payment.id.clone(),
        }
    }

    /// Renew for another term. Active subscriptions stretch from their current end date;
    /// lapsed ones restart on the payment date.
    pub fn extend(&self, payment: &Payment, weeks: u32) -> Self {
        match self.status {
            SubscriptionStatus::Active => Self {
                end_date: add_weeks(self.end_date, weeks),
                last_payment: payment.id.clone(),
                ..self.clone()
            },
            SubscriptionStatus::Expired | SubscriptionStatus::Cancelled => Self {
                status: SubscriptionStatus::Active,
                start_date: payment.payment_date,
                end_date: add_weeks(payment.payment_date, weeks),
                last_warned_on: None,
                last_payment: payment.id.clone(),
                ..self.clone()
            },
        }
    }

    pub fn is_lapsed(&self, today: NaiveDate) -> bool {
        self.status == SubscriptionStatus::Active && self.end_date < today
    }

    /// True when the term ends within `horizon_days` and the holder has not been warned
    /// about this term yet.
    pub fn needs_warning(&self, today: NaiveDate, horizon_days: i64) -> bool {
        if self.status != SubscriptionStatus::Active || self.end_date < today {
            return false;
        }
        let days_left = (self.end_date - today).num_days();
        if days_left > horizon_days {
            return false;
        }
        let window_opens = self.end_date - chrono::Duration::days(horizon_days);
        match self.last_warned_on {
            Some(warned) => warned < window_opens,
            None => true,
        }
    }

    pub fn days_remaining(&self, today: NaiveDate) -> i64 {
        (self.end_date - today).num_days()
    }
}

fn add_weeks(date: NaiveDate, weeks: u32) -> NaiveDate {
    date.checked_add_days(Days::new(u64::from(weeks) * 7))
        .unwrap_or(NaiveDate::MAX)
}
