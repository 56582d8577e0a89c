// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Lifecycle state of a class application.
///
/// `Draft` is the only editable state. `Submitted` is reached once and never
/// returns to `Draft`. `Cancelled` and `Completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Being assembled by the owner.
    #[default]
    Draft,
    /// Submitted with enrollments created.
    Submitted,
    /// Cancelled from draft or submitted.
    Cancelled,
    /// The courses have run.
    Completed,
}

impl ApplicationStatus {
    /// Returns the persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }

    /// Checks if a transition from this state to another is valid.
    ///
    /// Valid transitions are:
    /// - `Draft` → `Submitted`
    /// - `Draft` → `Cancelled`
    /// - `Submitted` → `Cancelled`
    /// - `Submitted` → `Completed`
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Draft, Self::Submitted | Self::Cancelled)
                | (Self::Submitted, Self::Cancelled | Self::Completed)
        )
    }

    /// Returns whether no further transitions are possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Completed)
    }
}

impl FromStr for ApplicationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Self::Draft),
            "submitted" => Ok(Self::Submitted),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            _ => Err(DomainError::InvalidApplicationStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a single enrollment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentStatus {
    /// Seat held for the student.
    Enrolled,
    /// Student finished the course.
    Completed,
    /// Enrollment cancelled; kept for history.
    Cancelled,
    /// Student did not attend.
    NoShow,
}

impl EnrollmentStatus {
    /// Returns the persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Enrolled => "enrolled",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }

    /// Returns whether this enrollment still counts against duplicate checks.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

impl FromStr for EnrollmentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "enrolled" => Ok(Self::Enrolled),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            "no_show" => Ok(Self::NoShow),
            _ => Err(DomainError::InvalidEnrollmentStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for EnrollmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the purchaser intends to pay. Recorded only; never processed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Credit or debit card.
    Card,
    /// Direct bank transfer.
    BankTransfer,
    /// Issued virtual account.
    VirtualAccount,
}

impl PaymentMethod {
    /// Returns the persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::BankTransfer => "bank_transfer",
            Self::VirtualAccount => "virtual_account",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "card" => Ok(Self::Card),
            "bank_transfer" => Ok(Self::BankTransfer),
            "virtual_account" => Ok(Self::VirtualAccount),
            _ => Err(DomainError::InvalidPaymentMethod(s.to_string())),
        }
    }
}

/// Payment state as reported by the payment collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    /// No confirmation received yet.
    #[default]
    Pending,
    /// Payment confirmed.
    Paid,
    /// Payment attempt failed.
    Failed,
    /// Payment returned to the purchaser.
    Refunded,
}

impl PaymentStatus {
    /// Returns the persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Paid => "paid",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "paid" => Ok(Self::Paid),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            _ => Err(DomainError::InvalidPaymentStatus(s.to_string())),
        }
    }
}

/// Payment metadata attached to an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PaymentInfo {
    /// Chosen payment method, if any yet.
    pub payment_method: Option<PaymentMethod>,
    /// Sum of the course lines' discounted prices. Always derived.
    pub total_amount: i64,
    /// Reported payment state.
    pub payment_status: PaymentStatus,
    /// Whether a tax invoice was requested.
    pub tax_invoice: bool,
}

/// Agreement flags accepted at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Agreements {
    /// Purchase terms accepted.
    pub purchase_terms: bool,
    /// Refund policy accepted.
    pub refund_policy: bool,
}

impl Agreements {
    /// Creates a new set of agreement flags.
    #[must_use]
    pub const fn new(purchase_terms: bool, refund_policy: bool) -> Self {
        Self {
            purchase_terms,
            refund_policy,
        }
    }

    /// Validates that both required agreements were accepted.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::AgreementRequired` naming the first missing flag.
    pub const fn ensure_accepted(&self) -> Result<(), DomainError> {
        if !self.purchase_terms {
            return Err(DomainError::AgreementRequired {
                agreement: "purchase terms",
            });
        }
        if !self.refund_policy {
            return Err(DomainError::AgreementRequired {
                agreement: "refund policy",
            });
        }
        Ok(())
    }
}

/// A registered account as seen by the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Canonical account identifier.
    pub user_id: i64,
    /// Registered name.
    pub name: String,
    /// Registered email.
    pub email: String,
    /// Registered phone, in any formatting.
    pub phone: String,
}

/// A scheduled run of a course with its seat counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingSchedule {
    /// Canonical schedule identifier.
    pub schedule_id: i64,
    /// The course this schedule runs.
    pub course_id: i64,
    /// First day (ISO 8601 date).
    pub start_date: String,
    /// Last day (ISO 8601 date).
    pub end_date: String,
    /// Whether the schedule accepts enrollments.
    pub is_active: bool,
    /// Seat capacity.
    pub available_seats: u32,
    /// Seats already taken.
    pub enrolled_count: u32,
}

impl TrainingSchedule {
    /// Seats still open.
    #[must_use]
    pub const fn remaining_seats(&self) -> u32 {
        self.available_seats.saturating_sub(self.enrolled_count)
    }

    /// Returns whether no seat is left.
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.enrolled_count >= self.available_seats
    }

    /// Human-readable period, captured on course lines at draft time.
    #[must_use]
    pub fn period(&self) -> String {
        format!("{} ~ {}", self.start_date, self.end_date)
    }
}

/// A claimed student identity, as typed by the purchaser or read from a roster file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentCandidate {
    /// Claimed name.
    pub name: String,
    /// Claimed email; used to look the account up.
    pub email: String,
    /// Claimed phone.
    pub phone: String,
    /// Optional company.
    pub company: Option<String>,
    /// Optional position.
    pub position: Option<String>,
}

impl StudentCandidate {
    /// Creates a candidate without company or position.
    #[must_use]
    pub const fn new(name: String, email: String, phone: String) -> Self {
        Self {
            name,
            email,
            phone,
            company: None,
            position: None,
        }
    }

    /// Converts a verified candidate into a roster entry for the given account.
    #[must_use]
    pub fn into_entry(self, user_id: i64) -> StudentEntry {
        StudentEntry {
            user_id,
            name: self.name.trim().to_string(),
            phone: self.phone.trim().to_string(),
            email: self.email.trim().to_string(),
            company: self.company.filter(|c| !c.trim().is_empty()),
            position: self.position.filter(|p| !p.trim().is_empty()),
        }
    }
}

/// A verified student on a course line roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentEntry {
    /// The student's existing account.
    pub user_id: i64,
    /// Name as verified.
    pub name: String,
    /// Phone as entered.
    pub phone: String,
    /// Email as entered.
    pub email: String,
    /// Optional company.
    pub company: Option<String>,
    /// Optional position.
    pub position: Option<String>,
}

/// One student's seat on one course line, created at submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Stored identifier.
    pub enrollment_id: i64,
    /// The submitted application.
    pub application_id: i64,
    /// The course line the student was listed on.
    pub course_line_id: i64,
    /// The course.
    pub course_id: i64,
    /// The schedule.
    pub schedule_id: i64,
    /// The student.
    pub student_user_id: i64,
    /// Current status.
    pub status: EnrollmentStatus,
    /// When the enrollment was created (RFC 3339).
    pub enrolled_at: String,
    /// When the enrollment was cancelled (RFC 3339).
    pub cancelled_at: Option<String>,
    /// Why the enrollment was cancelled.
    pub cancellation_reason: Option<String>,
}
