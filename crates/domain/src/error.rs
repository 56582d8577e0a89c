// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::application::RosterMode;
use crate::types::ApplicationStatus;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Application status string is not recognized.
    #[error("Invalid application status: {0}")]
    InvalidApplicationStatus(String),
    /// Enrollment status string is not recognized.
    #[error("Invalid enrollment status: {0}")]
    InvalidEnrollmentStatus(String),
    /// Payment method string is not recognized.
    #[error("Invalid payment method: {0}")]
    InvalidPaymentMethod(String),
    /// Payment status string is not recognized.
    #[error("Invalid payment status: {0}")]
    InvalidPaymentStatus(String),
    /// Roster mode string is not recognized.
    #[error("Invalid roster mode: {0}")]
    InvalidRosterMode(String),
    /// The requested lifecycle transition is not permitted.
    #[error("Cannot transition application from {from} to {to}")]
    InvalidStatusTransition {
        /// The current status.
        from: ApplicationStatus,
        /// The requested status.
        to: ApplicationStatus,
    },
    /// The operation requires a draft application.
    #[error("Application is {status}; only draft applications can be modified")]
    ApplicationNotDraft {
        /// The current status.
        status: ApplicationStatus,
    },
    /// No course was selected, or nothing in the selection is purchasable.
    #[error("At least one purchasable course must be selected")]
    EmptyCourseSelection,
    /// The same course appears twice in one application.
    #[error("Course {course_id} appears more than once in the application")]
    DuplicateCourseLine {
        /// The duplicated course.
        course_id: i64,
    },
    /// The application has no line for the course.
    #[error("Course {course_id} is not part of this application")]
    CourseLineNotFound {
        /// The requested course.
        course_id: i64,
    },
    /// Captured prices are inconsistent.
    #[error("Invalid price for course {course_id}: {reason}")]
    InvalidPrice {
        /// The course with the bad price.
        course_id: i64,
        /// What is wrong with it.
        reason: String,
    },
    /// The total amount does not fit in the amount type.
    #[error("Total amount overflowed")]
    AmountOverflow,
    /// The course line already uses the other roster mode.
    #[error("Course {course_id} already has a {existing} roster")]
    RosterModeConflict {
        /// The course line.
        course_id: i64,
        /// The roster mode already in use.
        existing: RosterMode,
    },
    /// The individual roster is full.
    #[error("Course {course_id} already has {cap} individually added students; use a bulk upload")]
    IndividualRosterFull {
        /// The course line.
        course_id: i64,
        /// The individual cap.
        cap: usize,
    },
    /// The student is already on the course line roster.
    #[error("Student {user_id} is already on the roster for course {course_id}")]
    DuplicateStudentOnLine {
        /// The course line.
        course_id: i64,
        /// The student account.
        user_id: i64,
    },
    /// The student is not on the course line roster.
    #[error("Student {user_id} is not on the individual roster for course {course_id}")]
    StudentNotOnLine {
        /// The course line.
        course_id: i64,
        /// The student account.
        user_id: i64,
    },
    /// A bulk roster has fewer rows than the bulk floor.
    #[error("Bulk roster has {rows} rows; at least {floor} are required")]
    BulkRosterTooSmall {
        /// Rows in the file.
        rows: usize,
        /// The bulk floor.
        floor: usize,
    },
    /// A bulk roster has more rows than the ceiling.
    #[error("Bulk roster has {rows} rows; at most {ceiling} are accepted")]
    BulkRosterTooLarge {
        /// Rows in the file.
        rows: usize,
        /// The bulk ceiling.
        ceiling: usize,
    },
    /// A course line has no students at submission.
    #[error("Course '{course_name}' ({course_id}) has no students")]
    EmptyRoster {
        /// The course line.
        course_id: i64,
        /// The course name.
        course_name: String,
    },
    /// A required agreement was not accepted.
    #[error("The {agreement} agreement must be accepted")]
    AgreementRequired {
        /// The agreement name.
        agreement: &'static str,
    },
    /// Application number is missing at submission.
    #[error("Application number cannot be empty")]
    InvalidApplicationNumber,
    /// Cancellation reason is empty.
    #[error("A cancellation reason is required")]
    MissingCancellationReason,
    /// A student field is empty or malformed.
    #[error("Invalid student {field}: {message}")]
    InvalidStudentField {
        /// The field name.
        field: &'static str,
        /// Description of the problem.
        message: String,
    },
    /// No account exists for the email.
    #[error("No registered account for '{email}'; students must already hold a registered account")]
    StudentAccountNotFound {
        /// The email that was looked up.
        email: String,
    },
    /// The phone number does not match the account.
    #[error("Phone mismatch for '{email}'")]
    PhoneMismatch {
        /// The account email.
        email: String,
    },
    /// The name does not match the account.
    #[error("Name mismatch for '{email}'")]
    NameMismatch {
        /// The account email.
        email: String,
    },
    /// The student already holds a live enrollment for the offering.
    #[error("Student {user_id} is already enrolled in course {course_id} schedule {schedule_id}")]
    AlreadyEnrolled {
        /// The student account.
        user_id: i64,
        /// The course.
        course_id: i64,
        /// The schedule.
        schedule_id: i64,
    },
    /// The schedule is not open for enrollment.
    #[error("Schedule {schedule_id} is not active")]
    ScheduleInactive {
        /// The schedule.
        schedule_id: i64,
    },
    /// The schedule has no remaining seats.
    #[error("Schedule {schedule_id} is full ({available_seats} seats)")]
    ScheduleFull {
        /// The schedule.
        schedule_id: i64,
        /// Total seats.
        available_seats: u32,
    },
    /// The schedule belongs to another course.
    #[error("Schedule {schedule_id} does not belong to course {course_id}")]
    ScheduleCourseMismatch {
        /// The schedule.
        schedule_id: i64,
        /// The course.
        course_id: i64,
    },
}

impl DomainError {
    /// Returns the stable sub-reason for student identity failures.
    ///
    /// Callers use this to tell the user which field to correct.
    #[must_use]
    pub const fn identity_reason(&self) -> Option<&'static str> {
        match self {
            Self::StudentAccountNotFound { .. } => Some("account_not_found"),
            Self::PhoneMismatch { .. } => Some("phone_mismatch"),
            Self::NameMismatch { .. } => Some("name_mismatch"),
            Self::InvalidStudentField { .. } => Some("invalid_field"),
            _ => None,
        }
    }
}
