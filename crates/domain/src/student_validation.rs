// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{Account, StudentCandidate, TrainingSchedule};

/// Reduces a phone number to its digits.
///
/// `010-1234-5678`, `010 1234 5678` and `01012345678` all normalize to the
/// same value.
#[must_use]
pub fn normalize_phone(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Normalizes an email for account lookup: trimmed and lowercased.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validates the shape of a claimed student identity.
///
/// This does not touch any account; it only rejects input that can never
/// match one.
///
/// # Errors
///
/// Returns `DomainError::InvalidStudentField` if the name is blank, the email
/// is blank or lacks an `@`, or the phone contains no digits.
pub fn validate_candidate_fields(candidate: &StudentCandidate) -> Result<(), DomainError> {
    if candidate.name.trim().is_empty() {
        return Err(DomainError::InvalidStudentField {
            field: "name",
            message: String::from("Name cannot be empty"),
        });
    }

    let email: &str = candidate.email.trim();
    if email.is_empty() {
        return Err(DomainError::InvalidStudentField {
            field: "email",
            message: String::from("Email cannot be empty"),
        });
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {}
        _ => {
            return Err(DomainError::InvalidStudentField {
                field: "email",
                message: format!("'{email}' is not an email address"),
            });
        }
    }

    if normalize_phone(&candidate.phone).is_empty() {
        return Err(DomainError::InvalidStudentField {
            field: "phone",
            message: String::from("Phone must contain digits"),
        });
    }

    Ok(())
}

/// Confirms a claimed identity against the account found by email.
///
/// # Arguments
///
/// * `candidate` - The claimed identity
/// * `account` - The account registered under the candidate's email, if any
///
/// # Returns
///
/// The verified account's user id.
///
/// # Errors
///
/// Returns an error if:
/// - A field is malformed (`InvalidStudentField`)
/// - No account exists (`StudentAccountNotFound`)
/// - The phone digits differ (`PhoneMismatch`)
/// - The trimmed name differs (`NameMismatch`)
pub fn verify_student_identity(
    candidate: &StudentCandidate,
    account: Option<&Account>,
) -> Result<i64, DomainError> {
    validate_candidate_fields(candidate)?;

    let Some(account) = account else {
        return Err(DomainError::StudentAccountNotFound {
            email: candidate.email.trim().to_string(),
        });
    };

    if normalize_phone(&candidate.phone) != normalize_phone(&account.phone) {
        return Err(DomainError::PhoneMismatch {
            email: account.email.clone(),
        });
    }

    if candidate.name.trim() != account.name.trim() {
        return Err(DomainError::NameMismatch {
            email: account.email.clone(),
        });
    }

    Ok(account.user_id)
}

/// Checks whether a student may enroll in a course offering.
///
/// Checks run in a fixed order so the reported reason is deterministic:
/// schedule ownership, existing enrollment, schedule activity, seats.
///
/// # Arguments
///
/// * `schedule` - The target schedule with current seat counters
/// * `course_id` - The course the line is for
/// * `user_id` - The student
/// * `has_live_enrollment` - Whether a non-cancelled enrollment already exists
///   for (student, course, schedule)
///
/// # Errors
///
/// Returns `ScheduleCourseMismatch`, `AlreadyEnrolled`, `ScheduleInactive` or
/// `ScheduleFull`.
pub const fn check_enrollment_eligibility(
    schedule: &TrainingSchedule,
    course_id: i64,
    user_id: i64,
    has_live_enrollment: bool,
) -> Result<(), DomainError> {
    if schedule.course_id != course_id {
        return Err(DomainError::ScheduleCourseMismatch {
            schedule_id: schedule.schedule_id,
            course_id,
        });
    }
    if has_live_enrollment {
        return Err(DomainError::AlreadyEnrolled {
            user_id,
            course_id,
            schedule_id: schedule.schedule_id,
        });
    }
    if !schedule.is_active {
        return Err(DomainError::ScheduleInactive {
            schedule_id: schedule.schedule_id,
        });
    }
    if schedule.is_full() {
        return Err(DomainError::ScheduleFull {
            schedule_id: schedule.schedule_id,
            available_seats: schedule.available_seats,
        });
    }
    Ok(())
}
