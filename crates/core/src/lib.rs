// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod apply;
mod command;
mod error;
mod fanout;
mod state;

#[cfg(test)]
mod tests;

use class_apply_domain::{Application, DomainError};

// Re-export public types and functions
pub use apply::{apply, open_draft};
pub use command::Command;
pub use error::CoreError;
pub use fanout::{PlannedEnrollment, plan_enrollments, seat_demand};
pub use state::{Action, DraftResult, TransitionResult};

/// Validates that an application belongs to the caller.
///
/// This is a read-only check; it does not change the application.
///
/// # Errors
///
/// Returns `CoreError::OwnerMismatch` if `owner_id` is not the owner.
pub const fn validate_owner(application: &Application, owner_id: i64) -> Result<(), CoreError> {
    if application.owner_id != owner_id {
        return Err(CoreError::OwnerMismatch {
            expected: owner_id,
            actual: application.owner_id,
        });
    }
    Ok(())
}

/// Validates that a course belongs to the application.
///
/// # Errors
///
/// Returns `DomainError::CourseLineNotFound` if no line exists for the course.
pub fn validate_course_line_exists(
    application: &Application,
    course_id: i64,
) -> Result<(), DomainError> {
    if application.course_line(course_id).is_none() {
        return Err(DomainError::CourseLineNotFound { course_id });
    }
    Ok(())
}
