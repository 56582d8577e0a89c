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

mod application;
mod error;
mod student_validation;
mod types;

#[cfg(test)]
mod tests;

pub use application::{
    Application, BULK_ROSTER_CEILING, BULK_ROSTER_FLOOR, BulkUploadRef, CourseLine,
    INDIVIDUAL_ROSTER_CAP, Roster, RosterMode, total_amount, validate_bulk_row_count,
};

// Re-export public types
pub use error::DomainError;
pub use student_validation::{
    check_enrollment_eligibility, normalize_email, normalize_phone, validate_candidate_fields,
    verify_student_identity,
};
pub use types::{
    Account, Agreements, ApplicationStatus, Enrollment, EnrollmentStatus, PaymentInfo, PaymentMethod,
    PaymentStatus, StudentCandidate, StudentEntry, TrainingSchedule,
};
