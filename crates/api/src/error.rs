// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use class_apply::CoreError;
use class_apply_domain::DomainError;
use class_apply_persistence::PersistenceError;

use crate::roster::RosterRowError;

/// Stable error kinds exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed or missing input.
    InvalidInput,
    /// The referenced resource does not exist.
    NotFound,
    /// The request conflicts with current state.
    Conflict,
    /// The caller does not own the resource.
    Forbidden,
    /// A business validation failed; see the sub-reason.
    ValidationFailed,
    /// Storage or invariant fault.
    Internal,
}

impl ErrorKind {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::NotFound => "not_found",
            Self::Conflict => "conflict",
            Self::Forbidden => "forbidden",
            Self::ValidationFailed => "validation_failed",
            Self::Internal => "internal",
        }
    }
}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Invalid input was provided.
    #[error("Invalid input for field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    #[error("{resource_type} not found: {message}")]
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// The request conflicts with the current state.
    #[error("Conflict ({rule}): {message}")]
    Conflict {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the conflict.
        message: String,
    },
    /// The caller may not act on the resource.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// A human-readable description.
        message: String,
    },
    /// A business validation failed.
    #[error("Validation failed ({reason}): {message}")]
    ValidationFailed {
        /// Stable sub-reason, e.g. `phone_mismatch`.
        reason: String,
        /// A human-readable description.
        message: String,
    },
    /// A roster file was rejected; every invalid row is listed.
    #[error("Roster rejected: {} invalid row(s)", rows.len())]
    RosterRejected {
        /// The invalid rows.
        rows: Vec<RosterRowError>,
    },
    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl ApiError {
    /// Returns the stable kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::ResourceNotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::ValidationFailed { .. } | Self::RosterRejected { .. } => {
                ErrorKind::ValidationFailed
            }
            Self::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Returns the sub-reason for validation failures.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::ValidationFailed { reason, .. } => Some(reason),
            Self::RosterRejected { .. } => Some("invalid_rows"),
            _ => None,
        }
    }
}

fn invalid_input(field: &str, message: String) -> ApiError {
    ApiError::InvalidInput {
        field: String::from(field),
        message,
    }
}

fn conflict(rule: &str, message: String) -> ApiError {
    ApiError::Conflict {
        rule: String::from(rule),
        message,
    }
}

fn validation_failed(reason: &str, message: String) -> ApiError {
    ApiError::ValidationFailed {
        reason: String::from(reason),
        message,
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    let message: String = err.to_string();
    match err {
        DomainError::InvalidApplicationStatus(_) => invalid_input("status", message),
        DomainError::InvalidEnrollmentStatus(_) => invalid_input("enrollment_status", message),
        DomainError::InvalidPaymentMethod(_) => invalid_input("payment_method", message),
        DomainError::InvalidPaymentStatus(_) => invalid_input("payment_status", message),
        DomainError::InvalidRosterMode(_) => invalid_input("roster_mode", message),
        DomainError::EmptyCourseSelection | DomainError::DuplicateCourseLine { .. } => {
            invalid_input("course_ids", message)
        }
        DomainError::InvalidPrice { .. } => invalid_input("price", message),
        DomainError::MissingCancellationReason => invalid_input("reason", message),
        DomainError::ScheduleCourseMismatch { .. } => invalid_input("schedule_id", message),
        DomainError::InvalidStatusTransition { .. } | DomainError::ApplicationNotDraft { .. } => {
            conflict("application_status", message)
        }
        DomainError::RosterModeConflict { .. } => conflict("roster_mode", message),
        DomainError::IndividualRosterFull { .. } => conflict("individual_cap", message),
        DomainError::DuplicateStudentOnLine { .. } => conflict("duplicate_student", message),
        DomainError::AlreadyEnrolled { .. } => conflict("already_enrolled", message),
        DomainError::ScheduleFull { .. } => conflict("schedule_full", message),
        DomainError::CourseLineNotFound { .. } => ApiError::ResourceNotFound {
            resource_type: String::from("Course line"),
            message,
        },
        DomainError::StudentNotOnLine { .. } => ApiError::ResourceNotFound {
            resource_type: String::from("Student"),
            message,
        },
        DomainError::BulkRosterTooSmall { .. } => validation_failed("bulk_floor", message),
        DomainError::BulkRosterTooLarge { .. } => validation_failed("bulk_ceiling", message),
        DomainError::EmptyRoster { .. } => validation_failed("empty_roster", message),
        DomainError::AgreementRequired { .. } => validation_failed("agreement_required", message),
        DomainError::ScheduleInactive { .. } => validation_failed("schedule_inactive", message),
        DomainError::InvalidStudentField { .. }
        | DomainError::StudentAccountNotFound { .. }
        | DomainError::PhoneMismatch { .. }
        | DomainError::NameMismatch { .. } => {
            let reason: &str = err.identity_reason().unwrap_or("invalid_field");
            validation_failed(reason, message)
        }
        DomainError::AmountOverflow | DomainError::InvalidApplicationNumber => {
            ApiError::Internal { message }
        }
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::OwnerMismatch { .. } => ApiError::Forbidden {
            message: String::from("Application belongs to another user"),
        },
        CoreError::UnpersistedCourseLine { .. } => ApiError::Internal {
            message: err.to_string(),
        },
    }
}

/// Translates a persistence error into an API error.
///
/// Submission races surface as `Conflict`; storage faults as `Internal`.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    let message: String = err.to_string();
    match err {
        PersistenceError::NotFound(_) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message,
        },
        PersistenceError::SeatsExhausted { .. } => conflict("seats_exhausted", message),
        PersistenceError::DuplicateEnrollment { .. } => conflict("duplicate_enrollment", message),
        PersistenceError::StaleApplication { .. } => conflict("stale_application", message),
        PersistenceError::UniqueViolation(_) => conflict("unique_violation", message),
        PersistenceError::DatabaseError(_)
        | PersistenceError::DatabaseConnectionFailed(_)
        | PersistenceError::MigrationFailed(_)
        | PersistenceError::QueryFailed(_)
        | PersistenceError::InitializationError(_)
        | PersistenceError::ForeignKeyEnforcementNotEnabled
        | PersistenceError::MissingIndex(_)
        | PersistenceError::CorruptRow(_) => ApiError::Internal { message },
    }
}
