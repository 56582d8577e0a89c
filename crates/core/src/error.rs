// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use class_apply_domain::DomainError;

/// Errors that can occur during state transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A domain rule was violated.
    #[error("Domain violation: {0}")]
    DomainViolation(#[from] DomainError),
    /// An existing application belongs to someone else.
    #[error("Application belongs to owner {actual}, not {expected}")]
    OwnerMismatch {
        /// The caller.
        expected: i64,
        /// The stored owner.
        actual: i64,
    },
    /// A course line has not been stored yet, so it cannot be enrolled against.
    #[error("Course line for course {course_id} has not been persisted")]
    UnpersistedCourseLine {
        /// The course of the line.
        course_id: i64,
    },
}
