// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::result::DatabaseErrorKind;

/// Errors that can occur during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// A database error occurred.
    #[error("Database error: {0}")]
    DatabaseError(String),
    /// Database connection failed.
    #[error("Database connection failed: {0}")]
    DatabaseConnectionFailed(String),
    /// Database migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),
    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),
    /// Initialization error.
    #[error("Initialization error: {0}")]
    InitializationError(String),
    /// Foreign key enforcement is not enabled.
    #[error("Foreign key enforcement is not enabled")]
    ForeignKeyEnforcementNotEnabled,
    /// A required index is missing from the schema.
    #[error("Schema is missing index {0}")]
    MissingIndex(String),
    /// A unique constraint rejected the write.
    #[error("Unique constraint violated: {0}")]
    UniqueViolation(String),
    /// A stored value could not be converted into a domain value.
    #[error("Corrupt stored value: {0}")]
    CorruptRow(String),
    /// The requested resource was not found.
    #[error("Not found: {0}")]
    NotFound(String),
    /// The conditional seat increment matched no row.
    #[error("Schedule {schedule_id} has no remaining seats or is not active")]
    SeatsExhausted {
        /// The schedule.
        schedule_id: i64,
    },
    /// A live enrollment already exists for the student and offering.
    #[error(
        "Student {student_user_id} already holds an enrollment for course {course_id} schedule {schedule_id}"
    )]
    DuplicateEnrollment {
        /// The student.
        student_user_id: i64,
        /// The course.
        course_id: i64,
        /// The schedule.
        schedule_id: i64,
    },
    /// The application changed status between read and write.
    #[error("Application {application_id} was modified concurrently")]
    StaleApplication {
        /// The application.
        application_id: i64,
    },
}

impl From<diesel::result::Error> for PersistenceError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => Self::NotFound("Record not found".to_string()),
            diesel::result::Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::UniqueViolation(info.message().to_string())
            }
            _ => Self::DatabaseError(err.to_string()),
        }
    }
}

impl From<diesel::ConnectionError> for PersistenceError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::DatabaseConnectionFailed(err.to_string())
    }
}
