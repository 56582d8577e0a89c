// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Persistence layer for the class application workflow.
//!
//! Built on Diesel with the `SQLite` backend. Applications, their course
//! lines, rosters and enrollments live in the same database as the
//! collaborator records the workflow reads (accounts, courses, schedules,
//! cart items), so a submission can update all of them in one transaction.
//!
//! ## Storage Rules
//!
//! - An application number is `NULL` until submission; a partial unique
//!   index covers present values only.
//! - A partial unique index on `(owner_id) WHERE status = 'draft'` keeps
//!   one draft per owner.
//! - A partial unique index over non-cancelled enrollments rejects a second
//!   live enrollment for the same student and offering.
//! - Seats are taken with a conditional `UPDATE` whose affected-row count
//!   decides success.
//!
//! ## Testing
//!
//! Each `new_in_memory()` call gets its own shared-cache in-memory
//! database, so tests never observe each other.

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
#![allow(clippy::multiple_crate_versions)]

use class_apply::PlannedEnrollment;
use class_apply_domain::{Account, Application, ApplicationStatus, Enrollment, TrainingSchedule};
use diesel::SqliteConnection;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

mod backend;
mod data_models;
mod diesel_schema;
mod error;
mod mutations;
mod queries;

#[cfg(test)]
mod tests;

pub use data_models::{CartCourse, PendingUpload, RosterUploadData};
pub use error::PersistenceError;

use backend::PersistenceBackend;

/// Atomic counter for generating unique in-memory database names.
///
/// Each call to `new_in_memory()` receives a unique sequential ID.
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Persistence adapter for class applications and their collaborators.
pub struct Persistence {
    pub(crate) conn: SqliteConnection,
}

impl Persistence {
    /// Creates a new persistence adapter with an in-memory `SQLite` database.
    ///
    /// Each call receives a unique database instance via atomic counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn new_in_memory() -> Result<Self, PersistenceError> {
        let db_id: u64 = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let shared_memory_url: String = format!("file:memdb_test_{db_id}?mode=memory&cache=shared");

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(&shared_memory_url)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Creates a new persistence adapter with a file-based `SQLite` database.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the `SQLite` database file
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn new_with_file<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let path_str: &str = path.as_ref().to_str().ok_or_else(|| {
            PersistenceError::InitializationError("Invalid database path".to_string())
        })?;

        let mut conn: SqliteConnection = backend::sqlite::initialize_database(path_str)?;
        backend::sqlite::enable_wal_mode(&mut conn)?;
        conn.verify_foreign_key_enforcement()?;

        Ok(Self { conn })
    }

    /// Verifies that foreign key enforcement is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if foreign key enforcement is not enabled.
    pub fn verify_foreign_key_enforcement(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_foreign_key_enforcement()
    }

    /// Verifies the partial unique indexes the workflow depends on.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::MissingIndex` if one is absent.
    pub fn verify_partial_indexes(&mut self) -> Result<(), PersistenceError> {
        self.conn.verify_partial_indexes()
    }

    // ========================================================================
    // Collaborators
    // ========================================================================

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the email is already registered.
    pub fn create_account(
        &mut self,
        name: &str,
        email: &str,
        phone: &str,
    ) -> Result<i64, PersistenceError> {
        mutations::create_account(&mut self.conn, name, email, phone)
    }

    /// Creates a purchasable course.
    ///
    /// # Errors
    ///
    /// Returns an error if the prices are invalid.
    pub fn create_course(
        &mut self,
        name: &str,
        price: i64,
        discounted_price: i64,
    ) -> Result<i64, PersistenceError> {
        mutations::create_course(&mut self.conn, name, price, discounted_price)
    }

    /// Marks a course as purchasable or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the course does not exist.
    pub fn set_course_purchasable(
        &mut self,
        course_id: i64,
        purchasable: bool,
    ) -> Result<(), PersistenceError> {
        mutations::set_course_purchasable(&mut self.conn, course_id, purchasable)
    }

    /// Creates a schedule for a course.
    ///
    /// # Errors
    ///
    /// Returns an error if the course does not exist.
    pub fn create_schedule(
        &mut self,
        course_id: i64,
        start_date: &str,
        end_date: &str,
        available_seats: u32,
    ) -> Result<i64, PersistenceError> {
        mutations::create_schedule(&mut self.conn, course_id, start_date, end_date, available_seats)
    }

    /// Opens or closes a schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the schedule does not exist.
    pub fn set_schedule_active(
        &mut self,
        schedule_id: i64,
        is_active: bool,
    ) -> Result<(), PersistenceError> {
        mutations::set_schedule_active(&mut self.conn, schedule_id, is_active)
    }

    /// Adds a course offering to the owner's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the course is already in the cart.
    pub fn add_to_cart(
        &mut self,
        owner_id: i64,
        course_id: i64,
        schedule_id: i64,
    ) -> Result<i64, PersistenceError> {
        mutations::add_to_cart(&mut self.conn, owner_id, course_id, schedule_id)
    }

    /// Removes courses from the owner's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the database delete fails.
    pub fn remove_cart_courses(
        &mut self,
        owner_id: i64,
        course_ids: &[i64],
    ) -> Result<usize, PersistenceError> {
        mutations::remove_cart_courses(&mut self.conn, owner_id, course_ids)
    }

    /// Finds an account by email (trimmed, case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn find_account_by_email(
        &mut self,
        email: &str,
    ) -> Result<Option<Account>, PersistenceError> {
        queries::find_account_by_email(&mut self.conn, email)
    }

    /// Retrieves an account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn get_account(&mut self, user_id: i64) -> Result<Option<Account>, PersistenceError> {
        queries::get_account(&mut self.conn, user_id)
    }

    /// Retrieves a schedule with current counters.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the schedule does not exist.
    pub fn get_schedule(&mut self, schedule_id: i64) -> Result<TrainingSchedule, PersistenceError> {
        queries::get_schedule(&mut self.conn, schedule_id)
    }

    /// Returns whether the student holds a live enrollment for the offering.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn has_live_enrollment(
        &mut self,
        student_user_id: i64,
        course_id: i64,
        schedule_id: i64,
    ) -> Result<bool, PersistenceError> {
        queries::has_live_enrollment(&mut self.conn, student_user_id, course_id, schedule_id)
    }

    /// Resolves requested course ids against the owner's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn resolve_cart_courses(
        &mut self,
        owner_id: i64,
        course_ids: &[i64],
    ) -> Result<Vec<CartCourse>, PersistenceError> {
        queries::resolve_cart_courses(&mut self.conn, owner_id, course_ids)
    }

    /// Lists the course ids in the owner's cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_cart_course_ids(&mut self, owner_id: i64) -> Result<Vec<i64>, PersistenceError> {
        queries::list_cart_course_ids(&mut self.conn, owner_id)
    }

    // ========================================================================
    // Applications
    // ========================================================================

    /// Finds the owner's draft, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn find_draft_for_owner(
        &mut self,
        owner_id: i64,
    ) -> Result<Option<Application>, PersistenceError> {
        queries::find_draft_for_owner(&mut self.conn, owner_id)
    }

    /// Retrieves an application.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the application does not exist.
    pub fn get_application(&mut self, application_id: i64) -> Result<Application, PersistenceError> {
        queries::get_application(&mut self.conn, application_id)
    }

    /// Lists the owner's applications, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_applications_for_owner(
        &mut self,
        owner_id: i64,
    ) -> Result<Vec<Application>, PersistenceError> {
        queries::list_applications_for_owner(&mut self.conn, owner_id)
    }

    /// Lists an application's enrollments.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub fn list_enrollments_for_application(
        &mut self,
        application_id: i64,
    ) -> Result<Vec<Enrollment>, PersistenceError> {
        queries::list_enrollments_for_application(&mut self.conn, application_id)
    }

    /// Retrieves a stored roster file.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the upload does not exist.
    pub fn get_roster_upload(&mut self, upload_id: i64) -> Result<RosterUploadData, PersistenceError> {
        queries::get_roster_upload(&mut self.conn, upload_id)
    }

    /// Returns the stored application number column as-is.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::NotFound` if the application does not exist.
    pub fn get_raw_application_number(
        &mut self,
        application_id: i64,
    ) -> Result<Option<String>, PersistenceError> {
        queries::get_raw_application_number(&mut self.conn, application_id)
    }

    /// Stores a draft, creating it if new.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft cannot be stored.
    pub fn save_draft(
        &mut self,
        application: &Application,
        pending_upload: Option<&PendingUpload>,
    ) -> Result<Application, PersistenceError> {
        mutations::save_draft(&mut self.conn, application, pending_upload)
    }

    /// Commits a submission with its enrollments in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `SeatsExhausted`, `DuplicateEnrollment` or `StaleApplication`
    /// when the submission cannot be applied; nothing is written in that case.
    pub fn commit_submission(
        &mut self,
        application: &Application,
        plan: &[PlannedEnrollment],
        enrolled_at: &str,
    ) -> Result<Vec<i64>, PersistenceError> {
        mutations::commit_submission(&mut self.conn, application, plan, enrolled_at)
    }

    /// Commits a cancellation and cascades it to enrollments.
    ///
    /// # Errors
    ///
    /// Returns `StaleApplication` if the stored status changed.
    pub fn commit_cancellation(
        &mut self,
        application: &Application,
        previous_status: ApplicationStatus,
    ) -> Result<usize, PersistenceError> {
        mutations::commit_cancellation(&mut self.conn, application, previous_status)
    }

    /// Commits a completion.
    ///
    /// # Errors
    ///
    /// Returns `StaleApplication` if the stored application is not submitted.
    pub fn commit_completion(&mut self, application: &Application) -> Result<(), PersistenceError> {
        mutations::commit_completion(&mut self.conn, application)
    }

    /// Stores a payment status reported by the payment collaborator.
    ///
    /// # Errors
    ///
    /// Returns `StaleApplication` if the stored status changed.
    pub fn record_payment_status(
        &mut self,
        application: &Application,
    ) -> Result<(), PersistenceError> {
        mutations::record_payment_status(&mut self.conn, application)
    }
}
