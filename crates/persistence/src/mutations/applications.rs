// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Application mutations.
//!
//! Every function here runs as one `BEGIN IMMEDIATE` transaction. Status
//! changes are guarded by the expected prior status so a concurrent writer
//! surfaces as `StaleApplication` instead of a lost update.

use class_apply::{PlannedEnrollment, seat_demand};
use class_apply_domain::{
    Application, ApplicationStatus, BulkUploadRef, CourseLine, EnrollmentStatus, PaymentMethod,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::{NewCourseLine, NewEnrollment, NewStudentEntry, PendingUpload};
use crate::diesel_schema::{applications, course_lines, enrollments, roster_uploads, student_entries};
use crate::error::PersistenceError;
use crate::mutations::catalog::{increment_enrolled_count, release_seat, remove_cart_courses};
use crate::queries::applications::get_application;
use crate::queries::catalog::has_live_enrollment;

fn to_i32(value: usize, what: &str) -> Result<i32, PersistenceError> {
    value
        .to_i32()
        .ok_or_else(|| PersistenceError::QueryFailed(format!("{what} {value} out of range")))
}

fn require_id(application: &Application) -> Result<i64, PersistenceError> {
    application
        .application_id
        .ok_or_else(|| PersistenceError::QueryFailed(String::from("application has no id")))
}

fn insert_roster_upload(
    conn: &mut SqliteConnection,
    application: &Application,
    application_id: i64,
    pending: &PendingUpload,
) -> Result<i64, PersistenceError> {
    let upload: &BulkUploadRef = application
        .course_line(pending.course_id)
        .and_then(|line| line.roster.upload())
        .ok_or_else(|| {
            PersistenceError::QueryFailed(format!(
                "course {} has no bulk roster to store",
                pending.course_id
            ))
        })?;
    let row_count: i32 = to_i32(upload.row_count, "row count")?;

    diesel::insert_into(roster_uploads::table)
        .values((
            roster_uploads::application_id.eq(application_id),
            roster_uploads::course_id.eq(pending.course_id),
            roster_uploads::file_name.eq(&upload.file_name),
            roster_uploads::content.eq(&pending.content),
            roster_uploads::row_count.eq(row_count),
            roster_uploads::uploaded_at.eq(&upload.uploaded_at),
        ))
        .execute(conn)?;

    let upload_id: i64 = conn.get_last_insert_rowid()?;
    info!(
        upload_id,
        application_id,
        course_id = pending.course_id,
        row_count,
        "Stored roster upload"
    );
    Ok(upload_id)
}

fn insert_course_line(
    conn: &mut SqliteConnection,
    application_id: i64,
    index: usize,
    line: &CourseLine,
    roster_upload_id: Option<i64>,
) -> Result<(), PersistenceError> {
    diesel::insert_into(course_lines::table)
        .values(&NewCourseLine {
            application_id,
            sort_order: to_i32(index, "sort order")?,
            course_id: line.course_id,
            schedule_id: line.schedule_id,
            course_name: &line.course_name,
            period: &line.period,
            price: line.price,
            discounted_price: line.discounted_price,
            roster_mode: line.roster.mode().as_str(),
            roster_upload_id,
        })
        .execute(conn)?;
    let course_line_id: i64 = conn.get_last_insert_rowid()?;

    for (position, student) in line.roster.students().iter().enumerate() {
        diesel::insert_into(student_entries::table)
            .values(&NewStudentEntry {
                course_line_id,
                sort_order: to_i32(position, "sort order")?,
                user_id: student.user_id,
                name: &student.name,
                phone: &student.phone,
                email: &student.email,
                company: student.company.as_deref(),
                position: student.position.as_deref(),
            })
            .execute(conn)?;
    }
    Ok(())
}

/// Stores a draft application, creating it if it has no id yet.
///
/// Course lines and rosters are rewritten in full. When `pending_upload` is
/// given, its file is stored first and linked to the bulk roster of its
/// course line.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `application` - The draft to store
/// * `pending_upload` - A newly ingested roster file, if any
///
/// # Returns
///
/// The stored application, reloaded with assigned ids.
///
/// # Errors
///
/// Returns an error if:
/// - The application is not a draft
/// - The stored application is no longer a draft (`StaleApplication`)
/// - The owner already has another draft (`UniqueViolation`)
pub fn save_draft(
    conn: &mut SqliteConnection,
    application: &Application,
    pending_upload: Option<&PendingUpload>,
) -> Result<Application, PersistenceError> {
    if application.status != ApplicationStatus::Draft {
        return Err(PersistenceError::QueryFailed(format!(
            "cannot save a {} application as a draft",
            application.status
        )));
    }

    conn.immediate_transaction(|conn| {
        let payment_method: Option<&str> = application
            .payment
            .payment_method
            .as_ref()
            .map(PaymentMethod::as_str);

        let application_id: i64 = if let Some(application_id) = application.application_id {
            let updated: usize = diesel::update(applications::table)
                .filter(applications::application_id.eq(application_id))
                .filter(applications::status.eq(ApplicationStatus::Draft.as_str()))
                .set((
                    applications::payment_method.eq(payment_method),
                    applications::total_amount.eq(application.payment.total_amount),
                    applications::payment_status.eq(application.payment.payment_status.as_str()),
                    applications::tax_invoice.eq(i32::from(application.payment.tax_invoice)),
                ))
                .execute(conn)?;
            if updated != 1 {
                return Err(PersistenceError::StaleApplication { application_id });
            }
            application_id
        } else {
            diesel::insert_into(applications::table)
                .values((
                    applications::owner_id.eq(application.owner_id),
                    applications::status.eq(ApplicationStatus::Draft.as_str()),
                    applications::payment_method.eq(payment_method),
                    applications::total_amount.eq(application.payment.total_amount),
                    applications::payment_status.eq(application.payment.payment_status.as_str()),
                    applications::tax_invoice.eq(i32::from(application.payment.tax_invoice)),
                    applications::created_at.eq(&application.created_at),
                ))
                .execute(conn)?;
            let application_id: i64 = conn.get_last_insert_rowid()?;
            info!(application_id, owner_id = application.owner_id, "Created draft");
            application_id
        };

        let pending_upload_id: Option<(i64, i64)> = match pending_upload {
            Some(pending) => Some((
                pending.course_id,
                insert_roster_upload(conn, application, application_id, pending)?,
            )),
            None => None,
        };

        diesel::delete(course_lines::table.filter(course_lines::application_id.eq(application_id)))
            .execute(conn)?;

        for (index, line) in application.course_lines.iter().enumerate() {
            let roster_upload_id: Option<i64> = match (line.roster.upload(), pending_upload_id) {
                (Some(_), Some((course_id, upload_id))) if course_id == line.course_id => {
                    Some(upload_id)
                }
                (Some(upload), _) => Some(upload.upload_id.ok_or_else(|| {
                    PersistenceError::QueryFailed(format!(
                        "bulk roster for course {} has no stored file",
                        line.course_id
                    ))
                })?),
                (None, _) => None,
            };
            insert_course_line(conn, application_id, index, line, roster_upload_id)?;
        }

        debug!(
            application_id,
            lines = application.course_lines.len(),
            students = application.total_students(),
            "Saved draft"
        );

        get_application(conn, application_id)
    })
}

/// Commits a submission: status, number, agreements, enrollments, seats and cart.
///
/// Runs as one transaction; any failure leaves no trace.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `application` - The application as it should look after submission
/// * `plan` - The enrollments to create
/// * `enrolled_at` - Timestamp for the new enrollments (RFC 3339)
///
/// # Returns
///
/// The ids of the created enrollments, in plan order.
///
/// # Errors
///
/// Returns an error if:
/// - The stored application is no longer a draft (`StaleApplication`)
/// - A student already holds a live enrollment (`DuplicateEnrollment`)
/// - A schedule is full or inactive (`SeatsExhausted`)
pub fn commit_submission(
    conn: &mut SqliteConnection,
    application: &Application,
    plan: &[PlannedEnrollment],
    enrolled_at: &str,
) -> Result<Vec<i64>, PersistenceError> {
    let application_id: i64 = require_id(application)?;
    let application_number: &str = application.application_number.as_deref().ok_or_else(|| {
        PersistenceError::QueryFailed(String::from("submitted application has no number"))
    })?;

    conn.immediate_transaction(|conn| {
        let updated: usize = diesel::update(applications::table)
            .filter(applications::application_id.eq(application_id))
            .filter(applications::status.eq(ApplicationStatus::Draft.as_str()))
            .set((
                applications::status.eq(ApplicationStatus::Submitted.as_str()),
                applications::application_number.eq(application_number),
                applications::submitted_at.eq(application.submitted_at.as_deref()),
                applications::agree_purchase_terms
                    .eq(i32::from(application.agreements.purchase_terms)),
                applications::agree_refund_policy
                    .eq(i32::from(application.agreements.refund_policy)),
            ))
            .execute(conn)?;
        if updated != 1 {
            return Err(PersistenceError::StaleApplication { application_id });
        }

        for (schedule_id, seats) in seat_demand(plan) {
            debug!(application_id, schedule_id, seats, "Taking seats");
        }

        let mut enrollment_ids: Vec<i64> = Vec::with_capacity(plan.len());
        for planned in plan {
            let duplicate: PersistenceError = PersistenceError::DuplicateEnrollment {
                student_user_id: planned.student_user_id,
                course_id: planned.course_id,
                schedule_id: planned.schedule_id,
            };
            if has_live_enrollment(
                conn,
                planned.student_user_id,
                planned.course_id,
                planned.schedule_id,
            )? {
                return Err(duplicate);
            }

            increment_enrolled_count(conn, planned.schedule_id)?;

            diesel::insert_into(enrollments::table)
                .values(&NewEnrollment {
                    application_id,
                    course_line_id: planned.course_line_id,
                    course_id: planned.course_id,
                    schedule_id: planned.schedule_id,
                    student_user_id: planned.student_user_id,
                    status: EnrollmentStatus::Enrolled.as_str(),
                    enrolled_at,
                })
                .execute(conn)
                .map_err(|e| match PersistenceError::from(e) {
                    PersistenceError::UniqueViolation(_) => duplicate.clone(),
                    other => other,
                })?;
            enrollment_ids.push(conn.get_last_insert_rowid()?);
        }

        remove_cart_courses(conn, application.owner_id, &application.course_ids())?;

        info!(
            application_id,
            application_number,
            enrollments = enrollment_ids.len(),
            "Committed submission"
        );
        Ok(enrollment_ids)
    })
}

/// Commits a cancellation and cascades it to the application's enrollments.
///
/// Every non-cancelled enrollment becomes `cancelled` with the same reason
/// and timestamp. Seats held by `enrolled` rows are released.
///
/// # Arguments
///
/// * `conn` - The database connection
/// * `application` - The application as it should look after cancellation
/// * `previous_status` - The status the stored row must still have
///
/// # Returns
///
/// The number of enrollments cancelled.
///
/// # Errors
///
/// Returns `StaleApplication` if the stored status is not `previous_status`.
pub fn commit_cancellation(
    conn: &mut SqliteConnection,
    application: &Application,
    previous_status: ApplicationStatus,
) -> Result<usize, PersistenceError> {
    let application_id: i64 = require_id(application)?;
    let cancelled_status: &str = EnrollmentStatus::Cancelled.as_str();

    conn.immediate_transaction(|conn| {
        let updated: usize = diesel::update(applications::table)
            .filter(applications::application_id.eq(application_id))
            .filter(applications::status.eq(previous_status.as_str()))
            .set((
                applications::status.eq(ApplicationStatus::Cancelled.as_str()),
                applications::cancelled_at.eq(application.cancelled_at.as_deref()),
                applications::cancellation_reason.eq(application.cancellation_reason.as_deref()),
            ))
            .execute(conn)?;
        if updated != 1 {
            return Err(PersistenceError::StaleApplication { application_id });
        }

        let seat_holders: Vec<i64> = enrollments::table
            .filter(enrollments::application_id.eq(application_id))
            .filter(enrollments::status.eq(EnrollmentStatus::Enrolled.as_str()))
            .select(enrollments::schedule_id)
            .load(conn)?;
        for schedule_id in &seat_holders {
            release_seat(conn, *schedule_id)?;
        }

        let cancelled: usize = diesel::update(enrollments::table)
            .filter(enrollments::application_id.eq(application_id))
            .filter(enrollments::status.ne(cancelled_status))
            .set((
                enrollments::status.eq(cancelled_status),
                enrollments::cancelled_at.eq(application.cancelled_at.as_deref()),
                enrollments::cancellation_reason.eq(application.cancellation_reason.as_deref()),
            ))
            .execute(conn)?;

        info!(
            application_id,
            from = %previous_status,
            cancelled_enrollments = cancelled,
            released_seats = seat_holders.len(),
            "Committed cancellation"
        );
        Ok(cancelled)
    })
}

/// Marks a submitted application as completed.
///
/// # Errors
///
/// Returns `StaleApplication` if the stored application is not `submitted`.
pub fn commit_completion(
    conn: &mut SqliteConnection,
    application: &Application,
) -> Result<(), PersistenceError> {
    let application_id: i64 = require_id(application)?;

    conn.immediate_transaction(|conn| {
        let updated: usize = diesel::update(applications::table)
            .filter(applications::application_id.eq(application_id))
            .filter(applications::status.eq(ApplicationStatus::Submitted.as_str()))
            .set(applications::status.eq(ApplicationStatus::Completed.as_str()))
            .execute(conn)?;
        if updated != 1 {
            return Err(PersistenceError::StaleApplication { application_id });
        }
        info!(application_id, "Committed completion");
        Ok(())
    })
}

/// Stores the payment status reported for an application.
///
/// # Errors
///
/// Returns `StaleApplication` if the stored status differs from the one the
/// caller loaded.
pub fn record_payment_status(
    conn: &mut SqliteConnection,
    application: &Application,
) -> Result<(), PersistenceError> {
    let application_id: i64 = require_id(application)?;
    let payment_status: &str = application.payment.payment_status.as_str();

    conn.immediate_transaction(|conn| {
        let updated: usize = diesel::update(applications::table)
            .filter(applications::application_id.eq(application_id))
            .filter(applications::status.eq(application.status.as_str()))
            .set(applications::payment_status.eq(payment_status))
            .execute(conn)?;
        if updated != 1 {
            return Err(PersistenceError::StaleApplication { application_id });
        }
        info!(application_id, payment_status, "Recorded payment status");
        Ok(())
    })
}
