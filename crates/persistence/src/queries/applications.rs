// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Application, roster and enrollment queries.
//!
//! An application is stored across `applications`, `course_lines`,
//! `student_entries` and `roster_uploads`; these queries reassemble it.

use class_apply_domain::{
    Agreements, Application, ApplicationStatus, BulkUploadRef, CourseLine, Enrollment,
    EnrollmentStatus, PaymentInfo, PaymentMethod, PaymentStatus, Roster, RosterMode,
    StudentEntry,
};
use diesel::SqliteConnection;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use std::str::FromStr;
use tracing::debug;

use crate::data_models::{
    ApplicationRow, CourseLineRow, EnrollmentRow, RosterUploadData, RosterUploadRow,
    StudentEntryRow,
};
use crate::diesel_schema::{applications, course_lines, enrollments, roster_uploads, student_entries};
use crate::error::PersistenceError;

fn corrupt<E: std::fmt::Display>(err: E) -> PersistenceError {
    PersistenceError::CorruptRow(err.to_string())
}

fn to_student(row: StudentEntryRow) -> StudentEntry {
    StudentEntry {
        user_id: row.user_id,
        name: row.name,
        phone: row.phone,
        email: row.email,
        company: row.company,
        position: row.position,
    }
}

fn to_upload_ref(row: RosterUploadRow) -> Result<BulkUploadRef, PersistenceError> {
    let row_count: usize = row
        .row_count
        .to_usize()
        .ok_or_else(|| corrupt(format!("upload {} has negative row_count", row.upload_id)))?;
    Ok(BulkUploadRef {
        upload_id: Some(row.upload_id),
        file_name: row.file_name,
        row_count,
        uploaded_at: row.uploaded_at,
    })
}

fn load_roster(
    conn: &mut SqliteConnection,
    line: &CourseLineRow,
) -> Result<Roster, PersistenceError> {
    let mode: RosterMode = RosterMode::from_str(&line.roster_mode).map_err(corrupt)?;
    let students: Vec<StudentEntry> = student_entries::table
        .filter(student_entries::course_line_id.eq(line.course_line_id))
        .order(student_entries::sort_order.asc())
        .select(StudentEntryRow::as_select())
        .load(conn)?
        .into_iter()
        .map(to_student)
        .collect();

    match mode {
        RosterMode::Empty => Ok(Roster::Empty),
        RosterMode::Individual => Ok(Roster::Individual { students }),
        RosterMode::Bulk => {
            let upload_id: i64 = line.roster_upload_id.ok_or_else(|| {
                corrupt(format!(
                    "bulk course line {} has no upload",
                    line.course_line_id
                ))
            })?;
            let upload: RosterUploadRow = roster_uploads::table
                .filter(roster_uploads::upload_id.eq(upload_id))
                .select(RosterUploadRow::as_select())
                .first(conn)?;
            Ok(Roster::Bulk {
                upload: to_upload_ref(upload)?,
                students,
            })
        }
    }
}

fn load_course_lines(
    conn: &mut SqliteConnection,
    application_id: i64,
) -> Result<Vec<CourseLine>, PersistenceError> {
    let rows: Vec<CourseLineRow> = course_lines::table
        .filter(course_lines::application_id.eq(application_id))
        .order(course_lines::sort_order.asc())
        .select(CourseLineRow::as_select())
        .load(conn)?;

    let mut lines: Vec<CourseLine> = Vec::with_capacity(rows.len());
    for row in rows {
        let roster: Roster = load_roster(conn, &row)?;
        lines.push(CourseLine {
            course_line_id: Some(row.course_line_id),
            course_id: row.course_id,
            schedule_id: row.schedule_id,
            course_name: row.course_name,
            period: row.period,
            price: row.price,
            discounted_price: row.discounted_price,
            roster,
        });
    }
    Ok(lines)
}

fn to_application(
    conn: &mut SqliteConnection,
    row: ApplicationRow,
) -> Result<Application, PersistenceError> {
    let status: ApplicationStatus = ApplicationStatus::from_str(&row.status).map_err(corrupt)?;
    let payment_method: Option<PaymentMethod> = row
        .payment_method
        .as_deref()
        .map(PaymentMethod::from_str)
        .transpose()
        .map_err(corrupt)?;
    let payment_status: PaymentStatus =
        PaymentStatus::from_str(&row.payment_status).map_err(corrupt)?;
    let course_lines: Vec<CourseLine> = load_course_lines(conn, row.application_id)?;

    Ok(Application {
        application_id: Some(row.application_id),
        application_number: row.application_number,
        owner_id: row.owner_id,
        status,
        course_lines,
        payment: PaymentInfo {
            payment_method,
            total_amount: row.total_amount,
            payment_status,
            tax_invoice: row.tax_invoice != 0,
        },
        agreements: Agreements::new(row.agree_purchase_terms != 0, row.agree_refund_policy != 0),
        created_at: row.created_at,
        submitted_at: row.submitted_at,
        cancelled_at: row.cancelled_at,
        cancellation_reason: row.cancellation_reason,
    })
}

/// Retrieves an application with its lines and rosters.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the application does not exist.
pub fn get_application(
    conn: &mut SqliteConnection,
    application_id: i64,
) -> Result<Application, PersistenceError> {
    debug!(application_id, "Loading application");

    let row: Option<ApplicationRow> = applications::table
        .filter(applications::application_id.eq(application_id))
        .select(ApplicationRow::as_select())
        .first(conn)
        .optional()?;

    match row {
        Some(row) => to_application(conn, row),
        None => Err(PersistenceError::NotFound(format!(
            "Application {application_id} not found"
        ))),
    }
}

/// Finds the owner's draft, if any.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn find_draft_for_owner(
    conn: &mut SqliteConnection,
    owner_id: i64,
) -> Result<Option<Application>, PersistenceError> {
    let row: Option<ApplicationRow> = applications::table
        .filter(applications::owner_id.eq(owner_id))
        .filter(applications::status.eq(ApplicationStatus::Draft.as_str()))
        .select(ApplicationRow::as_select())
        .first(conn)
        .optional()?;

    row.map(|row| to_application(conn, row)).transpose()
}

/// Lists the owner's applications, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_applications_for_owner(
    conn: &mut SqliteConnection,
    owner_id: i64,
) -> Result<Vec<Application>, PersistenceError> {
    let rows: Vec<ApplicationRow> = applications::table
        .filter(applications::owner_id.eq(owner_id))
        .order(applications::application_id.desc())
        .select(ApplicationRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| to_application(conn, row))
        .collect()
}

/// Lists every enrollment created for an application, in creation order.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_enrollments_for_application(
    conn: &mut SqliteConnection,
    application_id: i64,
) -> Result<Vec<Enrollment>, PersistenceError> {
    let rows: Vec<EnrollmentRow> = enrollments::table
        .filter(enrollments::application_id.eq(application_id))
        .order(enrollments::enrollment_id.asc())
        .select(EnrollmentRow::as_select())
        .load(conn)?;

    rows.into_iter()
        .map(|row| {
            Ok(Enrollment {
                enrollment_id: row.enrollment_id,
                application_id: row.application_id,
                course_line_id: row.course_line_id,
                course_id: row.course_id,
                schedule_id: row.schedule_id,
                student_user_id: row.student_user_id,
                status: EnrollmentStatus::from_str(&row.status).map_err(corrupt)?,
                enrolled_at: row.enrolled_at,
                cancelled_at: row.cancelled_at,
                cancellation_reason: row.cancellation_reason,
            })
        })
        .collect()
}

/// Retrieves a stored roster file.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the upload does not exist.
pub fn get_roster_upload(
    conn: &mut SqliteConnection,
    upload_id: i64,
) -> Result<RosterUploadData, PersistenceError> {
    let row: Option<RosterUploadRow> = roster_uploads::table
        .filter(roster_uploads::upload_id.eq(upload_id))
        .select(RosterUploadRow::as_select())
        .first(conn)
        .optional()?;

    row.map(|row| RosterUploadData {
        upload_id: row.upload_id,
        application_id: row.application_id,
        course_id: row.course_id,
        file_name: row.file_name,
        content: row.content,
        row_count: row.row_count,
        uploaded_at: row.uploaded_at,
    })
    .ok_or_else(|| PersistenceError::NotFound(format!("Roster upload {upload_id} not found")))
}

/// Returns the raw application number column, for storage-level checks.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the application does not exist.
pub fn get_raw_application_number(
    conn: &mut SqliteConnection,
    application_id: i64,
) -> Result<Option<String>, PersistenceError> {
    Ok(applications::table
        .filter(applications::application_id.eq(application_id))
        .select(applications::application_number)
        .first(conn)?)
}
