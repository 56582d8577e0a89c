// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use crate::diesel_schema::{
    accounts, applications, course_lines, enrollments, roster_uploads, student_entries,
    training_schedules,
};

/// A cart course resolved into purchasable line data.
///
/// Name and prices come from the catalog; the period comes from the
/// schedule chosen when the course was added to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCourse {
    pub course_id: i64,
    pub schedule_id: i64,
    pub course_name: String,
    pub period: String,
    pub price: i64,
    pub discounted_price: i64,
}

/// A stored roster file, kept for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterUploadData {
    pub upload_id: i64,
    pub application_id: i64,
    pub course_id: i64,
    pub file_name: String,
    pub content: String,
    pub row_count: i32,
    pub uploaded_at: String,
}

/// A roster file waiting to be stored with the draft that references it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    /// The course line the file was attached to.
    pub course_id: i64,
    /// Raw file content.
    pub content: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = accounts)]
pub struct AccountRow {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = training_schedules)]
pub struct ScheduleRow {
    pub schedule_id: i64,
    pub course_id: i64,
    pub start_date: String,
    pub end_date: String,
    pub is_active: i32,
    pub available_seats: i32,
    pub enrolled_count: i32,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = applications)]
pub struct ApplicationRow {
    pub application_id: i64,
    pub owner_id: i64,
    pub application_number: Option<String>,
    pub status: String,
    pub payment_method: Option<String>,
    pub total_amount: i64,
    pub payment_status: String,
    pub tax_invoice: i32,
    pub agree_purchase_terms: i32,
    pub agree_refund_policy: i32,
    pub created_at: String,
    pub submitted_at: Option<String>,
    pub cancelled_at: Option<String>,
    pub cancellation_reason: Option<String>,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = course_lines)]
pub struct CourseLineRow {
    pub course_line_id: i64,
    pub course_id: i64,
    pub schedule_id: i64,
    pub course_name: String,
    pub period: String,
    pub price: i64,
    pub discounted_price: i64,
    pub roster_mode: String,
    pub roster_upload_id: Option<i64>,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = student_entries)]
pub struct StudentEntryRow {
    pub user_id: i64,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub company: Option<String>,
    pub position: Option<String>,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = roster_uploads)]
pub struct RosterUploadRow {
    pub upload_id: i64,
    pub application_id: i64,
    pub course_id: i64,
    pub file_name: String,
    pub content: String,
    pub row_count: i32,
    pub uploaded_at: String,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = enrollments)]
pub struct EnrollmentRow {
    pub enrollment_id: i64,
    pub application_id: i64,
    pub course_line_id: i64,
    pub course_id: i64,
    pub schedule_id: i64,
    pub student_user_id: i64,
    pub status: String,
    pub enrolled_at: String,
    pub cancelled_at: Option<String>,
    pub cancellation_reason: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = course_lines)]
pub struct NewCourseLine<'a> {
    pub application_id: i64,
    pub sort_order: i32,
    pub course_id: i64,
    pub schedule_id: i64,
    pub course_name: &'a str,
    pub period: &'a str,
    pub price: i64,
    pub discounted_price: i64,
    pub roster_mode: &'a str,
    pub roster_upload_id: Option<i64>,
}

#[derive(Insertable)]
#[diesel(table_name = student_entries)]
pub struct NewStudentEntry<'a> {
    pub course_line_id: i64,
    pub sort_order: i32,
    pub user_id: i64,
    pub name: &'a str,
    pub phone: &'a str,
    pub email: &'a str,
    pub company: Option<&'a str>,
    pub position: Option<&'a str>,
}

#[derive(Insertable)]
#[diesel(table_name = enrollments)]
pub struct NewEnrollment<'a> {
    pub application_id: i64,
    pub course_line_id: i64,
    pub course_id: i64,
    pub schedule_id: i64,
    pub student_user_id: i64,
    pub status: &'a str,
    pub enrolled_at: &'a str,
}
