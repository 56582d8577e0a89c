// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use class_apply_domain::{
    Application, BulkUploadRef, CourseLine, Enrollment, PaymentMethod, StudentEntry,
};
use serde::{Deserialize, Serialize};

/// API request to turn cart courses into the caller's draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDraftRequest {
    /// Selected cart course ids.
    pub course_ids: Vec<i64>,
}

/// API request to add one student to a course line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachStudentRequest {
    /// The course line's course.
    pub course_id: i64,
    /// Claimed name.
    pub name: String,
    /// Claimed email.
    pub email: String,
    /// Claimed phone.
    pub phone: String,
    /// Optional company.
    #[serde(default)]
    pub company: Option<String>,
    /// Optional position.
    #[serde(default)]
    pub position: Option<String>,
}

/// API request to remove an individually added student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetachStudentRequest {
    /// The course line's course.
    pub course_id: i64,
    /// The student's account.
    pub user_id: i64,
}

/// API request to attach a roster file to a course line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachBulkRosterRequest {
    /// The course line's course.
    pub course_id: i64,
    /// Original file name.
    pub file_name: String,
    /// Raw CSV content.
    pub content: String,
}

/// API request to record payment metadata.
///
/// Payment status is not accepted here; see `RecordPaymentStatusRequest`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetPaymentInfoRequest {
    /// `card`, `bank_transfer` or `virtual_account`.
    #[serde(default)]
    pub payment_method: Option<String>,
    /// Whether a tax invoice is requested.
    #[serde(default)]
    pub tax_invoice: Option<bool>,
}

/// Payment state reported by the payment collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPaymentStatusRequest {
    /// `pending`, `paid`, `failed` or `refunded`.
    pub payment_status: String,
}

/// API request to submit a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitApplicationRequest {
    /// Purchase terms accepted.
    pub agree_purchase_terms: bool,
    /// Refund policy accepted.
    pub agree_refund_policy: bool,
}

/// API request to cancel an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelApplicationRequest {
    /// Why the application is cancelled.
    pub reason: String,
}

/// API request to validate a claimed student identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateStudentRequest {
    /// Claimed name.
    pub name: String,
    /// Claimed email.
    pub email: String,
    /// Claimed phone.
    pub phone: String,
}

/// API request to check whether a student may enroll in an offering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckEligibilityRequest {
    /// The student's account.
    pub user_id: i64,
    /// The course.
    pub course_id: i64,
    /// The schedule.
    pub schedule_id: i64,
}

/// A student on a course line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentInfo {
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: Option<String>,
    pub position: Option<String>,
}

impl From<&StudentEntry> for StudentInfo {
    fn from(student: &StudentEntry) -> Self {
        Self {
            user_id: student.user_id,
            name: student.name.clone(),
            email: student.email.clone(),
            phone: student.phone.clone(),
            company: student.company.clone(),
            position: student.position.clone(),
        }
    }
}

/// The stored roster file behind a bulk roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUploadInfo {
    pub upload_id: Option<i64>,
    pub file_name: String,
    pub row_count: usize,
    pub uploaded_at: String,
}

impl From<&BulkUploadRef> for BulkUploadInfo {
    fn from(upload: &BulkUploadRef) -> Self {
        Self {
            upload_id: upload.upload_id,
            file_name: upload.file_name.clone(),
            row_count: upload.row_count,
            uploaded_at: upload.uploaded_at.clone(),
        }
    }
}

/// A course line with its roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseLineInfo {
    pub course_line_id: Option<i64>,
    pub course_id: i64,
    pub schedule_id: i64,
    pub course_name: String,
    pub period: String,
    pub price: i64,
    pub discounted_price: i64,
    /// `empty`, `individual` or `bulk`.
    pub roster_mode: String,
    pub students: Vec<StudentInfo>,
    pub bulk_upload: Option<BulkUploadInfo>,
}

impl From<&CourseLine> for CourseLineInfo {
    fn from(line: &CourseLine) -> Self {
        Self {
            course_line_id: line.course_line_id,
            course_id: line.course_id,
            schedule_id: line.schedule_id,
            course_name: line.course_name.clone(),
            period: line.period.clone(),
            price: line.price,
            discounted_price: line.discounted_price,
            roster_mode: line.roster.mode().to_string(),
            students: line.roster.students().iter().map(StudentInfo::from).collect(),
            bulk_upload: line.roster.upload().map(BulkUploadInfo::from),
        }
    }
}

/// API response describing one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationResponse {
    pub application_id: i64,
    /// Absent until submission.
    pub application_number: Option<String>,
    pub owner_id: i64,
    pub status: String,
    pub course_lines: Vec<CourseLineInfo>,
    pub payment_method: Option<String>,
    pub total_amount: i64,
    pub payment_status: String,
    pub tax_invoice: bool,
    pub agree_purchase_terms: bool,
    pub agree_refund_policy: bool,
    pub created_at: String,
    pub submitted_at: Option<String>,
    pub cancelled_at: Option<String>,
    pub cancellation_reason: Option<String>,
}

impl From<&Application> for ApplicationResponse {
    fn from(application: &Application) -> Self {
        Self {
            application_id: application.application_id.unwrap_or_default(),
            application_number: application.application_number.clone(),
            owner_id: application.owner_id,
            status: application.status.to_string(),
            course_lines: application
                .course_lines
                .iter()
                .map(CourseLineInfo::from)
                .collect(),
            payment_method: application
                .payment
                .payment_method
                .as_ref()
                .map(|method: &PaymentMethod| String::from(method.as_str())),
            total_amount: application.payment.total_amount,
            payment_status: String::from(application.payment.payment_status.as_str()),
            tax_invoice: application.payment.tax_invoice,
            agree_purchase_terms: application.agreements.purchase_terms,
            agree_refund_policy: application.agreements.refund_policy,
            created_at: application.created_at.clone(),
            submitted_at: application.submitted_at.clone(),
            cancelled_at: application.cancelled_at.clone(),
            cancellation_reason: application.cancellation_reason.clone(),
        }
    }
}

/// API response for draft creation or update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftResponse {
    /// Whether a new draft was created (as opposed to the existing one updated).
    pub created: bool,
    pub application: ApplicationResponse,
}

/// API response for a stored roster file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachBulkRosterResponse {
    pub row_count: usize,
    pub application: ApplicationResponse,
}

/// API response for a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitApplicationResponse {
    pub application_number: String,
    pub enrollment_ids: Vec<i64>,
    pub application: ApplicationResponse,
}

/// API response for a cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelApplicationResponse {
    pub cancelled_enrollments: usize,
    pub application: ApplicationResponse,
}

/// Summary row for application listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSummary {
    pub application_id: i64,
    pub application_number: Option<String>,
    pub status: String,
    pub course_count: usize,
    pub student_count: usize,
    pub total_amount: i64,
    pub created_at: String,
    pub submitted_at: Option<String>,
}

impl From<&Application> for ApplicationSummary {
    fn from(application: &Application) -> Self {
        Self {
            application_id: application.application_id.unwrap_or_default(),
            application_number: application.application_number.clone(),
            status: application.status.to_string(),
            course_count: application.course_lines.len(),
            student_count: application.total_students(),
            total_amount: application.payment.total_amount,
            created_at: application.created_at.clone(),
            submitted_at: application.submitted_at.clone(),
        }
    }
}

/// API response listing the caller's applications, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListApplicationsResponse {
    pub applications: Vec<ApplicationSummary>,
}

/// One enrollment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentInfo {
    pub enrollment_id: i64,
    pub course_id: i64,
    pub schedule_id: i64,
    pub student_user_id: i64,
    pub status: String,
    pub enrolled_at: String,
    pub cancelled_at: Option<String>,
    pub cancellation_reason: Option<String>,
}

impl From<&Enrollment> for EnrollmentInfo {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            enrollment_id: enrollment.enrollment_id,
            course_id: enrollment.course_id,
            schedule_id: enrollment.schedule_id,
            student_user_id: enrollment.student_user_id,
            status: enrollment.status.to_string(),
            enrolled_at: enrollment.enrolled_at.clone(),
            cancelled_at: enrollment.cancelled_at.clone(),
            cancellation_reason: enrollment.cancellation_reason.clone(),
        }
    }
}

/// API response listing an application's enrollments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListEnrollmentsResponse {
    pub application_id: i64,
    pub enrollments: Vec<EnrollmentInfo>,
}

/// Outcome of a student identity check.
///
/// Identity mismatches are reported here rather than as errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateStudentResponse {
    pub valid: bool,
    pub user_id: Option<i64>,
    pub error: Option<String>,
    /// `account_not_found`, `phone_mismatch`, `name_mismatch` or `invalid_field`.
    pub reason: Option<String>,
}

/// Outcome of an eligibility check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckEligibilityResponse {
    pub eligible: bool,
    pub error: Option<String>,
}
