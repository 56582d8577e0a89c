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
#![allow(clippy::multiple_crate_versions)]

mod error;
mod handlers;
mod request_response;
mod roster;

#[cfg(test)]
mod tests;

pub use error::{
    ApiError, ErrorKind, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use handlers::{
    attach_bulk_roster, attach_student, cancel_application, check_eligibility,
    complete_application, create_or_update_draft, detach_student, download_roster_template,
    generate_application_number, get_application, list_applications, list_enrollments,
    record_payment_status, set_payment_info, submit_application, validate_student,
};
pub use request_response::{
    ApplicationResponse, ApplicationSummary, AttachBulkRosterRequest, AttachBulkRosterResponse,
    AttachStudentRequest, BulkUploadInfo, CancelApplicationRequest, CancelApplicationResponse,
    CheckEligibilityRequest, CheckEligibilityResponse, CourseLineInfo, CreateDraftRequest,
    DetachStudentRequest, DraftResponse, EnrollmentInfo, ListApplicationsResponse,
    ListEnrollmentsResponse, RecordPaymentStatusRequest, SetPaymentInfoRequest, StudentInfo,
    SubmitApplicationRequest, SubmitApplicationResponse, ValidateStudentRequest,
    ValidateStudentResponse,
};
pub use roster::{
    ROSTER_TEMPLATE_HEADER, RosterRow, RosterRowError, ingest_roster, parse_roster,
    roster_template_csv,
};
