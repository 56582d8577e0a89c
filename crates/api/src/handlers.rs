// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Workflow operations at the API boundary.
//!
//! Every operation on an existing application loads it, checks that the
//! caller owns it, applies a core command and stores the result.

use class_apply::{
    Command, DraftResult, TransitionResult, apply, open_draft, validate_course_line_exists,
    validate_owner,
};
use class_apply_domain::{
    Account, Agreements, Application, ApplicationStatus, BulkUploadRef, CourseLine, DomainError,
    Enrollment, PaymentMethod, PaymentStatus, RosterMode, StudentCandidate, StudentEntry,
    TrainingSchedule, check_enrollment_eligibility, verify_student_identity,
};
use class_apply_persistence::{CartCourse, PendingUpload, Persistence};
use time::{Date, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::request_response::{
    ApplicationResponse, ApplicationSummary, AttachBulkRosterRequest, AttachBulkRosterResponse,
    AttachStudentRequest, CancelApplicationRequest, CancelApplicationResponse,
    CheckEligibilityRequest, CheckEligibilityResponse, CreateDraftRequest, DetachStudentRequest,
    DraftResponse, EnrollmentInfo, ListApplicationsResponse, ListEnrollmentsResponse,
    RecordPaymentStatusRequest, SetPaymentInfoRequest, SubmitApplicationRequest,
    SubmitApplicationResponse, ValidateStudentRequest, ValidateStudentResponse,
};
use crate::roster::{ingest_roster, roster_template_csv};

/// Formats the current time as RFC 3339.
fn now_rfc3339(now: OffsetDateTime) -> Result<String, ApiError> {
    now.format(&time::format_description::well_known::Rfc3339)
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to format timestamp: {e}"),
        })
}

/// Builds the human-readable application number, e.g. `CA-20260202-000042`.
///
/// The number is derived from the submission date and the stored id, so it
/// is unique without a separate sequence.
#[must_use]
pub fn generate_application_number(submitted_on: Date, application_id: i64) -> String {
    format!(
        "CA-{:04}{:02}{:02}-{application_id:06}",
        submitted_on.year(),
        u8::from(submitted_on.month()),
        submitted_on.day()
    )
}

/// Loads an application and checks that the caller owns it.
fn load_owned(
    persistence: &mut Persistence,
    caller_id: i64,
    application_id: i64,
) -> Result<Application, ApiError> {
    let application: Application =
        persistence
            .get_application(application_id)
            .map_err(|e| match translate_persistence_error(e) {
                ApiError::ResourceNotFound { .. } => ApiError::ResourceNotFound {
                    resource_type: String::from("Application"),
                    message: format!("Application {application_id} does not exist"),
                },
                other => other,
            })?;

    if let Err(e) = validate_owner(&application, caller_id) {
        warn!(
            application_id,
            caller_id,
            owner_id = application.owner_id,
            "Rejected access to another user's application"
        );
        return Err(translate_core_error(e));
    }

    Ok(application)
}

fn run(application: &Application, command: Command) -> Result<TransitionResult, ApiError> {
    let result: TransitionResult = apply(application, command).map_err(translate_core_error)?;
    debug!(
        application_id = application.application_id,
        action = %result.action.name,
        "Applied command"
    );
    Ok(result)
}

/// Turns selected cart courses into the caller's draft.
///
/// Creates a draft if the caller has none; otherwise replaces the existing
/// draft's course lines and recomputes its total.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `caller_id` - The purchasing account
/// * `request` - The selected course ids
///
/// # Errors
///
/// Returns an error if:
/// - `course_ids` is empty or nothing in it is a purchasable cart course
/// - The database operation fails
pub fn create_or_update_draft(
    persistence: &mut Persistence,
    caller_id: i64,
    request: &CreateDraftRequest,
) -> Result<DraftResponse, ApiError> {
    if request.course_ids.is_empty() {
        return Err(translate_domain_error(DomainError::EmptyCourseSelection));
    }

    let resolved: Vec<CartCourse> = persistence
        .resolve_cart_courses(caller_id, &request.course_ids)
        .map_err(translate_persistence_error)?;
    if resolved.is_empty() {
        return Err(translate_domain_error(DomainError::EmptyCourseSelection));
    }

    let mut course_lines: Vec<CourseLine> = Vec::with_capacity(resolved.len());
    for course in resolved {
        course_lines.push(
            CourseLine::new(
                course.course_id,
                course.schedule_id,
                course.course_name,
                course.period,
                course.price,
                course.discounted_price,
            )
            .map_err(translate_domain_error)?,
        );
    }

    let existing: Option<Application> = persistence
        .find_draft_for_owner(caller_id)
        .map_err(translate_persistence_error)?;
    let now: String = now_rfc3339(OffsetDateTime::now_utc())?;
    let draft: DraftResult =
        open_draft(existing.as_ref(), caller_id, course_lines, now).map_err(translate_core_error)?;

    let stored: Application = persistence
        .save_draft(&draft.application, None)
        .map_err(translate_persistence_error)?;

    info!(
        application_id = stored.application_id,
        owner_id = caller_id,
        created = draft.created,
        lines = stored.course_lines.len(),
        total_amount = stored.payment.total_amount,
        "Opened draft"
    );

    Ok(DraftResponse {
        created: draft.created,
        application: ApplicationResponse::from(&stored),
    })
}

/// Verifies a student and adds them to a course line's individual roster.
///
/// # Errors
///
/// Returns an error if:
/// - The application is missing, not the caller's, or not a draft
/// - The identity does not match an account (`ValidationFailed`)
/// - The student is not eligible for the offering
/// - The line has a bulk roster or already holds five students (`Conflict`)
pub fn attach_student(
    persistence: &mut Persistence,
    caller_id: i64,
    application_id: i64,
    request: &AttachStudentRequest,
) -> Result<ApplicationResponse, ApiError> {
    let application: Application = load_owned(persistence, caller_id, application_id)?;
    application.ensure_draft().map_err(translate_domain_error)?;
    validate_course_line_exists(&application, request.course_id).map_err(translate_domain_error)?;
    let schedule_id: i64 = application
        .course_line(request.course_id)
        .map(|line| line.schedule_id)
        .ok_or_else(|| ApiError::Internal {
            message: format!("Course line {} vanished", request.course_id),
        })?;

    let candidate: StudentCandidate = StudentCandidate {
        name: request.name.clone(),
        email: request.email.clone(),
        phone: request.phone.clone(),
        company: request.company.clone(),
        position: request.position.clone(),
    };
    let account: Option<Account> = persistence
        .find_account_by_email(&candidate.email)
        .map_err(translate_persistence_error)?;
    let user_id: i64 =
        verify_student_identity(&candidate, account.as_ref()).map_err(translate_domain_error)?;

    let schedule: TrainingSchedule = persistence
        .get_schedule(schedule_id)
        .map_err(translate_persistence_error)?;
    let has_live_enrollment: bool = persistence
        .has_live_enrollment(user_id, request.course_id, schedule_id)
        .map_err(translate_persistence_error)?;

    let student: StudentEntry = candidate.into_entry(user_id);
    let result: TransitionResult = run(
        &application,
        Command::AttachStudent {
            course_id: request.course_id,
            student,
            schedule,
            has_live_enrollment,
        },
    )?;

    let stored: Application = persistence
        .save_draft(&result.new_application, None)
        .map_err(translate_persistence_error)?;

    info!(
        application_id,
        course_id = request.course_id,
        user_id,
        "Attached student"
    );

    Ok(ApplicationResponse::from(&stored))
}

/// Removes an individually added student from a course line.
///
/// # Errors
///
/// Returns an error if the application is missing, not the caller's, not a
/// draft, or the student is not on the line's individual roster.
pub fn detach_student(
    persistence: &mut Persistence,
    caller_id: i64,
    application_id: i64,
    request: &DetachStudentRequest,
) -> Result<ApplicationResponse, ApiError> {
    let application: Application = load_owned(persistence, caller_id, application_id)?;
    let result: TransitionResult = run(
        &application,
        Command::DetachStudent {
            course_id: request.course_id,
            user_id: request.user_id,
        },
    )?;
    let stored: Application = persistence
        .save_draft(&result.new_application, None)
        .map_err(translate_persistence_error)?;

    info!(
        application_id,
        course_id = request.course_id,
        user_id = request.user_id,
        "Detached student"
    );

    Ok(ApplicationResponse::from(&stored))
}

/// Ingests a roster file and attaches it as a course line's bulk roster.
///
/// The file is stored with the draft as an audit artifact, and the verified
/// students are persisted as the line's roster.
///
/// # Errors
///
/// Returns an error if:
/// - The application is missing, not the caller's, or not a draft
/// - The line already has a roster of either mode (`Conflict`)
/// - The file is malformed, outside the row bounds, or has invalid rows
pub fn attach_bulk_roster(
    persistence: &mut Persistence,
    caller_id: i64,
    application_id: i64,
    request: &AttachBulkRosterRequest,
) -> Result<AttachBulkRosterResponse, ApiError> {
    let application: Application = load_owned(persistence, caller_id, application_id)?;
    application.ensure_draft().map_err(translate_domain_error)?;
    let line: &CourseLine = application
        .course_line(request.course_id)
        .ok_or_else(|| {
            translate_domain_error(DomainError::CourseLineNotFound {
                course_id: request.course_id,
            })
        })?;
    if line.roster.mode() != RosterMode::Empty {
        return Err(translate_domain_error(DomainError::RosterModeConflict {
            course_id: line.course_id,
            existing: line.roster.mode(),
        }));
    }
    if request.file_name.trim().is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("file_name"),
            message: String::from("File name cannot be empty"),
        });
    }

    let schedule: TrainingSchedule = persistence
        .get_schedule(line.schedule_id)
        .map_err(translate_persistence_error)?;
    let students: Vec<StudentEntry> = ingest_roster(persistence, &request.content, &schedule)?;
    let row_count: usize = students.len();

    let upload: BulkUploadRef = BulkUploadRef {
        upload_id: None,
        file_name: request.file_name.trim().to_string(),
        row_count,
        uploaded_at: now_rfc3339(OffsetDateTime::now_utc())?,
    };
    let result: TransitionResult = run(
        &application,
        Command::AttachBulkRoster {
            course_id: request.course_id,
            upload,
            students,
        },
    )?;

    let pending: PendingUpload = PendingUpload {
        course_id: request.course_id,
        content: request.content.clone(),
    };
    let stored: Application = persistence
        .save_draft(&result.new_application, Some(&pending))
        .map_err(translate_persistence_error)?;

    info!(
        application_id,
        course_id = request.course_id,
        row_count,
        "Attached bulk roster"
    );

    Ok(AttachBulkRosterResponse {
        row_count,
        application: ApplicationResponse::from(&stored),
    })
}

/// Records payment metadata on a draft. Absent fields are left unchanged.
///
/// # Errors
///
/// Returns an error if the application is missing, not the caller's, not a
/// draft, or a value is not recognized.
pub fn set_payment_info(
    persistence: &mut Persistence,
    caller_id: i64,
    application_id: i64,
    request: &SetPaymentInfoRequest,
) -> Result<ApplicationResponse, ApiError> {
    let payment_method: Option<PaymentMethod> = request
        .payment_method
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(translate_domain_error)?;

    let application: Application = load_owned(persistence, caller_id, application_id)?;
    let result: TransitionResult = run(
        &application,
        Command::SetPaymentInfo {
            payment_method,
            tax_invoice: request.tax_invoice,
        },
    )?;
    let stored: Application = persistence
        .save_draft(&result.new_application, None)
        .map_err(translate_persistence_error)?;

    Ok(ApplicationResponse::from(&stored))
}

/// Records the payment status reported by the payment collaborator.
///
/// Not reachable by purchasers, so no owner check applies.
///
/// # Errors
///
/// Returns an error if the application is missing, the status is not
/// recognized, or the application changed underneath.
pub fn record_payment_status(
    persistence: &mut Persistence,
    application_id: i64,
    request: &RecordPaymentStatusRequest,
) -> Result<ApplicationResponse, ApiError> {
    let payment_status: PaymentStatus = request
        .payment_status
        .parse()
        .map_err(translate_domain_error)?;

    let application: Application = persistence
        .get_application(application_id)
        .map_err(translate_persistence_error)?;
    let result: TransitionResult =
        run(&application, Command::RecordPaymentStatus { payment_status })?;
    persistence
        .record_payment_status(&result.new_application)
        .map_err(translate_persistence_error)?;

    info!(
        application_id,
        payment_status = payment_status.as_str(),
        "Recorded payment status"
    );
    Ok(ApplicationResponse::from(&result.new_application))
}

/// Submits a draft.
///
/// Status, application number, agreements, enrollments, seat counts and
/// cart cleanup are committed in one transaction.
///
/// # Errors
///
/// Returns an error if:
/// - The application is missing, not the caller's, or not a draft
/// - A course line has no students or an agreement is missing (`ValidationFailed`)
/// - A schedule ran out of seats or a student is already enrolled (`Conflict`)
pub fn submit_application(
    persistence: &mut Persistence,
    caller_id: i64,
    application_id: i64,
    request: &SubmitApplicationRequest,
) -> Result<SubmitApplicationResponse, ApiError> {
    let application: Application = load_owned(persistence, caller_id, application_id)?;

    let now: OffsetDateTime = OffsetDateTime::now_utc();
    let submitted_at: String = now_rfc3339(now)?;
    let application_number: String = generate_application_number(now.date(), application_id);

    let result: TransitionResult = run(
        &application,
        Command::Submit {
            agreements: Agreements::new(request.agree_purchase_terms, request.agree_refund_policy),
            application_number: application_number.clone(),
            submitted_at: submitted_at.clone(),
        },
    )?;

    let enrollment_ids: Vec<i64> = persistence
        .commit_submission(
            &result.new_application,
            &result.enrollment_plan,
            &submitted_at,
        )
        .map_err(|e| {
            warn!(application_id, error = %e, "Submission rolled back");
            translate_persistence_error(e)
        })?;

    let stored: Application = persistence
        .get_application(application_id)
        .map_err(translate_persistence_error)?;

    info!(
        application_id,
        application_number = %application_number,
        enrollments = enrollment_ids.len(),
        "Submitted application"
    );

    Ok(SubmitApplicationResponse {
        application_number,
        enrollment_ids,
        application: ApplicationResponse::from(&stored),
    })
}

/// Cancels a draft or submitted application and its enrollments.
///
/// # Errors
///
/// Returns an error if:
/// - The application is missing or not the caller's
/// - The application is already cancelled or completed (`Conflict`)
/// - The reason is blank (`InvalidInput`)
pub fn cancel_application(
    persistence: &mut Persistence,
    caller_id: i64,
    application_id: i64,
    request: &CancelApplicationRequest,
) -> Result<CancelApplicationResponse, ApiError> {
    let application: Application = load_owned(persistence, caller_id, application_id)?;
    let previous_status: ApplicationStatus = application.status;

    let result: TransitionResult = run(
        &application,
        Command::Cancel {
            reason: request.reason.clone(),
            cancelled_at: now_rfc3339(OffsetDateTime::now_utc())?,
        },
    )?;
    let cancelled_enrollments: usize = persistence
        .commit_cancellation(&result.new_application, previous_status)
        .map_err(translate_persistence_error)?;

    let stored: Application = persistence
        .get_application(application_id)
        .map_err(translate_persistence_error)?;

    info!(
        application_id,
        from = %previous_status,
        cancelled_enrollments,
        "Cancelled application"
    );

    Ok(CancelApplicationResponse {
        cancelled_enrollments,
        application: ApplicationResponse::from(&stored),
    })
}

/// Marks a submitted application as completed.
///
/// Used by administrative collaborators once the courses have run, so no
/// owner check applies.
///
/// # Errors
///
/// Returns an error if the application is missing or not submitted.
pub fn complete_application(
    persistence: &mut Persistence,
    application_id: i64,
) -> Result<ApplicationResponse, ApiError> {
    let application: Application = persistence
        .get_application(application_id)
        .map_err(translate_persistence_error)?;
    let result: TransitionResult = run(&application, Command::Complete)?;
    persistence
        .commit_completion(&result.new_application)
        .map_err(translate_persistence_error)?;

    info!(application_id, "Completed application");
    Ok(ApplicationResponse::from(&result.new_application))
}

/// Retrieves one of the caller's applications.
///
/// # Errors
///
/// Returns an error if the application is missing or not the caller's.
pub fn get_application(
    persistence: &mut Persistence,
    caller_id: i64,
    application_id: i64,
) -> Result<ApplicationResponse, ApiError> {
    let application: Application = load_owned(persistence, caller_id, application_id)?;
    Ok(ApplicationResponse::from(&application))
}

/// Lists the caller's applications, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_applications(
    persistence: &mut Persistence,
    caller_id: i64,
) -> Result<ListApplicationsResponse, ApiError> {
    let applications: Vec<Application> = persistence
        .list_applications_for_owner(caller_id)
        .map_err(translate_persistence_error)?;
    Ok(ListApplicationsResponse {
        applications: applications.iter().map(ApplicationSummary::from).collect(),
    })
}

/// Lists the enrollments created for one of the caller's applications.
///
/// # Errors
///
/// Returns an error if the application is missing or not the caller's.
pub fn list_enrollments(
    persistence: &mut Persistence,
    caller_id: i64,
    application_id: i64,
) -> Result<ListEnrollmentsResponse, ApiError> {
    load_owned(persistence, caller_id, application_id)?;
    let enrollments: Vec<Enrollment> = persistence
        .list_enrollments_for_application(application_id)
        .map_err(translate_persistence_error)?;
    Ok(ListEnrollmentsResponse {
        application_id,
        enrollments: enrollments.iter().map(EnrollmentInfo::from).collect(),
    })
}

/// Checks a claimed identity against the account registered under its email.
///
/// Mismatches are reported in the response, not as errors.
///
/// # Errors
///
/// Returns an error only if the account lookup fails.
pub fn validate_student(
    persistence: &mut Persistence,
    request: &ValidateStudentRequest,
) -> Result<ValidateStudentResponse, ApiError> {
    let candidate: StudentCandidate = StudentCandidate::new(
        request.name.clone(),
        request.email.clone(),
        request.phone.clone(),
    );
    let account: Option<Account> = persistence
        .find_account_by_email(&candidate.email)
        .map_err(translate_persistence_error)?;

    let response: ValidateStudentResponse =
        match verify_student_identity(&candidate, account.as_ref()) {
            Ok(user_id) => ValidateStudentResponse {
                valid: true,
                user_id: Some(user_id),
                error: None,
                reason: None,
            },
            Err(e) => ValidateStudentResponse {
                valid: false,
                user_id: None,
                reason: e.identity_reason().map(String::from),
                error: Some(e.to_string()),
            },
        };
    Ok(response)
}

/// Checks whether a student may enroll in a course offering.
///
/// # Errors
///
/// Returns an error if the schedule does not exist or a lookup fails.
pub fn check_eligibility(
    persistence: &mut Persistence,
    request: &CheckEligibilityRequest,
) -> Result<CheckEligibilityResponse, ApiError> {
    let schedule: TrainingSchedule = persistence
        .get_schedule(request.schedule_id)
        .map_err(translate_persistence_error)?;
    let has_live_enrollment: bool = persistence
        .has_live_enrollment(request.user_id, request.course_id, request.schedule_id)
        .map_err(translate_persistence_error)?;

    let response: CheckEligibilityResponse = match check_enrollment_eligibility(
        &schedule,
        request.course_id,
        request.user_id,
        has_live_enrollment,
    ) {
        Ok(()) => CheckEligibilityResponse {
            eligible: true,
            error: None,
        },
        Err(e) => CheckEligibilityResponse {
            eligible: false,
            error: Some(e.to_string()),
        },
    };
    Ok(response)
}

/// Returns the roster template file (`text/csv`).
#[must_use]
pub fn download_roster_template() -> String {
    roster_template_csv()
}
