// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::fanout::{PlannedEnrollment, plan_enrollments};
use crate::state::{Action, DraftResult, TransitionResult};
use class_apply_domain::{
    Application, ApplicationStatus, CourseLine, DomainError, check_enrollment_eligibility,
};

/// Opens the owner's draft from a resolved cart selection.
///
/// If the owner already has a draft its course lines are replaced; otherwise
/// a new draft is created. An owner never holds more than one draft.
///
/// # Arguments
///
/// * `existing` - The owner's current draft, if any
/// * `owner_id` - The purchasing account
/// * `course_lines` - Priced lines resolved from the cart
/// * `now` - Creation time for a new draft (RFC 3339)
///
/// # Errors
///
/// Returns an error if:
/// - `course_lines` is empty or repeats a course
/// - The existing application is not a draft or belongs to someone else
pub fn open_draft(
    existing: Option<&Application>,
    owner_id: i64,
    course_lines: Vec<CourseLine>,
    now: String,
) -> Result<DraftResult, CoreError> {
    match existing {
        Some(draft) => {
            if draft.owner_id != owner_id {
                return Err(CoreError::OwnerMismatch {
                    expected: owner_id,
                    actual: draft.owner_id,
                });
            }
            let transition: TransitionResult =
                apply(draft, Command::ReplaceCourseLines { course_lines })?;
            Ok(DraftResult {
                application: transition.new_application,
                created: false,
            })
        }
        None => {
            let application: Application = Application::new_draft(owner_id, course_lines, now)?;
            Ok(DraftResult {
                application,
                created: true,
            })
        }
    }
}

/// Applies a command to an application, producing a new application.
///
/// The input is never modified. On success the result carries the updated
/// application and, for `Submit`, the enrollments to create.
///
/// # Arguments
///
/// * `application` - The current application (immutable)
/// * `command` - The command to apply
///
/// # Errors
///
/// Returns an error if the command violates a lifecycle or roster rule.
#[allow(clippy::too_many_lines)]
pub fn apply(application: &Application, command: Command) -> Result<TransitionResult, CoreError> {
    let name: &'static str = command.name();
    let mut new_application: Application = application.clone();
    let mut enrollment_plan: Vec<PlannedEnrollment> = Vec::new();

    let details: String = match command {
        Command::ReplaceCourseLines { course_lines } => {
            new_application.ensure_draft()?;
            new_application.replace_course_lines(course_lines)?;
            format!(
                "Replaced course lines with {:?}, total {}",
                new_application.course_ids(),
                new_application.payment.total_amount
            )
        }
        Command::AttachStudent {
            course_id,
            student,
            schedule,
            has_live_enrollment,
        } => {
            new_application.ensure_draft()?;
            let line: &mut CourseLine = new_application.course_line_mut(course_id)?;
            if schedule.schedule_id != line.schedule_id {
                return Err(CoreError::DomainViolation(
                    DomainError::ScheduleCourseMismatch {
                        schedule_id: schedule.schedule_id,
                        course_id,
                    },
                ));
            }
            check_enrollment_eligibility(&schedule, course_id, student.user_id, has_live_enrollment)?;
            let user_id: i64 = student.user_id;
            line.attach_student(student)?;
            format!("Attached student {user_id} to course {course_id}")
        }
        Command::DetachStudent { course_id, user_id } => {
            new_application.ensure_draft()?;
            new_application
                .course_line_mut(course_id)?
                .detach_student(user_id)?;
            format!("Detached student {user_id} from course {course_id}")
        }
        Command::AttachBulkRoster {
            course_id,
            upload,
            students,
        } => {
            new_application.ensure_draft()?;
            let rows: usize = students.len();
            let file_name: String = upload.file_name.clone();
            new_application
                .course_line_mut(course_id)?
                .attach_bulk_roster(upload, students)?;
            format!("Attached bulk roster '{file_name}' ({rows} rows) to course {course_id}")
        }
        Command::SetPaymentInfo {
            payment_method,
            tax_invoice,
        } => {
            new_application.ensure_draft()?;
            if let Some(method) = payment_method {
                new_application.payment.payment_method = Some(method);
            }
            if let Some(flag) = tax_invoice {
                new_application.payment.tax_invoice = flag;
            }
            String::from("Updated payment info")
        }
        Command::RecordPaymentStatus { payment_status } => {
            new_application.payment.payment_status = payment_status;
            format!("Recorded payment status {}", payment_status.as_str())
        }
        Command::Submit {
            agreements,
            application_number,
            submitted_at,
        } => {
            new_application.ensure_draft()?;
            new_application.ensure_rosters_populated()?;
            agreements.ensure_accepted()?;
            if application_number.trim().is_empty() {
                return Err(CoreError::DomainViolation(
                    DomainError::InvalidApplicationNumber,
                ));
            }
            new_application.status = ApplicationStatus::Submitted;
            new_application.agreements = agreements;
            new_application.application_number = Some(application_number);
            new_application.submitted_at = Some(submitted_at);
            enrollment_plan = plan_enrollments(&new_application)?;
            format!(
                "Submitted with {} enrollments across {} courses",
                enrollment_plan.len(),
                new_application.course_lines.len()
            )
        }
        Command::Cancel {
            reason,
            cancelled_at,
        } => {
            transition_to(&mut new_application, ApplicationStatus::Cancelled)?;
            let reason: String = reason.trim().to_string();
            if reason.is_empty() {
                return Err(CoreError::DomainViolation(
                    DomainError::MissingCancellationReason,
                ));
            }
            let details: String = format!("Cancelled: {reason}");
            new_application.cancellation_reason = Some(reason);
            new_application.cancelled_at = Some(cancelled_at);
            details
        }
        Command::Complete => {
            transition_to(&mut new_application, ApplicationStatus::Completed)?;
            String::from("Completed")
        }
    };

    Ok(TransitionResult {
        new_application,
        enrollment_plan,
        action: Action::new(String::from(name), Some(details)),
    })
}

fn transition_to(application: &mut Application, to: ApplicationStatus) -> Result<(), CoreError> {
    if !application.status.can_transition_to(to) {
        return Err(CoreError::DomainViolation(
            DomainError::InvalidStatusTransition {
                from: application.status,
                to,
            },
        ));
    }
    application.status = to;
    Ok(())
}
