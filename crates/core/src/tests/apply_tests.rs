// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::tests::helpers::{
    attach, create_test_draft, create_test_schedule, create_test_student, create_test_upload,
};
use crate::{Command, CoreError, TransitionResult, apply};
use class_apply_domain::{
    Application, ApplicationStatus, CourseLine, DomainError, PaymentMethod, PaymentStatus,
    RosterMode, StudentEntry,
};

#[test]
fn test_attach_student_does_not_modify_input() {
    let app: Application = create_test_draft(&[1]);
    let updated: Application = attach(&app, 1, 7);

    assert!(app.course_line(1).unwrap().roster.is_empty());
    assert_eq!(updated.course_line(1).unwrap().roster.len(), 1);
}

#[test]
fn test_attach_student_emits_action() {
    let app: Application = create_test_draft(&[1]);
    let result: TransitionResult = apply(
        &app,
        Command::AttachStudent {
            course_id: 1,
            student: create_test_student(7),
            schedule: create_test_schedule(1),
            has_live_enrollment: false,
        },
    )
    .unwrap();

    assert_eq!(result.action.name, "AttachStudent");
    assert!(result.enrollment_plan.is_empty());
}

#[test]
fn test_sixth_individual_student_fails() {
    let mut app: Application = create_test_draft(&[1]);
    for user_id in 1..=5 {
        app = attach(&app, 1, user_id);
    }

    let result: Result<TransitionResult, CoreError> = apply(
        &app,
        Command::AttachStudent {
            course_id: 1,
            student: create_test_student(6),
            schedule: create_test_schedule(1),
            has_live_enrollment: false,
        },
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::IndividualRosterFull { cap: 5, .. }
        ))
    ));
}

#[test]
fn test_attach_student_checks_eligibility() {
    let app: Application = create_test_draft(&[1]);
    let result: Result<TransitionResult, CoreError> = apply(
        &app,
        Command::AttachStudent {
            course_id: 1,
            student: create_test_student(7),
            schedule: create_test_schedule(1),
            has_live_enrollment: true,
        },
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(DomainError::AlreadyEnrolled {
            user_id: 7,
            ..
        }))
    ));
}

#[test]
fn test_attach_student_to_unknown_course_fails() {
    let app: Application = create_test_draft(&[1]);
    let result: Result<TransitionResult, CoreError> = apply(
        &app,
        Command::AttachStudent {
            course_id: 2,
            student: create_test_student(7),
            schedule: create_test_schedule(2),
            has_live_enrollment: false,
        },
    );
    assert_eq!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::CourseLineNotFound { course_id: 2 }
        ))
    );
}

#[test]
fn test_bulk_roster_after_individual_conflicts() {
    let app: Application = attach(&create_test_draft(&[1]), 1, 7);
    let students: Vec<StudentEntry> = (20..26).map(create_test_student).collect();

    let result: Result<TransitionResult, CoreError> = apply(
        &app,
        Command::AttachBulkRoster {
            course_id: 1,
            upload: create_test_upload(6),
            students,
        },
    );
    assert!(matches!(
        result,
        Err(CoreError::DomainViolation(
            DomainError::RosterModeConflict {
                existing: RosterMode::Individual,
                ..
            }
        ))
    ));
}

#[test]
fn test_bulk_roster_installs_rows() {
    let app: Application = create_test_draft(&[1]);
    let students: Vec<StudentEntry> = (20..30).map(create_test_student).collect();

    let result: TransitionResult = apply(
        &app,
        Command::AttachBulkRoster {
            course_id: 1,
            upload: create_test_upload(10),
            students,
        },
    )
    .unwrap();

    let line: &CourseLine = result.new_application.course_line(1).unwrap();
    assert_eq!(line.roster.mode(), RosterMode::Bulk);
    assert_eq!(line.roster.len(), 10);
    assert_eq!(line.roster.upload().unwrap().file_name, "roster.csv");
}

#[test]
fn test_detach_student_removes_entry() {
    let app: Application = attach(&attach(&create_test_draft(&[1]), 1, 7), 1, 8);
    let result: TransitionResult = apply(
        &app,
        Command::DetachStudent {
            course_id: 1,
            user_id: 7,
        },
    )
    .unwrap();

    let students: &[StudentEntry] = result
        .new_application
        .course_line(1)
        .unwrap()
        .roster
        .students();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0].user_id, 8);
}

#[test]
fn test_set_payment_info_merges_fields() {
    let app: Application = create_test_draft(&[1, 2]);
    let first: Application = apply(
        &app,
        Command::SetPaymentInfo {
            payment_method: Some(PaymentMethod::Card),
            tax_invoice: None,
        },
    )
    .unwrap()
    .new_application;
    let second: Application = apply(
        &first,
        Command::SetPaymentInfo {
            payment_method: None,
            tax_invoice: Some(true),
        },
    )
    .unwrap()
    .new_application;

    assert_eq!(second.payment.payment_method, Some(PaymentMethod::Card));
    assert!(second.payment.tax_invoice);
    assert_eq!(second.payment.payment_status, PaymentStatus::Pending);
    assert_eq!(second.payment.total_amount, 200_000);
}

#[test]
fn test_record_payment_status_is_accepted_after_cancellation() {
    let mut cancelled: Application = create_test_draft(&[1]);
    cancelled.status = ApplicationStatus::Cancelled;

    let result: TransitionResult = apply(
        &cancelled,
        Command::RecordPaymentStatus {
            payment_status: PaymentStatus::Refunded,
        },
    )
    .unwrap();

    assert_eq!(
        result.new_application.payment.payment_status,
        PaymentStatus::Refunded
    );
    assert_eq!(result.new_application.status, ApplicationStatus::Cancelled);
    assert_eq!(result.action.name, "RecordPaymentStatus");
}
