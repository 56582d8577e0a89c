// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{Fixture, attach, create_draft, create_fixture, create_student, submit};
use crate::PersistenceError;
use class_apply::{Command, TransitionResult, apply};
use class_apply_domain::{
    Application, ApplicationStatus, Enrollment, EnrollmentStatus, StudentEntry,
};

fn cancel_command() -> Command {
    Command::Cancel {
        reason: String::from("Company training budget withdrawn"),
        cancelled_at: String::from("2026-02-10T08:00:00Z"),
    }
}

#[test]
fn test_cancelling_submitted_application_cascades() {
    let Fixture {
        mut persistence,
        owner_id,
        course_a,
        schedule_a,
        ..
    } = create_fixture(30, 30);

    let mut draft: Application = create_draft(&mut persistence, owner_id, &[course_a]);
    for n in 1..=2 {
        let student: StudentEntry = create_student(&mut persistence, n);
        draft = attach(&mut persistence, &draft, course_a, student);
    }
    submit(&mut persistence, &draft).unwrap();
    let application_id: i64 = draft.application_id.unwrap();
    let submitted: Application = persistence.get_application(application_id).unwrap();

    let result: TransitionResult = apply(&submitted, cancel_command()).unwrap();
    let cancelled: usize = persistence
        .commit_cancellation(&result.new_application, ApplicationStatus::Submitted)
        .unwrap();
    assert_eq!(cancelled, 2);

    let stored: Application = persistence.get_application(application_id).unwrap();
    assert_eq!(stored.status, ApplicationStatus::Cancelled);
    assert_eq!(
        stored.cancellation_reason.as_deref(),
        Some("Company training budget withdrawn")
    );

    let enrollments: Vec<Enrollment> = persistence
        .list_enrollments_for_application(application_id)
        .unwrap();
    assert_eq!(enrollments.len(), 2);
    for enrollment in &enrollments {
        assert_eq!(enrollment.status, EnrollmentStatus::Cancelled);
        assert_eq!(enrollment.cancelled_at, stored.cancelled_at);
        assert_eq!(enrollment.cancellation_reason, stored.cancellation_reason);
    }

    assert_eq!(
        persistence.get_schedule(schedule_a).unwrap().enrolled_count,
        0
    );
    assert!(
        !persistence
            .has_live_enrollment(enrollments[0].student_user_id, course_a, schedule_a)
            .unwrap()
    );
}

#[test]
fn test_cancelling_draft_frees_owner_for_new_draft() {
    let Fixture {
        mut persistence,
        owner_id,
        course_a,
        ..
    } = create_fixture(30, 30);

    let draft: Application = create_draft(&mut persistence, owner_id, &[course_a]);
    let result: TransitionResult = apply(&draft, cancel_command()).unwrap();
    let cancelled: usize = persistence
        .commit_cancellation(&result.new_application, ApplicationStatus::Draft)
        .unwrap();
    assert_eq!(cancelled, 0);
    assert!(persistence.find_draft_for_owner(owner_id).unwrap().is_none());

    let fresh: Application = create_draft(&mut persistence, owner_id, &[course_a]);
    assert_ne!(fresh.application_id, draft.application_id);
    assert_eq!(
        persistence
            .list_applications_for_owner(owner_id)
            .unwrap()
            .len(),
        2
    );
}

#[test]
fn test_completed_application_cannot_be_cancelled() {
    let Fixture {
        mut persistence,
        owner_id,
        course_a,
        schedule_a,
        ..
    } = create_fixture(30, 30);

    let draft: Application = create_draft(&mut persistence, owner_id, &[course_a]);
    let student: StudentEntry = create_student(&mut persistence, 1);
    let draft: Application = attach(&mut persistence, &draft, course_a, student);
    submit(&mut persistence, &draft).unwrap();
    let application_id: i64 = draft.application_id.unwrap();
    let submitted: Application = persistence.get_application(application_id).unwrap();

    let completed: TransitionResult = apply(&submitted, Command::Complete).unwrap();
    persistence
        .commit_completion(&completed.new_application)
        .unwrap();
    assert_eq!(
        persistence.get_application(application_id).unwrap().status,
        ApplicationStatus::Completed
    );

    // A cancellation computed from the stale submitted snapshot loses.
    let stale: TransitionResult = apply(&submitted, cancel_command()).unwrap();
    let result: Result<usize, PersistenceError> =
        persistence.commit_cancellation(&stale.new_application, ApplicationStatus::Submitted);
    assert_eq!(
        result,
        Err(PersistenceError::StaleApplication { application_id })
    );
    assert_eq!(
        persistence.get_schedule(schedule_a).unwrap().enrolled_count,
        1
    );
}
