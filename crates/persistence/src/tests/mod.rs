// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod cancellation_tests;

use crate::{CartCourse, Persistence, PersistenceError};
use class_apply::{Command, DraftResult, TransitionResult, apply, open_draft};
use class_apply_domain::{Agreements, Application, CourseLine, StudentEntry, TrainingSchedule};

pub struct Fixture {
    pub persistence: Persistence,
    pub owner_id: i64,
    pub course_a: i64,
    pub schedule_a: i64,
    pub course_b: i64,
    pub schedule_b: i64,
}

/// Two courses (300,000 and 450,000 after discount), one schedule each,
/// both in the owner's cart.
pub fn create_fixture(seats_a: u32, seats_b: u32) -> Fixture {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let owner_id: i64 = persistence
        .create_account("Purchaser", "owner@example.com", "010-1111-2222")
        .unwrap();
    let course_a: i64 = persistence
        .create_course("Rust Fundamentals", 350_000, 300_000)
        .unwrap();
    let course_b: i64 = persistence
        .create_course("Async Rust", 450_000, 450_000)
        .unwrap();
    let schedule_a: i64 = persistence
        .create_schedule(course_a, "2026-03-02", "2026-03-06", seats_a)
        .unwrap();
    let schedule_b: i64 = persistence
        .create_schedule(course_b, "2026-04-06", "2026-04-10", seats_b)
        .unwrap();
    persistence
        .add_to_cart(owner_id, course_a, schedule_a)
        .unwrap();
    persistence
        .add_to_cart(owner_id, course_b, schedule_b)
        .unwrap();

    Fixture {
        persistence,
        owner_id,
        course_a,
        schedule_a,
        course_b,
        schedule_b,
    }
}

pub fn create_student(persistence: &mut Persistence, n: i64) -> StudentEntry {
    let name: String = format!("Student {n}");
    let email: String = format!("student{n}@example.com");
    let phone: String = format!("010-2000-{n:04}");
    let user_id: i64 = persistence.create_account(&name, &email, &phone).unwrap();
    StudentEntry {
        user_id,
        name,
        phone,
        email,
        company: None,
        position: None,
    }
}

pub fn to_line(course: CartCourse) -> CourseLine {
    CourseLine::new(
        course.course_id,
        course.schedule_id,
        course.course_name,
        course.period,
        course.price,
        course.discounted_price,
    )
    .unwrap()
}

pub fn create_draft(persistence: &mut Persistence, owner_id: i64, course_ids: &[i64]) -> Application {
    let lines: Vec<CourseLine> = persistence
        .resolve_cart_courses(owner_id, course_ids)
        .unwrap()
        .into_iter()
        .map(to_line)
        .collect();
    let existing: Option<Application> = persistence.find_draft_for_owner(owner_id).unwrap();
    let result: DraftResult = open_draft(
        existing.as_ref(),
        owner_id,
        lines,
        String::from("2026-02-01T09:00:00Z"),
    )
    .unwrap();
    persistence.save_draft(&result.application, None).unwrap()
}

pub fn attach(
    persistence: &mut Persistence,
    application: &Application,
    course_id: i64,
    student: StudentEntry,
) -> Application {
    let schedule_id: i64 = application.course_line(course_id).unwrap().schedule_id;
    let schedule: TrainingSchedule = persistence.get_schedule(schedule_id).unwrap();
    let has_live_enrollment: bool = persistence
        .has_live_enrollment(student.user_id, course_id, schedule_id)
        .unwrap();
    let result: TransitionResult = apply(
        application,
        Command::AttachStudent {
            course_id,
            student,
            schedule,
            has_live_enrollment,
        },
    )
    .unwrap();
    persistence.save_draft(&result.new_application, None).unwrap()
}

pub fn submit(
    persistence: &mut Persistence,
    application: &Application,
) -> Result<Vec<i64>, PersistenceError> {
    let application_id: i64 = application.application_id.unwrap();
    let result: TransitionResult = apply(
        application,
        Command::Submit {
            agreements: Agreements::new(true, true),
            application_number: format!("CA-20260202-{application_id:06}"),
            submitted_at: String::from("2026-02-02T10:00:00Z"),
        },
    )
    .unwrap();
    persistence.commit_submission(
        &result.new_application,
        &result.enrollment_plan,
        "2026-02-02T10:00:00Z",
    )
}
