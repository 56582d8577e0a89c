// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use class_apply_persistence::Persistence;

use crate::{
    AttachStudentRequest, CreateDraftRequest, DraftResponse, SubmitApplicationRequest,
    create_or_update_draft,
};

pub struct TestContext {
    pub persistence: Persistence,
    pub owner_id: i64,
    pub course_a: i64,
    pub schedule_a: i64,
    pub course_b: i64,
    pub schedule_b: i64,
}

/// Seeds an owner with two cart courses: 300,000 and 450,000 after discount.
pub fn create_test_context(seats_a: u32) -> TestContext {
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
        .create_schedule(course_b, "2026-04-06", "2026-04-10", 30)
        .unwrap();
    persistence
        .add_to_cart(owner_id, course_a, schedule_a)
        .unwrap();
    persistence
        .add_to_cart(owner_id, course_b, schedule_b)
        .unwrap();

    TestContext {
        persistence,
        owner_id,
        course_a,
        schedule_a,
        course_b,
        schedule_b,
    }
}

pub fn create_test_account(persistence: &mut Persistence, n: usize) -> i64 {
    persistence
        .create_account(
            &format!("Student {n}"),
            &format!("student{n}@example.com"),
            &format!("010-2000-{n:04}"),
        )
        .unwrap()
}

/// A request matching the account created by `create_test_account(n)`.
pub fn student_request(course_id: i64, n: usize) -> AttachStudentRequest {
    AttachStudentRequest {
        course_id,
        name: format!("Student {n}"),
        email: format!("student{n}@example.com"),
        phone: format!("0102000{n:04}"),
        company: Some(String::from("Acme")),
        position: None,
    }
}

/// Roster CSV for students `first..=last`, with Korean headers.
pub fn roster_csv(first: usize, last: usize) -> String {
    let mut content: String = String::from("이름,이메일,연락처,회사\n");
    for n in first..=last {
        content.push_str(&format!(
            "Student {n},student{n}@example.com,010-2000-{n:04},Acme\n"
        ));
    }
    content
}

pub fn open_draft(persistence: &mut Persistence, owner_id: i64, course_ids: Vec<i64>) -> i64 {
    let response: DraftResponse =
        create_or_update_draft(persistence, owner_id, &CreateDraftRequest { course_ids })
            .unwrap();
    response.application.application_id
}

pub const fn accept_all() -> SubmitApplicationRequest {
    SubmitApplicationRequest {
        agree_purchase_terms: true,
        agree_refund_policy: true,
    }
}
