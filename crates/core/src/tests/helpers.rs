// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Command, TransitionResult, apply};
use class_apply_domain::{
    Agreements, Application, BulkUploadRef, CourseLine, StudentEntry, TrainingSchedule,
};

pub const OWNER: i64 = 100;

pub fn create_test_line(course_id: i64, price: i64) -> CourseLine {
    CourseLine::new(
        course_id,
        course_id * 10,
        format!("Course {course_id}"),
        String::from("2026-03-02 ~ 2026-03-06"),
        price,
        price,
    )
    .unwrap()
}

/// A draft whose lines look persisted (ids assigned).
pub fn create_test_draft(course_ids: &[i64]) -> Application {
    let lines: Vec<CourseLine> = course_ids
        .iter()
        .map(|id| create_test_line(*id, 100_000))
        .collect();
    let mut app: Application =
        Application::new_draft(OWNER, lines, String::from("2026-02-01T09:00:00Z")).unwrap();
    app.application_id = Some(1);
    for line in &mut app.course_lines {
        line.course_line_id = Some(line.course_id + 1000);
    }
    app
}

pub fn create_test_student(user_id: i64) -> StudentEntry {
    StudentEntry {
        user_id,
        name: format!("Student {user_id}"),
        phone: String::from("010-0000-0000"),
        email: format!("s{user_id}@example.com"),
        company: Some(String::from("Acme")),
        position: None,
    }
}

pub fn create_test_schedule(course_id: i64) -> TrainingSchedule {
    TrainingSchedule {
        schedule_id: course_id * 10,
        course_id,
        start_date: String::from("2026-03-02"),
        end_date: String::from("2026-03-06"),
        is_active: true,
        available_seats: 30,
        enrolled_count: 0,
    }
}

pub fn create_test_upload(row_count: usize) -> BulkUploadRef {
    BulkUploadRef {
        upload_id: Some(9),
        file_name: String::from("roster.csv"),
        row_count,
        uploaded_at: String::from("2026-02-01T09:00:00Z"),
    }
}

pub fn attach(app: &Application, course_id: i64, user_id: i64) -> Application {
    apply(
        app,
        Command::AttachStudent {
            course_id,
            student: create_test_student(user_id),
            schedule: create_test_schedule(course_id),
            has_live_enrollment: false,
        },
    )
    .unwrap()
    .new_application
}

pub fn submit_command(number: &str) -> Command {
    Command::Submit {
        agreements: Agreements::new(true, true),
        application_number: String::from(number),
        submitted_at: String::from("2026-02-02T10:00:00Z"),
    }
}

pub fn submitted(app: &Application) -> Application {
    let result: TransitionResult = apply(app, submit_command("CA-20260202-000001")).unwrap();
    result.new_application
}
