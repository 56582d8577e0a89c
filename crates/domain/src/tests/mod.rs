// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]


use crate::{CourseLine, StudentEntry};

pub fn student(user_id: i64) -> StudentEntry {
    StudentEntry {
        user_id,
        name: format!("Student {user_id}"),
        phone: format!("010-0000-{user_id:04}"),
        email: format!("student{user_id}@example.com"),
        company: None,
        position: None,
    }
}

pub fn line(course_id: i64, discounted_price: i64) -> CourseLine {
    CourseLine::new(
        course_id,
        course_id * 10,
        format!("Course {course_id}"),
        String::from("2026-03-02 ~ 2026-03-06"),
        discounted_price,
        discounted_price,
    )
    .unwrap()
}
