// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Enrollment fan-out planning.
//!
//! A submitted application expands into one enrollment per student per
//! course line. The plan is pure data; persistence executes it inside the
//! submission transaction.

use crate::error::CoreError;
use class_apply_domain::Application;
use std::collections::BTreeMap;

/// One enrollment to create at submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlannedEnrollment {
    /// The stored course line.
    pub course_line_id: i64,
    /// The course.
    pub course_id: i64,
    /// The schedule whose seat counter is incremented.
    pub schedule_id: i64,
    /// The student.
    pub student_user_id: i64,
}

/// Expands every course line roster into planned enrollments.
///
/// Lines appear in application order and students in roster order.
///
/// # Errors
///
/// Returns `CoreError::UnpersistedCourseLine` if a line has no stored id.
pub fn plan_enrollments(application: &Application) -> Result<Vec<PlannedEnrollment>, CoreError> {
    let mut plan: Vec<PlannedEnrollment> = Vec::with_capacity(application.total_students());
    for line in &application.course_lines {
        let course_line_id: i64 = line
            .course_line_id
            .ok_or(CoreError::UnpersistedCourseLine {
                course_id: line.course_id,
            })?;
        plan.extend(
            line.roster
                .students()
                .iter()
                .map(|student| PlannedEnrollment {
                    course_line_id,
                    course_id: line.course_id,
                    schedule_id: line.schedule_id,
                    student_user_id: student.user_id,
                }),
        );
    }
    Ok(plan)
}

/// Seats each schedule needs for the plan.
#[must_use]
pub fn seat_demand(plan: &[PlannedEnrollment]) -> BTreeMap<i64, usize> {
    let mut demand: BTreeMap<i64, usize> = BTreeMap::new();
    for planned in plan {
        *demand.entry(planned.schedule_id).or_insert(0) += 1;
    }
    demand
}
