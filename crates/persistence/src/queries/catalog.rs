// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Collaborator queries: accounts, schedules, cart and existing enrollments.

use class_apply_domain::{Account, TrainingSchedule, normalize_email};
use diesel::SqliteConnection;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use std::collections::HashSet;
use tracing::debug;

use crate::data_models::{AccountRow, CartCourse, ScheduleRow};
use crate::diesel_schema::{accounts, cart_items, courses, enrollments, training_schedules};
use crate::error::PersistenceError;

fn to_account(row: AccountRow) -> Account {
    Account {
        user_id: row.user_id,
        name: row.name,
        email: row.email,
        phone: row.phone,
    }
}

pub(crate) fn to_schedule(row: ScheduleRow) -> Result<TrainingSchedule, PersistenceError> {
    let available_seats: u32 = row.available_seats.to_u32().ok_or_else(|| {
        PersistenceError::CorruptRow(format!(
            "schedule {} has negative available_seats",
            row.schedule_id
        ))
    })?;
    let enrolled_count: u32 = row.enrolled_count.to_u32().ok_or_else(|| {
        PersistenceError::CorruptRow(format!(
            "schedule {} has negative enrolled_count",
            row.schedule_id
        ))
    })?;
    Ok(TrainingSchedule {
        schedule_id: row.schedule_id,
        course_id: row.course_id,
        start_date: row.start_date,
        end_date: row.end_date,
        is_active: row.is_active != 0,
        available_seats,
        enrolled_count,
    })
}

/// Finds an account by email.
///
/// The lookup is trimmed and case-insensitive.
///
/// # Errors
///
/// Returns an error if the database query fails.
/// Returns `Ok(None)` if no account uses the email.
pub fn find_account_by_email(
    conn: &mut SqliteConnection,
    email: &str,
) -> Result<Option<Account>, PersistenceError> {
    let normalized: String = normalize_email(email);
    debug!(email = %normalized, "Looking up account by email");

    let row: Option<AccountRow> = accounts::table
        .filter(accounts::email.eq(&normalized))
        .select(AccountRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(to_account))
}

/// Retrieves an account by id.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn get_account(
    conn: &mut SqliteConnection,
    user_id: i64,
) -> Result<Option<Account>, PersistenceError> {
    let row: Option<AccountRow> = accounts::table
        .filter(accounts::user_id.eq(user_id))
        .select(AccountRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(to_account))
}

/// Retrieves a schedule with its current seat counters.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the schedule does not exist.
pub fn get_schedule(
    conn: &mut SqliteConnection,
    schedule_id: i64,
) -> Result<TrainingSchedule, PersistenceError> {
    let row: Option<ScheduleRow> = training_schedules::table
        .filter(training_schedules::schedule_id.eq(schedule_id))
        .select(ScheduleRow::as_select())
        .first(conn)
        .optional()?;

    match row {
        Some(row) => to_schedule(row),
        None => Err(PersistenceError::NotFound(format!(
            "Schedule {schedule_id} not found"
        ))),
    }
}

/// Returns whether the student holds a non-cancelled enrollment for the offering.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn has_live_enrollment(
    conn: &mut SqliteConnection,
    student_user_id: i64,
    course_id: i64,
    schedule_id: i64,
) -> Result<bool, PersistenceError> {
    let count: i64 = enrollments::table
        .filter(enrollments::student_user_id.eq(student_user_id))
        .filter(enrollments::course_id.eq(course_id))
        .filter(enrollments::schedule_id.eq(schedule_id))
        .filter(enrollments::status.ne("cancelled"))
        .count()
        .get_result(conn)?;

    Ok(count > 0)
}

/// Resolves requested course ids against the owner's cart.
///
/// Ids not in the cart or not purchasable are skipped. Duplicates are
/// collapsed and request order is kept.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn resolve_cart_courses(
    conn: &mut SqliteConnection,
    owner_id: i64,
    course_ids: &[i64],
) -> Result<Vec<CartCourse>, PersistenceError> {
    let mut seen: HashSet<i64> = HashSet::new();
    let mut resolved: Vec<CartCourse> = Vec::new();

    for &course_id in course_ids {
        if !seen.insert(course_id) {
            continue;
        }

        let schedule_id: Option<i64> = cart_items::table
            .filter(cart_items::owner_id.eq(owner_id))
            .filter(cart_items::course_id.eq(course_id))
            .select(cart_items::schedule_id)
            .first(conn)
            .optional()?;
        let Some(schedule_id) = schedule_id else {
            debug!(owner_id, course_id, "Course not in cart; skipping");
            continue;
        };

        let course: Option<(String, i64, i64)> = courses::table
            .filter(courses::course_id.eq(course_id))
            .filter(courses::is_purchasable.eq(1))
            .select((courses::name, courses::price, courses::discounted_price))
            .first(conn)
            .optional()?;
        let Some((course_name, price, discounted_price)) = course else {
            debug!(owner_id, course_id, "Course not purchasable; skipping");
            continue;
        };

        let schedule: TrainingSchedule = get_schedule(conn, schedule_id)?;

        resolved.push(CartCourse {
            course_id,
            schedule_id,
            course_name,
            period: schedule.period(),
            price,
            discounted_price,
        });
    }

    Ok(resolved)
}

/// Lists the course ids in the owner's cart, oldest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_cart_course_ids(
    conn: &mut SqliteConnection,
    owner_id: i64,
) -> Result<Vec<i64>, PersistenceError> {
    Ok(cart_items::table
        .filter(cart_items::owner_id.eq(owner_id))
        .order(cart_items::cart_item_id.asc())
        .select(cart_items::course_id)
        .load(conn)?)
}
