// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Collaborator mutations.
//!
//! Accounts, catalog entries, schedules and cart items belong to other
//! systems. These writers exist so the workflow has something to read and
//! so the submission transaction can span the cart and seat counters.

use class_apply_domain::normalize_email;
use diesel::SqliteConnection;
use diesel::prelude::*;
use num_traits::ToPrimitive;
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{accounts, cart_items, courses, training_schedules};
use crate::error::PersistenceError;

/// Creates an account.
///
/// The email is stored trimmed and lowercased.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the email is taken.
pub fn create_account(
    conn: &mut SqliteConnection,
    name: &str,
    email: &str,
    phone: &str,
) -> Result<i64, PersistenceError> {
    let normalized_email: String = normalize_email(email);

    diesel::insert_into(accounts::table)
        .values((
            accounts::name.eq(name.trim()),
            accounts::email.eq(&normalized_email),
            accounts::phone.eq(phone.trim()),
        ))
        .execute(conn)?;

    let user_id: i64 = conn.get_last_insert_rowid()?;
    info!(user_id, email = %normalized_email, "Account created");
    Ok(user_id)
}

/// Creates a purchasable course.
///
/// # Errors
///
/// Returns an error if the prices violate the table constraints.
pub fn create_course(
    conn: &mut SqliteConnection,
    name: &str,
    price: i64,
    discounted_price: i64,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(courses::table)
        .values((
            courses::name.eq(name),
            courses::price.eq(price),
            courses::discounted_price.eq(discounted_price),
        ))
        .execute(conn)?;

    let course_id: i64 = conn.get_last_insert_rowid()?;
    info!(course_id, name, price, discounted_price, "Course created");
    Ok(course_id)
}

/// Marks a course as purchasable or not.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the course does not exist.
pub fn set_course_purchasable(
    conn: &mut SqliteConnection,
    course_id: i64,
    purchasable: bool,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(courses::table)
        .filter(courses::course_id.eq(course_id))
        .set(courses::is_purchasable.eq(i32::from(purchasable)))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Course {course_id} not found"
        )));
    }
    Ok(())
}

/// Creates a schedule for a course.
///
/// # Errors
///
/// Returns an error if the seat count does not fit or the course does not exist.
pub fn create_schedule(
    conn: &mut SqliteConnection,
    course_id: i64,
    start_date: &str,
    end_date: &str,
    available_seats: u32,
) -> Result<i64, PersistenceError> {
    let seats: i32 = available_seats.to_i32().ok_or_else(|| {
        PersistenceError::QueryFailed(format!("available_seats {available_seats} out of range"))
    })?;

    diesel::insert_into(training_schedules::table)
        .values((
            training_schedules::course_id.eq(course_id),
            training_schedules::start_date.eq(start_date),
            training_schedules::end_date.eq(end_date),
            training_schedules::available_seats.eq(seats),
        ))
        .execute(conn)?;

    let schedule_id: i64 = conn.get_last_insert_rowid()?;
    info!(schedule_id, course_id, available_seats, "Schedule created");
    Ok(schedule_id)
}

/// Opens or closes a schedule for enrollment.
///
/// # Errors
///
/// Returns `PersistenceError::NotFound` if the schedule does not exist.
pub fn set_schedule_active(
    conn: &mut SqliteConnection,
    schedule_id: i64,
    is_active: bool,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(training_schedules::table)
        .filter(training_schedules::schedule_id.eq(schedule_id))
        .set(training_schedules::is_active.eq(i32::from(is_active)))
        .execute(conn)?;
    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Schedule {schedule_id} not found"
        )));
    }
    info!(schedule_id, is_active, "Schedule activity changed");
    Ok(())
}

/// Adds a course offering to the owner's cart.
///
/// # Errors
///
/// Returns `PersistenceError::UniqueViolation` if the course is already in the cart.
pub fn add_to_cart(
    conn: &mut SqliteConnection,
    owner_id: i64,
    course_id: i64,
    schedule_id: i64,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(cart_items::table)
        .values((
            cart_items::owner_id.eq(owner_id),
            cart_items::course_id.eq(course_id),
            cart_items::schedule_id.eq(schedule_id),
        ))
        .execute(conn)?;

    let cart_item_id: i64 = conn.get_last_insert_rowid()?;
    debug!(cart_item_id, owner_id, course_id, "Added course to cart");
    Ok(cart_item_id)
}

/// Removes applied courses from the owner's cart.
///
/// Courses not in the cart are ignored.
///
/// # Errors
///
/// Returns an error if the database delete fails.
pub fn remove_cart_courses(
    conn: &mut SqliteConnection,
    owner_id: i64,
    course_ids: &[i64],
) -> Result<usize, PersistenceError> {
    let removed: usize = diesel::delete(
        cart_items::table
            .filter(cart_items::owner_id.eq(owner_id))
            .filter(cart_items::course_id.eq_any(course_ids)),
    )
    .execute(conn)?;

    debug!(owner_id, removed, "Removed applied courses from cart");
    Ok(removed)
}

/// Takes one seat on a schedule.
///
/// The update only matches an active schedule with a free seat, so two
/// writers can never push `enrolled_count` past `available_seats`.
///
/// # Errors
///
/// Returns `PersistenceError::SeatsExhausted` if no row matched.
pub fn increment_enrolled_count(
    conn: &mut SqliteConnection,
    schedule_id: i64,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(training_schedules::table)
        .filter(training_schedules::schedule_id.eq(schedule_id))
        .filter(training_schedules::is_active.eq(1))
        .filter(training_schedules::enrolled_count.lt(training_schedules::available_seats))
        .set(training_schedules::enrolled_count.eq(training_schedules::enrolled_count + 1))
        .execute(conn)?;

    if updated != 1 {
        return Err(PersistenceError::SeatsExhausted { schedule_id });
    }
    Ok(())
}

/// Gives one seat back to a schedule.
///
/// # Errors
///
/// Returns an error if the database update fails.
pub fn release_seat(conn: &mut SqliteConnection, schedule_id: i64) -> Result<(), PersistenceError> {
    diesel::update(training_schedules::table)
        .filter(training_schedules::schedule_id.eq(schedule_id))
        .filter(training_schedules::enrolled_count.gt(0))
        .set(training_schedules::enrolled_count.eq(training_schedules::enrolled_count - 1))
        .execute(conn)?;
    Ok(())
}
