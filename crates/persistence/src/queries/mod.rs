// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Query modules for persistence layer.
//!
//! This module contains all read-only queries for the persistence layer.
//!
//! ## Module Organization
//!
//! - `applications`: Applications, course lines, rosters, enrollments
//! - `catalog`: Accounts, schedules, cart, live enrollment checks

pub mod applications;
pub mod catalog;

pub use applications::{
    find_draft_for_owner, get_application, get_raw_application_number, get_roster_upload,
    list_applications_for_owner, list_enrollments_for_application,
};
pub use catalog::{
    find_account_by_email, get_account, get_schedule, has_live_enrollment, list_cart_course_ids,
    resolve_cart_courses,
};
