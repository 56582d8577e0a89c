// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Mutation modules for persistence layer.
//!
//! ## Module Organization
//!
//! - `applications`: Draft storage and the submit, cancel and complete transactions
//! - `catalog`: Collaborator writers and the conditional seat counter updates

pub mod applications;
pub mod catalog;

pub use applications::{
    commit_cancellation, commit_completion, commit_submission, record_payment_status, save_draft,
};
pub use catalog::{
    add_to_cart, create_account, create_course, create_schedule, remove_cart_courses,
    set_course_purchasable, set_schedule_active,
};
