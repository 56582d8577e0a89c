// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::fanout::PlannedEnrollment;
use class_apply_domain::Application;

/// A description of what a transition did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The command name.
    pub name: String,
    /// Human-readable details.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new action record.
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// The result of a successful state transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The application after the transition.
    pub new_application: Application,
    /// Enrollments to create. Only non-empty for `Submit`.
    pub enrollment_plan: Vec<PlannedEnrollment>,
    /// What happened.
    pub action: Action,
}

/// The result of opening a draft from a cart selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftResult {
    /// The new or updated draft.
    pub application: Application,
    /// Whether a new draft was created rather than an existing one updated.
    pub created: bool,
}
