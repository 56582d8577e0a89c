// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use class_apply_domain::{
    Agreements, BulkUploadRef, CourseLine, PaymentMethod, PaymentStatus, StudentEntry,
    TrainingSchedule,
};

/// A command represents user or system intent as data only.
///
/// Commands are the only way to request changes to an application. Anything
/// that needs storage (account lookup, schedule counters, existing
/// enrollments) is resolved by the caller and carried in the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Replace the draft's course lines with a freshly resolved selection.
    ReplaceCourseLines {
        /// Priced lines resolved from the cart.
        course_lines: Vec<CourseLine>,
    },
    /// Add one verified student to a course line.
    AttachStudent {
        /// The course line to add to.
        course_id: i64,
        /// The verified student.
        student: StudentEntry,
        /// The line's schedule with current counters.
        schedule: TrainingSchedule,
        /// Whether the student already holds a live enrollment for the offering.
        has_live_enrollment: bool,
    },
    /// Remove an individually added student.
    DetachStudent {
        /// The course line.
        course_id: i64,
        /// The student to remove.
        user_id: i64,
    },
    /// Install a bulk roster whose rows were all validated.
    AttachBulkRoster {
        /// The course line.
        course_id: i64,
        /// The uploaded file.
        upload: BulkUploadRef,
        /// Validated rows in file order.
        students: Vec<StudentEntry>,
    },
    /// Merge payment metadata. `None` fields keep their current value.
    SetPaymentInfo {
        /// Payment method.
        payment_method: Option<PaymentMethod>,
        /// Tax invoice flag.
        tax_invoice: Option<bool>,
    },
    /// Record the payment state reported by the payment collaborator.
    ///
    /// Accepted in every status; refunds arrive after cancellation.
    RecordPaymentStatus {
        /// Reported payment status.
        payment_status: PaymentStatus,
    },
    /// Submit the draft.
    Submit {
        /// Agreement flags as accepted by the purchaser.
        agreements: Agreements,
        /// The number to assign.
        application_number: String,
        /// Submission time (RFC 3339).
        submitted_at: String,
    },
    /// Cancel a draft or submitted application.
    Cancel {
        /// Why.
        reason: String,
        /// Cancellation time (RFC 3339).
        cancelled_at: String,
    },
    /// Mark a submitted application as completed.
    Complete,
}

impl Command {
    /// Returns the command name used in logs and transition records.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ReplaceCourseLines { .. } => "ReplaceCourseLines",
            Self::AttachStudent { .. } => "AttachStudent",
            Self::DetachStudent { .. } => "DetachStudent",
            Self::AttachBulkRoster { .. } => "AttachBulkRoster",
            Self::SetPaymentInfo { .. } => "SetPaymentInfo",
            Self::RecordPaymentStatus { .. } => "RecordPaymentStatus",
            Self::Submit { .. } => "Submit",
            Self::Cancel { .. } => "Cancel",
            Self::Complete => "Complete",
        }
    }
}
