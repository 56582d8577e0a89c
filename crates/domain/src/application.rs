// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! The class application aggregate and its course lines.
//!
//! A course line holds either individually added students or a single bulk
//! roster, never both. The thresholds are asymmetric so the two paths never
//! overlap: one to five students are added one at a time, six or more arrive
//! as a bulk file.

use crate::error::DomainError;
use crate::types::{Agreements, ApplicationStatus, PaymentInfo, StudentEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// Maximum number of students added one at a time to a course line.
pub const INDIVIDUAL_ROSTER_CAP: usize = 5;

/// Minimum number of rows in a bulk roster file.
pub const BULK_ROSTER_FLOOR: usize = 6;

/// Maximum number of rows in a bulk roster file.
pub const BULK_ROSTER_CEILING: usize = 500;

/// Which roster path a course line uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterMode {
    /// No students yet.
    Empty,
    /// Students added one at a time.
    Individual,
    /// Students from a bulk upload.
    Bulk,
}

impl RosterMode {
    /// Returns the persisted string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Individual => "individual",
            Self::Bulk => "bulk",
        }
    }
}

impl FromStr for RosterMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "empty" => Ok(Self::Empty),
            "individual" => Ok(Self::Individual),
            "bulk" => Ok(Self::Bulk),
            _ => Err(DomainError::InvalidRosterMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for RosterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reference to an uploaded roster file, kept as an audit artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkUploadRef {
    /// Stored upload identifier. `None` until persisted.
    pub upload_id: Option<i64>,
    /// Original file name.
    pub file_name: String,
    /// Number of validated rows.
    pub row_count: usize,
    /// When the file was uploaded (RFC 3339).
    pub uploaded_at: String,
}

/// The students of one course line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Roster {
    /// Nobody yet.
    #[default]
    Empty,
    /// Students added one at a time.
    Individual {
        /// The students in insertion order.
        students: Vec<StudentEntry>,
    },
    /// Students validated from a bulk upload.
    Bulk {
        /// The uploaded file.
        upload: BulkUploadRef,
        /// The validated rows in file order.
        students: Vec<StudentEntry>,
    },
}

impl Roster {
    /// Returns the roster path in use.
    #[must_use]
    pub const fn mode(&self) -> RosterMode {
        match self {
            Self::Empty => RosterMode::Empty,
            Self::Individual { .. } => RosterMode::Individual,
            Self::Bulk { .. } => RosterMode::Bulk,
        }
    }

    /// Returns the students regardless of path.
    #[must_use]
    pub fn students(&self) -> &[StudentEntry] {
        match self {
            Self::Empty => &[],
            Self::Individual { students } | Self::Bulk { students, .. } => students,
        }
    }

    /// Number of students on the roster.
    #[must_use]
    pub fn len(&self) -> usize {
        self.students().len()
    }

    /// Returns whether nobody is on the roster.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.students().is_empty()
    }

    /// Returns the upload reference for bulk rosters.
    #[must_use]
    pub const fn upload(&self) -> Option<&BulkUploadRef> {
        match self {
            Self::Bulk { upload, .. } => Some(upload),
            _ => None,
        }
    }
}

/// One selected course within an application.
///
/// Name, period and prices are captured when the line is created so later
/// catalog changes do not alter an in-flight application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseLine {
    /// Stored line identifier. `None` until persisted.
    pub course_line_id: Option<i64>,
    /// The course.
    pub course_id: i64,
    /// The schedule the students will attend.
    pub schedule_id: i64,
    /// Course name at draft time.
    pub course_name: String,
    /// Schedule period at draft time.
    pub period: String,
    /// List price at draft time.
    pub price: i64,
    /// Price actually charged.
    pub discounted_price: i64,
    /// The students.
    pub roster: Roster,
}

impl CourseLine {
    /// Creates a course line with an empty roster.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPrice` if either price is negative or the
    /// discounted price exceeds the list price.
    pub fn new(
        course_id: i64,
        schedule_id: i64,
        course_name: String,
        period: String,
        price: i64,
        discounted_price: i64,
    ) -> Result<Self, DomainError> {
        if price < 0 || discounted_price < 0 {
            return Err(DomainError::InvalidPrice {
                course_id,
                reason: String::from("prices cannot be negative"),
            });
        }
        if discounted_price > price {
            return Err(DomainError::InvalidPrice {
                course_id,
                reason: format!("discounted price {discounted_price} exceeds price {price}"),
            });
        }
        Ok(Self {
            course_line_id: None,
            course_id,
            schedule_id,
            course_name,
            period,
            price,
            discounted_price,
            roster: Roster::Empty,
        })
    }

    /// Adds one individually verified student.
    ///
    /// # Errors
    ///
    /// Returns an error if the line has a bulk roster, the individual cap is
    /// reached, or the student is already on the line.
    pub fn attach_student(&mut self, student: StudentEntry) -> Result<(), DomainError> {
        match &mut self.roster {
            Roster::Bulk { .. } => Err(DomainError::RosterModeConflict {
                course_id: self.course_id,
                existing: RosterMode::Bulk,
            }),
            Roster::Empty => {
                self.roster = Roster::Individual {
                    students: vec![student],
                };
                Ok(())
            }
            Roster::Individual { students } => {
                if students.len() >= INDIVIDUAL_ROSTER_CAP {
                    return Err(DomainError::IndividualRosterFull {
                        course_id: self.course_id,
                        cap: INDIVIDUAL_ROSTER_CAP,
                    });
                }
                if students.iter().any(|s| s.user_id == student.user_id) {
                    return Err(DomainError::DuplicateStudentOnLine {
                        course_id: self.course_id,
                        user_id: student.user_id,
                    });
                }
                students.push(student);
                Ok(())
            }
        }
    }

    /// Removes an individually added student.
    ///
    /// The roster returns to empty when the last student leaves, which frees
    /// the line to take a bulk upload instead.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::StudentNotOnLine` if the student is not on an
    /// individual roster of this line.
    pub fn detach_student(&mut self, user_id: i64) -> Result<StudentEntry, DomainError> {
        let not_found = DomainError::StudentNotOnLine {
            course_id: self.course_id,
            user_id,
        };
        let Roster::Individual { students } = &mut self.roster else {
            return Err(not_found);
        };
        let Some(index) = students.iter().position(|s| s.user_id == user_id) else {
            return Err(not_found);
        };
        let removed: StudentEntry = students.remove(index);
        if students.is_empty() {
            self.roster = Roster::Empty;
        }
        Ok(removed)
    }

    /// Installs a validated bulk roster.
    ///
    /// # Errors
    ///
    /// Returns an error if the line already has any roster, or the row count
    /// falls outside the bulk floor and ceiling.
    pub fn attach_bulk_roster(
        &mut self,
        upload: BulkUploadRef,
        students: Vec<StudentEntry>,
    ) -> Result<(), DomainError> {
        let existing: RosterMode = self.roster.mode();
        if existing != RosterMode::Empty {
            return Err(DomainError::RosterModeConflict {
                course_id: self.course_id,
                existing,
            });
        }
        validate_bulk_row_count(students.len())?;
        validate_unique_students(self.course_id, &students)?;
        self.roster = Roster::Bulk { upload, students };
        Ok(())
    }
}

/// Checks a bulk roster row count against the floor and ceiling.
///
/// # Errors
///
/// Returns `BulkRosterTooSmall` or `BulkRosterTooLarge`.
pub const fn validate_bulk_row_count(rows: usize) -> Result<(), DomainError> {
    if rows < BULK_ROSTER_FLOOR {
        return Err(DomainError::BulkRosterTooSmall {
            rows,
            floor: BULK_ROSTER_FLOOR,
        });
    }
    if rows > BULK_ROSTER_CEILING {
        return Err(DomainError::BulkRosterTooLarge {
            rows,
            ceiling: BULK_ROSTER_CEILING,
        });
    }
    Ok(())
}

fn validate_unique_students(course_id: i64, students: &[StudentEntry]) -> Result<(), DomainError> {
    let mut seen: HashSet<i64> = HashSet::new();
    for student in students {
        if !seen.insert(student.user_id) {
            return Err(DomainError::DuplicateStudentOnLine {
                course_id,
                user_id: student.user_id,
            });
        }
    }
    Ok(())
}

/// Sums the discounted prices of the course lines.
///
/// # Errors
///
/// Returns `DomainError::AmountOverflow` if the sum does not fit.
pub fn total_amount(course_lines: &[CourseLine]) -> Result<i64, DomainError> {
    course_lines.iter().try_fold(0_i64, |acc, line| {
        acc.checked_add(line.discounted_price)
            .ok_or(DomainError::AmountOverflow)
    })
}

/// The class application aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    /// Stored identifier. `None` until persisted.
    pub application_id: Option<i64>,
    /// Human-readable number. Absent until submission.
    pub application_number: Option<String>,
    /// The purchasing account.
    pub owner_id: i64,
    /// Lifecycle state.
    pub status: ApplicationStatus,
    /// Selected courses in selection order.
    pub course_lines: Vec<CourseLine>,
    /// Payment metadata; `total_amount` is derived from the lines.
    pub payment: PaymentInfo,
    /// Agreement flags, recorded at submission.
    pub agreements: Agreements,
    /// Creation time (RFC 3339).
    pub created_at: String,
    /// Submission time (RFC 3339).
    pub submitted_at: Option<String>,
    /// Cancellation time (RFC 3339).
    pub cancelled_at: Option<String>,
    /// Why the application was cancelled.
    pub cancellation_reason: Option<String>,
}

impl Application {
    /// Creates a new draft for the owner.
    ///
    /// # Errors
    ///
    /// Returns an error if no course lines are given, a course repeats, or
    /// the total overflows.
    pub fn new_draft(
        owner_id: i64,
        course_lines: Vec<CourseLine>,
        created_at: String,
    ) -> Result<Self, DomainError> {
        let mut application: Self = Self {
            application_id: None,
            application_number: None,
            owner_id,
            status: ApplicationStatus::Draft,
            course_lines: Vec::new(),
            payment: PaymentInfo::default(),
            agreements: Agreements::default(),
            created_at,
            submitted_at: None,
            cancelled_at: None,
            cancellation_reason: None,
        };
        application.replace_course_lines(course_lines)?;
        Ok(application)
    }

    /// Fails unless the application is a draft.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ApplicationNotDraft`.
    pub const fn ensure_draft(&self) -> Result<(), DomainError> {
        match self.status {
            ApplicationStatus::Draft => Ok(()),
            status => Err(DomainError::ApplicationNotDraft { status }),
        }
    }

    /// Replaces the course lines and recomputes the total.
    ///
    /// A roster already attached to a course whose schedule is unchanged is
    /// carried over to the replacement line.
    ///
    /// # Errors
    ///
    /// Returns an error if `course_lines` is empty, a course repeats, or the
    /// total overflows. The application is unchanged on error.
    pub fn replace_course_lines(
        &mut self,
        mut course_lines: Vec<CourseLine>,
    ) -> Result<(), DomainError> {
        if course_lines.is_empty() {
            return Err(DomainError::EmptyCourseSelection);
        }
        let mut seen: HashSet<i64> = HashSet::new();
        for line in &course_lines {
            if !seen.insert(line.course_id) {
                return Err(DomainError::DuplicateCourseLine {
                    course_id: line.course_id,
                });
            }
        }
        let total: i64 = total_amount(&course_lines)?;

        for line in &mut course_lines {
            if let Some(previous) = self
                .course_lines
                .iter()
                .find(|old| old.course_id == line.course_id && old.schedule_id == line.schedule_id)
                && line.roster.is_empty()
            {
                line.roster = previous.roster.clone();
            }
        }

        self.course_lines = course_lines;
        self.payment.total_amount = total;
        Ok(())
    }

    /// Finds the line for a course.
    #[must_use]
    pub fn course_line(&self, course_id: i64) -> Option<&CourseLine> {
        self.course_lines.iter().find(|l| l.course_id == course_id)
    }

    /// Finds the line for a course, mutably.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::CourseLineNotFound`.
    pub fn course_line_mut(&mut self, course_id: i64) -> Result<&mut CourseLine, DomainError> {
        self.course_lines
            .iter_mut()
            .find(|l| l.course_id == course_id)
            .ok_or(DomainError::CourseLineNotFound { course_id })
    }

    /// Fails on the first course line with nobody on its roster.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::EmptyRoster` naming the line.
    pub fn ensure_rosters_populated(&self) -> Result<(), DomainError> {
        match self.course_lines.iter().find(|l| l.roster.is_empty()) {
            Some(line) => Err(DomainError::EmptyRoster {
                course_id: line.course_id,
                course_name: line.course_name.clone(),
            }),
            None => Ok(()),
        }
    }

    /// Total students across all lines.
    #[must_use]
    pub fn total_students(&self) -> usize {
        self.course_lines.iter().map(|l| l.roster.len()).sum()
    }

    /// Course ids of all lines, in line order.
    #[must_use]
    pub fn course_ids(&self) -> Vec<i64> {
        self.course_lines.iter().map(|l| l.course_id).collect()
    }
}
