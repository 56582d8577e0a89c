// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bulk roster ingestion.
//!
//! A roster file is CSV with one student per row. Headers are matched
//! case-insensitively against English and Korean synonyms. Ingestion is
//! all-or-nothing: if any row fails, the whole file is rejected and every
//! failing row is reported.

use class_apply_domain::{
    Account, StudentCandidate, StudentEntry, TrainingSchedule, normalize_email, validate_bulk_row_count,
    verify_student_identity,
};
use class_apply_persistence::Persistence;
use csv::StringRecord;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::error::{ApiError, translate_domain_error, translate_persistence_error};

/// Canonical header row of the roster template.
pub const ROSTER_TEMPLATE_HEADER: &str = "name,email,phone,company,position";

/// A column of the canonical student shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum RosterColumn {
    Name,
    Email,
    Phone,
    Company,
    Position,
}

impl RosterColumn {
    const REQUIRED: [Self; 3] = [Self::Name, Self::Email, Self::Phone];

    const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Company => "company",
            Self::Position => "position",
        }
    }

    fn from_header(header: &str) -> Option<Self> {
        match normalize_header(header).as_str() {
            "name" | "이름" | "성명" => Some(Self::Name),
            "email" | "e-mail" | "이메일" => Some(Self::Email),
            "phone" | "mobile" | "연락처" | "휴대폰" => Some(Self::Phone),
            "company" | "회사" | "소속" => Some(Self::Company),
            "position" | "직급" | "직책" => Some(Self::Position),
            _ => None,
        }
    }
}

/// Normalizes a header for matching: BOM stripped, trimmed, lowercased.
fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}

/// A rejected roster row.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RosterRowError {
    /// The line in the file where the row starts; the header is line 1.
    pub row_number: u64,
    /// The email on the row, if present.
    pub email: Option<String>,
    /// Stable reason, e.g. `name_mismatch` or `duplicate_in_file`.
    pub reason: String,
    /// Human-readable description.
    pub message: String,
}

/// A parsed, not yet verified, roster row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    /// The line in the file where the row starts; the header is line 1.
    pub row_number: u64,
    /// The claimed identity.
    pub candidate: StudentCandidate,
}

/// Returns the roster template file content.
#[must_use]
pub fn roster_template_csv() -> String {
    format!("{ROSTER_TEMPLATE_HEADER}\n")
}

fn map_headers(headers: &StringRecord) -> Result<HashMap<RosterColumn, usize>, ApiError> {
    let mut header_map: HashMap<RosterColumn, usize> = HashMap::new();
    for (idx, header) in headers.iter().enumerate() {
        if let Some(column) = RosterColumn::from_header(header) {
            header_map.entry(column).or_insert(idx);
        }
    }

    let missing: Vec<&str> = RosterColumn::REQUIRED
        .iter()
        .filter(|column| !header_map.contains_key(*column))
        .map(|column| column.as_str())
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("file"),
            message: format!("Missing required columns: {}", missing.join(", ")),
        });
    }

    Ok(header_map)
}

/// Parses roster CSV content into candidate rows.
///
/// Rows whose fields are all blank are skipped.
///
/// # Errors
///
/// Returns `ApiError::InvalidInput` if the file cannot be read as CSV or a
/// required column (name, email, phone) is missing.
pub fn parse_roster(content: &str) -> Result<Vec<RosterRow>, ApiError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: StringRecord = reader
        .headers()
        .map_err(|e| ApiError::InvalidInput {
            field: String::from("file"),
            message: format!("Failed to read roster headers: {e}"),
        })?
        .clone();
    let header_map: HashMap<RosterColumn, usize> = map_headers(&headers)?;

    let mut rows: Vec<RosterRow> = Vec::new();
    for result in reader.records() {
        let record: StringRecord = result.map_err(|e| ApiError::InvalidInput {
            field: String::from("file"),
            message: format!("Failed to parse roster: {e}"),
        })?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let field = |column: RosterColumn| -> Option<String> {
            header_map
                .get(&column)
                .and_then(|&idx| record.get(idx))
                .filter(|value| !value.is_empty())
                .map(String::from)
        };

        let row_number: u64 = record.position().map_or(0, csv::Position::line);
        rows.push(RosterRow {
            row_number,
            candidate: StudentCandidate {
                name: field(RosterColumn::Name).unwrap_or_default(),
                email: field(RosterColumn::Email).unwrap_or_default(),
                phone: field(RosterColumn::Phone).unwrap_or_default(),
                company: field(RosterColumn::Company),
                position: field(RosterColumn::Position),
            },
        });
    }

    Ok(rows)
}

/// Parses and verifies a roster file for one course offering.
///
/// The row-count bounds are checked before any row is verified. Each row
/// must match an existing account, must not repeat an email already seen in
/// the file, and must not belong to a student already enrolled in the
/// schedule.
///
/// # Arguments
///
/// * `persistence` - Used for account and enrollment lookups only
/// * `content` - Raw CSV content
/// * `schedule` - The schedule of the target course line
///
/// # Returns
///
/// The verified students, in file order.
///
/// # Errors
///
/// Returns an error if:
/// - The file is malformed or lacks a required column (`InvalidInput`)
/// - The row count is outside the bulk bounds (`ValidationFailed`)
/// - Any row fails verification (`RosterRejected`, listing every bad row)
pub fn ingest_roster(
    persistence: &mut Persistence,
    content: &str,
    schedule: &TrainingSchedule,
) -> Result<Vec<StudentEntry>, ApiError> {
    let rows: Vec<RosterRow> = parse_roster(content)?;
    validate_bulk_row_count(rows.len()).map_err(translate_domain_error)?;

    let mut seen_emails: HashSet<String> = HashSet::new();
    let mut row_errors: Vec<RosterRowError> = Vec::new();
    let mut students: Vec<StudentEntry> = Vec::with_capacity(rows.len());

    for row in rows {
        let email: Option<String> =
            Some(row.candidate.email.clone()).filter(|email| !email.is_empty());

        if email.is_some() && !seen_emails.insert(normalize_email(&row.candidate.email)) {
            row_errors.push(RosterRowError {
                row_number: row.row_number,
                email,
                reason: String::from("duplicate_in_file"),
                message: String::from("Email appears more than once in the file"),
            });
            continue;
        }

        let account: Option<Account> = persistence
            .find_account_by_email(&row.candidate.email)
            .map_err(translate_persistence_error)?;
        let user_id: i64 = match verify_student_identity(&row.candidate, account.as_ref()) {
            Ok(user_id) => user_id,
            Err(e) => {
                row_errors.push(RosterRowError {
                    row_number: row.row_number,
                    email,
                    reason: String::from(e.identity_reason().unwrap_or("invalid_field")),
                    message: e.to_string(),
                });
                continue;
            }
        };

        if persistence
            .has_live_enrollment(user_id, schedule.course_id, schedule.schedule_id)
            .map_err(translate_persistence_error)?
        {
            row_errors.push(RosterRowError {
                row_number: row.row_number,
                email,
                reason: String::from("already_enrolled"),
                message: format!(
                    "Student is already enrolled in schedule {}",
                    schedule.schedule_id
                ),
            });
            continue;
        }

        students.push(row.candidate.into_entry(user_id));
    }

    if !row_errors.is_empty() {
        warn!(
            schedule_id = schedule.schedule_id,
            invalid_rows = row_errors.len(),
            "Rejected roster upload"
        );
        return Err(ApiError::RosterRejected { rows: row_errors });
    }

    debug!(
        schedule_id = schedule.schedule_id,
        rows = students.len(),
        "Verified roster upload"
    );
    Ok(students)
}
