// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Roster file ingestion tests.

use super::helpers::{
    TestContext, accept_all, create_test_account, create_test_context, open_draft, roster_csv,
    student_request,
};
use crate::{
    ApiError, ApplicationResponse, AttachBulkRosterRequest, AttachBulkRosterResponse,
    CreateDraftRequest, DraftResponse, ErrorKind, ROSTER_TEMPLATE_HEADER, RosterRow,
    RosterRowError, attach_bulk_roster, attach_student, create_or_update_draft,
    download_roster_template, get_application, parse_roster, submit_application,
};

fn upload(
    context: &mut TestContext,
    application_id: i64,
    content: String,
) -> Result<AttachBulkRosterResponse, ApiError> {
    attach_bulk_roster(
        &mut context.persistence,
        context.owner_id,
        application_id,
        &AttachBulkRosterRequest {
            course_id: context.course_a,
            file_name: String::from("students.csv"),
            content,
        },
    )
}

#[test]
fn test_parse_maps_header_synonyms_and_skips_blank_lines() {
    let content: &str = "\u{feff}성명, E-mail ,휴대폰,소속,직책\n\
                         Kim Minsu,minsu@example.com,010-1234-5678,Acme,Engineer\n\
                         \n\
                         ,,,,\n\
                         Lee Jiwon,jiwon@example.com,01098765432,,\n";

    let rows: Vec<RosterRow> = parse_roster(content).unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].row_number, 2);
    assert_eq!(rows[0].candidate.name, "Kim Minsu");
    assert_eq!(rows[0].candidate.email, "minsu@example.com");
    assert_eq!(rows[0].candidate.position.as_deref(), Some("Engineer"));
    assert_eq!(rows[1].row_number, 5);
    assert_eq!(rows[1].candidate.company, None);
}

#[test]
fn test_parse_rejects_missing_required_column() {
    let result: Result<Vec<RosterRow>, ApiError> =
        parse_roster("name,email,company\nKim,kim@example.com,Acme\n");

    assert!(matches!(
        result,
        Err(ApiError::InvalidInput { ref message, .. }) if message.contains("phone")
    ));
}

#[test]
fn test_template_has_canonical_header() {
    let template: String = download_roster_template();
    assert_eq!(template.trim_end(), ROSTER_TEMPLATE_HEADER);
    assert!(parse_roster(&template).unwrap().is_empty());
}

#[test]
fn test_bulk_roster_is_attached_and_stored() {
    let mut context: TestContext = create_test_context(30);
    let application_id: i64 =
        open_draft(&mut context.persistence, context.owner_id, vec![context.course_a]);
    for n in 1..=6 {
        create_test_account(&mut context.persistence, n);
    }

    let response: AttachBulkRosterResponse =
        upload(&mut context, application_id, roster_csv(1, 6)).unwrap();

    assert_eq!(response.row_count, 6);
    let line = &response.application.course_lines[0];
    assert_eq!(line.roster_mode, "bulk");
    assert_eq!(line.students.len(), 6);
    let bulk = line.bulk_upload.as_ref().unwrap();
    assert_eq!(bulk.file_name, "students.csv");
    assert!(bulk.upload_id.is_some());
}

#[test]
fn test_five_row_file_fails_entirely() {
    let mut context: TestContext = create_test_context(30);
    let application_id: i64 =
        open_draft(&mut context.persistence, context.owner_id, vec![context.course_a]);
    for n in 1..=5 {
        create_test_account(&mut context.persistence, n);
    }

    let err: ApiError = upload(&mut context, application_id, roster_csv(1, 5)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValidationFailed);
    assert_eq!(err.reason(), Some("bulk_floor"));

    let stored: ApplicationResponse =
        get_application(&mut context.persistence, context.owner_id, application_id).unwrap();
    assert_eq!(stored.course_lines[0].roster_mode, "empty");
}

#[test]
fn test_oversized_file_is_rejected_before_row_checks() {
    let mut context: TestContext = create_test_context(30);
    let application_id: i64 =
        open_draft(&mut context.persistence, context.owner_id, vec![context.course_a]);

    let err: ApiError = upload(&mut context, application_id, roster_csv(1, 501)).unwrap_err();
    assert_eq!(err.reason(), Some("bulk_ceiling"));
}

#[test]
fn test_every_invalid_row_is_reported() {
    let mut context: TestContext = create_test_context(30);
    let application_id: i64 =
        open_draft(&mut context.persistence, context.owner_id, vec![context.course_a]);
    for n in 1..=5 {
        create_test_account(&mut context.persistence, n);
    }

    let mut content: String = roster_csv(1, 5);
    content.push_str("Student 3,student3@example.com,010-2000-0003,Acme\n");
    content.push_str("Nobody,nobody@example.com,010-0000-0000,Acme\n");
    content.push_str("Wrong Name,student4@example.com,010-2000-0004,Acme\n");

    let err: ApiError = upload(&mut context, application_id, content).unwrap_err();
    let ApiError::RosterRejected { rows } = err else {
        panic!("expected RosterRejected, got {err:?}");
    };

    let summary: Vec<(u64, &str)> = rows
        .iter()
        .map(|row: &RosterRowError| (row.row_number, row.reason.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (7, "duplicate_in_file"),
            (8, "account_not_found"),
            (9, "duplicate_in_file"),
        ]
    );

    let stored: ApplicationResponse =
        get_application(&mut context.persistence, context.owner_id, application_id).unwrap();
    assert!(stored.course_lines[0].students.is_empty());
}

#[test]
fn test_name_mismatch_row_is_reported() {
    let mut context: TestContext = create_test_context(30);
    let application_id: i64 =
        open_draft(&mut context.persistence, context.owner_id, vec![context.course_a]);
    for n in 1..=6 {
        create_test_account(&mut context.persistence, n);
    }
    let content: String = roster_csv(1, 6).replace("Student 2,", "Student Two,");

    let err: ApiError = upload(&mut context, application_id, content).unwrap_err();
    let ApiError::RosterRejected { rows } = err else {
        panic!("expected RosterRejected, got {err:?}");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].row_number, 3);
    assert_eq!(rows[0].reason, "name_mismatch");
    assert_eq!(rows[0].email.as_deref(), Some("student2@example.com"));
}

#[test]
fn test_already_enrolled_student_is_row_error() {
    let mut context: TestContext = create_test_context(30);
    for n in 1..=6 {
        create_test_account(&mut context.persistence, n);
    }

    // Another purchaser enrolls student 1 in the same schedule.
    let other: i64 = context
        .persistence
        .create_account("Other Purchaser", "other@example.com", "010-3333-4444")
        .unwrap();
    context
        .persistence
        .add_to_cart(other, context.course_a, context.schedule_a)
        .unwrap();
    let other_draft: DraftResponse = create_or_update_draft(
        &mut context.persistence,
        other,
        &CreateDraftRequest {
            course_ids: vec![context.course_a],
        },
    )
    .unwrap();
    let other_id: i64 = other_draft.application.application_id;
    attach_student(
        &mut context.persistence,
        other,
        other_id,
        &student_request(context.course_a, 1),
    )
    .unwrap();
    submit_application(&mut context.persistence, other, other_id, &accept_all()).unwrap();

    let application_id: i64 =
        open_draft(&mut context.persistence, context.owner_id, vec![context.course_a]);
    let err: ApiError = upload(&mut context, application_id, roster_csv(1, 6)).unwrap_err();
    let ApiError::RosterRejected { rows } = err else {
        panic!("expected RosterRejected, got {err:?}");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].row_number, 2);
    assert_eq!(rows[0].reason, "already_enrolled");
}

#[test]
fn test_second_bulk_roster_on_line_conflicts() {
    let mut context: TestContext = create_test_context(30);
    let application_id: i64 =
        open_draft(&mut context.persistence, context.owner_id, vec![context.course_a]);
    for n in 1..=12 {
        create_test_account(&mut context.persistence, n);
    }
    upload(&mut context, application_id, roster_csv(1, 6)).unwrap();

    let err: ApiError = upload(&mut context, application_id, roster_csv(7, 12)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[test]
fn test_bulk_roster_survives_draft_reconversion() {
    let mut context: TestContext = create_test_context(30);
    let application_id: i64 =
        open_draft(&mut context.persistence, context.owner_id, vec![context.course_a]);
    for n in 1..=6 {
        create_test_account(&mut context.persistence, n);
    }
    let uploaded: AttachBulkRosterResponse =
        upload(&mut context, application_id, roster_csv(1, 6)).unwrap();
    let upload_id: Option<i64> = uploaded.application.course_lines[0]
        .bulk_upload
        .as_ref()
        .and_then(|bulk| bulk.upload_id);
    assert!(upload_id.is_some());

    let response: DraftResponse = create_or_update_draft(
        &mut context.persistence,
        context.owner_id,
        &CreateDraftRequest {
            course_ids: vec![context.course_a, context.course_b],
        },
    )
    .unwrap();

    assert!(!response.created);
    assert_eq!(response.application.application_id, application_id);
    assert_eq!(response.application.total_amount, 750_000);
    let kept = response
        .application
        .course_lines
        .iter()
        .find(|line| line.course_id == context.course_a)
        .unwrap();
    assert_eq!(kept.roster_mode, "bulk");
    assert_eq!(kept.students.len(), 6);
    assert_eq!(
        kept.bulk_upload.as_ref().and_then(|bulk| bulk.upload_id),
        upload_id
    );
    let added = response
        .application
        .course_lines
        .iter()
        .find(|line| line.course_id == context.course_b)
        .unwrap();
    assert_eq!(added.roster_mode, "empty");
}

#[test]
fn test_row_numbers_follow_file_lines_across_blank_lines() {
    let mut context: TestContext = create_test_context(30);
    let application_id: i64 =
        open_draft(&mut context.persistence, context.owner_id, vec![context.course_a]);
    for n in 1..=6 {
        create_test_account(&mut context.persistence, n);
    }
    let content: String = roster_csv(1, 6)
        .replace("Student 3,", "\nStudent 3,")
        .replace("Student 5,", "Student Five,");

    let err: ApiError = upload(&mut context, application_id, content).unwrap_err();
    let ApiError::RosterRejected { rows } = err else {
        panic!("expected RosterRejected, got {err:?}");
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].row_number, 7);
    assert_eq!(rows[0].reason, "name_mismatch");
}
