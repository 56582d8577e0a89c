// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! HTTP tests against an in-memory database.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use super::*;
use crate::session::CallerError;
use axum::{body::Body, http::Request};
use serde::de::DeserializeOwned;
use tower::ServiceExt;

struct Seed {
    owner_id: i64,
    other_owner_id: i64,
    course_a: i64,
    schedule_a: i64,
    course_b: i64,
}

/// Helper to create test app state with in-memory persistence.
fn create_test_app_state() -> AppState {
    let persistence: Persistence =
        Persistence::new_in_memory().expect("Failed to create in-memory persistence");
    AppState {
        persistence: Arc::new(Mutex::new(persistence)),
    }
}

/// Seeds two purchasers with `course_a` (limited seats) and `course_b` in
/// their carts, plus student accounts 1..=8.
async fn seed(app_state: &AppState, seats_a: u32) -> Seed {
    let mut persistence = app_state.persistence.lock().await;
    let owner_id: i64 = persistence
        .create_account("Purchaser", "owner@example.com", "010-1111-2222")
        .unwrap();
    let other_owner_id: i64 = persistence
        .create_account("Other Purchaser", "other@example.com", "010-3333-4444")
        .unwrap();
    let course_a: i64 = persistence
        .create_course("Rust Fundamentals", 350_000, 300_000)
        .unwrap();
    let course_b: i64 = persistence
        .create_course("Async Rust", 450_000, 450_000)
        .unwrap();
    let schedule_a: i64 = persistence
        .create_schedule(course_a, "2026-03-02", "2026-03-06", seats_a)
        .unwrap();
    let schedule_b: i64 = persistence
        .create_schedule(course_b, "2026-04-06", "2026-04-10", 30)
        .unwrap();
    for owner in [owner_id, other_owner_id] {
        persistence.add_to_cart(owner, course_a, schedule_a).unwrap();
        persistence.add_to_cart(owner, course_b, schedule_b).unwrap();
    }
    for n in 1..=8 {
        persistence
            .create_account(
                &format!("Student {n}"),
                &format!("student{n}@example.com"),
                &format!("010-2000-{n:04}"),
            )
            .unwrap();
    }
    Seed {
        owner_id,
        other_owner_id,
        course_a,
        schedule_a,
        course_b,
    }
}

fn json_request<T: Serialize>(method: &str, uri: &str, user_id: i64, body: &T) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("X-User-Id", user_id.to_string())
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

fn get_request(uri: &str, user_id: i64) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("X-User-Id", user_id.to_string())
        .body(Body::empty())
        .unwrap()
}

async fn read_json<T: DeserializeOwned>(response: Response) -> T {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

fn student(course_id: i64, n: usize) -> AttachStudentRequest {
    AttachStudentRequest {
        course_id,
        name: format!("Student {n}"),
        email: format!("student{n}@example.com"),
        phone: format!("010-2000-{n:04}"),
        company: None,
        position: None,
    }
}

const ACCEPT_ALL: SubmitApplicationRequest = SubmitApplicationRequest {
    agree_purchase_terms: true,
    agree_refund_policy: true,
};

async fn create_draft(app: &Router, owner_id: i64, course_ids: Vec<i64>) -> i64 {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/applications/draft",
            owner_id,
            &CreateDraftRequest { course_ids },
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let draft: DraftResponse = read_json(response).await;
    draft.application.application_id
}

async fn attach(app: &Router, owner_id: i64, application_id: i64, request: &AttachStudentRequest) {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/applications/{application_id}/students"),
            owner_id,
            request,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_health() {
    let app: Router = build_router(create_test_app_state());

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health: HealthResponse = read_json(response).await;
    assert_eq!(health.status, "ok");
}

#[tokio::test]
async fn test_missing_user_header_is_unauthorized() {
    let app: Router = build_router(create_test_app_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/applications")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_user_is_unauthorized() {
    let app: Router = build_router(create_test_app_state());

    let response = app.oneshot(get_request("/applications", 999)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_caller_lookup_failure_is_internal_error() {
    let response: Response = CallerError::LookupFailed.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = read_json(response).await;
    assert_eq!(body.kind, "internal");

    let response: Response = CallerError::UnknownAccount.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_full_workflow_over_http() {
    let app_state: AppState = create_test_app_state();
    let seed: Seed = seed(&app_state, 30).await;
    let app: Router = build_router(app_state);

    let application_id: i64 =
        create_draft(&app, seed.owner_id, vec![seed.course_a, seed.course_b]).await;
    attach(&app, seed.owner_id, application_id, &student(seed.course_a, 1)).await;
    attach(&app, seed.owner_id, application_id, &student(seed.course_b, 2)).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/applications/{application_id}/payment"),
            seed.owner_id,
            &SetPaymentInfoRequest {
                payment_method: Some(String::from("virtual_account")),
                tax_invoice: Some(true),
            },
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/applications/{application_id}/submit"),
            seed.owner_id,
            &ACCEPT_ALL,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let submitted: SubmitApplicationResponse = read_json(response).await;
    assert_eq!(submitted.enrollment_ids.len(), 2);
    assert_eq!(submitted.application.total_amount, 750_000);
    assert_eq!(
        submitted.application.payment_method.as_deref(),
        Some("virtual_account")
    );

    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/applications/{application_id}/enrollments"),
            seed.owner_id,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let enrollments: ListEnrollmentsResponse = read_json(response).await;
    assert_eq!(enrollments.enrollments.len(), 2);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/applications/{application_id}/cancel"),
            seed.owner_id,
            &CancelApplicationRequest {
                reason: String::from("Budget cut"),
            },
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cancelled: CancelApplicationResponse = read_json(response).await;
    assert_eq!(cancelled.cancelled_enrollments, 2);

    let response = app
        .oneshot(get_request("/applications", seed.owner_id))
        .await
        .unwrap();
    let listed: ListApplicationsResponse = read_json(response).await;
    assert_eq!(listed.applications.len(), 1);
    assert_eq!(listed.applications[0].status, "cancelled");
}

#[tokio::test]
async fn test_error_kinds_map_to_status_codes() {
    let app_state: AppState = create_test_app_state();
    let seed: Seed = seed(&app_state, 30).await;
    let app: Router = build_router(app_state);
    let application_id: i64 = create_draft(&app, seed.owner_id, vec![seed.course_a]).await;

    // Not found
    let response = app
        .clone()
        .oneshot(get_request("/applications/4242", seed.owner_id))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Forbidden
    let response = app
        .clone()
        .oneshot(get_request(
            &format!("/applications/{application_id}"),
            seed.other_owner_id,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Invalid input
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/applications/draft",
            seed.owner_id,
            &CreateDraftRequest { course_ids: vec![] },
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Validation failed: empty roster
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/applications/{application_id}/submit"),
            seed.owner_id,
            &ACCEPT_ALL,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorResponse = read_json(response).await;
    assert_eq!(body.kind, "validation_failed");
    assert_eq!(body.reason.as_deref(), Some("empty_roster"));

    // Conflict: cancelling twice
    let cancel: CancelApplicationRequest = CancelApplicationRequest {
        reason: String::from("No longer needed"),
    };
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/applications/{application_id}/cancel"),
            seed.owner_id,
            &cancel,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/applications/{application_id}/cancel"),
            seed.owner_id,
            &cancel,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_rejected_roster_lists_rows() {
    let app_state: AppState = create_test_app_state();
    let seed: Seed = seed(&app_state, 30).await;
    let app: Router = build_router(app_state);
    let application_id: i64 = create_draft(&app, seed.owner_id, vec![seed.course_a]).await;

    let mut content: String = String::from("name,email,phone\n");
    for n in 1..=6 {
        content.push_str(&format!("Student {n},student{n}@example.com,010-2000-{n:04}\n"));
    }
    content.push_str("Ghost,ghost@example.com,010-0000-0000\n");

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/applications/{application_id}/bulk_roster"),
            seed.owner_id,
            &AttachBulkRosterRequest {
                course_id: seed.course_a,
                file_name: String::from("students.csv"),
                content,
            },
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorResponse = read_json(response).await;
    let rows: Vec<RosterRowError> = body.rows.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].row_number, 8);
    assert_eq!(rows[0].reason, "account_not_found");
}

#[tokio::test]
async fn test_owner_cannot_set_payment_status() {
    let app_state: AppState = create_test_app_state();
    let seed: Seed = seed(&app_state, 30).await;
    let app: Router = build_router(app_state);
    let application_id: i64 = create_draft(&app, seed.owner_id, vec![seed.course_a]).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/applications/{application_id}/payment"),
            seed.owner_id,
            &serde_json::json!({ "payment_method": "card", "payment_status": "paid" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = app
        .oneshot(get_request(
            &format!("/applications/{application_id}"),
            seed.owner_id,
        ))
        .await
        .unwrap();
    let application: ApplicationResponse = read_json(response).await;
    assert_eq!(application.payment_status, "pending");
    assert_eq!(application.payment_method, None);
}

#[tokio::test]
async fn test_validate_student_endpoint() {
    let app_state: AppState = create_test_app_state();
    let seed: Seed = seed(&app_state, 30).await;
    let app: Router = build_router(app_state);

    let response = app
        .oneshot(json_request(
            "POST",
            "/students/validate",
            seed.owner_id,
            &ValidateStudentRequest {
                name: String::from("Student 1"),
                email: String::from("student1@example.com"),
                phone: String::from("010-2000-9999"),
            },
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ValidateStudentResponse = read_json(response).await;
    assert!(!body.valid);
    assert_eq!(body.reason.as_deref(), Some("phone_mismatch"));
}

#[tokio::test]
async fn test_roster_template_is_csv() {
    let app: Router = build_router(create_test_app_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/roster_template")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv; charset=utf-8"
    );
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(
        String::from_utf8(body_bytes.to_vec()).unwrap(),
        "name,email,phone,company,position\n"
    );
}

#[tokio::test]
async fn test_concurrent_submissions_for_last_seat() {
    let app_state: AppState = create_test_app_state();
    let seed: Seed = seed(&app_state, 1).await;
    let app: Router = build_router(app_state.clone());

    let first: i64 = create_draft(&app, seed.owner_id, vec![seed.course_a]).await;
    let second: i64 = create_draft(&app, seed.other_owner_id, vec![seed.course_a]).await;
    attach(&app, seed.owner_id, first, &student(seed.course_a, 1)).await;
    attach(&app, seed.other_owner_id, second, &student(seed.course_a, 2)).await;

    let (first_response, second_response) = tokio::join!(
        app.clone().oneshot(json_request(
            "POST",
            &format!("/applications/{first}/submit"),
            seed.owner_id,
            &ACCEPT_ALL,
        )),
        app.clone().oneshot(json_request(
            "POST",
            &format!("/applications/{second}/submit"),
            seed.other_owner_id,
            &ACCEPT_ALL,
        )),
    );

    let mut statuses: Vec<u16> = vec![
        first_response.unwrap().status().as_u16(),
        second_response.unwrap().status().as_u16(),
    ];
    statuses.sort_unstable();
    assert_eq!(statuses, vec![200, 409]);

    let mut persistence = app_state.persistence.lock().await;
    let schedule = persistence.get_schedule(seed.schedule_a).unwrap();
    assert_eq!(schedule.enrolled_count, 1);
}
