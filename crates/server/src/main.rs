// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod session;

use axum::{
    Json, Router,
    extract::{Path, State as AxumState},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::Parser;
use class_apply_api::{
    ApiError, ApplicationResponse, AttachBulkRosterRequest, AttachBulkRosterResponse,
    AttachStudentRequest, CancelApplicationRequest, CancelApplicationResponse,
    CheckEligibilityRequest, CheckEligibilityResponse, CreateDraftRequest, DetachStudentRequest,
    DraftResponse, ErrorKind, ListApplicationsResponse, ListEnrollmentsResponse, RosterRowError,
    SetPaymentInfoRequest, SubmitApplicationRequest, SubmitApplicationResponse,
    ValidateStudentRequest, ValidateStudentResponse, attach_bulk_roster, attach_student,
    cancel_application, check_eligibility, create_or_update_draft, detach_student,
    download_roster_template, get_application, list_applications, list_enrollments,
    set_payment_info, submit_application, validate_student,
};
use class_apply_persistence::Persistence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::session::Caller;

/// Class application server - HTTP surface for the class application workflow
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,
}

/// Application state shared across handlers.
///
/// The persistence layer sits behind an async mutex; each request holds it
/// for its whole unit of work.
#[derive(Clone)]
struct AppState {
    persistence: Arc<Mutex<Persistence>>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Stable error kind.
    kind: String,
    /// Error message.
    message: String,
    /// Sub-reason for validation failures.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    reason: Option<String>,
    /// Rejected roster rows.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    rows: Option<Vec<RosterRowError>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
}

/// HTTP error wrapper that implements `IntoResponse`.
struct HttpError {
    status: StatusCode,
    body: ErrorResponse,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

const fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Forbidden => StatusCode::FORBIDDEN,
        ErrorKind::ValidationFailed => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let kind: ErrorKind = err.kind();
        if kind == ErrorKind::Internal {
            error!(error = %err, "Request failed");
        } else {
            warn!(kind = kind.as_str(), error = %err, "Request rejected");
        }

        let reason: Option<String> = err.reason().map(String::from);
        let message: String = err.to_string();
        let rows: Option<Vec<RosterRowError>> = match err {
            ApiError::RosterRejected { rows } => Some(rows),
            _ => None,
        };

        Self {
            status: status_for(kind),
            body: ErrorResponse {
                error: true,
                kind: String::from(kind.as_str()),
                message,
                reason,
                rows,
            },
        }
    }
}

/// Handler for GET `/health` endpoint.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: String::from("ok"),
    })
}

/// Handler for POST `/applications/draft` endpoint.
///
/// Turns selected cart courses into the caller's draft.
async fn handle_create_draft(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller_id): Caller,
    Json(req): Json<CreateDraftRequest>,
) -> Result<Json<DraftResponse>, HttpError> {
    info!(
        caller_id,
        courses = req.course_ids.len(),
        "Handling create_draft request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: DraftResponse = create_or_update_draft(&mut persistence, caller_id, &req)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/applications` endpoint.
async fn handle_list_applications(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller_id): Caller,
) -> Result<Json<ListApplicationsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListApplicationsResponse = list_applications(&mut persistence, caller_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/applications/{id}` endpoint.
async fn handle_get_application(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller_id): Caller,
    Path(application_id): Path<i64>,
) -> Result<Json<ApplicationResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ApplicationResponse =
        get_application(&mut persistence, caller_id, application_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/applications/{id}/students` endpoint.
async fn handle_attach_student(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller_id): Caller,
    Path(application_id): Path<i64>,
    Json(req): Json<AttachStudentRequest>,
) -> Result<Json<ApplicationResponse>, HttpError> {
    info!(
        caller_id,
        application_id,
        course_id = req.course_id,
        "Handling attach_student request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: ApplicationResponse =
        attach_student(&mut persistence, caller_id, application_id, &req)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for DELETE `/applications/{id}/students` endpoint.
async fn handle_detach_student(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller_id): Caller,
    Path(application_id): Path<i64>,
    Json(req): Json<DetachStudentRequest>,
) -> Result<Json<ApplicationResponse>, HttpError> {
    info!(
        caller_id,
        application_id,
        course_id = req.course_id,
        user_id = req.user_id,
        "Handling detach_student request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: ApplicationResponse =
        detach_student(&mut persistence, caller_id, application_id, &req)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/applications/{id}/bulk_roster` endpoint.
///
/// The file travels as CSV text inside the JSON body.
async fn handle_attach_bulk_roster(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller_id): Caller,
    Path(application_id): Path<i64>,
    Json(req): Json<AttachBulkRosterRequest>,
) -> Result<Json<AttachBulkRosterResponse>, HttpError> {
    info!(
        caller_id,
        application_id,
        course_id = req.course_id,
        file_name = %req.file_name,
        bytes = req.content.len(),
        "Handling attach_bulk_roster request"
    );

    let mut persistence = app_state.persistence.lock().await;
    let response: AttachBulkRosterResponse =
        attach_bulk_roster(&mut persistence, caller_id, application_id, &req)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/applications/{id}/payment` endpoint.
async fn handle_set_payment_info(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller_id): Caller,
    Path(application_id): Path<i64>,
    Json(req): Json<SetPaymentInfoRequest>,
) -> Result<Json<ApplicationResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ApplicationResponse =
        set_payment_info(&mut persistence, caller_id, application_id, &req)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/applications/{id}/submit` endpoint.
async fn handle_submit(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller_id): Caller,
    Path(application_id): Path<i64>,
    Json(req): Json<SubmitApplicationRequest>,
) -> Result<Json<SubmitApplicationResponse>, HttpError> {
    info!(caller_id, application_id, "Handling submit request");

    let mut persistence = app_state.persistence.lock().await;
    let response: SubmitApplicationResponse =
        submit_application(&mut persistence, caller_id, application_id, &req)?;
    drop(persistence);

    info!(
        application_id,
        application_number = %response.application_number,
        enrollments = response.enrollment_ids.len(),
        "Successfully submitted application"
    );

    Ok(Json(response))
}

/// Handler for POST `/applications/{id}/cancel` endpoint.
async fn handle_cancel(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller_id): Caller,
    Path(application_id): Path<i64>,
    Json(req): Json<CancelApplicationRequest>,
) -> Result<Json<CancelApplicationResponse>, HttpError> {
    info!(caller_id, application_id, "Handling cancel request");

    let mut persistence = app_state.persistence.lock().await;
    let response: CancelApplicationResponse =
        cancel_application(&mut persistence, caller_id, application_id, &req)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/applications/{id}/enrollments` endpoint.
async fn handle_list_enrollments(
    AxumState(app_state): AxumState<AppState>,
    Caller(caller_id): Caller,
    Path(application_id): Path<i64>,
) -> Result<Json<ListEnrollmentsResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ListEnrollmentsResponse =
        list_enrollments(&mut persistence, caller_id, application_id)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/students/validate` endpoint.
async fn handle_validate_student(
    AxumState(app_state): AxumState<AppState>,
    Caller(_caller_id): Caller,
    Json(req): Json<ValidateStudentRequest>,
) -> Result<Json<ValidateStudentResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: ValidateStudentResponse = validate_student(&mut persistence, &req)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/students/eligibility` endpoint.
async fn handle_check_eligibility(
    AxumState(app_state): AxumState<AppState>,
    Caller(_caller_id): Caller,
    Json(req): Json<CheckEligibilityRequest>,
) -> Result<Json<CheckEligibilityResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: CheckEligibilityResponse = check_eligibility(&mut persistence, &req)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for GET `/roster_template` endpoint.
async fn handle_roster_template() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"roster_template.csv\"",
            ),
        ],
        download_roster_template(),
    )
}

fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/applications", get(handle_list_applications))
        .route("/applications/draft", post(handle_create_draft))
        .route("/applications/{id}", get(handle_get_application))
        .route(
            "/applications/{id}/students",
            post(handle_attach_student).delete(handle_detach_student),
        )
        .route(
            "/applications/{id}/bulk_roster",
            post(handle_attach_bulk_roster),
        )
        .route("/applications/{id}/payment", post(handle_set_payment_info))
        .route("/applications/{id}/submit", post(handle_submit))
        .route("/applications/{id}/cancel", post(handle_cancel))
        .route(
            "/applications/{id}/enrollments",
            get(handle_list_enrollments),
        )
        .route("/students/validate", post(handle_validate_student))
        .route("/students/eligibility", post(handle_check_eligibility))
        .route("/roster_template", get(handle_roster_template))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing class application server");

    let persistence: Persistence = if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        Persistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        Persistence::new_in_memory()?
    };

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
    };

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
