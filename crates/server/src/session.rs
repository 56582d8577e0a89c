// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Caller identity extraction for the server.
//!
//! Authentication happens upstream; the authenticated account id arrives in
//! the `X-User-Id` header and is checked against the account store.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tracing::{debug, error, warn};

use crate::{AppState, ErrorResponse};

/// Header carrying the authenticated account id.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Extractor for the calling account.
///
/// # Usage
///
/// ```ignore
/// async fn my_handler(Caller(user_id): Caller) -> Result<Json<Response>, HttpError> {
///     Ok(Json(Response { ... }))
/// }
/// ```
///
/// # Errors
///
/// Returns HTTP 401 Unauthorized if the header is missing, is not an
/// integer, or names no registered account.
pub struct Caller(pub i64);

impl FromRequestParts<AppState> for Caller {
    type Rejection = CallerError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let raw: &str = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| {
                debug!("Missing X-User-Id header");
                CallerError::MissingHeader
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid X-User-Id header encoding");
                CallerError::InvalidHeader
            })?;

        let user_id: i64 = raw.trim().parse().map_err(|_| {
            warn!(value = raw, "X-User-Id is not an integer");
            CallerError::InvalidHeader
        })?;

        let mut persistence = state.persistence.lock().await;
        let account = persistence.get_account(user_id).map_err(|e| {
            error!(user_id, error = %e, "Caller lookup failed");
            CallerError::LookupFailed
        })?;
        drop(persistence);

        if account.is_none() {
            warn!(user_id, "X-User-Id names no account");
            return Err(CallerError::UnknownAccount);
        }

        debug!(user_id, "Caller identified");
        Ok(Self(user_id))
    }
}

/// Caller extraction errors.
#[derive(Debug)]
pub enum CallerError {
    /// The header is missing.
    MissingHeader,
    /// The header is not an account id.
    InvalidHeader,
    /// No account has the id.
    UnknownAccount,
    /// The account store could not be read.
    LookupFailed,
}

impl IntoResponse for CallerError {
    fn into_response(self) -> Response {
        let (status, kind, message): (StatusCode, &str, &str) = match self {
            Self::MissingHeader => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Missing X-User-Id header",
            ),
            Self::InvalidHeader => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "X-User-Id must be an account id",
            ),
            Self::UnknownAccount => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "X-User-Id does not name a registered account",
            ),
            Self::LookupFailed => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal",
                "Caller lookup failed",
            ),
        };
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            kind: String::from(kind),
            message: String::from(message),
            reason: None,
            rows: None,
        });
        (status, body).into_response()
    }
}
