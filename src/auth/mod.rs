//! Admin token check for the `/api/admin` routes.
//!
//! Tokens are compared in constant time.

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use subtle::ConstantTimeEq;

use crate::errors::{codes, ErrorDetails, ErrorResponse};

/// Alternative header for the admin token.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Admin authentication layer; `expected_token = None` lets everything through (dev mode).
pub async fn admin_auth_layer(
    expected_token: Option<String>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = expected_token else {
        return next.run(request).await;
    };

    match provided_token(request.headers()) {
        Some(provided) if constant_time_compare(provided, &expected) => next.run(request).await,
        Some(_) => unauthorized_response("Invalid admin token"),
        None => unauthorized_response("Missing admin token"),
    }
}

/// Token from `Authorization: Bearer ...`, else from the admin token header.
fn provided_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
        .or_else(|| {
            headers
                .get(ADMIN_TOKEN_HEADER)
                .and_then(|v| v.to_str().ok())
        })
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Create an unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    let body = ErrorResponse {
        success: false,
        error: ErrorDetails {
            code: codes::UNAUTHORIZED.to_string(),
            message: message.to_string(),
        },
        revision_id: 0,
    };

    (StatusCode::UNAUTHORIZED, Json(body)).into_response()
}
