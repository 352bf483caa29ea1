//! HTTP basic auth guard for the admin routes.

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use subtle::ConstantTimeEq;

use crate::startup::{AdminCredentials, AppState};

const REALM: &str = r#"Basic realm="admin", charset="UTF-8""#;

/// Decode `Authorization: Basic ...` into a username and password.
pub fn parse_basic_auth(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

fn matches(creds: &AdminCredentials, user: &str, pass: &str) -> bool {
    let user_ok = creds.username.as_bytes().ct_eq(user.as_bytes());
    let pass_ok = creds.password.as_bytes().ct_eq(pass.as_bytes());
    (user_ok & pass_ok).into()
}

fn challenge() -> Response {
    let mut res = (StatusCode::UNAUTHORIZED, "authentication required").into_response();
    res.headers_mut()
        .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(REALM));
    res
}

/// Middleware rejecting requests without the configured admin credentials.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match parse_basic_auth(request.headers()) {
        Some((user, pass)) if matches(&state.admin, &user, &pass) => next.run(request).await,
        Some((user, _)) => {
            tracing::warn!(user = %user, "admin login rejected");
            challenge()
        }
        None => challenge(),
    }
}
