//! Header extraction middleware.
//!
//! Runs in front of the MCP service for every HTTP request. It creates the request's
//! [`RequestIdentityContext`], fills it from the first non-empty header in
//! [`USER_ID_HEADERS`], and hands the request on. The body is never read and the
//! downstream response (or error) is returned untouched.

use axum::extract::Request;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;

use super::{RequestIdentityContext, UserId};

/// Identity headers in priority order. First non-empty value wins.
///
/// LibreChat fills these from `{{LIBRECHAT_USER_ID}}` / `{{LIBRECHAT_USER_EMAIL}}`.
pub const USER_ID_HEADERS: [&str; 3] = ["x-user-id", "x-user-email", "x-librechat-user-id"];

/// Find the request's user identity in its headers.
///
/// Values that are blank after trimming, or not valid visible ASCII, are skipped so the
/// next header in line gets a chance.
pub fn extract_user_id(headers: &HeaderMap) -> Option<UserId> {
    USER_ID_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|value| value.to_str().ok())
            .and_then(UserId::parse)
    })
}

/// axum middleware: attach a per-request identity context before dispatch.
pub async fn user_id_middleware(mut request: Request, next: Next) -> Response {
    let context = RequestIdentityContext::new();

    match extract_user_id(request.headers()) {
        Some(user_id) => {
            tracing::debug!(user_id = %user_id, "user id header found");
            context.set(user_id);
        }
        None => tracing::debug!("no user id header in request"),
    }

    request.extensions_mut().insert(context);
    next.run(request).await
}
