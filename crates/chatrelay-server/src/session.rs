//! `session_id` cookie handling

use axum::http::{HeaderMap, header::COOKIE};
use chatrelay_core::SessionId;

/// Name of the cookie carrying the session id
pub const SESSION_COOKIE: &str = "session_id";

/// Session id from the request's `Cookie` headers, if any
pub fn session_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionId::parse(value.trim_matches('"')))
}

/// `Set-Cookie` value handing `session` to the browser
pub fn session_cookie(session: &SessionId) -> String {
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/",
        SESSION_COOKIE, session
    )
}

/// `Set-Cookie` value that removes the session cookie
pub fn expired_session_cookie() -> String {
    format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
        SESSION_COOKIE
    )
}
