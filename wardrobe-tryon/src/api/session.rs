//! Session identity extraction
//!
//! The client identifies its session with an `X-Session-Id` header or a
//! `wardrobe_session` cookie. Handlers receive it as an explicit value and
//! pass it down; nothing below the HTTP layer reads request state.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::Duration;
use std::convert::Infallible;

pub const SESSION_HEADER: &str = "x-session-id";
pub const SESSION_COOKIE: &str = "wardrobe_session";

/// Session id supplied by the client, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaybeSession(pub Option<String>);

impl MaybeSession {
    pub fn id(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let from_header = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        if from_header.is_some() {
            return Ok(Self(from_header));
        }

        let from_cookie = parts
            .headers
            .get_all(axum::http::header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find_map(|cookies| cookie_value(cookies, SESSION_COOKIE));

        Ok(Self(from_cookie))
    }
}

/// `Set-Cookie` value keeping the session alive for `ttl`
pub fn session_cookie(session_id: &str, ttl: Duration) -> String {
    format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax",
        SESSION_COOKIE,
        session_id,
        ttl.num_seconds()
    )
}

/// Value of `name` in a `Cookie` header (`a=1; b=2`)
fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name && !value.is_empty()).then(|| value.to_string())
    })
}
