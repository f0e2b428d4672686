//! Cookie-carried pseudo-session
//!
//! Each browser gets an opaque `session_id` cookie that scopes which goals it
//! can see. There is no authentication behind it.

use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

pub const SESSION_COOKIE: &str = "session_id";

/// One year
pub const SESSION_MAX_AGE_SECS: u64 = 60 * 60 * 24 * 365;

const MAX_SESSION_ID_LEN: usize = 128;

/// Session id of the caller, minted fresh when the request carried none
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId {
    pub id: String,
    pub is_new: bool,
}

impl SessionId {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match session_id_from_headers(headers) {
            Some(id) => Self { id, is_new: false },
            None => Self {
                id: uuid::Uuid::new_v4().to_string(),
                is_new: true,
            },
        }
    }

    /// `Set-Cookie` value that (re)issues this session
    pub fn cookie(&self, secure: bool) -> String {
        session_cookie(&self.id, secure)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for SessionId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

/// Read the session id from the request's `Cookie` headers.
///
/// Values that could not be echoed back safely in a `Set-Cookie` header are
/// treated as absent.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name.trim() == SESSION_COOKIE).then(|| value.trim().trim_matches('"'))
        })
        .find(|value| is_valid_session_id(value))
        .map(str::to_string)
}

fn is_valid_session_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_SESSION_ID_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Build the `Set-Cookie` header value for a session.
///
/// Cross-origin browsers only send the cookie back when it is
/// `SameSite=None; Secure`; plain-HTTP local setups need `secure = false`.
pub fn session_cookie(session_id: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly",
        SESSION_COOKIE, session_id, SESSION_MAX_AGE_SECS
    );
    if secure {
        cookie.push_str("; SameSite=None; Secure");
    } else {
        cookie.push_str("; SameSite=Lax");
    }
    cookie
}
