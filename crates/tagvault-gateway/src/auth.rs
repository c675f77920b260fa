// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signed session cookies.
//!
//! The cookie value is `<session_id>.<hex HMAC-SHA256(secret, session_id)>`.
//! A value with a bad signature is treated exactly like a missing cookie,
//! so the request proceeds as `Unauthenticated`.

use std::convert::Infallible;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tagvault_core::TagvaultError;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "tagvault_session";

type HmacSha256 = Hmac<Sha256>;

/// Signs, verifies, sets and clears the session cookie.
#[derive(Clone)]
pub struct SessionCookies {
    mac: HmacSha256,
    secure: bool,
}

impl std::fmt::Debug for SessionCookies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCookies")
            .field("key", &"[redacted]")
            .field("secure", &self.secure)
            .finish()
    }
}

impl SessionCookies {
    pub fn new(secret: &SecretString, secure: bool) -> Result<Self, TagvaultError> {
        let mac = <HmacSha256 as Mac>::new_from_slice(secret.expose_secret().as_bytes())
            .map_err(|_| TagvaultError::Config("session secret cannot key HMAC".to_string()))?;
        Ok(Self { mac, secure })
    }

    /// Cookie value for `session_id`.
    pub fn sign(&self, session_id: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(session_id.as_bytes());
        let tag = hex::encode(mac.finalize().into_bytes());
        format!("{session_id}.{tag}")
    }

    /// The session id carried by `value`, if its signature checks out.
    pub fn verify(&self, value: &str) -> Option<String> {
        let (session_id, tag) = value.rsplit_once('.')?;
        let tag = hex::decode(tag).ok()?;
        let mut mac = self.mac.clone();
        mac.update(session_id.as_bytes());
        mac.verify_slice(&tag).ok()?;
        Some(session_id.to_string())
    }

    /// Add a cookie for `session_id` to the response jar.
    pub fn issue(&self, jar: CookieJar, session_id: &str) -> CookieJar {
        let cookie = Cookie::build((SESSION_COOKIE, self.sign(session_id)))
            .http_only(true)
            .same_site(SameSite::Strict)
            .path("/")
            .secure(self.secure);
        jar.add(cookie)
    }

    /// Expire the session cookie the client sent, if any.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
    }
}

/// The verified session id from the request cookie, if any.
#[derive(Debug, Clone, Default)]
pub struct SessionId(pub Option<String>);

impl SessionId {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for SessionId
where
    SessionCookies: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = SessionCookies::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let id = jar.get(SESSION_COOKIE).and_then(|cookie| {
            let verified = cookies.verify(cookie.value());
            if verified.is_none() {
                tracing::debug!("session cookie signature rejected");
            }
            verified
        });
        Ok(SessionId(id))
    }
}
