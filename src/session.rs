/// Signed session cookie
///
/// The caller's identity and any pending one-shot notices travel in a single
/// HS256-signed token stored in a cookie. A missing, expired or tampered
/// token reads as an anonymous session with no notices.
use crate::{config::SessionConfig, context::AppContext, error::AppResult};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponseParts, ResponseParts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::{convert::Infallible, sync::Arc};
use tracing::{debug, warn};

/// Who the caller is. Student and admin identities are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Identity {
    #[default]
    Anonymous,
    Student {
        roll_number: String,
    },
    Admin {
        id: i64,
        username: String,
    },
}

/// Token payload
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionClaims {
    identity: Identity,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    notices: Vec<String>,
    exp: i64,
}

/// Keys and cookie settings for session tokens
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    cookie_name: String,
    ttl: Duration,
    secure: bool,
}

impl SessionKeys {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            cookie_name: config.cookie_name.clone(),
            ttl: Duration::hours(config.ttl_hours),
            secure: config.cookie_secure,
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn encode(&self, identity: &Identity, notices: &[String]) -> AppResult<String> {
        let claims = SessionClaims {
            identity: identity.clone(),
            notices: notices.to_vec(),
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    fn decode(&self, token: &str) -> Option<SessionClaims> {
        match decode::<SessionClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256)) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                debug!(error = %e, "discarding unusable session token");
                None
            }
        }
    }
}

/// Request-scoped session.
///
/// Extract it in a handler, mutate it, and return it as part of the response
/// so the cookie is rewritten when anything changed.
pub struct Session {
    keys: Arc<SessionKeys>,
    jar: CookieJar,
    identity: Identity,
    notices: Vec<String>,
    changed: bool,
}

impl Session {
    pub fn from_jar(keys: Arc<SessionKeys>, jar: CookieJar) -> Self {
        let claims = jar
            .get(keys.cookie_name())
            .and_then(|cookie| keys.decode(cookie.value()));
        let (identity, notices) = claims
            .map(|c| (c.identity, c.notices))
            .unwrap_or_default();

        Self {
            keys,
            jar,
            identity,
            notices,
            changed: false,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn student_roll(&self) -> Option<&str> {
        match &self.identity {
            Identity::Student { roll_number } => Some(roll_number),
            _ => None,
        }
    }

    pub fn admin(&self) -> Option<(i64, &str)> {
        match &self.identity {
            Identity::Admin { id, username } => Some((*id, username)),
            _ => None,
        }
    }

    /// Become the given student, dropping any admin identity
    pub fn login_student(&mut self, roll_number: String) {
        self.identity = Identity::Student { roll_number };
        self.changed = true;
    }

    /// Become the given admin, dropping any student identity
    pub fn login_admin(&mut self, id: i64, username: String) {
        self.identity = Identity::Admin { id, username };
        self.changed = true;
    }

    /// Clear a student identity; an admin identity is left alone
    pub fn logout_student(&mut self) {
        if matches!(self.identity, Identity::Student { .. }) {
            self.identity = Identity::Anonymous;
            self.changed = true;
        }
    }

    /// Clear an admin identity; a student identity is left alone
    pub fn logout_admin(&mut self) {
        if matches!(self.identity, Identity::Admin { .. }) {
            self.identity = Identity::Anonymous;
            self.changed = true;
        }
    }

    /// Queue a notice for the next rendered page
    pub fn flash(&mut self, message: impl Into<String>) {
        self.notices.push(message.into());
        self.changed = true;
    }

    /// Take every queued notice; they will not be shown again
    pub fn take_notices(&mut self) -> Vec<String> {
        if !self.notices.is_empty() {
            self.changed = true;
        }
        std::mem::take(&mut self.notices)
    }

    fn into_jar(self) -> CookieJar {
        if !self.changed {
            return self.jar;
        }

        let name = self.keys.cookie_name().to_string();
        if self.identity == Identity::Anonymous && self.notices.is_empty() {
            return self.jar.remove(Cookie::build(name).path("/"));
        }

        match self.keys.encode(&self.identity, &self.notices) {
            Ok(token) => self.jar.add(
                Cookie::build((name, token))
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax)
                    .secure(self.keys.secure),
            ),
            Err(e) => {
                warn!(error = %e, "failed to sign session token, clearing session");
                self.jar.remove(Cookie::build(name).path("/"))
            }
        }
    }
}

#[async_trait]
impl FromRequestParts<AppContext> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        Ok(Session::from_jar(Arc::clone(&state.session_keys), jar))
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.into_jar().into_response_parts(res)
    }
}
