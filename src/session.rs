use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde_json::Value;

use crate::error::AppError;

/// Cookie holding an ordinary user's session token.
pub const USER_TOKEN_COOKIE: &str = "token";
/// Cookie holding a blood-bank operator's session token.
pub const BLOOD_BANK_TOKEN_COOKIE: &str = "bloodBankToken";

const USER_ID_CLAIMS: [&str; 4] = ["id", "userId", "_id", "sub"];

/// The caller's credentials, passed explicitly to every backend call.
///
/// Two kinds of token may be present. The user token is tried first and the
/// blood-bank token second; an `Authorization: Bearer` header counts as a user
/// token and takes precedence over the cookie of the same kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user_token: Option<String>,
    blood_bank_token: Option<String>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_user_token(mut self, token: impl Into<String>) -> Self {
        self.user_token = non_empty(token.into());
        self
    }

    pub fn with_blood_bank_token(mut self, token: impl Into<String>) -> Self {
        self.blood_bank_token = non_empty(token.into());
        self
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut session = Session::anonymous();

        if let Some(token) = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            session.user_token = non_empty(token.trim().to_string());
        }

        for cookie_header in headers.get_all(header::COOKIE) {
            let Ok(cookie_header) = cookie_header.to_str() else {
                continue;
            };
            for cookie in cookie_header.split(';') {
                let Some((k, v)) = cookie.trim().split_once('=') else {
                    continue;
                };
                match k {
                    USER_TOKEN_COOKIE if session.user_token.is_none() => {
                        session.user_token = non_empty(v.to_string());
                    }
                    BLOOD_BANK_TOKEN_COOKIE if session.blood_bank_token.is_none() => {
                        session.blood_bank_token = non_empty(v.to_string());
                    }
                    _ => {}
                }
            }
        }

        session
    }

    /// Token for the `Authorization` header, following the fallback order.
    pub fn bearer(&self) -> Option<&str> {
        self.user_token
            .as_deref()
            .or(self.blood_bank_token.as_deref())
    }

    pub fn is_authenticated(&self) -> bool {
        self.bearer().is_some()
    }

    pub fn require(&self) -> Result<&str, AppError> {
        self.bearer().ok_or(AppError::Unauthorized)
    }

    /// Key that scopes cached per-page baselines to this caller.
    pub fn cache_key(&self) -> String {
        match self.bearer() {
            Some(token) => format!("token:{token}"),
            None => "anonymous".to_string(),
        }
    }

    /// User id carried in the token claims. The signature is not checked here;
    /// the backend verifies every token it receives, this is only used to mark
    /// which events the caller is registered for.
    pub fn user_id(&self) -> Option<String> {
        let token = self.user_token.as_deref()?;
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = match decode::<Value>(token, &DecodingKey::from_secret(&[]), &validation) {
            Ok(data) => data,
            Err(e) => {
                tracing::debug!("Session token claims unreadable: {}", e);
                return None;
            }
        };

        USER_ID_CLAIMS.iter().find_map(|claim| match data.claims.get(*claim)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Session::from_headers(&parts.headers))
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
