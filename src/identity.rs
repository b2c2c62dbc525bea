//! Best-effort caller identity from bearer tokens.
//!
//! Tokens are decoded locally and their claims checked against the
//! configured identity pool. Signatures are not verified: the result is an
//! attribution hint for logging and must never gate a request.

use axum::http::{HeaderMap, header::AUTHORIZATION};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use mockable::Clock;
use serde_json::{Map, Value};

use crate::config::{ConfigMap, IdentitySettings};

const BEARER_SCHEME: &str = "bearer";
const ID_TOKEN_USE: &str = "id";

/// Caller identity recovered from an identity token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Subject claim.
    pub id: Option<String>,
    /// Email claim.
    pub email: Option<String>,
    /// Username claim.
    pub username: Option<String>,
    /// Every decoded claim.
    pub raw_claims: Map<String, Value>,
}

impl Identity {
    /// Returns the most readable label available for log attribution.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .or(self.id.as_deref())
    }
}

/// Extracts the caller identity from request headers.
///
/// Returns `None` when identity is not configured, the header is absent or
/// malformed, or any claim check fails. Never errors.
#[must_use]
pub fn extract_identity(
    headers: &HeaderMap,
    config: &ConfigMap,
    clock: &impl Clock,
) -> Option<Identity> {
    let settings = IdentitySettings::from_config(config)?;
    let token = bearer_token(headers)?;
    let claims = decode_claims(token)?;
    if !claims_are_valid(&claims, &settings, clock) {
        return None;
    }

    let claim = |name: &str| claims.get(name).and_then(Value::as_str).map(str::to_owned);
    Some(Identity {
        id: claim("sub"),
        email: claim("email"),
        username: claim("cognito:username").or_else(|| claim("username")),
        raw_claims: claims,
    })
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case(BEARER_SCHEME) {
        return None;
    }
    let trimmed = token.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn decode_claims(token: &str) -> Option<Map<String, Value>> {
    let mut segments = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return None;
    };

    let width = payload.len().next_multiple_of(4);
    let padded = format!("{payload:=<width$}");
    let bytes = URL_SAFE.decode(padded).ok()?;
    match serde_json::from_slice(&bytes).ok()? {
        Value::Object(claims) => Some(claims),
        _ => None,
    }
}

fn claims_are_valid(
    claims: &Map<String, Value>,
    settings: &IdentitySettings,
    clock: &impl Clock,
) -> bool {
    let Some(expires_at) = claims.get("exp").and_then(Value::as_i64) else {
        return false;
    };
    if expires_at <= clock.utc().timestamp() {
        return false;
    }
    if claims.get("iss").and_then(Value::as_str) != Some(settings.issuer().as_str()) {
        return false;
    }
    if claims.get("aud").and_then(Value::as_str) != Some(settings.client_id.as_str()) {
        return false;
    }
    claims
        .get("token_use")
        .is_none_or(|token_use| token_use.as_str() == Some(ID_TOKEN_USE))
}
