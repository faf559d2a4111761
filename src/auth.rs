//! Local decode of an externally issued bearer token.
//!
//! The token is only opened to read display fields (name, email) for the
//! account views; issuance and verification belong to the remote auth
//! service, and nothing in the cart depends on this.

use base64::engine::general_purpose::{STANDARD, URL_SAFE_NO_PAD};
use base64::Engine;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token has no payload segment")]
    MissingPayload,
    #[error("token payload is not valid base64: {0}")]
    Decode(#[from] base64::DecodeError),
    #[error("token payload is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Display fields read out of the token payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SessionProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Decode the JSON payload of a bearer token.
///
/// Accepts either a bare base64 payload or a three-segment JWT-style token
/// (in which case the middle segment is taken). A leading `Bearer ` scheme
/// prefix is tolerated. No signature check is performed.
pub fn decode_profile(token: &str) -> Result<SessionProfile, AuthError> {
    let token = token.trim();
    let token = token.strip_prefix("Bearer ").unwrap_or(token);
    let segments: Vec<&str> = token.split('.').collect();
    let payload = if segments.len() == 3 { segments[1] } else { token };
    if payload.is_empty() {
        return Err(AuthError::MissingPayload);
    }
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| STANDARD.decode(payload))?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn encode(payload: &serde_json::Value) -> String {
        URL_SAFE_NO_PAD.encode(payload.to_string())
    }

    #[test]
    fn decodes_a_jwt_style_token() {
        let payload = encode(&json!({ "name": "Asha", "email": "asha@example.com" }));
        let token = format!("eyJhbGciOiJIUzI1NiJ9.{payload}.sig");
        let profile = decode_profile(&token).expect("decode should succeed");
        assert_eq!(profile.name.as_deref(), Some("Asha"));
        assert_eq!(profile.email.as_deref(), Some("asha@example.com"));
    }

    #[test]
    fn decodes_a_bare_payload_with_bearer_prefix() {
        let payload = encode(&json!({ "email": "x@y.z" }));
        let profile = decode_profile(&format!("Bearer {payload}")).expect("decode should succeed");
        assert_eq!(profile.email.as_deref(), Some("x@y.z"));
        assert!(profile.name.is_none());
    }

    #[test]
    fn missing_fields_default_to_none() {
        let payload = encode(&json!({ "sub": "user-1" }));
        let profile = decode_profile(&payload).expect("decode should succeed");
        assert_eq!(profile, SessionProfile::default());
    }

    #[test]
    fn garbage_base64_is_an_error() {
        assert!(matches!(decode_profile("a.%%%%.c"), Err(AuthError::Decode(_))));
    }

    #[test]
    fn non_json_payload_is_an_error() {
        let payload = URL_SAFE_NO_PAD.encode("not json");
        assert!(matches!(decode_profile(&payload), Err(AuthError::Parse(_))));
    }

    #[test]
    fn empty_token_is_an_error() {
        assert!(matches!(decode_profile("  "), Err(AuthError::MissingPayload)));
    }
}
