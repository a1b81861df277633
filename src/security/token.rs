//! Issuance and verification of signed bearer tokens.
//!
//! Tokens are compact JWTs: three base64url (no pad) segments
//! `header.payload.signature`, signed with HMAC-SHA256 over the process
//! signing secret. Verification is strictly ordered: structure first
//! (malformed), then the signature recomputed and compared in constant time
//! (rejected), and only then is the payload decoded and the expiry checked
//! (expired). Claims from a token whose signature has not matched are never
//! read. The `alg` header is compared against the single expected
//! identifier; the verifier never selects an algorithm from the token.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use ring::{constant_time, hmac};
use serde::{Deserialize, Serialize};

use crate::error::ShopResult;
use crate::security::error::AuthError;
use crate::security::types::Principal;

/// The only algorithm this codec issues or accepts.
const TOKEN_ALGORITHM: &str = "HS256";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// A claim that may be absent or carry a string value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    #[default]
    Absent,
    Text(String),
}

impl ClaimValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, ClaimValue::Absent)
    }
}

/// Verified token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated username
    pub sub: String,
    /// Space-joined role set
    #[serde(default, skip_serializing_if = "ClaimValue::is_absent")]
    pub scope: ClaimValue,
    /// Issued-at, seconds since the Unix epoch
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch
    pub exp: i64,
}

/// Issues and verifies HMAC-SHA256 signed tokens.
///
/// Pure CPU work over immutable key material; safe to share across request
/// handlers without locking.
pub struct TokenCodec {
    key: hmac::Key,
    validity_secs: i64,
}

impl TokenCodec {
    pub fn new(secret: &[u8], validity_secs: u64) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, secret),
            validity_secs: validity_secs as i64,
        }
    }

    /// Issue a token for an authenticated principal, valid from now for the
    /// configured validity window.
    pub fn issue(&self, principal: &Principal) -> ShopResult<String> {
        self.issue_at(principal, Utc::now().timestamp())
    }

    pub(crate) fn issue_at(&self, principal: &Principal, issued_at: i64) -> ShopResult<String> {
        // Sorted for a deterministic scope string; role sets are unordered.
        let mut roles: Vec<&str> = principal.roles.iter().map(String::as_str).collect();
        roles.sort_unstable();

        let header = Header {
            alg: TOKEN_ALGORITHM.to_string(),
            typ: "JWT".to_string(),
        };
        let claims = Claims {
            sub: principal.username.clone(),
            scope: ClaimValue::Text(roles.join(" ")),
            iat: issued_at,
            exp: issued_at + self.validity_secs,
        };

        let signing_input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header)?),
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims)?),
        );
        let tag = hmac::sign(&self.key, signing_input.as_bytes());
        Ok(format!(
            "{}.{}",
            signing_input,
            URL_SAFE_NO_PAD.encode(tag.as_ref())
        ))
    }

    /// Verify a token string and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let segments: Vec<&str> = token.split('.').collect();
        let &[header_b64, payload_b64, signature_b64] = segments.as_slice() else {
            return Err(AuthError::MalformedToken);
        };

        let header_bytes = URL_SAFE_NO_PAD
            .decode(header_b64)
            .map_err(|_| AuthError::MalformedToken)?;
        let header: Header =
            serde_json::from_slice(&header_bytes).map_err(|_| AuthError::MalformedToken)?;
        if header.alg != TOKEN_ALGORITHM {
            return Err(AuthError::MalformedToken);
        }

        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| AuthError::MalformedToken)?;
        let signing_input = format!("{}.{}", header_b64, payload_b64);
        let expected = hmac::sign(&self.key, signing_input.as_bytes());
        constant_time::verify_slices_are_equal(expected.as_ref(), &signature)
            .map_err(|_| AuthError::SignatureInvalid)?;

        // The signature matched, so the payload is one we issued.
        let payload_bytes = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| AuthError::MalformedToken)?;
        let claims: Claims =
            serde_json::from_slice(&payload_bytes).map_err(|_| AuthError::MalformedToken)?;

        if Utc::now().timestamp() >= claims.exp {
            return Err(AuthError::ExpiredToken);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::authority::roles_of;
    use crate::security::types::{ROLE_ADMIN, ROLE_CUSTOMER};

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn codec() -> TokenCodec {
        TokenCodec::new(SECRET, 3600)
    }

    fn admin() -> Principal {
        Principal::new("admin", vec![ROLE_ADMIN.to_string()])
    }

    #[test]
    fn issue_then_verify_round_trips() {
        let codec = codec();
        let principal = Principal::new(
            "admin",
            vec![ROLE_ADMIN.to_string(), ROLE_CUSTOMER.to_string()],
        );
        let token = codec.issue(&principal).unwrap();
        let claims = codec.verify(&token).unwrap();

        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.exp, claims.iat + 3600);
        assert_eq!(roles_of(&claims), principal.roles);
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec();
        // exp one second in the past
        let token = codec.issue_at(&admin(), Utc::now().timestamp() - 3601).unwrap();
        assert!(matches!(
            codec.verify(&token),
            Err(AuthError::ExpiredToken)
        ));
    }

    #[test]
    fn tampered_signature_is_rejected() {
        let codec = codec();
        let token = codec.issue(&admin()).unwrap();

        let flipped = flip_signature_char(&token);
        assert!(matches!(
            codec.verify(&flipped),
            Err(AuthError::SignatureInvalid)
        ));
    }

    #[test]
    fn signature_check_precedes_expiry_check() {
        let codec = codec();
        // Expired AND tampered: the signature verdict must win.
        let token = codec.issue_at(&admin(), Utc::now().timestamp() - 7200).unwrap();
        let flipped = flip_signature_char(&token);
        assert!(matches!(
            codec.verify(&flipped),
            Err(AuthError::SignatureInvalid)
        ));
    }

    #[test]
    fn wrong_segment_count_is_malformed() {
        let codec = codec();
        assert!(matches!(
            codec.verify("only.two"),
            Err(AuthError::MalformedToken)
        ));
        assert!(matches!(
            codec.verify("a.b.c.d"),
            Err(AuthError::MalformedToken)
        ));
        assert!(matches!(codec.verify(""), Err(AuthError::MalformedToken)));
    }

    #[test]
    fn unexpected_algorithm_is_rejected_before_signature_handling() {
        let codec = codec();
        // A token claiming alg "none" must be rejected as malformed even if
        // its signature segment is empty, never evaluated under the
        // attacker-chosen algorithm.
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"admin","iat":0,"exp":9999999999}"#);
        let forged = format!("{}.{}.", header, payload);
        assert!(matches!(
            codec.verify(&forged),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn token_from_a_different_key_is_rejected() {
        let other = TokenCodec::new(b"ffffffffffffffffffffffffffffffff", 3600);
        let token = other.issue(&admin()).unwrap();
        assert!(matches!(
            codec().verify(&token),
            Err(AuthError::SignatureInvalid)
        ));
    }

    /// Flips the first character of the signature segment, keeping the
    /// encoding canonical so the failure is attributed to the MAC check.
    fn flip_signature_char(token: &str) -> String {
        let dot = token.rfind('.').unwrap();
        let mut bytes = token.as_bytes().to_vec();
        bytes[dot + 1] = if bytes[dot + 1] == b'A' { b'B' } else { b'A' };
        String::from_utf8(bytes).unwrap()
    }
}
