//! Provides decoding and verification of the id_token.
//!
//! The id_token is a compact JWS (`header.payload.signature`) signed with HS256,
//! the key being the client secret shared with the provider.
//! A decoded token is only handed out after:
//! - the signature verifies with the client secret,
//! - the header announces HS256 (any other algorithm is refused),
//! - `exp`, when present, is not in the past,
//! - `nbf` and `iat`, when present, are not in the future,
//! - `iss` equals the expected issuer.

use jsonwebtoken::{
    Algorithm, DecodingKey, Validation, decode, errors::ErrorKind, get_current_timestamp,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::error;

use crate::error::Error;

/// Represents an encoded id_token, exactly as received from the token endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIdToken(pub(crate) String);

impl RawIdToken {
    pub fn value(&self) -> &str {
        &self.0
    }
}

/// Represents the verified payload of an id_token.
/// Claims without a dedicated field are kept in `additional`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>, // Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>, // Subject (user identifier)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>, // Expiration (UNIX time)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>, // Issued-at (UNIX time)
    #[serde(flatten)]
    pub additional: Map<String, Value>,
}

impl IdTokenClaims {
    /// Looks up any claim by name, including the ones with a dedicated field.
    pub fn get(&self, claim: &str) -> Option<Value> {
        match claim {
            "iss" => self.iss.clone().map(Value::from),
            "sub" => self.sub.clone().map(Value::from),
            "exp" => self.exp.map(Value::from),
            "iat" => self.iat.map(Value::from),
            _ => self.additional.get(claim).cloned(),
        }
    }

    /// Verifies `raw` with `secret` and checks its issuer.
    pub fn decode_and_verify(raw: &RawIdToken, secret: &str, issuer: &str) -> Result<Self, Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.required_spec_claims.clear();
        validation.validate_aud = false;
        validation.validate_nbf = true;

        let data = decode::<IdTokenClaims>(
            &raw.0,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|e| {
            error!("Failed to decode IDToken: {}", e);
            Error::Decode(e)
        })?;

        let claims = data.claims;
        // jsonwebtoken does not look at `iat`; a token issued in the future is not valid yet.
        if claims
            .iat
            .is_some_and(|iat| iat > get_current_timestamp() + validation.leeway)
        {
            error!("IDToken issued in the future: iat {:?}", claims.iat);
            return Err(Error::Decode(ErrorKind::ImmatureSignature.into()));
        }
        if claims.iss.as_deref() != Some(issuer) {
            error!(
                "IDToken issuer mismatch: expected {}, got {:?}",
                issuer, claims.iss
            );
            return Err(Error::InvalidIdToken("invalid issuer"));
        }
        Ok(claims)
    }
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode, errors::ErrorKind};
    use serde_json::{Value, json};

    use crate::error::Error;

    use super::{IdTokenClaims, RawIdToken};

    const SECRET: &str = "my_secret";
    const ISSUER: &str = "https://idp.example/oauth/authorize";

    fn sign(alg: Algorithm, secret: &str, claims: &Value) -> RawIdToken {
        let token = encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        RawIdToken(token)
    }

    #[test]
    fn test_id_token_decode_success() {
        let raw = sign(
            Algorithm::HS256,
            SECRET,
            &json!({
                "iss": ISSUER,
                "sub": "user-1",
                "iat": 1742189616u64,
                "firstname": "Alice",
                "position": "engineer"
            }),
        );
        let claims = IdTokenClaims::decode_and_verify(&raw, SECRET, ISSUER).unwrap();
        assert_eq!(claims.iss.as_deref(), Some(ISSUER));
        assert_eq!(claims.sub.as_deref(), Some("user-1"));
        assert_eq!(claims.iat, Some(1742189616));
        assert_eq!(claims.get("firstname"), Some(json!("Alice")));
        assert_eq!(claims.get("sub"), Some(json!("user-1")));
        assert_eq!(claims.get("missing"), None);
    }

    #[test]
    fn test_id_token_wrong_key() {
        let raw = sign(Algorithm::HS256, "other_secret", &json!({ "iss": ISSUER }));
        let res = IdTokenClaims::decode_and_verify(&raw, SECRET, ISSUER);
        assert!(matches!(res, Err(Error::Decode(_))));
    }

    #[test]
    fn test_id_token_wrong_algorithm() {
        let raw = sign(Algorithm::HS512, SECRET, &json!({ "iss": ISSUER }));
        let res = IdTokenClaims::decode_and_verify(&raw, SECRET, ISSUER);
        assert!(matches!(res, Err(Error::Decode(_))));
    }

    #[test]
    fn test_id_token_malformed() {
        let raw = RawIdToken("not.a.jwt".to_string());
        let res = IdTokenClaims::decode_and_verify(&raw, SECRET, ISSUER);
        assert!(matches!(res, Err(Error::Decode(_))));

        let raw = RawIdToken("no_dots".to_string());
        let res = IdTokenClaims::decode_and_verify(&raw, SECRET, ISSUER);
        assert!(matches!(res, Err(Error::Decode(_))));
    }

    #[test]
    fn test_id_token_expired() {
        let raw = sign(
            Algorithm::HS256,
            SECRET,
            &json!({ "iss": ISSUER, "exp": 1_000_000u64 }),
        );
        let res = IdTokenClaims::decode_and_verify(&raw, SECRET, ISSUER);
        assert!(matches!(res, Err(Error::Decode(_))));
    }

    #[test]
    fn test_id_token_not_yet_valid() {
        let raw = sign(
            Algorithm::HS256,
            SECRET,
            &json!({ "iss": ISSUER, "nbf": 4_000_000_000u64 }),
        );
        let res = IdTokenClaims::decode_and_verify(&raw, SECRET, ISSUER);
        assert!(matches!(res, Err(Error::Decode(_))));
    }

    #[test]
    fn test_id_token_issued_in_future() {
        let raw = sign(
            Algorithm::HS256,
            SECRET,
            &json!({ "iss": ISSUER, "iat": 4_000_000_000u64 }),
        );
        let res = IdTokenClaims::decode_and_verify(&raw, SECRET, ISSUER);
        match res {
            Err(Error::Decode(e)) => assert!(matches!(e.kind(), ErrorKind::ImmatureSignature)),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_id_token_past_nbf_and_iat() {
        let raw = sign(
            Algorithm::HS256,
            SECRET,
            &json!({ "iss": ISSUER, "nbf": 1_000_000u64, "iat": 1_000_000u64 }),
        );
        assert!(IdTokenClaims::decode_and_verify(&raw, SECRET, ISSUER).is_ok());
    }

    #[test]
    fn test_id_token_invalid_issuer() {
        let raw = sign(
            Algorithm::HS256,
            SECRET,
            &json!({ "iss": "https://evil.example/oauth/authorize" }),
        );
        let res = IdTokenClaims::decode_and_verify(&raw, SECRET, ISSUER);
        assert!(matches!(res, Err(Error::InvalidIdToken("invalid issuer"))));
    }

    #[test]
    fn test_id_token_missing_issuer() {
        let raw = sign(Algorithm::HS256, SECRET, &json!({ "sub": "user-1" }));
        let res = IdTokenClaims::decode_and_verify(&raw, SECRET, ISSUER);
        assert!(matches!(res, Err(Error::InvalidIdToken(_))));
    }
}
