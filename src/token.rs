//! Provides the token request and the validated token set returned by the token endpoint.
//!
//! This module:
//! - TokenRequest: the form body and credentials sent to the token endpoint,
//!   for both the `authorization_code` and the `refresh_token` grants.
//! - Token: the validated response. It can only be built by `Token::from_response`,
//!   which either yields a fully checked value or an error.
//! - AccessToken: a structure representing the access token used to call the userinfo endpoint.

use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::error;

use crate::{
    code::Code,
    config::{ClientID, ClientSecret, Config, RedirectURI, TokenEndPoint},
    error::Error,
    id_token::{IdTokenClaims, RawIdToken},
    refresh_token::RefreshToken,
};

/// Represents an OAuth 2.0 access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken(pub(crate) String);

impl AccessToken {
    pub fn new(value: &str) -> Self {
        Self(value.to_string())
    }

    /// Retrieves the access token as a string reference.
    pub fn value(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Grant {
    AuthorizationCode(Code),
    RefreshToken(RefreshToken),
}

/// A request to the token endpoint, authenticated with HTTP Basic client credentials.
#[derive(Debug, Clone)]
pub struct TokenRequest {
    token_endpoint: TokenEndPoint,
    client_id: ClientID,
    client_secret: ClientSecret,
    redirect_uri: RedirectURI,
    grant: Grant,
}

impl TokenRequest {
    /// Exchanges an authorization code (`grant_type=authorization_code`).
    pub fn authorization_code(config: &Config, code: &Code) -> Self {
        Self::with_grant(config, Grant::AuthorizationCode(code.to_owned()))
    }

    /// Exchanges a refresh token (`grant_type=refresh_token`).
    pub fn refresh_token(config: &Config, refresh_token: &RefreshToken) -> Self {
        Self::with_grant(config, Grant::RefreshToken(refresh_token.to_owned()))
    }

    fn with_grant(config: &Config, grant: Grant) -> Self {
        Self {
            token_endpoint: config.token_endpoint.to_owned(),
            client_id: config.client_id.to_owned(),
            client_secret: config.client_secret.to_owned(),
            redirect_uri: config.redirect_uri.to_owned(),
            grant,
        }
    }

    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint.0
    }

    pub fn grant_type(&self) -> &str {
        match self.grant {
            Grant::AuthorizationCode(_) => "authorization_code",
            Grant::RefreshToken(_) => "refresh_token",
        }
    }

    /// Form parameters in the order they are sent.
    pub fn params(&self) -> Vec<(&str, &str)> {
        let grant = match &self.grant {
            Grant::AuthorizationCode(code) => ("code", code.0.as_str()),
            Grant::RefreshToken(token) => ("refresh_token", token.0.as_str()),
        };
        vec![
            ("grant_type", self.grant_type()),
            grant,
            ("redirect_uri", self.redirect_uri.0.as_str()),
        ]
    }

    /// `Authorization` header value: `Basic base64(client_id:client_secret)`.
    pub fn basic_credential(&self) -> String {
        let credential = format!("{}:{}", self.client_id.0, self.client_secret.0);
        format!("Basic {}", STANDARD.encode(credential))
    }
}

/// A token set returned by the token endpoint, with its id_token verified.
///
/// `expires_in` is kept as the relative lifetime in seconds the provider sent;
/// computing an absolute expiry is up to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    raw_id_token: RawIdToken,
    id_token: IdTokenClaims,
    access_token: AccessToken,
    refresh_token: Option<RefreshToken>,
    token_type: String,
    expires_in: u64,
    scope: Vec<String>,
}

impl Token {
    /// Builds a `Token` from a token endpoint response body.
    ///
    /// The id_token is verified with `client_secret` (HS256) and its `iss` must equal `issuer`.
    /// Every field except `refresh_token` is required.
    pub fn from_response(body: &str, client_secret: &str, issuer: &str) -> Result<Self, Error> {
        let body: Map<String, Value> = serde_json::from_str(body).map_err(|e| {
            error!("Failed to parse token response: {}", e);
            Error::InvalidToken("response body is not a JSON object".to_string())
        })?;

        let raw_id_token = RawIdToken(required_str(&body, "id_token")?);
        let id_token = IdTokenClaims::decode_and_verify(&raw_id_token, client_secret, issuer)?;
        let access_token = AccessToken(required_str(&body, "access_token")?);
        let refresh_token = match body.get("refresh_token") {
            None | Some(Value::Null) => None,
            Some(Value::String(v)) => Some(RefreshToken(v.to_owned())),
            Some(_) => return Err(invalid("refresh_token is not a string")),
        };
        let token_type = required_str(&body, "token_type")?;
        let expires_in = required_u64(&body, "expires_in")?;
        let scope = parse_scope(&required_str(&body, "scope")?);

        Ok(Self {
            raw_id_token,
            id_token,
            access_token,
            refresh_token,
            token_type,
            expires_in,
            scope,
        })
    }

    pub fn raw_id_token(&self) -> &RawIdToken {
        &self.raw_id_token
    }

    pub fn id_token(&self) -> &IdTokenClaims {
        &self.id_token
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&RefreshToken> {
        self.refresh_token.as_ref()
    }

    /// Usually `Bearer`.
    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Lifetime of the access token in seconds.
    pub fn expires_in(&self) -> u64 {
        self.expires_in
    }

    pub fn scope(&self) -> &[String] {
        &self.scope
    }
}

fn invalid(message: &str) -> Error {
    error!("Invalid token response: {}", message);
    Error::InvalidToken(message.to_string())
}

fn required_str(body: &Map<String, Value>, field: &str) -> Result<String, Error> {
    match body.get(field) {
        None | Some(Value::Null) => Err(invalid(&format!("{} missing", field))),
        Some(Value::String(v)) => Ok(v.to_owned()),
        Some(_) => Err(invalid(&format!("{} is not a string", field))),
    }
}

// Some providers send `expires_in` as a string of digits.
fn required_u64(body: &Map<String, Value>, field: &str) -> Result<u64, Error> {
    match body.get(field) {
        None | Some(Value::Null) => Err(invalid(&format!("{} missing", field))),
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| invalid(&format!("{} is not an integer", field))),
        Some(Value::String(s)) => s
            .parse::<u64>()
            .map_err(|_| invalid(&format!("{} is not an integer", field))),
        Some(_) => Err(invalid(&format!("{} is not an integer", field))),
    }
}

fn parse_scope(scope: &str) -> Vec<String> {
    scope.split_whitespace().map(str::to_string).collect()
}
