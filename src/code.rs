//! This module handles the authorization request and the redirect that comes back from it.
//!
//! It provides the following key functionalities:
//! - Generating an authorization request URL (`CodeRequest`).
//! - Parsing and verifying the authorization code received on the callback (`UnCheckedCodeResponse`).
//!
//! # Key Structures and Features
//!
//! ## `CodeRequest`
//! A structure used to generate the authorization request URL.
//! - Query parameters are always `response_type`, `client_id`, `redirect_uri`, `scope`, `state`,
//!   in this order, each value percent-encoded.
//!
//! ## `UnCheckedCodeResponse`
//! Represents the authorization code response received from the provider.
//! - This response must be validated against the stored state before it can be used.
//!
//! ## `Code`
//! Represents a verified authorization code that can be exchanged for tokens.
//!
//! # Examples
//! ## Generating an Authorization Request URL
//! ```rust,no_run
//! use tiny_oidc_client::{code::CodeRequest, config::Config, state::State};
//!
//! let config = Config::builder()
//!     .client_id("your_client_id")
//!     .client_secret("your_client_secret")
//!     .redirect_uri("your_redirect_uri")
//!     .provider_uri("https://idp.example")
//!     .build()
//!     .unwrap();
//!
//! let state = State::new().unwrap();
//! let url = CodeRequest::new(&config, state.value()).into_url().unwrap();
//! println!("Auth URL: {}", url);
//! ```
//!
//! ## Handling the Callback and Verifying the Authorization Code
//! ```rust,no_run
//! use tiny_oidc_client::code::UnCheckedCodeResponse;
//!
//! let response = UnCheckedCodeResponse::from_url("https://example.com/callback?...").unwrap();
//! // get stored state from the session store
//! let cached_state = "stored state";
//!
//! let code = response.exchange_with_code(cached_state).expect("state mismatch!");
//! ```
use std::collections::HashMap;

use tracing::error;
use url::Url;

use crate::{
    config::{AuthEndPoint, ClientID, Config, RedirectURI},
    error::Error,
    state::{UnCheckedState, validate_state},
};

/// Represents the value of the `code` query parameter sent back by the provider.
///
/// Obtained through `UnCheckedCodeResponse::exchange_with_code` after the state has been verified,
/// or built directly when the caller has already done that check.
#[derive(Debug, Clone, PartialEq)]
pub struct Code(pub(crate) String);

impl Code {
    /// Checks the state of `res` against `cached_state`.
    /// If valid, returns a `Code`; otherwise, returns `Error::InvalidState`.
    pub fn new_with_verify_state(
        res: UnCheckedCodeResponse,
        cached_state: &str,
    ) -> Result<Self, Error> {
        res.exchange_with_code(cached_state)
    }

    pub fn value(&self) -> &str {
        &self.0
    }
}

impl From<String> for Code {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Code {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Generates a URL to initiate the authorization request.
#[derive(Debug, Clone)]
pub struct CodeRequest {
    auth_endpoint: AuthEndPoint,
    response_type: &'static str,
    client_id: ClientID,
    redirect_uri: RedirectURI,
    scope: String,
    state: String,
}

impl CodeRequest {
    pub fn new(config: &Config, state: &str) -> Self {
        Self {
            auth_endpoint: config.auth_endpoint.to_owned(),
            response_type: "code",
            client_id: config.client_id.to_owned(),
            redirect_uri: config.redirect_uri.to_owned(),
            scope: config.scope.to_owned(),
            state: state.to_string(),
        }
    }

    /// Constructs the authorization URL.
    pub fn into_url(&self) -> Result<String, Error> {
        let mut url = Url::parse(&self.auth_endpoint.0).map_err(|e| {
            error!("Failed to parse authorize endpoint: {}", e);
            Error::URL
        })?;
        url.query_pairs_mut()
            .append_pair("response_type", self.response_type)
            .append_pair("client_id", &self.client_id.0)
            .append_pair("redirect_uri", &self.redirect_uri.0)
            .append_pair("scope", &self.scope)
            .append_pair("state", &self.state);
        Ok(url.into())
    }
}

/// A redirect from the provider containing an unverified authorization code and state.
/// Must be validated using the stored state before use.
#[derive(Debug, Clone)]
pub struct UnCheckedCodeResponse {
    state: UnCheckedState,
    code: Code,
}

impl UnCheckedCodeResponse {
    /// Builds the response from query parameters already extracted by a web framework.
    pub fn new(code: &str, state: &str) -> Self {
        Self {
            state: state.into(),
            code: code.into(),
        }
    }

    /// Parses the full callback URL.
    ///
    /// An `error` parameter from the provider yields `Error::Authorization`.
    /// A missing `state` is kept empty so it is rejected on verification.
    pub fn from_url(response_url: &str) -> Result<Self, Error> {
        let url = Url::parse(response_url).map_err(|e| {
            error!("Failed to parse callback url: {}", e);
            Error::URL
        })?;
        let params: HashMap<_, _> = url.query_pairs().collect();

        if let Some(err) = params.get("error") {
            let message = match params.get("error_description") {
                Some(desc) => format!("{}: {}", err, desc),
                None => err.to_string(),
            };
            error!("Provider returned an error: {}", message);
            return Err(Error::Authorization(message));
        }

        let code = params.get("code").ok_or_else(|| {
            error!("Callback url has no code");
            Error::URL
        })?;
        let state = params.get("state").map(|v| v.to_string()).unwrap_or_default();
        Ok(Self {
            state: state.into(),
            code: code.to_string().into(),
        })
    }

    /// Must be validated using the stored state before use.
    pub fn exchange_with_code(self, cached_state: &str) -> Result<Code, Error> {
        validate_state(cached_state, &self.state.0)?;
        Ok(self.code)
    }
}
