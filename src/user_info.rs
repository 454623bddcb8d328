//! Provides the userinfo request and the profile it returns.
//!
//! The profile is not schema-checked: whatever JSON object the provider returns is exposed
//! as a map of claim names to JSON values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::error;

use crate::{
    config::{Config, UserInfoEndPoint},
    error::Error,
    token::AccessToken,
};

/// A GET request to the userinfo endpoint, authenticated with the access token as a bearer credential.
#[derive(Debug, Clone)]
pub struct UserInfoRequest {
    user_info_endpoint: UserInfoEndPoint,
    access_token: AccessToken,
}

impl UserInfoRequest {
    pub fn new(config: &Config, access_token: &AccessToken) -> Self {
        Self {
            user_info_endpoint: config.user_info_endpoint.to_owned(),
            access_token: access_token.to_owned(),
        }
    }

    pub fn user_info_endpoint(&self) -> &str {
        &self.user_info_endpoint.0
    }

    /// `Authorization` header value: `Bearer <access_token>`.
    pub fn bearer_credential(&self) -> String {
        format!("Bearer {}", self.access_token.0)
    }
}

/// The user profile returned by the userinfo endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserInfo(Map<String, Value>);

impl UserInfo {
    /// Parses a userinfo response body. Anything but a JSON object is rejected.
    pub fn from_body(body: &str) -> Result<Self, Error> {
        let map = serde_json::from_str::<Map<String, Value>>(body).map_err(|e| {
            error!("Failed to parse userinfo response: {}", e);
            Error::Parse
        })?;
        Ok(Self(map))
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Convenience accessor for string claims.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}
