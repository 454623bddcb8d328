//! Provides the refresh token value.
//!
//! A refresh token is returned next to the access token on some grants. Passing it to
//! `OidcClient::request_token_by_refresh_token` yields a new, fully validated `Token`.

use serde::{Deserialize, Serialize};

/// Represents an OAuth 2.0 refresh token, which is used to obtain a new access token without user interaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshToken(pub(crate) String);

impl RefreshToken {
    /// Creates a new refresh token from a string.
    pub fn new(value: &str) -> Self {
        Self(value.to_string())
    }
    /// Returns the refresh token as a String.
    pub fn value(&self) -> String {
        self.0.to_owned()
    }
    /// Returns the refresh token as a str.
    pub fn value_as_str(&self) -> &str {
        &self.0
    }
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use super::RefreshToken;

    #[test]
    fn test_refresh_token_methods() {
        let refresh_token = RefreshToken::new("refresh_token_value");

        assert_eq!(refresh_token.value(), "refresh_token_value");
        assert_eq!(refresh_token.value_as_str(), "refresh_token_value");
    }

    #[test]
    fn test_refresh_token_serde_transparent() {
        let refresh_token: RefreshToken = serde_json::from_str(r#""my_refresh_token""#).unwrap();
        assert_eq!(refresh_token, RefreshToken::new("my_refresh_token"));
        assert_eq!(
            serde_json::to_string(&refresh_token).unwrap(),
            r#""my_refresh_token""#
        );
    }
}
