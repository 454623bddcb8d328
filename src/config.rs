//! Defines structures and builders related to client configuration.
//!
//! Provides a structured way to handle credentials
//! and endpoints required for authentication and token exchange.
//!
//! ## Structures
//! - `Config`: Stores all the necessary client information. Immutable once built.
//! - `ConfigBuilder`: A builder for constructing a `Config` instance.
//!
//! Endpoints are derived from the provider base URI when `build` is called:
//! - authorize: `{provider_uri}/oauth/authorize`
//! - token: `{provider_uri}/oauth/token`
//! - userinfo: `{provider_uri}/userinfo`
//!
//! # Example
//! ```rust,no_run
//! use tiny_oidc_client::config::Config;
//!
//! let config = Config::builder()
//!     .client_id("your-client-id")
//!     .client_secret("your-client-secret")
//!     .redirect_uri("https://your-app.com/callback")
//!     .provider_uri("https://idp.example")
//!     .build()
//!     .unwrap();
//! ```
use std::fmt;

use itertools::Itertools;
use tracing::error;
use url::Url;

use crate::error::Error;

pub(crate) const DEFAULT_SCOPE: &str = "openid profile";

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct AuthEndPoint(pub String);

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TokenEndPoint(pub String);

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct UserInfoEndPoint(pub String);

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ClientID(pub String);

#[derive(Clone, Default, PartialEq)]
pub(crate) struct ClientSecret(pub String);

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientSecret(***)")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct RedirectURI(pub String);

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Issuer(pub String);

/// Holds everything the client needs to talk to a single identity provider.
///
/// It can only be obtained through [`ConfigBuilder::build`], which guarantees that
/// every field is non-empty and every endpoint is an absolute URL.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) auth_endpoint: AuthEndPoint,
    pub(crate) token_endpoint: TokenEndPoint,
    pub(crate) user_info_endpoint: UserInfoEndPoint,
    pub(crate) client_id: ClientID,
    pub(crate) client_secret: ClientSecret,
    pub(crate) redirect_uri: RedirectURI,
    pub(crate) issuer: Issuer,
    pub(crate) scope: String,
}

// ==========impl Config==========
impl Config {
    /// Returns a new `ConfigBuilder` instance to create a `Config` object.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn client_id(&self) -> &str {
        &self.client_id.0
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri.0
    }

    pub fn auth_endpoint(&self) -> &str {
        &self.auth_endpoint.0
    }

    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint.0
    }

    pub fn user_info_endpoint(&self) -> &str {
        &self.user_info_endpoint.0
    }

    /// The value the `iss` claim of every id_token must carry.
    /// Defaults to the authorize endpoint.
    pub fn issuer(&self) -> &str {
        &self.issuer.0
    }

    /// Space-delimited scope sent in the authorization request.
    pub fn scope(&self) -> &str {
        &self.scope
    }
}

/// Provides a convenient way to create a `Config` instance step by step.
///
/// `provider_uri` fills in every endpoint. An explicitly set endpoint
/// takes precedence over the derived one.
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    provider_uri: Option<String>,
    auth_endpoint: Option<AuthEndPoint>,
    token_endpoint: Option<TokenEndPoint>,
    user_info_endpoint: Option<UserInfoEndPoint>,
    client_id: ClientID,
    client_secret: ClientSecret,
    redirect_uri: RedirectURI,
    issuer: Option<Issuer>,
    scope: Option<String>,
}

// ==========impl ConfigBuilder==========
impl ConfigBuilder {
    /// Creates a new `ConfigBuilder` instance with default values.
    pub fn new() -> Self {
        ConfigBuilder::default()
    }

    /// Sets the provider base URI the endpoints are derived from.
    pub fn provider_uri(mut self, provider_uri: &str) -> Self {
        self.provider_uri = Some(provider_uri.trim_end_matches('/').to_string());
        self
    }

    /// Overrides the authorization endpoint URL.
    pub fn auth_endpoint(mut self, auth_endpoint: &str) -> Self {
        self.auth_endpoint = Some(AuthEndPoint(auth_endpoint.to_string()));
        self
    }

    /// Overrides the token endpoint URL.
    pub fn token_endpoint(mut self, token_endpoint: &str) -> Self {
        self.token_endpoint = Some(TokenEndPoint(token_endpoint.to_string()));
        self
    }

    /// Overrides the userinfo endpoint URL.
    pub fn user_info_endpoint(mut self, user_info_endpoint: &str) -> Self {
        self.user_info_endpoint = Some(UserInfoEndPoint(user_info_endpoint.to_string()));
        self
    }

    /// Sets the client ID registered with the provider.
    pub fn client_id(mut self, client_id: &str) -> Self {
        self.client_id = ClientID(client_id.to_string());
        self
    }

    /// Sets the client secret. It is also the HS256 key of the id_token.
    pub fn client_secret(mut self, client_secret: &str) -> Self {
        self.client_secret = ClientSecret(client_secret.to_string());
        self
    }

    /// Sets the redirect URI registered with the provider.
    pub fn redirect_uri(mut self, redirect_uri: &str) -> Self {
        self.redirect_uri = RedirectURI(redirect_uri.to_string());
        self
    }

    /// Overrides the expected `iss` claim.
    pub fn issuer(mut self, issuer: &str) -> Self {
        self.issuer = Some(Issuer(issuer.to_string()));
        self
    }

    /// Sets the space-delimited scope. Defaults to `"openid profile"`.
    pub fn scope(mut self, scope: &str) -> Self {
        self.scope = Some(scope.to_string());
        self
    }

    /// Sets the scope from a list. Duplicates are dropped, order is kept.
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let scope = scopes
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .filter(|s| !s.is_empty())
            .unique()
            .join(" ");
        self.scope = Some(scope);
        self
    }

    /// Constructs a `Config`, deriving the endpoints that were not set explicitly.
    pub fn build(self) -> Result<Config, Error> {
        let base = self.provider_uri.filter(|v| !v.is_empty());
        let derive = |suffix: &str| base.as_ref().map(|b| format!("{}{}", b, suffix));

        let auth_endpoint = self
            .auth_endpoint
            .or_else(|| derive("/oauth/authorize").map(AuthEndPoint))
            .ok_or(Error::Config("authorize endpoint is not set"))?;
        let token_endpoint = self
            .token_endpoint
            .or_else(|| derive("/oauth/token").map(TokenEndPoint))
            .ok_or(Error::Config("token endpoint is not set"))?;
        let user_info_endpoint = self
            .user_info_endpoint
            .or_else(|| derive("/userinfo").map(UserInfoEndPoint))
            .ok_or(Error::Config("userinfo endpoint is not set"))?;

        for endpoint in [&auth_endpoint.0, &token_endpoint.0, &user_info_endpoint.0] {
            Url::parse(endpoint).map_err(|e| {
                error!("Failed to parse endpoint {}: {}", endpoint, e);
                Error::URL
            })?;
        }

        if self.client_id.0.is_empty() {
            return Err(Error::Config("client_id is empty"));
        }
        if self.client_secret.0.is_empty() {
            return Err(Error::Config("client_secret is empty"));
        }
        if self.redirect_uri.0.is_empty() {
            return Err(Error::Config("redirect_uri is empty"));
        }
        let scope = self.scope.unwrap_or_else(|| DEFAULT_SCOPE.to_string());
        if scope.trim().is_empty() {
            return Err(Error::Config("scope is empty"));
        }

        let issuer = self
            .issuer
            .filter(|v| !v.0.is_empty())
            .unwrap_or_else(|| Issuer(auth_endpoint.0.clone()));

        Ok(Config {
            auth_endpoint,
            token_endpoint,
            user_info_endpoint,
            client_id: self.client_id,
            client_secret: self.client_secret,
            redirect_uri: self.redirect_uri,
            issuer,
            scope,
        })
    }
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use crate::{config::Config, error::Error};

    use super::ConfigBuilder;

    fn base_builder() -> ConfigBuilder {
        ConfigBuilder::new()
            .client_id("my_client_id")
            .client_secret("my_secret")
            .redirect_uri("https://redirect.example.com")
    }

    #[test]
    fn test_config_builder_derives_endpoints() {
        let config = base_builder()
            .provider_uri("https://idp.example")
            .build()
            .unwrap();

        assert_eq!(config.auth_endpoint(), "https://idp.example/oauth/authorize");
        assert_eq!(config.token_endpoint(), "https://idp.example/oauth/token");
        assert_eq!(config.user_info_endpoint(), "https://idp.example/userinfo");
        assert_eq!(config.issuer(), "https://idp.example/oauth/authorize");
        assert_eq!(config.client_id(), "my_client_id");
        assert_eq!(config.client_secret.0, "my_secret");
        assert_eq!(config.redirect_uri(), "https://redirect.example.com");
        assert_eq!(config.scope(), "openid profile");
    }

    #[test]
    fn test_config_builder_trailing_slash() {
        let config = base_builder()
            .provider_uri("https://idp.example/")
            .build()
            .unwrap();
        assert_eq!(config.token_endpoint(), "https://idp.example/oauth/token");
    }

    #[test]
    fn test_config_builder_overrides() {
        let config = Config::builder()
            .client_id("my_client_id")
            .client_secret("my_secret")
            .redirect_uri("https://redirect.example.com")
            .provider_uri("https://idp.example")
            .token_endpoint("https://token.example.com/token")
            .issuer("https://issuer.example.com")
            .scope("openid email")
            .build()
            .unwrap();

        assert_eq!(config.auth_endpoint(), "https://idp.example/oauth/authorize");
        assert_eq!(config.token_endpoint(), "https://token.example.com/token");
        assert_eq!(config.issuer(), "https://issuer.example.com");
        assert_eq!(config.scope(), "openid email");
    }

    #[test]
    fn test_config_builder_explicit_endpoints_without_provider() {
        let config = base_builder()
            .auth_endpoint("https://auth.example.com/auth")
            .token_endpoint("https://token.example.com")
            .user_info_endpoint("https://userinfo.example.com")
            .build()
            .unwrap();

        assert_eq!(config.auth_endpoint(), "https://auth.example.com/auth");
        assert_eq!(config.issuer(), "https://auth.example.com/auth");
    }

    #[test]
    fn test_config_builder_scopes_dedup() {
        let config = base_builder()
            .provider_uri("https://idp.example")
            .scopes(["openid", "email", "openid", " profile "])
            .build()
            .unwrap();
        assert_eq!(config.scope(), "openid email profile");
    }

    #[test]
    fn test_config_builder_missing_fields() {
        let res = ConfigBuilder::new()
            .client_id("id")
            .client_secret("secret")
            .redirect_uri("https://redirect.example.com")
            .build();
        assert!(matches!(res, Err(Error::Config(_))));

        let res = ConfigBuilder::new()
            .provider_uri("https://idp.example")
            .client_secret("secret")
            .redirect_uri("https://redirect.example.com")
            .build();
        assert!(matches!(res, Err(Error::Config("client_id is empty"))));

        let res = base_builder()
            .provider_uri("https://idp.example")
            .scope(" ")
            .build();
        assert!(matches!(res, Err(Error::Config("scope is empty"))));
    }

    #[test]
    fn test_config_builder_invalid_url() {
        let res = base_builder().provider_uri("not a url").build();
        assert!(matches!(res, Err(Error::URL)));
    }

    #[test]
    fn test_config_debug_redacts_secret() {
        let config = base_builder()
            .provider_uri("https://idp.example")
            .build()
            .unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("my_secret"));
        assert!(debug.contains("ClientSecret(***)"));
        assert!(debug.contains("my_client_id"));
    }
}
