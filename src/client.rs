//! `OidcClient` ties the pieces together for a single provider.
//!
//! Every exchange issues one request and either returns the parsed result or an error:
//! non-2xx answers become `Error::Client` with the body kept verbatim, nothing is retried.
//!
//! # Example
//! ```rust,no_run
//! use tiny_oidc_client::{client::OidcClient, code::UnCheckedCodeResponse, config::Config};
//!
//! # async fn run() -> Result<(), tiny_oidc_client::error::Error> {
//! let config = Config::builder()
//!     .client_id("your-client-id")
//!     .client_secret("your-client-secret")
//!     .redirect_uri("https://your-app.com/callback")
//!     .provider_uri("https://idp.example")
//!     .build()?;
//! let client = OidcClient::new(config);
//!
//! // 1. before redirecting
//! let state = client.create_state()?;
//! let url = client.create_authenticate_url(state.value())?;
//!
//! // 2. on the callback
//! let res = UnCheckedCodeResponse::from_url("https://your-app.com/callback?code=..&state=..")?;
//! let code = res.exchange_with_code(state.value())?;
//! let token = client.request_token(&code).await?;
//! let profile = client.request_user_info(token.access_token()).await?;
//! # Ok(())
//! # }
//! ```
use tracing::error;

use crate::{
    code::{Code, CodeRequest},
    config::Config,
    error::Error,
    executer::{Executer, HttpExe, RawResponse},
    refresh_token::RefreshToken,
    state::{State, validate_state},
    token::{AccessToken, Token, TokenRequest},
    user_info::{UserInfo, UserInfoRequest},
};

#[derive(Debug, Clone)]
pub struct OidcClient {
    config: Config,
    exe: HttpExe,
}

impl OidcClient {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            exe: HttpExe::default(),
        }
    }

    /// Uses the given `reqwest::Client` (timeouts, proxies, ...) for every request.
    pub fn with_http_client(config: Config, client: reqwest::Client) -> Self {
        Self {
            config,
            exe: HttpExe::new(client),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Generates a fresh state for one authorization attempt.
    pub fn create_state(&self) -> Result<State, Error> {
        State::new()
    }

    /// See [`validate_state`].
    pub fn validate_state(&self, cached: &str, incoming: &str) -> Result<(), Error> {
        validate_state(cached, incoming)
    }

    pub fn create_authenticate_url(&self, state: &str) -> Result<String, Error> {
        CodeRequest::new(&self.config, state).into_url()
    }

    /// Exchanges an authorization code for a validated `Token`.
    pub async fn request_token(&self, code: &Code) -> Result<Token, Error> {
        let req = TokenRequest::authorization_code(&self.config, code);
        self.exchange(&req).await
    }

    /// Exchanges a refresh token for a new validated `Token`.
    pub async fn request_token_by_refresh_token(
        &self,
        refresh_token: &RefreshToken,
    ) -> Result<Token, Error> {
        let req = TokenRequest::refresh_token(&self.config, refresh_token);
        self.exchange(&req).await
    }

    pub async fn request_user_info(&self, access_token: &AccessToken) -> Result<UserInfo, Error> {
        let req = UserInfoRequest::new(&self.config, access_token);
        let res = success(self.exe.execute(&req).await?)?;
        UserInfo::from_body(&res.body)
    }

    /// `request_token` followed by `request_user_info` with the obtained access token.
    pub async fn request_user_info_by_code(&self, code: &Code) -> Result<UserInfo, Error> {
        let token = self.request_token(code).await?;
        self.request_user_info(token.access_token()).await
    }

    async fn exchange(&self, req: &TokenRequest) -> Result<Token, Error> {
        let res = success(self.exe.execute(req).await?)?;
        Token::from_response(
            &res.body,
            &self.config.client_secret.0,
            &self.config.issuer.0,
        )
    }
}

fn success(res: RawResponse) -> Result<RawResponse, Error> {
    if res.is_success() {
        Ok(res)
    } else {
        error!("Provider responded with {}: {}", res.status, res.body);
        Err(Error::Client {
            status_code: res.status,
            body: res.body,
        })
    }
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use http::StatusCode;

    use crate::{config::ConfigBuilder, error::Error, executer::RawResponse};

    use super::{OidcClient, success};

    fn client() -> OidcClient {
        let config = ConfigBuilder::new()
            .client_id("my_client_id")
            .client_secret("my_secret")
            .redirect_uri("https://app.example/callback")
            .provider_uri("https://idp.example")
            .build()
            .unwrap();
        OidcClient::new(config)
    }

    #[test]
    fn test_create_authenticate_url() {
        let url = client().create_authenticate_url("abc123").unwrap();
        assert_eq!(
            url,
            "https://idp.example/oauth/authorize?response_type=code&client_id=my_client_id\
             &redirect_uri=https%3A%2F%2Fapp.example%2Fcallback&scope=openid+profile&state=abc123"
        );
    }

    #[test]
    fn test_create_and_validate_state() {
        let client = client();
        let state = client.create_state().unwrap();
        assert!(client.validate_state(state.value(), state.value()).is_ok());
        assert!(matches!(
            client.validate_state(state.value(), ""),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_success_keeps_error_body() {
        let res = RawResponse {
            status: StatusCode::UNAUTHORIZED,
            body: r#"{"error":"invalid_grant"}"#.to_string(),
        };
        match success(res) {
            Err(Error::Client { status_code, body }) => {
                assert_eq!(status_code, 401);
                assert_eq!(body, r#"{"error":"invalid_grant"}"#);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
