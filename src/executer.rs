//! Provides an asynchronous execution framework for sending HTTP requests to the provider.
//!
//! This module:
//! - Defines the Executer trait, which provides a unified interface for making HTTP requests.
//! - Implements it on `HttpExe` for token requests and userinfo requests.
//!
//! Executers only move bytes: they hand back the status and the raw body.
//! Interpreting the body is left to `Token` and `UserInfo`.

use std::{error::Error, pin::Pin};

use crate::{token::TokenRequest, user_info::UserInfoRequest};
use http::{
    StatusCode,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use reqwest::{Client, Response, Url};
use thiserror::Error;
use tracing::{debug, error};

/// generic asynchronous execution interface for sending HTTP requests.
/// Key Components:
/// - Req: The request type that the executer will handle.
/// - Response: The expected response type.
/// - Error: The error type that will be returned on failure.
/// - Future: The asynchronous execution result, returning either Response or Error
pub trait Executer<'a, Req>
where
    Req: Send,
{
    type Response;
    type Error: Error;
    type Future: Future<Output = Result<Self::Response, Self::Error>> + Send + 'a;

    fn execute(&'a self, req: &'a Req) -> Self::Future;
}

/// Defines possible errors that can occur during request execution.
#[derive(Debug, Clone, Error)]
pub enum ExecuteError {
    #[error("Failed to read response body")]
    Read,
    #[error("Failed to send request")]
    Send,
    #[error("Failed to parse url")]
    URL,
}

/// Status and body of a provider response, whatever the status.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

impl RawResponse {
    /// `true` for 2xx.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    async fn read(res: Response) -> Result<Self, ExecuteError> {
        let status = res.status();
        let body = res.text().await.map_err(|e| {
            error!("Failed to read response body: {:?}", e);
            ExecuteError::Read
        })?;
        Ok(Self { status, body })
    }
}

/// Sends requests with a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpExe {
    client: Client,
}

impl HttpExe {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn parse_url(url: &str) -> Result<Url, ExecuteError> {
    Url::parse(url).map_err(|e| {
        error!("Failed to parse url: {:?}", e);
        ExecuteError::URL
    })
}

/// Request Workflow
/// 1. Parse the token endpoint URL.
/// 2. Attach the Basic client credential.
/// 3. Send the grant as an HTTP POST form.
/// 4. Return the status and raw body.
impl<'a> Executer<'a, TokenRequest> for HttpExe {
    type Response = RawResponse;
    type Error = ExecuteError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'a>>;

    fn execute(&'a self, req: &'a TokenRequest) -> Self::Future {
        Box::pin(async move {
            let url = parse_url(req.token_endpoint())?;
            debug!("Requesting token ({}) from {}", req.grant_type(), url);

            let res = self
                .client
                .post(url)
                .header(AUTHORIZATION, req.basic_credential())
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .form(&req.params())
                .send()
                .await
                .map_err(|e| {
                    error!("Failed to send request: {:?}", e);
                    ExecuteError::Send
                })?;
            RawResponse::read(res).await
        })
    }
}

/// Request Workflow
/// 1. Parse the userinfo endpoint URL.
/// 2. Send an HTTP GET with the bearer credential.
/// 3. Return the status and raw body.
impl<'a> Executer<'a, UserInfoRequest> for HttpExe {
    type Response = RawResponse;
    type Error = ExecuteError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'a>>;

    fn execute(&'a self, req: &'a UserInfoRequest) -> Self::Future {
        Box::pin(async move {
            let url = parse_url(req.user_info_endpoint())?;
            debug!("Requesting userinfo from {}", url);

            let res = self
                .client
                .get(url)
                .header(AUTHORIZATION, req.bearer_credential())
                .send()
                .await
                .map_err(|e| {
                    error!("Failed to send request: {:?}", e);
                    ExecuteError::Send
                })?;
            RawResponse::read(res).await
        })
    }
}

// ==========Tests==========
#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::{ExecuteError, RawResponse, parse_url};

    #[test]
    fn test_raw_response_is_success() {
        let ok = RawResponse {
            status: StatusCode::OK,
            body: String::new(),
        };
        let unauthorized = RawResponse {
            status: StatusCode::UNAUTHORIZED,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!unauthorized.is_success());
    }

    #[test]
    fn test_parse_url() {
        assert!(parse_url("https://idp.example/oauth/token").is_ok());
        assert!(matches!(parse_url("idp.example"), Err(ExecuteError::URL)));
    }
}
