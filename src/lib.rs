//! Tiny client for the OAuth2 Authorization Code flow with OpenID Connect.
//!
//! This library covers the client side of the flow against a single identity provider:
//! building the authorize URL, exchanging codes and refresh tokens, verifying the id_token
//! and fetching the user profile.
//! # Feature
//! - Generate a state value (32 alphanumeric characters from the OS CSPRNG)
//! - Generate the authorization request URL
//! - Verify the state in constant time and retrieve the code
//! - Exchange code or refresh token for a token set (using reqwest)
//! - Verify the id_token (HS256 with the client secret) and its issuer
//! - Fetch user info with the access token (using reqwest)
//! # Endpoints
//! Derived from the provider base URI:
//! - `{base}/oauth/authorize`
//! - `{base}/oauth/token`
//! - `{base}/userinfo`
//! # Caution
//! - The library does not store anything. Keeping the state between the redirect and the
//!   callback, and the tokens afterwards, is the caller's job.
//! - `expires_in` is returned as sent by the provider, in seconds.
//! # Examples
//! For example usage, see `demos/axum_server.rs`.
pub mod client;
pub mod code;
pub mod config;
pub mod error;
pub mod executer;
pub mod id_token;
pub mod refresh_token;
pub mod state;
pub mod token;
pub mod user_info;
