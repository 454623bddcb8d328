use http::StatusCode;
use thiserror::Error;

use crate::executer::ExecuteError;

#[derive(Debug, Error)]
pub enum Error {
    /// The provider answered with a non-2xx status. `body` is kept verbatim.
    #[error("Provider responded with {status_code}: {body}")]
    Client { status_code: StatusCode, body: String },
    #[error("Invalid state: {0}")]
    InvalidState(&'static str),
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    /// Signature, structure, algorithm or expiry check of the id_token failed.
    #[error("Failed to decode IDToken: {0}")]
    Decode(#[from] jsonwebtoken::errors::Error),
    #[error("Invalid IDToken: {0}")]
    InvalidIdToken(&'static str),
    #[error("Authorization denied by provider: {0}")]
    Authorization(String),
    #[error("Invalid config: {0}")]
    Config(&'static str),
    #[error("Failed to generate state")]
    GenState,
    #[error("Failed to parse data")]
    Parse,
    #[error("Failed to parse url")]
    URL,
    #[error(transparent)]
    Execute(#[from] ExecuteError),
}
