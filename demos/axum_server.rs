// Register a client at your provider with
// - Redirect_uri: http://localhost/auth/callback
// Set .env file
// ```.env
// client_id="your_client_id"
// client_secret="your_client_secret"
// redirect_uri="http://localhost/auth/callback"
// provider_uri="https://your-provider.example"
// ```
// finally ```cargo run --example axum_server```
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
    routing::{get, post},
};
use axum_extra::extract::{CookieJar, cookie::Cookie};
use http::StatusCode;
use serde::Deserialize;
use tiny_oidc_client::{
    client::OidcClient,
    code::UnCheckedCodeResponse,
    config::ConfigBuilder,
    error::Error,
    refresh_token::RefreshToken,
};
use tracing::error;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Log settings
    tracing_subscriber::fmt::init();

    // Build Config from environment
    let config = ConfigBuilder::new()
        .client_id(&read_env("client_id")?)
        .client_secret(&read_env("client_secret")?)
        .redirect_uri(&read_env("redirect_uri")?)
        .provider_uri(&read_env("provider_uri")?)
        .build()
        .context("Invalid client config")?;

    // application state that holds the client and the pending states
    let app_state = AppState::new(OidcClient::new(config));
    let listener = tokio::net::TcpListener::bind("0.0.0.0:80").await?;
    // '/auth/callback': the redirect_uri registered at the provider
    // '/': starts the flow (redirect to the provider's login page)
    let app = Router::new()
        .route("/auth/callback", get(call_back))
        .route("/", get(start_auth))
        .route("/refresh", post(refresh_token))
        .with_state(Arc::new(app_state));

    axum::serve(listener, app).await?;
    anyhow::Ok(())
}

static COOKIE_KEY: &str = "session_id";

async fn start_auth(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<impl IntoResponse, StatusCode> {
    // Generate a state for each attempt
    let state = app_state
        .client
        .create_state()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    // Cookie holds the session id, the session map holds the state
    let session_id = Uuid::new_v4().to_string();
    let cookie = Cookie::new(COOKIE_KEY, session_id.clone());
    app_state
        .sessions
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .insert(session_id, state.value().to_string());

    let url = app_state
        .client
        .create_authenticate_url(state.value())
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok((jar.add(cookie), Redirect::to(&url)))
}

#[derive(Debug, Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

async fn call_back(
    State(app_state): State<Arc<AppState>>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse, StatusCode> {
    // The state is consumed whatever the outcome
    let session_id = jar.get(COOKIE_KEY).ok_or(StatusCode::BAD_REQUEST)?.value();
    let cached_state = app_state
        .sessions
        .lock()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .remove(session_id)
        .ok_or(StatusCode::BAD_REQUEST)?;

    if let Some(err) = params.error {
        error!("Provider returned an error: {}", err);
        return Err(StatusCode::UNAUTHORIZED);
    }

    let code = params.code.as_deref().ok_or_else(|| {
        error!("Callback without code");
        StatusCode::BAD_REQUEST
    })?;
    let res = UnCheckedCodeResponse::new(code, params.state.as_deref().unwrap_or_default());
    // Get Code after verifying the state
    let code = res.exchange_with_code(&cached_state).map_err(|e| {
        error!("{}", e);
        StatusCode::BAD_REQUEST
    })?;

    let token = app_state
        .client
        .request_token(&code)
        .await
        .map_err(into_status)?;
    let user_info = app_state
        .client
        .request_user_info(token.access_token())
        .await
        .map_err(into_status)?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "id_token": token.id_token(),
            "user_info": user_info,
            "refresh_token": token.refresh_token(),
            "expires_in": token.expires_in(),
        })),
    ))
}

// Refresh token handler
// Recommend getting the refresh_token from a secure store in production code
async fn refresh_token(
    State(app_state): State<Arc<AppState>>,
    Json(body): Json<RefreshBody>,
) -> Result<impl IntoResponse, StatusCode> {
    let refresh_token = RefreshToken::new(&body.refresh_token);
    let token = app_state
        .client
        .request_token_by_refresh_token(&refresh_token)
        .await
        .map_err(into_status)?;
    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "access_token": token.access_token(),
            "scope": token.scope(),
            "expires_in": token.expires_in(),
        })),
    ))
}

fn into_status(e: Error) -> StatusCode {
    error!("{}", e);
    match e {
        Error::Client { .. } => StatusCode::BAD_GATEWAY,
        Error::InvalidToken(_) | Error::Decode(_) | Error::InvalidIdToken(_) => {
            StatusCode::UNAUTHORIZED
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

// Get env from .env file
fn read_env(key: &str) -> anyhow::Result<String> {
    dotenvy::var(key).context("Failed to read env")
}

#[derive(Debug)]
struct AppState {
    client: OidcClient,
    // In-memory and never expired: only fit for this demo.
    // A real server should use a session store that drops abandoned logins.
    sessions: Mutex<HashMap<String, String>>,
}

impl AppState {
    fn new(client: OidcClient) -> Self {
        Self {
            client,
            sessions: Mutex::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
struct RefreshBody {
    refresh_token: String,
}

