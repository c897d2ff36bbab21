use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{
            AuthResponse, LoginRequest, LogoutResponse, RefreshRequest, Registration,
            SessionResponse, SignupRequest, User,
        },
        extractors::{ProfileId, SessionUser},
        jwt::{SessionKeys, TokenKind},
        services::{AuthError, SignedIn},
    },
    state::AppState,
};

const AUTH_FAILED: &str = "Authentication failed. Please try again.";

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/signup", post(signup))
        .route("/auth/logout", post(logout))
        .route("/auth/refresh", post(refresh))
}

pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/session", get(get_session))
        .route("/me", get(get_me))
}

/// Form problems are reported as such; anything from the identity backend
/// collapses into one generic message.
fn auth_failure(e: AuthError) -> (StatusCode, String) {
    match e {
        AuthError::InvalidEmail | AuthError::MissingPassword | AuthError::MissingName => {
            warn!(error = %e, "rejected auth form");
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        AuthError::Backend(_) => {
            error!(error = %e, "identity backend failed");
            (StatusCode::UNAUTHORIZED, AUTH_FAILED.into())
        }
    }
}

fn issue_tokens(
    state: &AppState,
    profile: uuid::Uuid,
    signed: SignedIn,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let tokens = SessionKeys::from_ref(state).issue(profile).map_err(|e| {
        error!(error = %e, %profile, "session tokens not issued");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    Ok(Json(AuthResponse {
        access_token: tokens.access,
        refresh_token: tokens.refresh,
        user: signed.user,
        warning: signed.warning,
    }))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    ProfileId(profile): ProfileId,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let signed = state
        .sessions
        .sign_in(profile, &payload.email, &payload.password)
        .await
        .map_err(auth_failure)?;

    info!(%profile, "user logged in");
    issue_tokens(&state, profile, signed)
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    ProfileId(profile): ProfileId,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let registration = Registration {
        name: payload.name,
        email: payload.email,
        password: payload.password,
        age: payload.age,
        health_conditions: payload.health_conditions,
    };
    let signed = state
        .sessions
        .sign_up(profile, registration)
        .await
        .map_err(auth_failure)?;

    info!(%profile, "user registered");
    issue_tokens(&state, profile, signed)
}

#[instrument(skip(state))]
pub async fn logout(
    State(state): State<AppState>,
    ProfileId(profile): ProfileId,
) -> Json<LogoutResponse> {
    let warning = state.sessions.sign_out(profile).await;
    Json(LogoutResponse {
        signed_out: true,
        warning,
    })
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    let profile = SessionKeys::from_ref(&state)
        .verify(&payload.refresh_token, TokenKind::Refresh)
        .map_err(|e| {
            warn!(error = %e, "rejected refresh token");
            (StatusCode::UNAUTHORIZED, e.to_string())
        })?
        .profile;

    // A signed-out profile cannot refresh its way back in.
    let user = state
        .sessions
        .current(profile)
        .await
        .ok_or((StatusCode::UNAUTHORIZED, "No active session".to_string()))?;

    issue_tokens(
        &state,
        profile,
        SignedIn {
            user,
            warning: None,
        },
    )
}

/// Session restore on page load: the persisted user, if any.
#[instrument(skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    ProfileId(profile): ProfileId,
) -> Json<SessionResponse> {
    Json(SessionResponse {
        user: state.sessions.current(profile).await,
    })
}

#[instrument(skip(session))]
pub async fn get_me(session: SessionUser) -> Json<User> {
    Json(session.user)
}
