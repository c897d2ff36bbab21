use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
};
use tracing::warn;
use uuid::Uuid;

use super::dto::User;
use super::jwt::SessionKeys;
use crate::state::AppState;

/// Header carrying the client's profile id (one browser profile's key space).
pub const PROFILE_HEADER: &str = "x-profile-id";

/// Profile the request acts on.
pub struct ProfileId(pub Uuid);

fn profile_header(parts: &Parts) -> Result<Option<Uuid>, (StatusCode, String)> {
    let Some(raw) = parts.headers.get(PROFILE_HEADER) else {
        return Ok(None);
    };
    raw.to_str()
        .ok()
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .map(Some)
        .ok_or((
            StatusCode::BAD_REQUEST,
            format!("Invalid {PROFILE_HEADER} header"),
        ))
}

#[async_trait]
impl<S> FromRequestParts<S> for ProfileId
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        profile_header(parts)?.map(ProfileId).ok_or((
            StatusCode::BAD_REQUEST,
            format!("Missing {PROFILE_HEADER} header"),
        ))
    }
}

/// Profile of a valid bearer access token. When the request also names a
/// profile in its header, it has to be the token's.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    SessionKeys: FromRef<S>,
{
    type Rejection = (StatusCode, String);

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Missing Authorization header".to_string(),
            ))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .or_else(|| auth_header.strip_prefix("bearer "))
            .ok_or((
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header".to_string(),
            ))?;

        let acting_as = profile_header(parts)?;
        SessionKeys::from_ref(state)
            .authorize(token, acting_as)
            .map(AuthUser)
            .map_err(|e| {
                warn!(error = %e, ?acting_as, "rejected access token");
                (StatusCode::UNAUTHORIZED, e.to_string())
            })
    }
}

/// A valid access token whose profile still has a session user.
/// Gates the dashboard and report routes.
pub struct SessionUser {
    pub profile: Uuid,
    pub user: User,
}

#[async_trait]
impl FromRequestParts<AppState> for SessionUser {
    type Rejection = (StatusCode, String);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(profile) = AuthUser::from_request_parts(parts, state).await?;
        match state.sessions.current(profile).await {
            Some(user) => Ok(SessionUser { profile, user }),
            None => Err((StatusCode::UNAUTHORIZED, "No active session".to_string())),
        }
    }
}

/// Session user when one is present; never rejects.
pub struct MaybeSessionUser(pub Option<User>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeSessionUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = SessionUser::from_request_parts(parts, state).await.ok();
        Ok(MaybeSessionUser(session.map(|s| s.user)))
    }
}
