//! Session tokens. Both tokens of a pair name the profile they were issued
//! to; an access token is only honoured for that profile.

use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::{config::JwtConfig, state::AppState};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Token expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Expected a {0:?} token")]
    WrongKind(TokenKind),

    #[error("Token does not belong to this profile")]
    ForeignProfile,

    #[error("token signing failed: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Token payload.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    #[serde(rename = "sub")]
    pub profile: Uuid,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

#[derive(Debug)]
pub struct SessionTokens {
    pub access: String,
    pub refresh: String,
}

#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl From<&JwtConfig> for SessionKeys {
    fn from(cfg: &JwtConfig) -> Self {
        let minutes = |m: i64| Duration::from_secs(m.max(0) as u64 * 60);
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: minutes(cfg.ttl_minutes),
            refresh_ttl: minutes(cfg.refresh_ttl_minutes),
        }
    }
}

impl FromRef<AppState> for SessionKeys {
    fn from_ref(state: &AppState) -> Self {
        Self::from(&state.config.jwt)
    }
}

impl SessionKeys {
    fn ttl(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        }
    }

    pub fn mint(&self, profile: Uuid, kind: TokenKind) -> Result<String, TokenError> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl(kind).as_secs() as i64);
        let claims = SessionClaims {
            profile,
            kind,
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(%profile, ?kind, "session token minted");
        Ok(token)
    }

    /// Fresh access + refresh pair for a profile.
    pub fn issue(&self, profile: Uuid) -> Result<SessionTokens, TokenError> {
        Ok(SessionTokens {
            access: self.mint(profile, TokenKind::Access)?,
            refresh: self.mint(profile, TokenKind::Refresh)?,
        })
    }

    /// Checks signature, issuer, audience, expiry and kind.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<SessionClaims, TokenError> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let claims = decode::<SessionClaims>(token, &self.decoding, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })?
            .claims;
        if claims.kind != expected {
            return Err(TokenError::WrongKind(expected));
        }
        Ok(claims)
    }

    /// Access-token check for a request. `acting_as` is the profile the
    /// request names, if it names one; it must be the token's profile.
    pub fn authorize(&self, token: &str, acting_as: Option<Uuid>) -> Result<Uuid, TokenError> {
        let claims = self.verify(token, TokenKind::Access)?;
        match acting_as {
            Some(profile) if profile != claims.profile => Err(TokenError::ForeignProfile),
            _ => Ok(claims.profile),
        }
    }
}
