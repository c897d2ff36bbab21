//! Test helpers shared by the handler and service tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request},
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use uuid::Uuid;

use crate::assistant::client::{AssistantError, TextGenerator};
use crate::auth::extractors::PROFILE_HEADER;
use crate::auth::jwt::{SessionKeys, TokenKind};
use crate::state::AppState;

pub fn request(
    method: Method,
    uri: &str,
    profile: Option<Uuid>,
    bearer: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(profile) = profile {
        builder = builder.header(PROFILE_HEADER, profile.to_string());
    }
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Access token for `profile` under the state's signing config.
pub fn access_token(state: &AppState, profile: Uuid) -> String {
    SessionKeys::from(&state.config.jwt)
        .mint(profile, TokenKind::Access)
        .unwrap()
}

pub async fn body_json(res: Response) -> serde_json::Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Serves `router` on an ephemeral local port; returns its base URL.
pub async fn spawn_server(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[derive(Debug, Clone, Copy)]
enum Script {
    Echo,
    Failing,
    Unconfigured,
}

/// In-process `TextGenerator`. Prompts starting with "slow" take 50ms.
pub struct ScriptedGenerator {
    script: Script,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    fn with(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
        }
    }

    /// Replies `echo: <prompt>`.
    pub fn echo() -> Self {
        Self::with(Script::Echo)
    }

    /// Fails like an endpoint answering 500.
    pub fn failing() -> Self {
        Self::with(Script::Failing)
    }

    /// No credential.
    pub fn unconfigured() -> Self {
        Self::with(Script::Unconfigured)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn is_configured(&self) -> bool {
        !matches!(self.script, Script::Unconfigured)
    }

    async fn send_prompt(&self, prompt: &str) -> Result<String, AssistantError> {
        if !self.is_configured() {
            return Err(AssistantError::CredentialMissing);
        }
        self.calls.fetch_add(1, Ordering::SeqCst);
        if prompt.starts_with("slow") {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        match self.script {
            Script::Echo => Ok(format!("echo: {prompt}")),
            _ => Err(AssistantError::RequestFailed(
                "500 Internal Server Error".into(),
            )),
        }
    }
}
