use axum::{
    extract::State,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument, warn};

use crate::{
    assistant::{
        client::AssistantError,
        preferences::PreferencesPatch,
        services::{ConnectionStatus, ConversationView, SaveOutcome, SendOutcome},
        transcript::ExportDocument,
    },
    auth::extractors::ProfileId,
    state::AppState,
};

pub fn assistant_routes() -> Router<AppState> {
    Router::new()
        .route("/assistant", get(view))
        .route("/assistant/messages", post(send).delete(clear))
        .route("/assistant/test-connection", post(test_connection))
        .route("/assistant/preferences", patch(update_preferences))
        .route("/assistant/save", post(save))
        .route("/assistant/export", get(export))
        .route("/assistant/import", post(import))
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ConnectionResponse {
    pub status: ConnectionStatus,
}

fn assistant_failure(e: AssistantError) -> (StatusCode, String) {
    match e {
        AssistantError::EmptyPrompt | AssistantError::InvalidTranscript(_) => {
            warn!(error = %e, "rejected assistant request");
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        AssistantError::CredentialMissing => (StatusCode::SERVICE_UNAVAILABLE, e.to_string()),
        AssistantError::RequestFailed(_) => {
            error!(error = %e, "assistant backend failed");
            (StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

#[instrument(skip(state))]
pub async fn view(
    State(state): State<AppState>,
    ProfileId(profile): ProfileId,
) -> Json<ConversationView> {
    Json(state.assistant.view(profile).await)
}

/// A failed generation still answers 200: the apology is part of the
/// transcript and `error` carries the cause.
#[instrument(skip(state, payload))]
pub async fn send(
    State(state): State<AppState>,
    ProfileId(profile): ProfileId,
    Json(payload): Json<SendRequest>,
) -> Result<Json<SendOutcome>, (StatusCode, String)> {
    state
        .assistant
        .send(profile, &payload.text)
        .await
        .map(Json)
        .map_err(assistant_failure)
}

#[instrument(skip(state))]
pub async fn test_connection(
    State(state): State<AppState>,
    ProfileId(profile): ProfileId,
) -> Json<ConnectionResponse> {
    Json(ConnectionResponse {
        status: state.assistant.test_connection(profile).await,
    })
}

#[instrument(skip(state, payload))]
pub async fn update_preferences(
    State(state): State<AppState>,
    ProfileId(profile): ProfileId,
    Json(payload): Json<PreferencesPatch>,
) -> Json<ConversationView> {
    Json(state.assistant.update_preferences(profile, payload).await)
}

#[instrument(skip(state))]
pub async fn save(
    State(state): State<AppState>,
    ProfileId(profile): ProfileId,
) -> Json<SaveOutcome> {
    Json(state.assistant.save(profile).await)
}

#[instrument(skip(state))]
pub async fn clear(
    State(state): State<AppState>,
    ProfileId(profile): ProfileId,
) -> Json<ConversationView> {
    Json(state.assistant.clear(profile).await)
}

#[instrument(skip(state))]
pub async fn export(
    State(state): State<AppState>,
    ProfileId(profile): ProfileId,
) -> Result<Response, (StatusCode, String)> {
    let doc = state.assistant.export(profile).await;
    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        doc.file_name()
    ))
    .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let mut res = Json(doc).into_response();
    res.headers_mut()
        .insert(header::CONTENT_DISPOSITION, disposition);
    Ok(res)
}

#[instrument(skip(state, payload))]
pub async fn import(
    State(state): State<AppState>,
    ProfileId(profile): ProfileId,
    Json(payload): Json<ExportDocument>,
) -> Result<Json<ConversationView>, (StatusCode, String)> {
    state
        .assistant
        .import(profile, payload)
        .await
        .map(Json)
        .map_err(assistant_failure)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::transcript::APOLOGY;
    use crate::testing::{body_json, request, ScriptedGenerator};
    use axum::http::Method;
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app_with(generator: ScriptedGenerator) -> Router {
        let state = AppState::fake_with_generator(Arc::new(generator));
        crate::app::build_app(state)
    }

    async fn send_text(app: &Router, profile: Uuid, text: &str) -> Response {
        app.clone()
            .oneshot(request(
                Method::POST,
                "/api/v1/assistant/messages",
                Some(profile),
                None,
                Some(serde_json::json!({ "text": text })),
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn send_returns_reply_and_view_shows_it() {
        let app = app_with(ScriptedGenerator::echo());
        let profile = Uuid::new_v4();

        let res = send_text(&app, profile, "aspirin?").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["reply"]["text"], "echo: aspirin?");

        let res = app
            .oneshot(request(Method::GET, "/api/v1/assistant", Some(profile), None, None))
            .await
            .unwrap();
        let view = body_json(res).await;
        assert_eq!(view["messages"].as_array().unwrap().len(), 3);
        assert_eq!(view["messages"][1]["sender"], "user");
        assert_eq!(view["messages"][2]["sender"], "ai");
    }

    #[tokio::test]
    async fn status_codes_for_rejections() {
        let app = app_with(ScriptedGenerator::unconfigured());
        let profile = Uuid::new_v4();
        assert_eq!(
            send_text(&app, profile, "hi").await.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            send_text(&app, profile, "  ").await.status(),
            StatusCode::BAD_REQUEST
        );

        let res = app
            .oneshot(request(Method::GET, "/api/v1/assistant", Some(profile), None, None))
            .await
            .unwrap();
        assert_eq!(body_json(res).await["input_enabled"], false);
    }

    #[tokio::test]
    async fn failed_generation_is_apology_with_200() {
        let app = app_with(ScriptedGenerator::failing());
        let res = send_text(&app, Uuid::new_v4(), "hi").await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["reply"]["text"], APOLOGY);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn export_sets_attachment_name() {
        let app = app_with(ScriptedGenerator::echo());
        let res = app
            .oneshot(request(
                Method::GET,
                "/api/v1/assistant/export",
                Some(Uuid::new_v4()),
                None,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let disposition = res.headers()[header::CONTENT_DISPOSITION].to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"ai-assistant-chat-"));
        assert_eq!(body_json(res).await["totalMessages"], 1);
    }

    #[tokio::test]
    async fn import_rejects_duplicate_ids() {
        let app = app_with(ScriptedGenerator::echo());
        let m = serde_json::json!({
            "id": "same",
            "text": "hi",
            "sender": "user",
            "timestamp": "2026-01-01T00:00:00Z",
        });
        let doc = serde_json::json!({
            "messages": [m.clone(), m],
            "exportDate": "2026-01-01T00:00:00Z",
            "totalMessages": 2,
            "userMessages": 2,
            "aiMessages": 0,
        });
        let res = app
            .oneshot(request(
                Method::POST,
                "/api/v1/assistant/import",
                Some(Uuid::new_v4()),
                None,
                Some(doc),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn preferences_patch_and_clear() {
        let app = app_with(ScriptedGenerator::echo());
        let profile = Uuid::new_v4();

        let res = app
            .clone()
            .oneshot(request(
                Method::PATCH,
                "/api/v1/assistant/preferences",
                Some(profile),
                None,
                Some(serde_json::json!({"theme": "dark"})),
            ))
            .await
            .unwrap();
        let view = body_json(res).await;
        assert_eq!(view["preferences"]["theme"], "dark");
        assert_eq!(view["preferences"]["auto_save"], true);

        send_text(&app, profile, "hi").await;
        let res = app
            .oneshot(request(
                Method::DELETE,
                "/api/v1/assistant/messages",
                Some(profile),
                None,
                None,
            ))
            .await
            .unwrap();
        assert_eq!(body_json(res).await["messages"].as_array().unwrap().len(), 1);
    }
}
