use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use tracing::{error, instrument, warn};

use super::dto::{FeedbackReceipt, FeedbackRequest};
use super::services::{validate, THANK_YOU};
use crate::state::AppState;

pub fn feedback_routes() -> Router<AppState> {
    Router::new().route("/feedback", post(submit_feedback))
}

#[instrument(skip(state, payload))]
pub async fn submit_feedback(
    State(state): State<AppState>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<Json<FeedbackReceipt>, (StatusCode, String)> {
    let entry = validate(payload).map_err(|e| {
        warn!(error = %e, "rejected feedback");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    state.feedback.submit(&entry).await.map_err(|e| {
        error!(error = %e, id = %entry.id, "feedback sink failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to submit feedback".to_string())
    })?;

    Ok(Json(FeedbackReceipt {
        id: entry.id,
        submitted_at: entry.submitted_at,
        message: THANK_YOU,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{body_json, request};
    use axum::http::Method;
    use tower::ServiceExt;

    #[tokio::test]
    async fn submit_and_reject() {
        let app = crate::app::build_app(AppState::fake());
        let res = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/v1/feedback",
                None,
                None,
                Some(serde_json::json!({
                    "name": "Asha",
                    "email": "asha@example.in",
                    "category": "praise",
                    "rating": 5,
                    "feedback": "Love the weather tips",
                })),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert!(body["id"].is_string());
        assert_eq!(body["message"], THANK_YOU);

        for rating in [9, 300, -1] {
            let res = app
                .clone()
                .oneshot(request(
                    Method::POST,
                    "/api/v1/feedback",
                    None,
                    None,
                    Some(serde_json::json!({
                        "name": "Asha",
                        "email": "asha@example.in",
                        "rating": rating,
                        "feedback": "x",
                    })),
                ))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "rating {rating}");
        }
    }
}
