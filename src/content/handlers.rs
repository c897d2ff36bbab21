use axum::{
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use super::pages::{self, AboutPage, FeedbackPage, FutureScopePage, HomePage};
use crate::{
    auth::{extractors::MaybeSessionUser, services::normalize_email},
    state::AppState,
};

pub fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/content/home", get(home))
        .route("/content/about", get(about))
        .route("/content/future-scope", get(future_scope))
        .route("/content/feedback", get(feedback))
        .route("/future-scope/notify", post(notify))
}

pub fn navigation_routes() -> Router<AppState> {
    Router::new()
        .route("/navigation", get(navigation))
        .route("/routes", get(route_table))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NavAction {
    Link,
    Logout,
}

#[derive(Debug, Clone, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub path: &'static str,
    pub action: NavAction,
}

#[derive(Debug, Serialize)]
pub struct Navigation {
    pub brand: &'static str,
    pub links: Vec<NavLink>,
    pub signed_in_as: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientRoute {
    pub path: &'static str,
    pub api: &'static str,
    pub requires_session: bool,
}

/// Client pages and the endpoints that back them. Gated pages redirect to
/// `/login` when the session is missing.
pub const CLIENT_ROUTES: &[ClientRoute] = &[
    ClientRoute {
        path: "/",
        api: "/api/v1/content/home",
        requires_session: false,
    },
    ClientRoute {
        path: "/login",
        api: "/api/v1/auth/login",
        requires_session: false,
    },
    ClientRoute {
        path: "/scanner",
        api: "/api/v1/scans",
        requires_session: false,
    },
    ClientRoute {
        path: "/about",
        api: "/api/v1/content/about",
        requires_session: false,
    },
    ClientRoute {
        path: "/future-scope",
        api: "/api/v1/content/future-scope",
        requires_session: false,
    },
    ClientRoute {
        path: "/feedback",
        api: "/api/v1/content/feedback",
        requires_session: false,
    },
    ClientRoute {
        path: "/dashboard",
        api: "/api/v1/dashboard",
        requires_session: true,
    },
    ClientRoute {
        path: "/report/:id",
        api: "/api/v1/reports/:id",
        requires_session: true,
    },
];

fn nav_links(signed_in: bool) -> Vec<NavLink> {
    let link = |label, path| NavLink {
        label,
        path,
        action: NavAction::Link,
    };
    let mut links = vec![
        link("Home", "/"),
        link("Scanner", "/scanner"),
        link("About", "/about"),
        link("Future Scope", "/future-scope"),
        link("Feedback", "/feedback"),
    ];
    if signed_in {
        links.push(link("Dashboard", "/dashboard"));
        links.push(NavLink {
            label: "Logout",
            path: "/",
            action: NavAction::Logout,
        });
    } else {
        links.push(link("Sign In", "/login"));
    }
    links
}

#[derive(Debug, Deserialize)]
pub struct NotifyRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct NotifyResponse {
    pub subscribed: bool,
    pub message: &'static str,
}

pub async fn home() -> Json<HomePage> {
    Json(pages::home())
}

pub async fn about() -> Json<AboutPage> {
    Json(pages::about())
}

pub async fn future_scope() -> Json<FutureScopePage> {
    Json(pages::future_scope())
}

pub async fn feedback() -> Json<FeedbackPage> {
    Json(pages::feedback())
}

/// Mock subscription; the address is validated and dropped.
#[instrument(skip(payload))]
pub async fn notify(
    Json(payload): Json<NotifyRequest>,
) -> Result<Json<NotifyResponse>, (StatusCode, String)> {
    normalize_email(&payload.email).map_err(|e| {
        warn!(error = %e, "rejected notify signup");
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;
    info!("notify signup accepted");
    Ok(Json(NotifyResponse {
        subscribed: true,
        message: "Thank you! You'll be notified about updates.",
    }))
}

#[instrument(skip(session))]
pub async fn navigation(MaybeSessionUser(session): MaybeSessionUser) -> Json<Navigation> {
    Json(Navigation {
        brand: "Mediyo",
        links: nav_links(session.is_some()),
        signed_in_as: session.map(|u| u.name),
    })
}

pub async fn route_table() -> Json<&'static [ClientRoute]> {
    Json(CLIENT_ROUTES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{access_token, body_json, request};
    use axum::http::Method;
    use tower::ServiceExt;
    use uuid::Uuid;

    #[tokio::test]
    async fn navigation_tail_follows_session() {
        let state = AppState::fake();
        let app = crate::app::build_app(state.clone());
        let profile = Uuid::new_v4();
        let token = access_token(&state, profile);

        let res = app
            .clone()
            .oneshot(request(Method::GET, "/api/v1/navigation", None, None, None))
            .await
            .unwrap();
        let nav = body_json(res).await;
        let links = nav["links"].as_array().unwrap();
        assert_eq!(links.last().unwrap()["label"], "Sign In");
        assert!(nav["signed_in_as"].is_null());

        state
            .sessions
            .sign_in(profile, "john@x.test", "pw")
            .await
            .unwrap();
        let res = app
            .oneshot(request(Method::GET, "/api/v1/navigation", None, Some(&token), None))
            .await
            .unwrap();
        let nav = body_json(res).await;
        let labels: Vec<_> = nav["links"]
            .as_array()
            .unwrap()
            .iter()
            .map(|l| l["label"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(&labels[labels.len() - 2..], ["Dashboard", "Logout"]);
        assert_eq!(nav["signed_in_as"], "John Doe");
    }

    #[test]
    fn only_dashboard_and_report_are_gated() {
        let gated: Vec<_> = CLIENT_ROUTES
            .iter()
            .filter(|r| r.requires_session)
            .map(|r| r.path)
            .collect();
        assert_eq!(gated, vec!["/dashboard", "/report/:id"]);
    }

    #[tokio::test]
    async fn notify_validates_email() {
        let app = crate::app::build_app(AppState::fake());
        let res = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/api/v1/future-scope/notify",
                None,
                None,
                Some(serde_json::json!({"email": "not-an-email"})),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = app
            .oneshot(request(
                Method::POST,
                "/api/v1/future-scope/notify",
                None,
                None,
                Some(serde_json::json!({"email": " Reader@Example.COM "})),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_json(res).await["subscribed"], true);
    }

    #[tokio::test]
    async fn content_pages_are_served() {
        let app = crate::app::build_app(AppState::fake());
        for page in ["home", "about", "future-scope", "feedback"] {
            let res = app
                .clone()
                .oneshot(request(
                    Method::GET,
                    &format!("/api/v1/content/{page}"),
                    None,
                    None,
                    None,
                ))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::OK, "{page}");
        }
    }
}
