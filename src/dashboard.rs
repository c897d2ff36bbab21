//! Signed-in landing page: greeting, profile card, storage banner, stats and
//! recent scans. Stats and history are fixed sample data.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use crate::{
    auth::{dto::User, extractors::SessionUser},
    state::AppState,
    weather::handlers::WeatherBanner,
};

#[derive(Debug, Clone, Serialize)]
pub struct QuickStat {
    pub label: &'static str,
    pub value: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecentScan {
    pub id: &'static str,
    pub medicine: &'static str,
    pub date: &'static str,
    pub safety: &'static str,
    pub report_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuickAction {
    pub label: &'static str,
    pub path: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub welcome: String,
    pub tagline: &'static str,
    pub user: User,
    pub weather: WeatherBanner,
    pub quick_stats: Vec<QuickStat>,
    pub quick_actions: Vec<QuickAction>,
    pub recent_scans: Vec<RecentScan>,
}

fn quick_stats() -> Vec<QuickStat> {
    vec![
        QuickStat {
            label: "Total Scans",
            value: "24",
        },
        QuickStat {
            label: "This Month",
            value: "8",
        },
        QuickStat {
            label: "Safety Score",
            value: "95%",
        },
    ]
}

fn recent_scans() -> Vec<RecentScan> {
    [
        ("1", "Paracetamol 500mg", "2024-01-15", "Safe"),
        ("2", "Ibuprofen 400mg", "2024-01-14", "Caution"),
        ("3", "Amoxicillin 250mg", "2024-01-13", "Safe"),
    ]
    .into_iter()
    .map(|(id, medicine, date, safety)| RecentScan {
        id,
        medicine,
        date,
        safety,
        report_path: format!("/report/{id}"),
    })
    .collect()
}

fn welcome_line(user: &User) -> String {
    let name = if user.name.trim().is_empty() {
        "User"
    } else {
        user.name.as_str()
    };
    format!("Welcome back, {name}!")
}

pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

#[instrument(skip(state, session))]
pub async fn get_dashboard(
    State(state): State<AppState>,
    session: SessionUser,
) -> Json<DashboardResponse> {
    Json(DashboardResponse {
        welcome: welcome_line(&session.user),
        tagline: "Monitor your medicine safety and get AI-powered insights",
        user: session.user,
        weather: WeatherBanner::from_store(&state.weather),
        quick_stats: quick_stats(),
        quick_actions: vec![
            QuickAction {
                label: "Scan Medicine",
                path: "/scanner",
            },
            QuickAction {
                label: "Give Feedback",
                path: "/feedback",
            },
        ],
        recent_scans: recent_scans(),
    })
}
