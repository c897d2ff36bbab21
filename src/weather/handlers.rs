use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tracing::instrument;

use super::advice::StorageAdvice;
use super::services::{WeatherReading, WeatherStore};
use crate::state::AppState;

/// Storage-advice banner as rendered on the home page and dashboard.
#[derive(Debug, Serialize)]
pub struct WeatherBanner {
    pub loading: bool,
    pub reading: Option<WeatherReading>,
    pub advice: Option<StorageAdvice>,
}

impl WeatherBanner {
    pub fn from_store(store: &WeatherStore) -> Self {
        let reading = store.current();
        let advice = reading
            .as_ref()
            .map(|r| StorageAdvice::for_temperature(r.temperature));
        Self {
            loading: store.is_loading(),
            reading,
            advice,
        }
    }
}

pub fn weather_routes() -> Router<AppState> {
    Router::new().route("/weather", get(get_weather))
}

#[instrument(skip(state))]
pub async fn get_weather(State(state): State<AppState>) -> Json<WeatherBanner> {
    Json(WeatherBanner::from_store(&state.weather))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::advice::StorageRisk;

    #[test]
    fn banner_from_ready_store() {
        let store = WeatherStore::ready(WeatherReading {
            temperature: 33.0,
            condition: "Sunny".into(),
            location: "Delhi".into(),
        });
        let banner = WeatherBanner::from_store(&store);
        assert!(!banner.loading);
        assert_eq!(banner.advice.unwrap().risk, StorageRisk::High);
    }
}
