use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// One ambient reading. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub temperature: f64,
    pub condition: String,
    pub location: String,
}

#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self) -> anyhow::Result<WeatherReading>;
}

/// Fixed snapshot in place of a weather API.
pub struct MockWeatherSource;

#[async_trait]
impl WeatherSource for MockWeatherSource {
    async fn fetch(&self) -> anyhow::Result<WeatherReading> {
        Ok(WeatherReading {
            temperature: 28.0,
            condition: "Clear".into(),
            location: "Mumbai, India".into(),
        })
    }
}

/// Environmental context shared by every view.
///
/// `start` spawns a single fetch that publishes once after the delay.
/// Until then the store reports `loading`. `shutdown` (or drop) aborts a
/// fetch that has not finished.
pub struct WeatherStore {
    rx: watch::Receiver<Option<WeatherReading>>,
    loading: watch::Receiver<bool>,
    task: Option<JoinHandle<()>>,
}

impl WeatherStore {
    pub fn start(source: Arc<dyn WeatherSource>, delay: Duration) -> Self {
        let (tx, rx) = watch::channel(None);
        let (loading_tx, loading) = watch::channel(true);
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match source.fetch().await {
                Ok(reading) => {
                    info!(
                        temperature = reading.temperature,
                        location = %reading.location,
                        "weather reading published"
                    );
                    let _ = tx.send(Some(reading));
                }
                Err(e) => warn!(error = %e, "weather fetch failed"),
            }
            let _ = loading_tx.send(false);
        });
        Self {
            rx,
            loading,
            task: Some(task),
        }
    }

    /// A store that already holds `reading`.
    pub fn ready(reading: WeatherReading) -> Self {
        let (_tx, rx) = watch::channel(Some(reading));
        let (_loading_tx, loading) = watch::channel(false);
        Self {
            rx,
            loading,
            task: None,
        }
    }

    pub fn current(&self) -> Option<WeatherReading> {
        self.rx.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Waits until the fetch has settled and returns the reading, if any.
    pub async fn settled(&self) -> Option<WeatherReading> {
        let mut loading = self.loading.clone();
        // Err means the fetch task is gone; its last value still stands.
        let _ = loading.wait_for(|l| !*l).await;
        self.current()
    }

    pub fn shutdown(&self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

impl Drop for WeatherStore {
    fn drop(&mut self) {
        self.shutdown();
    }
}
