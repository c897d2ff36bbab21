use std::sync::Arc;

use crate::assistant::client::{GeminiClient, TextGenerator};
use crate::assistant::services::AssistantService;
use crate::auth::identity::MockIdentityProvider;
use crate::auth::services::SessionStore;
use crate::config::AppConfig;
use crate::feedback::services::{FeedbackSink, MockFeedbackSink};
use crate::scanner::services::{MedicineAnalyzer, MockAnalyzer};
use crate::storage::{FileKvStore, KvStore};
use crate::weather::services::{MockWeatherSource, WeatherStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub sessions: Arc<SessionStore>,
    pub weather: Arc<WeatherStore>,
    pub assistant: Arc<AssistantService>,
    pub analyzer: Arc<dyn MedicineAnalyzer>,
    pub feedback: Arc<dyn FeedbackSink>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let storage = Arc::new(FileKvStore::new(
            config.data_dir.clone(),
            config.storage_quota_bytes,
        )) as Arc<dyn KvStore>;

        let generator = Arc::new(GeminiClient::new(&config.assistant)?) as Arc<dyn TextGenerator>;
        if !generator.is_configured() {
            tracing::warn!("GEMINI_API_KEY not set; assistant input is disabled");
        }

        let weather = Arc::new(WeatherStore::start(
            Arc::new(MockWeatherSource),
            config.latency.weather(),
        ));

        Ok(Self::from_parts(config, storage, generator, weather))
    }

    /// Wires the mock backends around the given storage, text generator and
    /// weather store.
    pub fn from_parts(
        config: Arc<AppConfig>,
        storage: Arc<dyn KvStore>,
        generator: Arc<dyn TextGenerator>,
        weather: Arc<WeatherStore>,
    ) -> Self {
        let latency = &config.latency;
        let identity = Arc::new(MockIdentityProvider::new(latency.auth()));
        let sessions = Arc::new(SessionStore::new(storage.clone(), identity));
        let assistant = Arc::new(AssistantService::new(storage, generator));
        let analyzer = Arc::new(MockAnalyzer::new(latency.scan())) as Arc<dyn MedicineAnalyzer>;
        let feedback = Arc::new(MockFeedbackSink::new(latency.feedback())) as Arc<dyn FeedbackSink>;

        Self {
            config,
            sessions,
            weather,
            assistant,
            analyzer,
            feedback,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_generator(Arc::new(crate::testing::ScriptedGenerator::echo()))
    }

    /// In-memory storage, zero latency, weather already settled.
    #[cfg(test)]
    pub fn fake_with_generator(generator: Arc<dyn TextGenerator>) -> Self {
        use crate::config::{AssistantConfig, JwtConfig, MockLatency};
        use crate::storage::MemoryKvStore;
        use crate::weather::services::WeatherReading;

        let config = Arc::new(AppConfig {
            data_dir: std::env::temp_dir().join("mediyo-test"),
            storage_quota_bytes: 5 * 1024 * 1024,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            assistant: AssistantConfig {
                api_key: None,
                base_url: "http://127.0.0.1:9".into(),
                model: "gemini-pro".into(),
                timeout_secs: 1,
            },
            latency: MockLatency::none(),
        });

        let weather = Arc::new(WeatherStore::ready(WeatherReading {
            temperature: 28.0,
            condition: "Clear".into(),
            location: "Mumbai, India".into(),
        }));
        Self::from_parts(config, Arc::new(MemoryKvStore::new()), generator, weather)
    }
}
