use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Outbound generative-text endpoint. The key never leaves the server.
#[derive(Debug, Clone, Deserialize)]
pub struct AssistantConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

/// Artificial latencies standing in for the backends that do not exist.
#[derive(Debug, Clone, Deserialize)]
pub struct MockLatency {
    pub auth_ms: u64,
    pub weather_ms: u64,
    pub scan_ms: u64,
    pub feedback_ms: u64,
}

impl MockLatency {
    pub fn none() -> Self {
        Self {
            auth_ms: 0,
            weather_ms: 0,
            scan_ms: 0,
            feedback_ms: 0,
        }
    }

    pub fn auth(&self) -> Duration {
        Duration::from_millis(self.auth_ms)
    }
    pub fn weather(&self) -> Duration {
        Duration::from_millis(self.weather_ms)
    }
    pub fn scan(&self) -> Duration {
        Duration::from_millis(self.scan_ms)
    }
    pub fn feedback(&self) -> Duration {
        Duration::from_millis(self.feedback_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub storage_quota_bytes: usize,
    pub jwt: JwtConfig,
    pub assistant: AssistantConfig,
    pub latency: MockLatency,
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let data_dir = std::env::var("MEDIYO_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "mediyo".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "mediyo-users".into()),
            ttl_minutes: env_or("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_or("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };

        let assistant = AssistantConfig {
            api_key: std::env::var("GEMINI_API_KEY")
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty()),
            base_url: std::env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".into()),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-pro".into()),
            timeout_secs: env_or("GEMINI_TIMEOUT_SECS", 30),
        };

        let latency = MockLatency {
            auth_ms: env_or("MOCK_AUTH_DELAY_MS", 1000),
            weather_ms: env_or("MOCK_WEATHER_DELAY_MS", 1000),
            scan_ms: env_or("MOCK_SCAN_DELAY_MS", 3000),
            feedback_ms: env_or("MOCK_FEEDBACK_DELAY_MS", 2000),
        };

        Ok(Self {
            data_dir,
            storage_quota_bytes: env_or("MEDIYO_STORAGE_QUOTA_BYTES", 5 * 1024 * 1024),
            jwt,
            assistant,
            latency,
        })
    }
}
