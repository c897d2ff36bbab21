use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use super::dto::{AgeGroups, CompositionItem, ScanReport};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("an image file is required")]
    MissingImage,

    #[error("only one image can be scanned at a time")]
    TooManyImages,

    #[error("unsupported content type {0}; an image is required")]
    NotAnImage(String),

    #[error("image is empty")]
    EmptyImage,

    #[error("invalid base64")]
    InvalidBase64,
}

pub struct UploadItem {
    pub body: Bytes,
    pub content_type: String,
}

/// Accepted upload, identified for logs.
pub struct ScanUpload {
    pub id: Uuid,
    pub body: Bytes,
    pub content_type: String,
}

impl ScanUpload {
    /// Exactly one non-empty `image/*` item.
    pub fn from_items(mut items: Vec<UploadItem>) -> Result<Self, ScanError> {
        let item = match items.len() {
            0 => return Err(ScanError::MissingImage),
            1 => items.remove(0),
            _ => return Err(ScanError::TooManyImages),
        };
        if !item.content_type.starts_with("image/") {
            return Err(ScanError::NotAnImage(item.content_type));
        }
        if item.body.is_empty() {
            return Err(ScanError::EmptyImage);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            body: item.body,
            content_type: item.content_type,
        })
    }
}

#[async_trait]
pub trait MedicineAnalyzer: Send + Sync {
    async fn analyze(&self, upload: &ScanUpload) -> anyhow::Result<ScanReport>;
    async fn report(&self, id: &str) -> anyhow::Result<ScanReport>;
}

/// Stand-in analyzer: the same Paracetamol report for every image.
pub struct MockAnalyzer {
    delay: Duration,
}

pub const SAMPLE_SCANNED_DATE: &str = "2024-01-15";

impl MockAnalyzer {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    fn sample(id: String) -> ScanReport {
        let strs = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        ScanReport {
            id,
            medicine_name: "Paracetamol 500mg".into(),
            composition: vec![
                CompositionItem {
                    ingredient: "Paracetamol".into(),
                    percentage: 85.0,
                },
                CompositionItem {
                    ingredient: "Starch".into(),
                    percentage: 10.0,
                },
                CompositionItem {
                    ingredient: "Other excipients".into(),
                    percentage: 5.0,
                },
            ],
            safety: "Safe".into(),
            safety_score: 92,
            age_groups: AgeGroups {
                children: "Consult Doctor".into(),
                adults: "Safe".into(),
                elderly: "Safe".into(),
                pregnant: "Consult Doctor".into(),
            },
            side_effects: strs(&["Nausea", "Dizziness", "Skin rash (rare)"]),
            dosage: "Adults: 1-2 tablets every 4-6 hours".into(),
            expiry_date: "2025-12-31".into(),
            storage_temp: "25°C".into(),
            certification: "FDA Approved".into(),
            warnings: strs(&[
                "Do not exceed 8 tablets in 24 hours",
                "Avoid alcohol consumption",
            ]),
            scanned_date: None,
        }
    }
}

#[async_trait]
impl MedicineAnalyzer for MockAnalyzer {
    async fn analyze(&self, upload: &ScanUpload) -> anyhow::Result<ScanReport> {
        tokio::time::sleep(self.delay).await;
        debug!(
            upload = %upload.id,
            content_type = %upload.content_type,
            bytes = upload.body.len(),
            "mock analysis"
        );
        Ok(Self::sample(Uuid::new_v4().to_string()))
    }

    async fn report(&self, id: &str) -> anyhow::Result<ScanReport> {
        let mut report = Self::sample(id.to_string());
        report.scanned_date = Some(SAMPLE_SCANNED_DATE.into());
        Ok(report)
    }
}
