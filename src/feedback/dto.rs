use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackCategory {
    #[default]
    General,
    Bug,
    Feature,
    Improvement,
    Praise,
}

impl FeedbackCategory {
    pub const ALL: [FeedbackCategory; 5] = [
        FeedbackCategory::General,
        FeedbackCategory::Bug,
        FeedbackCategory::Feature,
        FeedbackCategory::Improvement,
        FeedbackCategory::Praise,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FeedbackCategory::General => "General Feedback",
            FeedbackCategory::Bug => "Bug Report",
            FeedbackCategory::Feature => "Feature Request",
            FeedbackCategory::Improvement => "Improvement Suggestion",
            FeedbackCategory::Praise => "Praise & Appreciation",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub category: FeedbackCategory,
    /// 0 means "not rated". Range is checked on validation.
    #[serde(default)]
    pub rating: i64,
    pub feedback: String,
}

/// A validated submission as handed to the sink.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackEntry {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub category: FeedbackCategory,
    pub rating: u8,
    pub feedback: String,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
}

#[derive(Debug, Serialize)]
pub struct FeedbackReceipt {
    pub id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: OffsetDateTime,
    pub message: &'static str,
}
