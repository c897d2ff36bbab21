use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::dto::{FeedbackEntry, FeedbackRequest};
use crate::auth::services::normalize_email;

pub const THANK_YOU: &str = "Your feedback has been submitted successfully. We appreciate your \
input and will review it carefully.";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeedbackError {
    #[error("Name is required")]
    MissingName,

    #[error("Invalid email")]
    InvalidEmail,

    #[error("Feedback text is required")]
    MissingText,

    #[error("Rating must be between 0 and 5")]
    RatingOutOfRange,
}

pub fn validate(req: FeedbackRequest) -> Result<FeedbackEntry, FeedbackError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(FeedbackError::MissingName);
    }
    let email = normalize_email(&req.email).map_err(|_| FeedbackError::InvalidEmail)?;
    let feedback = req.feedback.trim();
    if feedback.is_empty() {
        return Err(FeedbackError::MissingText);
    }
    let rating = u8::try_from(req.rating)
        .ok()
        .filter(|r| *r <= 5)
        .ok_or(FeedbackError::RatingOutOfRange)?;
    Ok(FeedbackEntry {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email,
        category: req.category,
        rating,
        feedback: feedback.to_string(),
        submitted_at: OffsetDateTime::now_utc(),
    })
}

/// Where submitted feedback goes.
#[async_trait]
pub trait FeedbackSink: Send + Sync {
    async fn submit(&self, entry: &FeedbackEntry) -> anyhow::Result<()>;
}

/// Accepts everything after the delay and logs it.
pub struct MockFeedbackSink {
    delay: Duration,
}

impl MockFeedbackSink {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl FeedbackSink for MockFeedbackSink {
    async fn submit(&self, entry: &FeedbackEntry) -> anyhow::Result<()> {
        tokio::time::sleep(self.delay).await;
        info!(
            id = %entry.id,
            category = ?entry.category,
            rating = entry.rating,
            "feedback received"
        );
        Ok(())
    }
}
