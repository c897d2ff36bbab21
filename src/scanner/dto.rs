use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DISCLAIMER: &str = "This AI-generated analysis is for informational purposes only and \
does not constitute medical advice, diagnosis, or treatment. Always consult with qualified \
healthcare professionals before making any medical decisions or changes to your medication \
regimen. The accuracy of this analysis depends on the quality of the scanned image and may not \
capture all relevant information about the medication.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionItem {
    pub ingredient: String,
    pub percentage: f64,
}

/// Verdicts stay free-form ("Safe", "Consult Doctor", "Not Recommended").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeGroups {
    pub children: String,
    pub adults: String,
    pub elderly: String,
    pub pregnant: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub id: String,
    pub medicine_name: String,
    pub composition: Vec<CompositionItem>,
    pub safety: String,
    pub safety_score: u8,
    pub age_groups: AgeGroups,
    pub side_effects: Vec<String>,
    pub dosage: String,
    pub expiry_date: String,
    pub storage_temp: String,
    pub certification: String,
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scanned_date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScanBase64 {
    pub image_b64: String,
    pub content_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub upload_id: Uuid,
    pub report: ScanReport,
    /// Client route of the full report.
    pub report_path: String,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub report: ScanReport,
    pub disclaimer: &'static str,
}
