use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::rules::{KnockoutResult, UnderwritingMetrics};
use super::verification::{download_link, SanctionLetter};

pub const PLACEHOLDER_TRANSACTION_ID: &str = "TXN_99887766";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDecisionRequest {
    #[serde(default)]
    pub decision: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

impl VideoDecisionRequest {
    pub fn approves(&self) -> bool {
        self.decision.as_deref() == Some("approve")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoVerificationResponse {
    pub status: String,
    pub verification: bool,
}

impl VideoVerificationResponse {
    pub(crate) fn verified() -> Self {
        Self {
            status: "Video KYC Verified".to_string(),
            verification: true,
        }
    }

    pub(crate) fn rejected() -> Self {
        Self {
            status: "Video KYC Rejected".to_string(),
            verification: false,
        }
    }
}

/// Knockout failures return the bare knockout payload; passing
/// applications return both stages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnderwritingResponse {
    Completed {
        status: String,
        knockout: KnockoutResult,
        metrics: UnderwritingMetrics,
    },
    KnockedOut(KnockoutResult),
}

impl UnderwritingResponse {
    pub fn knockout(&self) -> &KnockoutResult {
        match self {
            UnderwritingResponse::Completed { knockout, .. } => knockout,
            UnderwritingResponse::KnockedOut(knockout) => knockout,
        }
    }

    pub fn metrics(&self) -> Option<&UnderwritingMetrics> {
        match self {
            UnderwritingResponse::Completed { metrics, .. } => Some(metrics),
            UnderwritingResponse::KnockedOut(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanctionResponse {
    pub message: String,
    pub download_link: String,
}

impl From<&SanctionLetter> for SanctionResponse {
    fn from(letter: &SanctionLetter) -> Self {
        Self {
            message: "Sanction Letter Generated Successfully".to_string(),
            download_link: download_link(letter),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisbursementResponse {
    pub status: String,
    pub message: String,
    pub transaction_id: String,
}

impl DisbursementResponse {
    pub(crate) fn success() -> Self {
        Self {
            status: "Success".to_string(),
            message: "Funds Disbursed to Borrower Account".to_string(),
            transaction_id: PLACEHOLDER_TRANSACTION_ID.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeRequest {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Numbers arrive as JSON numbers or numeric strings. Falsy values
/// (`0`, `""`, `null`) leave the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreUpdateRequest {
    #[serde(default)]
    pub cibil_score: Option<Value>,
    /// Alias accepted when `cibil_score` is absent or falsy.
    #[serde(default)]
    pub score: Option<Value>,
    #[serde(default)]
    pub risk_score: Option<Value>,
    #[serde(default)]
    pub approved_amount: Option<Value>,
    #[serde(default)]
    pub remarks: Option<Value>,
}
