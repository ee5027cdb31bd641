use serde::{Deserialize, Serialize};

use super::domain::LoanApplication;

/// Generated sanction letter as reported by the document service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanctionLetter {
    pub file_name: String,
}

/// Result of a penny-drop bank account check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PennyDropOutcome {
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_holder: Option<String>,
    pub message: String,
}

/// Outbound verification and document collaborators (bank, PDF rendering).
/// Calls are synchronous and never retried.
pub trait VerificationGateway: Send + Sync {
    fn generate_sanction_letter(
        &self,
        application: &LoanApplication,
    ) -> Result<SanctionLetter, VerificationError>;

    fn perform_penny_drop(
        &self,
        account_number: &str,
        ifsc_code: &str,
    ) -> Result<PennyDropOutcome, VerificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("verification provider unavailable: {0}")]
    Unavailable(String),
    #[error("verification provider rejected the request: {0}")]
    Rejected(String),
}

/// Route through which generated documents are served.
pub fn download_link(letter: &SanctionLetter) -> String {
    format!("/api/v1/documents/download/{}", letter.file_name)
}
