use serde::{Deserialize, Serialize};

use super::domain::{CreditAssessment, KycDetail, LoanApplication};

/// Application as returned to clients, with its owned records embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: LoanApplication,
    pub product_name: Option<String>,
    pub kyc_details: Vec<KycDetail>,
    pub credit_assessment: Option<CreditAssessment>,
}

/// Newest upload first, matching the document listing order.
pub(crate) fn sort_kyc_newest_first(details: &mut [KycDetail]) {
    details.sort_by(|left, right| {
        right
            .uploaded_at
            .cmp(&left.uploaded_at)
            .then(right.id.cmp(&left.id))
    });
}

/// Most recently assessed first.
pub(crate) fn sort_assessments(assessments: &mut [CreditAssessment]) {
    assessments.sort_by(|left, right| {
        right
            .assessed_at
            .cmp(&left.assessed_at)
            .then(right.id.cmp(&left.id))
    });
}
