//! Loan origination: application intake, knockout and underwriting rules,
//! the status machine, KYC documents and credit assessments.

pub mod auth;
pub mod domain;
pub mod memory;
pub mod payloads;
pub mod product;
pub mod query;
pub mod repository;
pub mod router;
pub mod rules;
pub mod service;
pub mod transitions;
pub mod verification;
pub mod views;

#[cfg(test)]
mod tests;

pub use auth::{AuthError, Authenticator, CallerContext};
pub use domain::{
    ApplicationForm, ApplicationStatus, AssessmentForm, CreditAssessment, Gender, IncomeType,
    KycDetail, KycForm, KycType, LoanApplication, TenantId, TenantScope, UnknownStatus,
    VerificationFlags, ASSESSMENT_STATUS_UNDER_REVIEW, KYC_STATUS_PENDING, KYC_STATUS_VERIFIED,
};
pub use memory::MemoryLoanStore;
pub use payloads::{
    DisbursementResponse, SanctionResponse, ScoreUpdateRequest, StatusChangeRequest,
    UnderwritingResponse, VideoDecisionRequest, VideoVerificationResponse,
    PLACEHOLDER_TRANSACTION_ID,
};
pub use product::{
    is_personal_loan, EligibilityConstraints, InterestConfig, LoanProduct, ProductConfigError,
    ProductConfiguration, ProductForm, PERSONAL_LOAN,
};
pub use query::{ApplicationQuery, KycQuery};
pub use repository::{
    ApplicationRepository, AssessmentRepository, KycRepository, LoanStore, ProductCatalog,
    RepositoryError,
};
pub use router::{origination_router, OriginationState};
pub use rules::{
    applicant_age, KnockoutResult, RuleEngine, SystemDecision, UnderwritingAssumptions,
    UnderwritingError, UnderwritingMetrics,
};
pub use service::{LoanOriginationService, LoanServiceError};
pub use transitions::{
    EdgeGuard, TransitionMode, TransitionPolicy, WorkflowAction, WorkflowViolation,
};
pub use verification::{
    download_link, PennyDropOutcome, SanctionLetter, VerificationError, VerificationGateway,
};
pub use views::ApplicationView;
