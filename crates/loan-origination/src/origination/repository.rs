use super::domain::{CreditAssessment, KycDetail, LoanApplication, TenantScope};
use super::product::LoanProduct;

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record belongs to another tenant")]
    CrossTenant,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Storage for application aggregates. Every call is bounded by the
/// caller's tenant; records outside the scope behave as if absent.
pub trait ApplicationRepository: Send + Sync {
    fn insert_application(
        &self,
        scope: &TenantScope,
        record: LoanApplication,
    ) -> Result<LoanApplication, RepositoryError>;
    fn update_application(
        &self,
        scope: &TenantScope,
        record: LoanApplication,
    ) -> Result<(), RepositoryError>;
    fn fetch_application(
        &self,
        scope: &TenantScope,
        id: u64,
    ) -> Result<Option<LoanApplication>, RepositoryError>;
    fn list_applications(&self, scope: &TenantScope)
        -> Result<Vec<LoanApplication>, RepositoryError>;
    fn delete_application(&self, scope: &TenantScope, id: u64) -> Result<(), RepositoryError>;
}

pub trait KycRepository: Send + Sync {
    fn insert_kyc(&self, scope: &TenantScope, record: KycDetail)
        -> Result<KycDetail, RepositoryError>;
    fn update_kyc(&self, scope: &TenantScope, record: KycDetail) -> Result<(), RepositoryError>;
    fn fetch_kyc(&self, scope: &TenantScope, id: u64)
        -> Result<Option<KycDetail>, RepositoryError>;
    /// All documents in scope, optionally narrowed to one application.
    fn list_kyc(
        &self,
        scope: &TenantScope,
        application: Option<u64>,
    ) -> Result<Vec<KycDetail>, RepositoryError>;
    fn delete_kyc(&self, scope: &TenantScope, id: u64) -> Result<(), RepositoryError>;
}

pub trait AssessmentRepository: Send + Sync {
    /// Fails with [`RepositoryError::Conflict`] when the application already
    /// has an assessment.
    fn insert_assessment(
        &self,
        scope: &TenantScope,
        record: CreditAssessment,
    ) -> Result<CreditAssessment, RepositoryError>;
    fn update_assessment(
        &self,
        scope: &TenantScope,
        record: CreditAssessment,
    ) -> Result<(), RepositoryError>;
    fn fetch_assessment(
        &self,
        scope: &TenantScope,
        id: u64,
    ) -> Result<Option<CreditAssessment>, RepositoryError>;
    fn assessment_for(
        &self,
        scope: &TenantScope,
        application: u64,
    ) -> Result<Option<CreditAssessment>, RepositoryError>;
    fn list_assessments(&self, scope: &TenantScope)
        -> Result<Vec<CreditAssessment>, RepositoryError>;
    fn delete_assessment(&self, scope: &TenantScope, id: u64) -> Result<(), RepositoryError>;
}

/// Product reference data the rule engine reads its configuration from.
pub trait ProductCatalog: Send + Sync {
    fn insert_product(
        &self,
        scope: &TenantScope,
        record: LoanProduct,
    ) -> Result<LoanProduct, RepositoryError>;
    fn update_product(&self, scope: &TenantScope, record: LoanProduct)
        -> Result<(), RepositoryError>;
    fn fetch_product(
        &self,
        scope: &TenantScope,
        id: u64,
    ) -> Result<Option<LoanProduct>, RepositoryError>;
    fn list_products(&self, scope: &TenantScope) -> Result<Vec<LoanProduct>, RepositoryError>;
}

/// Everything the origination service persists through.
pub trait LoanStore: ApplicationRepository + KycRepository + AssessmentRepository + ProductCatalog {}

impl<T> LoanStore for T where
    T: ApplicationRepository + KycRepository + AssessmentRepository + ProductCatalog
{
}
