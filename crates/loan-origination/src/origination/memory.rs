//! Process-local [`LoanStore`](super::repository::LoanStore) used by the
//! service binary, the CLI demo and the test suites.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use super::domain::{CreditAssessment, KycDetail, LoanApplication, TenantId, TenantScope};
use super::product::LoanProduct;
use super::repository::{
    ApplicationRepository, AssessmentRepository, KycRepository, ProductCatalog, RepositoryError,
};

#[derive(Debug, Default)]
pub struct MemoryLoanStore {
    applications: Mutex<BTreeMap<u64, LoanApplication>>,
    kyc: Mutex<BTreeMap<u64, (TenantId, KycDetail)>>,
    assessments: Mutex<BTreeMap<u64, (TenantId, CreditAssessment)>>,
    products: Mutex<BTreeMap<u64, LoanProduct>>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, name: &str) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable(format!("{name} table lock poisoned")))
}

fn ensure_scope(scope: &TenantScope, tenant: &TenantId) -> Result<(), RepositoryError> {
    if scope.owns(tenant) {
        Ok(())
    } else {
        Err(RepositoryError::CrossTenant)
    }
}

impl MemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ApplicationRepository for MemoryLoanStore {
    fn insert_application(
        &self,
        scope: &TenantScope,
        record: LoanApplication,
    ) -> Result<LoanApplication, RepositoryError> {
        ensure_scope(scope, &record.tenant)?;
        let mut table = lock(&self.applications, "applications")?;
        if table.contains_key(&record.id)
            || table
                .values()
                .any(|existing| existing.application_id == record.application_id)
        {
            return Err(RepositoryError::Conflict);
        }
        table.insert(record.id, record.clone());
        Ok(record)
    }

    fn update_application(
        &self,
        scope: &TenantScope,
        record: LoanApplication,
    ) -> Result<(), RepositoryError> {
        ensure_scope(scope, &record.tenant)?;
        let mut table = lock(&self.applications, "applications")?;
        match table.get(&record.id) {
            Some(existing) if scope.owns(&existing.tenant) => {
                table.insert(record.id, record);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_application(
        &self,
        scope: &TenantScope,
        id: u64,
    ) -> Result<Option<LoanApplication>, RepositoryError> {
        let table = lock(&self.applications, "applications")?;
        Ok(table
            .get(&id)
            .filter(|record| scope.owns(&record.tenant))
            .cloned())
    }

    fn list_applications(
        &self,
        scope: &TenantScope,
    ) -> Result<Vec<LoanApplication>, RepositoryError> {
        let table = lock(&self.applications, "applications")?;
        Ok(table
            .values()
            .filter(|record| scope.owns(&record.tenant))
            .cloned()
            .collect())
    }

    fn delete_application(&self, scope: &TenantScope, id: u64) -> Result<(), RepositoryError> {
        let mut table = lock(&self.applications, "applications")?;
        match table.get(&id) {
            Some(existing) if scope.owns(&existing.tenant) => {
                table.remove(&id);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }
}

impl KycRepository for MemoryLoanStore {
    fn insert_kyc(
        &self,
        scope: &TenantScope,
        record: KycDetail,
    ) -> Result<KycDetail, RepositoryError> {
        let mut table = lock(&self.kyc, "kyc")?;
        if table.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        table.insert(record.id, (scope.tenant.clone(), record.clone()));
        Ok(record)
    }

    fn update_kyc(&self, scope: &TenantScope, record: KycDetail) -> Result<(), RepositoryError> {
        let mut table = lock(&self.kyc, "kyc")?;
        match table.get(&record.id) {
            Some((tenant, _)) if scope.owns(tenant) => {
                table.insert(record.id, (scope.tenant.clone(), record));
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_kyc(
        &self,
        scope: &TenantScope,
        id: u64,
    ) -> Result<Option<KycDetail>, RepositoryError> {
        let table = lock(&self.kyc, "kyc")?;
        Ok(table
            .get(&id)
            .filter(|(tenant, _)| scope.owns(tenant))
            .map(|(_, record)| record.clone()))
    }

    fn list_kyc(
        &self,
        scope: &TenantScope,
        application: Option<u64>,
    ) -> Result<Vec<KycDetail>, RepositoryError> {
        let table = lock(&self.kyc, "kyc")?;
        Ok(table
            .values()
            .filter(|(tenant, _)| scope.owns(tenant))
            .map(|(_, record)| record)
            .filter(|record| {
                application
                    .map(|id| record.form.loan_application == id)
                    .unwrap_or(true)
            })
            .cloned()
            .collect())
    }

    fn delete_kyc(&self, scope: &TenantScope, id: u64) -> Result<(), RepositoryError> {
        let mut table = lock(&self.kyc, "kyc")?;
        match table.get(&id) {
            Some((tenant, _)) if scope.owns(tenant) => {
                table.remove(&id);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }
}

impl AssessmentRepository for MemoryLoanStore {
    fn insert_assessment(
        &self,
        scope: &TenantScope,
        record: CreditAssessment,
    ) -> Result<CreditAssessment, RepositoryError> {
        let mut table = lock(&self.assessments, "assessments")?;
        if table.contains_key(&record.id)
            || table
                .values()
                .any(|(_, existing)| existing.form.application == record.form.application)
        {
            return Err(RepositoryError::Conflict);
        }
        table.insert(record.id, (scope.tenant.clone(), record.clone()));
        Ok(record)
    }

    fn update_assessment(
        &self,
        scope: &TenantScope,
        record: CreditAssessment,
    ) -> Result<(), RepositoryError> {
        let mut table = lock(&self.assessments, "assessments")?;
        if table.iter().any(|(id, (_, existing))| {
            *id != record.id && existing.form.application == record.form.application
        }) {
            return Err(RepositoryError::Conflict);
        }
        match table.get(&record.id) {
            Some((tenant, _)) if scope.owns(tenant) => {
                table.insert(record.id, (scope.tenant.clone(), record));
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_assessment(
        &self,
        scope: &TenantScope,
        id: u64,
    ) -> Result<Option<CreditAssessment>, RepositoryError> {
        let table = lock(&self.assessments, "assessments")?;
        Ok(table
            .get(&id)
            .filter(|(tenant, _)| scope.owns(tenant))
            .map(|(_, record)| record.clone()))
    }

    fn assessment_for(
        &self,
        scope: &TenantScope,
        application: u64,
    ) -> Result<Option<CreditAssessment>, RepositoryError> {
        let table = lock(&self.assessments, "assessments")?;
        Ok(table
            .values()
            .find(|(tenant, record)| scope.owns(tenant) && record.form.application == application)
            .map(|(_, record)| record.clone()))
    }

    fn list_assessments(
        &self,
        scope: &TenantScope,
    ) -> Result<Vec<CreditAssessment>, RepositoryError> {
        let table = lock(&self.assessments, "assessments")?;
        Ok(table
            .values()
            .filter(|(tenant, _)| scope.owns(tenant))
            .map(|(_, record)| record.clone())
            .collect())
    }

    fn delete_assessment(&self, scope: &TenantScope, id: u64) -> Result<(), RepositoryError> {
        let mut table = lock(&self.assessments, "assessments")?;
        match table.get(&id) {
            Some((tenant, _)) if scope.owns(tenant) => {
                table.remove(&id);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }
}

impl ProductCatalog for MemoryLoanStore {
    fn insert_product(
        &self,
        scope: &TenantScope,
        record: LoanProduct,
    ) -> Result<LoanProduct, RepositoryError> {
        ensure_scope(scope, &record.tenant)?;
        let mut table = lock(&self.products, "products")?;
        if table.contains_key(&record.id) {
            return Err(RepositoryError::Conflict);
        }
        table.insert(record.id, record.clone());
        Ok(record)
    }

    fn update_product(
        &self,
        scope: &TenantScope,
        record: LoanProduct,
    ) -> Result<(), RepositoryError> {
        ensure_scope(scope, &record.tenant)?;
        let mut table = lock(&self.products, "products")?;
        match table.get(&record.id) {
            Some(existing) if scope.owns(&existing.tenant) => {
                table.insert(record.id, record);
                Ok(())
            }
            _ => Err(RepositoryError::NotFound),
        }
    }

    fn fetch_product(
        &self,
        scope: &TenantScope,
        id: u64,
    ) -> Result<Option<LoanProduct>, RepositoryError> {
        let table = lock(&self.products, "products")?;
        Ok(table
            .get(&id)
            .filter(|record| scope.owns(&record.tenant))
            .cloned())
    }

    fn list_products(&self, scope: &TenantScope) -> Result<Vec<LoanProduct>, RepositoryError> {
        let table = lock(&self.products, "products")?;
        Ok(table
            .values()
            .filter(|record| scope.owns(&record.tenant))
            .cloned()
            .collect())
    }
}
