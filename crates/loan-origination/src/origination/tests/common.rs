use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::Request;
use axum::response::Response;
use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::{json, Value};

use crate::origination::auth::{Authenticator, CallerContext};
use crate::origination::domain::{
    ApplicationForm, CreditAssessment, Gender, IncomeType, KycDetail, LoanApplication, TenantId,
    TenantScope, VerificationFlags,
};
use crate::origination::memory::MemoryLoanStore;
use crate::origination::product::{LoanProduct, ProductConfiguration, ProductForm, PERSONAL_LOAN};
use crate::origination::repository::{
    ApplicationRepository, AssessmentRepository, KycRepository, ProductCatalog, RepositoryError,
};
use crate::origination::router::origination_router;
use crate::origination::rules::UnderwritingAssumptions;
use crate::origination::service::LoanOriginationService;
use crate::origination::transitions::TransitionMode;
use crate::origination::verification::{
    PennyDropOutcome, SanctionLetter, VerificationError, VerificationGateway,
};

pub(crate) const TOKEN: &str = "priya-token";
pub(crate) const OTHER_TOKEN: &str = "omar-token";

pub(crate) fn caller() -> CallerContext {
    CallerContext::new("priya", "acme-finance")
}

pub(crate) fn other_tenant() -> CallerContext {
    CallerContext::new("omar", "northwind-credit")
}

/// Birth date that yields `age` under the 365-day rule for records created today.
pub(crate) fn dob_for_age(age: i64) -> NaiveDate {
    Utc::now().date_naive() - Duration::days(age * 365 + 10)
}

pub(crate) fn application_form() -> ApplicationForm {
    ApplicationForm {
        branch: Some("PUNE-01".to_string()),
        customer: "CUST-1001".to_string(),
        first_name: "Asha".to_string(),
        last_name: "Kulkarni".to_string(),
        mobile_no: "9876543210".to_string(),
        email: "asha.kulkarni@example.com".to_string(),
        dob: dob_for_age(30),
        pan_number: "ABCPK1234F".to_string(),
        aadhaar_number: Some("123412341234".to_string()),
        gender: Gender::Female,
        income_type: IncomeType::Salaried,
        res_address_line1: "14 Baner Road".to_string(),
        res_address_line2: String::new(),
        res_city: "Pune".to_string(),
        res_state: "Maharashtra".to_string(),
        res_pincode: "411045".to_string(),
        office_address_line1: String::new(),
        office_city: String::new(),
        office_pincode: String::new(),
        product: None,
        requested_amount: Decimal::new(25_000_000, 2),
        requested_tenure: 24,
        monthly_income: Decimal::new(5_000_000, 2),
        employer_name: Some("Deccan Tooling".to_string()),
        business_name: None,
        employment_type: "Permanent".to_string(),
        bank_account_number: "50100234567890".to_string(),
        ifsc_code: "HDFC0001234".to_string(),
        account_type: "Savings".to_string(),
        mandate_type: "eNACH".to_string(),
        disbursement_consent: true,
        flags: VerificationFlags::default(),
        remarks: None,
    }
}

pub(crate) fn application_form_aged(age: i64) -> ApplicationForm {
    let mut form = application_form();
    form.dob = dob_for_age(age);
    form
}

pub(crate) fn stored_application(id: u64, tenant: &str, form: ApplicationForm) -> LoanApplication {
    LoanApplication::new(
        id,
        TenantId(tenant.to_string()),
        form,
        Some("priya".to_string()),
        Utc::now(),
    )
}

pub(crate) fn application_payload() -> Value {
    json!({
        "customer": "CUST-2002",
        "first_name": "Vikram",
        "last_name": "Rao",
        "mobile_no": "9123456780",
        "email": "vikram.rao@example.com",
        "dob": dob_for_age(30).to_string(),
        "pan_number": "ABCPR4321K",
        "gender": "M",
        "res_address_line1": "7 MG Road",
        "res_city": "Bengaluru",
        "res_state": "Karnataka",
        "res_pincode": "560001",
        "requested_amount": "250000.00",
        "monthly_income": "50000.00",
        "bank_account_number": "50100234567890",
        "ifsc_code": "HDFC0001234"
    })
}

pub(crate) fn product_form(name: &str) -> ProductForm {
    ProductForm {
        name: name.to_string(),
        configuration: ProductConfiguration::default(),
    }
}

pub(crate) fn personal_loan_form() -> ProductForm {
    product_form(PERSONAL_LOAN)
}

/// Gateway double with a switchable penny-drop verdict.
#[derive(Debug)]
pub(crate) struct StubGateway {
    pub(crate) penny_drop_passes: bool,
    pub(crate) penny_drop_calls: Mutex<Vec<(String, String)>>,
}

impl StubGateway {
    pub(crate) fn passing() -> Self {
        Self {
            penny_drop_passes: true,
            penny_drop_calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            penny_drop_passes: false,
            penny_drop_calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<(String, String)> {
        self.penny_drop_calls
            .lock()
            .expect("gateway mutex poisoned")
            .clone()
    }
}

impl VerificationGateway for StubGateway {
    fn generate_sanction_letter(
        &self,
        application: &LoanApplication,
    ) -> Result<SanctionLetter, VerificationError> {
        Ok(SanctionLetter {
            file_name: format!("sanction_{}.pdf", application.application_id),
        })
    }

    fn perform_penny_drop(
        &self,
        account_number: &str,
        ifsc_code: &str,
    ) -> Result<PennyDropOutcome, VerificationError> {
        self.penny_drop_calls
            .lock()
            .expect("gateway mutex poisoned")
            .push((account_number.to_string(), ifsc_code.to_string()));

        Ok(if self.penny_drop_passes {
            PennyDropOutcome {
                verified: true,
                account_holder: Some("ASHA KULKARNI".to_string()),
                message: "Account verified".to_string(),
            }
        } else {
            PennyDropOutcome {
                verified: false,
                account_holder: None,
                message: "Account does not exist".to_string(),
            }
        })
    }
}

pub(crate) type TestService = LoanOriginationService<MemoryLoanStore, StubGateway>;

pub(crate) fn build_service() -> (TestService, Arc<MemoryLoanStore>, Arc<StubGateway>) {
    build_service_with(TransitionMode::Strict, StubGateway::passing())
}

pub(crate) fn build_service_with(
    mode: TransitionMode,
    gateway: StubGateway,
) -> (TestService, Arc<MemoryLoanStore>, Arc<StubGateway>) {
    let store = Arc::new(MemoryLoanStore::new());
    let gateway = Arc::new(gateway);
    let service = LoanOriginationService::new(
        store.clone(),
        gateway.clone(),
        UnderwritingAssumptions::default(),
        mode,
    );
    (service, store, gateway)
}

pub(crate) fn authenticator() -> Authenticator {
    Authenticator::new([
        (TOKEN.to_string(), caller()),
        (OTHER_TOKEN.to_string(), other_tenant()),
    ])
}

pub(crate) fn router_for<S, V>(service: LoanOriginationService<S, V>) -> axum::Router
where
    S: crate::origination::repository::LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    origination_router(Arc::new(service), Arc::new(authenticator()))
}

pub(crate) fn json_request(method: &str, uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("serialize body")))
        .expect("request")
}

pub(crate) fn empty_request(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

pub(crate) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store whose every call fails as if the backing database were down.
pub(crate) struct UnavailableStore;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl ApplicationRepository for UnavailableStore {
    fn insert_application(
        &self,
        _scope: &TenantScope,
        _record: LoanApplication,
    ) -> Result<LoanApplication, RepositoryError> {
        offline()
    }

    fn update_application(
        &self,
        _scope: &TenantScope,
        _record: LoanApplication,
    ) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_application(
        &self,
        _scope: &TenantScope,
        _id: u64,
    ) -> Result<Option<LoanApplication>, RepositoryError> {
        offline()
    }

    fn list_applications(
        &self,
        _scope: &TenantScope,
    ) -> Result<Vec<LoanApplication>, RepositoryError> {
        offline()
    }

    fn delete_application(&self, _scope: &TenantScope, _id: u64) -> Result<(), RepositoryError> {
        offline()
    }
}

impl KycRepository for UnavailableStore {
    fn insert_kyc(
        &self,
        _scope: &TenantScope,
        _record: KycDetail,
    ) -> Result<KycDetail, RepositoryError> {
        offline()
    }

    fn update_kyc(&self, _scope: &TenantScope, _record: KycDetail) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_kyc(
        &self,
        _scope: &TenantScope,
        _id: u64,
    ) -> Result<Option<KycDetail>, RepositoryError> {
        offline()
    }

    fn list_kyc(
        &self,
        _scope: &TenantScope,
        _application: Option<u64>,
    ) -> Result<Vec<KycDetail>, RepositoryError> {
        offline()
    }

    fn delete_kyc(&self, _scope: &TenantScope, _id: u64) -> Result<(), RepositoryError> {
        offline()
    }
}

impl AssessmentRepository for UnavailableStore {
    fn insert_assessment(
        &self,
        _scope: &TenantScope,
        _record: CreditAssessment,
    ) -> Result<CreditAssessment, RepositoryError> {
        offline()
    }

    fn update_assessment(
        &self,
        _scope: &TenantScope,
        _record: CreditAssessment,
    ) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_assessment(
        &self,
        _scope: &TenantScope,
        _id: u64,
    ) -> Result<Option<CreditAssessment>, RepositoryError> {
        offline()
    }

    fn assessment_for(
        &self,
        _scope: &TenantScope,
        _application: u64,
    ) -> Result<Option<CreditAssessment>, RepositoryError> {
        offline()
    }

    fn list_assessments(
        &self,
        _scope: &TenantScope,
    ) -> Result<Vec<CreditAssessment>, RepositoryError> {
        offline()
    }

    fn delete_assessment(&self, _scope: &TenantScope, _id: u64) -> Result<(), RepositoryError> {
        offline()
    }
}

impl ProductCatalog for UnavailableStore {
    fn insert_product(
        &self,
        _scope: &TenantScope,
        _record: LoanProduct,
    ) -> Result<LoanProduct, RepositoryError> {
        offline()
    }

    fn update_product(
        &self,
        _scope: &TenantScope,
        _record: LoanProduct,
    ) -> Result<(), RepositoryError> {
        offline()
    }

    fn fetch_product(
        &self,
        _scope: &TenantScope,
        _id: u64,
    ) -> Result<Option<LoanProduct>, RepositoryError> {
        offline()
    }

    fn list_products(&self, _scope: &TenantScope) -> Result<Vec<LoanProduct>, RepositoryError> {
        offline()
    }
}
