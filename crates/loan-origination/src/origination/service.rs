use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::auth::CallerContext;
use super::domain::{
    ApplicationForm, ApplicationStatus, AssessmentForm, CreditAssessment, KycDetail, KycForm,
    KycType, LoanApplication, TenantScope, KYC_STATUS_VERIFIED,
};
use super::payloads::{
    DisbursementResponse, SanctionResponse, ScoreUpdateRequest, StatusChangeRequest,
    UnderwritingResponse, VideoDecisionRequest, VideoVerificationResponse,
};
use super::product::{is_personal_loan, LoanProduct, ProductConfigError, ProductForm};
use super::query::{ApplicationQuery, KycQuery};
use super::repository::{LoanStore, RepositoryError};
use super::rules::{RuleEngine, UnderwritingAssumptions, UnderwritingError};
use super::transitions::{TransitionMode, TransitionPolicy, WorkflowAction, WorkflowViolation};
use super::verification::{VerificationError, VerificationGateway};
use super::views::{sort_assessments, sort_kyc_newest_first, ApplicationView};

/// Service orchestrating application CRUD, the rule engine, the status
/// machine and the verification gateway.
pub struct LoanOriginationService<S, V> {
    store: Arc<S>,
    gateway: Arc<V>,
    assumptions: UnderwritingAssumptions,
    transitions: TransitionPolicy,
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static KYC_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static ASSESSMENT_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static PRODUCT_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_id(sequence: &AtomicU64) -> u64 {
    sequence.fetch_add(1, Ordering::Relaxed)
}

impl<S, V> LoanOriginationService<S, V>
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    pub fn new(
        store: Arc<S>,
        gateway: Arc<V>,
        assumptions: UnderwritingAssumptions,
        mode: TransitionMode,
    ) -> Self {
        Self {
            store,
            gateway,
            assumptions,
            transitions: TransitionPolicy::new(mode),
        }
    }

    pub fn with_defaults(store: Arc<S>, gateway: Arc<V>) -> Self {
        Self::new(
            store,
            gateway,
            UnderwritingAssumptions::default(),
            TransitionMode::default(),
        )
    }

    pub fn transition_mode(&self) -> TransitionMode {
        self.transitions.mode()
    }

    pub fn assumptions(&self) -> &UnderwritingAssumptions {
        &self.assumptions
    }

    // ---- applications -------------------------------------------------

    pub fn create_application(
        &self,
        caller: &CallerContext,
        form: ApplicationForm,
    ) -> Result<ApplicationView, LoanServiceError> {
        let scope = caller.scope();
        form.validate().map_err(LoanServiceError::Validation)?;
        self.ensure_product_reference(&scope, form.product)?;

        let record = LoanApplication::new(
            next_id(&APPLICATION_SEQUENCE),
            caller.tenant.clone(),
            form,
            Some(caller.user.clone()),
            Utc::now(),
        );
        let stored = self.store.insert_application(&scope, record)?;
        info!(
            application = stored.id,
            application_id = %stored.application_id,
            tenant = %stored.tenant,
            user = %caller.user,
            "loan application created"
        );
        self.view(&scope, stored)
    }

    pub fn list_applications(
        &self,
        caller: &CallerContext,
        query: &ApplicationQuery,
    ) -> Result<Vec<ApplicationView>, LoanServiceError> {
        let scope = caller.scope();
        let applications = self.store.list_applications(&scope)?;
        let matched = query
            .apply(applications)
            .map_err(LoanServiceError::Validation)?;
        matched
            .into_iter()
            .map(|application| self.view(&scope, application))
            .collect()
    }

    pub fn get_application(
        &self,
        caller: &CallerContext,
        id: u64,
    ) -> Result<ApplicationView, LoanServiceError> {
        let scope = caller.scope();
        let application = self.load_application(&scope, id)?;
        self.view(&scope, application)
    }

    /// Full update of the writable fields. Status and derived values are
    /// left untouched.
    pub fn replace_application(
        &self,
        caller: &CallerContext,
        id: u64,
        form: ApplicationForm,
    ) -> Result<ApplicationView, LoanServiceError> {
        let scope = caller.scope();
        let mut application = self.load_application(&scope, id)?;
        form.validate().map_err(LoanServiceError::Validation)?;
        self.ensure_product_reference(&scope, form.product)?;

        application.form = form;
        application.touch();
        self.store.update_application(&scope, application.clone())?;
        self.view(&scope, application)
    }

    pub fn patch_application(
        &self,
        caller: &CallerContext,
        id: u64,
        patch: Map<String, Value>,
    ) -> Result<ApplicationView, LoanServiceError> {
        let scope = caller.scope();
        let mut application = self.load_application(&scope, id)?;
        let form: ApplicationForm = merge_patch(&application.form, patch)?;
        form.validate().map_err(LoanServiceError::Validation)?;
        if form.product != application.form.product {
            self.ensure_product_reference(&scope, form.product)?;
        }

        application.form = form;
        application.touch();
        self.store.update_application(&scope, application.clone())?;
        self.view(&scope, application)
    }

    /// Removes the application together with its KYC documents and
    /// credit assessment.
    pub fn delete_application(
        &self,
        caller: &CallerContext,
        id: u64,
    ) -> Result<(), LoanServiceError> {
        let scope = caller.scope();
        let application = self.load_application(&scope, id)?;

        for detail in self.store.list_kyc(&scope, Some(application.id))? {
            self.store.delete_kyc(&scope, detail.id)?;
        }
        if let Some(assessment) = self.store.assessment_for(&scope, application.id)? {
            self.store.delete_assessment(&scope, assessment.id)?;
        }
        self.store.delete_application(&scope, application.id)?;

        info!(application = application.id, tenant = %scope.tenant, "loan application deleted");
        Ok(())
    }

    // ---- workflow actions ---------------------------------------------

    pub fn verify_video(
        &self,
        caller: &CallerContext,
        id: u64,
        request: VideoDecisionRequest,
    ) -> Result<VideoVerificationResponse, LoanServiceError> {
        let scope = caller.scope();
        let mut application = self.load_application(&scope, id)?;
        self.ensure_action_allowed(&application, WorkflowAction::VerifyVideo)?;

        if request.approves() {
            application.form.flags.is_video_kyc_verified = true;

            let mut documents = self.store.list_kyc(&scope, Some(application.id))?;
            sort_kyc_newest_first(&mut documents);
            if let Some(mut video) = documents
                .into_iter()
                .find(|detail| detail.form.kyc_type == KycType::SelfDeclarationVideo)
            {
                video.form.status = KYC_STATUS_VERIFIED.to_string();
                video.form.verified_at = Some(Utc::now());
                self.store.update_kyc(&scope, video)?;
            }

            application.touch();
            self.store.update_application(&scope, application)?;
            info!(application = id, "video KYC approved");
            Ok(VideoVerificationResponse::verified())
        } else {
            let remarks = request.remarks.unwrap_or_default();
            application.form.flags.is_video_kyc_verified = false;
            application.form.remarks = Some(format!("Video Rejection: {remarks}"));
            application.status = ApplicationStatus::Hold;
            application.touch();
            self.store.update_application(&scope, application)?;
            warn!(application = id, "video KYC rejected, application on hold");
            Ok(VideoVerificationResponse::rejected())
        }
    }

    /// Knockout first; metrics only for applications that pass. The
    /// application is persisted on both paths.
    pub fn run_underwriting(
        &self,
        caller: &CallerContext,
        id: u64,
    ) -> Result<UnderwritingResponse, LoanServiceError> {
        let scope = caller.scope();
        let mut application = self.load_application(&scope, id)?;
        self.ensure_action_allowed(&application, WorkflowAction::RunUnderwriting)?;
        let product = self.product_for(&scope, &application)?;

        let knockout = RuleEngine::new(&mut application, product.as_ref(), &self.assumptions)
            .execute_knockout_checks();

        if !knockout.is_eligible {
            application.status = ApplicationStatus::Rejected;
            application.form.remarks = knockout.rejection_reason.clone();
            self.store.update_application(&scope, application)?;
            warn!(
                application = id,
                reason = knockout.rejection_reason.as_deref().unwrap_or_default(),
                "application knocked out"
            );
            return Ok(UnderwritingResponse::KnockedOut(knockout));
        }

        let metrics = RuleEngine::new(&mut application, product.as_ref(), &self.assumptions)
            .calculate_underwriting_metrics()?;
        application.status = ApplicationStatus::Underwriting;
        self.store.update_application(&scope, application)?;
        info!(
            application = id,
            net_cash_flow = %metrics.net_cash_flow,
            foir = %metrics.foir,
            "underwriting complete"
        );

        Ok(UnderwritingResponse::Completed {
            status: "Underwriting Complete".to_string(),
            knockout,
            metrics,
        })
    }

    pub fn generate_sanction(
        &self,
        caller: &CallerContext,
        id: u64,
    ) -> Result<SanctionResponse, LoanServiceError> {
        let scope = caller.scope();
        let mut application = self.load_application(&scope, id)?;
        self.ensure_action_allowed(&application, WorkflowAction::GenerateSanction)?;

        if !matches!(
            application.status,
            ApplicationStatus::Underwriting | ApplicationStatus::Sanctioned
        ) {
            warn!(application = id, status = %application.status, "sanction requested too early");
            return Err(WorkflowViolation::NotReadyForSanction {
                status: application.status,
            }
            .into());
        }

        let letter = self.gateway.generate_sanction_letter(&application)?;
        application.status = ApplicationStatus::Sanctioned;
        application.touch();
        self.store.update_application(&scope, application)?;
        info!(application = id, file = %letter.file_name, "sanction letter generated");

        Ok(SanctionResponse::from(&letter))
    }

    pub fn disburse_loan(
        &self,
        caller: &CallerContext,
        id: u64,
    ) -> Result<DisbursementResponse, LoanServiceError> {
        let scope = caller.scope();
        let mut application = self.load_application(&scope, id)?;
        self.ensure_action_allowed(&application, WorkflowAction::DisburseLoan)?;

        let outcome = self.gateway.perform_penny_drop(
            &application.form.bank_account_number,
            &application.form.ifsc_code,
        )?;
        if !outcome.verified {
            warn!(application = id, message = %outcome.message, "penny drop failed");
            return Err(WorkflowViolation::BankVerificationFailed(outcome).into());
        }
        application.form.flags.is_penny_drop_verified = true;

        let product = self.product_for(&scope, &application)?;
        if is_personal_loan(product.as_ref()) && !application.form.flags.is_video_kyc_verified {
            warn!(application = id, "disbursement blocked, video KYC pending");
            return Err(WorkflowViolation::VideoKycPending.into());
        }

        application.status = ApplicationStatus::Disbursed;
        application.touch();
        self.store.update_application(&scope, application)?;
        info!(application = id, "loan disbursed");

        Ok(DisbursementResponse::success())
    }

    pub fn change_status(
        &self,
        caller: &CallerContext,
        id: u64,
        request: StatusChangeRequest,
    ) -> Result<ApplicationView, LoanServiceError> {
        let scope = caller.scope();
        let mut application = self.load_application(&scope, id)?;

        let raw = request
            .status
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .ok_or_else(|| LoanServiceError::Validation("status is required".to_string()))?;
        let target = ApplicationStatus::from_str(raw)
            .map_err(|err| LoanServiceError::Validation(err.to_string()))?;

        let product = self.product_for(&scope, &application)?;
        if let Err(violation) = self.transitions.check(&application, product.as_ref(), target) {
            warn!(
                application = id,
                from = %application.status,
                to = %target,
                mode = %self.transitions.mode(),
                %violation,
                "status change rejected"
            );
            return Err(violation.into());
        }

        let from = application.status;
        application.status = target;
        if let Some(remarks) = request.remarks.filter(|remarks| !remarks.is_empty()) {
            application.form.remarks = Some(remarks);
        }
        application.touch();
        self.store.update_application(&scope, application.clone())?;
        info!(application = id, %from, to = %target, user = %caller.user, "status changed");

        self.view(&scope, application)
    }

    // ---- KYC documents ------------------------------------------------

    pub fn create_kyc(
        &self,
        caller: &CallerContext,
        form: KycForm,
    ) -> Result<KycDetail, LoanServiceError> {
        let scope = caller.scope();
        form.validate().map_err(LoanServiceError::Validation)?;
        self.ensure_application_reference(&scope, "loan_application", form.loan_application)?;

        let record = KycDetail {
            id: next_id(&KYC_SEQUENCE),
            form,
            uploaded_at: Utc::now(),
        };
        let stored = self.store.insert_kyc(&scope, record)?;
        info!(
            kyc = stored.id,
            application = stored.form.loan_application,
            kind = ?stored.form.kyc_type,
            "KYC document uploaded"
        );
        Ok(stored)
    }

    pub fn list_kyc(
        &self,
        caller: &CallerContext,
        query: &KycQuery,
    ) -> Result<Vec<KycDetail>, LoanServiceError> {
        let scope = caller.scope();
        let mut details: Vec<KycDetail> = self
            .store
            .list_kyc(&scope, query.loan_application)?
            .into_iter()
            .filter(|detail| query.matches(detail))
            .collect();
        sort_kyc_newest_first(&mut details);
        Ok(details)
    }

    pub fn get_kyc(&self, caller: &CallerContext, id: u64) -> Result<KycDetail, LoanServiceError> {
        self.load_kyc(&caller.scope(), id)
    }

    pub fn replace_kyc(
        &self,
        caller: &CallerContext,
        id: u64,
        form: KycForm,
    ) -> Result<KycDetail, LoanServiceError> {
        let scope = caller.scope();
        let mut detail = self.load_kyc(&scope, id)?;
        self.save_kyc_form(&scope, &mut detail, form)?;
        Ok(detail)
    }

    pub fn patch_kyc(
        &self,
        caller: &CallerContext,
        id: u64,
        patch: Map<String, Value>,
    ) -> Result<KycDetail, LoanServiceError> {
        let scope = caller.scope();
        let mut detail = self.load_kyc(&scope, id)?;
        let form = merge_patch(&detail.form, patch)?;
        self.save_kyc_form(&scope, &mut detail, form)?;
        Ok(detail)
    }

    pub fn delete_kyc(&self, caller: &CallerContext, id: u64) -> Result<(), LoanServiceError> {
        let scope = caller.scope();
        let detail = self.load_kyc(&scope, id)?;
        self.store.delete_kyc(&scope, detail.id)?;
        Ok(())
    }

    fn save_kyc_form(
        &self,
        scope: &TenantScope,
        detail: &mut KycDetail,
        form: KycForm,
    ) -> Result<(), LoanServiceError> {
        form.validate().map_err(LoanServiceError::Validation)?;
        if form.loan_application != detail.form.loan_application {
            self.ensure_application_reference(scope, "loan_application", form.loan_application)?;
        }
        detail.form = form;
        self.store.update_kyc(scope, detail.clone())?;
        Ok(())
    }

    // ---- credit assessments -------------------------------------------

    pub fn create_assessment(
        &self,
        caller: &CallerContext,
        form: AssessmentForm,
    ) -> Result<CreditAssessment, LoanServiceError> {
        let scope = caller.scope();
        self.ensure_application_reference(&scope, "application", form.application)?;
        if self.store.assessment_for(&scope, form.application)?.is_some() {
            return Err(duplicate_assessment());
        }

        let record = CreditAssessment {
            id: next_id(&ASSESSMENT_SEQUENCE),
            form,
            assessed_at: Utc::now(),
        };
        let stored = self.store.insert_assessment(&scope, record)?;
        info!(
            assessment = stored.id,
            application = stored.form.application,
            "credit assessment opened"
        );
        Ok(stored)
    }

    pub fn list_assessments(
        &self,
        caller: &CallerContext,
    ) -> Result<Vec<CreditAssessment>, LoanServiceError> {
        let mut assessments = self.store.list_assessments(&caller.scope())?;
        sort_assessments(&mut assessments);
        Ok(assessments)
    }

    pub fn get_assessment(
        &self,
        caller: &CallerContext,
        id: u64,
    ) -> Result<CreditAssessment, LoanServiceError> {
        self.load_assessment(&caller.scope(), id)
    }

    pub fn replace_assessment(
        &self,
        caller: &CallerContext,
        id: u64,
        form: AssessmentForm,
    ) -> Result<CreditAssessment, LoanServiceError> {
        let scope = caller.scope();
        let mut assessment = self.load_assessment(&scope, id)?;
        self.save_assessment_form(&scope, &mut assessment, form)?;
        Ok(assessment)
    }

    pub fn patch_assessment(
        &self,
        caller: &CallerContext,
        id: u64,
        patch: Map<String, Value>,
    ) -> Result<CreditAssessment, LoanServiceError> {
        let scope = caller.scope();
        let mut assessment = self.load_assessment(&scope, id)?;
        let form = merge_patch(&assessment.form, patch)?;
        self.save_assessment_form(&scope, &mut assessment, form)?;
        Ok(assessment)
    }

    pub fn delete_assessment(
        &self,
        caller: &CallerContext,
        id: u64,
    ) -> Result<(), LoanServiceError> {
        let scope = caller.scope();
        let assessment = self.load_assessment(&scope, id)?;
        self.store.delete_assessment(&scope, assessment.id)?;
        Ok(())
    }

    /// Score entry. Only truthy values overwrite what is stored.
    pub fn update_score(
        &self,
        caller: &CallerContext,
        id: u64,
        request: ScoreUpdateRequest,
    ) -> Result<CreditAssessment, LoanServiceError> {
        let scope = caller.scope();
        let mut assessment = self.load_assessment(&scope, id)?;

        let cibil = request
            .cibil_score
            .filter(is_truthy)
            .or_else(|| request.score.filter(is_truthy));
        if let Some(value) = cibil {
            assessment.form.cibil_score = Some(integer_field("cibil_score", &value)?);
        }
        if let Some(value) = request.risk_score.filter(is_truthy) {
            assessment.form.risk_score = Some(decimal_field("risk_score", &value)?);
        }
        if let Some(value) = request.approved_amount.filter(is_truthy) {
            assessment.form.approved_amount = decimal_field("approved_amount", &value)?;
        }
        if let Some(value) = request.remarks.filter(is_truthy) {
            assessment.form.remarks = Some(match value {
                Value::String(text) => text,
                other => other.to_string(),
            });
        }

        assessment.assessed_at = Utc::now();
        self.store.update_assessment(&scope, assessment.clone())?;
        info!(
            assessment = id,
            application = assessment.form.application,
            cibil_score = ?assessment.form.cibil_score,
            "credit score updated"
        );
        Ok(assessment)
    }

    fn save_assessment_form(
        &self,
        scope: &TenantScope,
        assessment: &mut CreditAssessment,
        form: AssessmentForm,
    ) -> Result<(), LoanServiceError> {
        if form.application != assessment.form.application {
            self.ensure_application_reference(scope, "application", form.application)?;
            if self.store.assessment_for(scope, form.application)?.is_some() {
                return Err(duplicate_assessment());
            }
        }
        assessment.form = form;
        assessment.assessed_at = Utc::now();
        self.store.update_assessment(scope, assessment.clone())?;
        Ok(())
    }

    // ---- products -----------------------------------------------------

    pub fn create_product(
        &self,
        caller: &CallerContext,
        form: ProductForm,
    ) -> Result<LoanProduct, LoanServiceError> {
        let scope = caller.scope();
        form.validate()?;
        let record = LoanProduct {
            id: next_id(&PRODUCT_SEQUENCE),
            tenant: caller.tenant.clone(),
            form,
        };
        let stored = self.store.insert_product(&scope, record)?;
        info!(product = stored.id, name = %stored, tenant = %stored.tenant, "loan product saved");
        Ok(stored)
    }

    pub fn list_products(&self, caller: &CallerContext) -> Result<Vec<LoanProduct>, LoanServiceError> {
        Ok(self.store.list_products(&caller.scope())?)
    }

    pub fn get_product(&self, caller: &CallerContext, id: u64) -> Result<LoanProduct, LoanServiceError> {
        self.store
            .fetch_product(&caller.scope(), id)?
            .ok_or(LoanServiceError::NotFound {
                entity: "product",
                id,
            })
    }

    pub fn replace_product(
        &self,
        caller: &CallerContext,
        id: u64,
        form: ProductForm,
    ) -> Result<LoanProduct, LoanServiceError> {
        let scope = caller.scope();
        let mut product = self.get_product(caller, id)?;
        form.validate()?;
        product.form = form;
        self.store.update_product(&scope, product.clone())?;
        Ok(product)
    }

    // ---- helpers ------------------------------------------------------

    fn ensure_action_allowed(
        &self,
        application: &LoanApplication,
        action: WorkflowAction,
    ) -> Result<(), LoanServiceError> {
        self.transitions
            .check_action(action, application.status)
            .map_err(|violation| {
                warn!(
                    application = application.id,
                    status = %application.status,
                    %action,
                    "workflow action refused"
                );
                violation.into()
            })
    }

    fn load_application(
        &self,
        scope: &TenantScope,
        id: u64,
    ) -> Result<LoanApplication, LoanServiceError> {
        self.store
            .fetch_application(scope, id)?
            .ok_or(LoanServiceError::NotFound {
                entity: "application",
                id,
            })
    }

    fn load_kyc(&self, scope: &TenantScope, id: u64) -> Result<KycDetail, LoanServiceError> {
        self.store
            .fetch_kyc(scope, id)?
            .ok_or(LoanServiceError::NotFound { entity: "kyc", id })
    }

    fn load_assessment(
        &self,
        scope: &TenantScope,
        id: u64,
    ) -> Result<CreditAssessment, LoanServiceError> {
        self.store
            .fetch_assessment(scope, id)?
            .ok_or(LoanServiceError::NotFound {
                entity: "assessment",
                id,
            })
    }

    fn product_for(
        &self,
        scope: &TenantScope,
        application: &LoanApplication,
    ) -> Result<Option<LoanProduct>, LoanServiceError> {
        match application.form.product {
            Some(product) => Ok(self.store.fetch_product(scope, product)?),
            None => Ok(None),
        }
    }

    fn ensure_product_reference(
        &self,
        scope: &TenantScope,
        product: Option<u64>,
    ) -> Result<(), LoanServiceError> {
        match product {
            Some(id) if self.store.fetch_product(scope, id)?.is_none() => {
                Err(invalid_reference("product", id))
            }
            _ => Ok(()),
        }
    }

    fn ensure_application_reference(
        &self,
        scope: &TenantScope,
        field: &str,
        application: u64,
    ) -> Result<(), LoanServiceError> {
        if self.store.fetch_application(scope, application)?.is_none() {
            return Err(invalid_reference(field, application));
        }
        Ok(())
    }

    fn view(
        &self,
        scope: &TenantScope,
        application: LoanApplication,
    ) -> Result<ApplicationView, LoanServiceError> {
        let product_name = self
            .product_for(scope, &application)?
            .map(|product| product.form.name);
        let mut kyc_details = self.store.list_kyc(scope, Some(application.id))?;
        sort_kyc_newest_first(&mut kyc_details);
        let credit_assessment = self.store.assessment_for(scope, application.id)?;

        Ok(ApplicationView {
            application,
            product_name,
            kyc_details,
            credit_assessment,
        })
    }
}

fn invalid_reference(field: &str, id: u64) -> LoanServiceError {
    LoanServiceError::Validation(format!(
        "{field}: invalid pk \"{id}\" - object does not exist."
    ))
}

fn duplicate_assessment() -> LoanServiceError {
    LoanServiceError::Validation(
        "application: credit assessment with this application already exists.".to_string(),
    )
}

/// Overlays `patch` on the serialized form. Keys the form does not own
/// (read-only or unknown) are dropped before deserializing.
fn merge_patch<T>(current: &T, patch: Map<String, Value>) -> Result<T, LoanServiceError>
where
    T: Serialize + DeserializeOwned,
{
    let mut value =
        serde_json::to_value(current).map_err(|err| LoanServiceError::Validation(err.to_string()))?;
    if let Value::Object(fields) = &mut value {
        for (key, incoming) in patch {
            if fields.contains_key(&key) {
                fields.insert(key, incoming);
            }
        }
    }
    serde_json::from_value(value).map_err(|err| LoanServiceError::Validation(err.to_string()))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map(|n| n != 0.0).unwrap_or(true),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

fn integer_field(field: &str, value: &Value) -> Result<i32, LoanServiceError> {
    let parsed = match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float.trunc() as i64))
            .and_then(|whole| i32::try_from(whole).ok()),
        Value::String(text) => text.trim().parse::<i32>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| LoanServiceError::Validation(format!("{field}: a valid integer is required.")))
}

fn decimal_field(field: &str, value: &Value) -> Result<Decimal, LoanServiceError> {
    let parsed = match value {
        Value::Number(number) => Decimal::from_str(&number.to_string()).ok(),
        Value::String(text) => Decimal::from_str(text.trim()).ok(),
        _ => None,
    };
    parsed
        .map(|decimal| decimal.round_dp(2))
        .ok_or_else(|| LoanServiceError::Validation(format!("{field}: a valid number is required.")))
}

/// Error raised by the origination service.
#[derive(Debug, thiserror::Error)]
pub enum LoanServiceError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Workflow(#[from] WorkflowViolation),
    #[error(transparent)]
    Product(#[from] ProductConfigError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Verification(#[from] VerificationError),
    #[error(transparent)]
    Underwriting(#[from] UnderwritingError),
}
