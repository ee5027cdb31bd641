use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tenant owning a record. Every repository call is scoped by one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(pub String);

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Explicit tenant boundary threaded through the service and repositories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantScope {
    pub tenant: TenantId,
}

impl TenantScope {
    pub fn new(tenant: impl Into<String>) -> Self {
        Self {
            tenant: TenantId(tenant.into()),
        }
    }

    pub fn owns(&self, tenant: &TenantId) -> bool {
        &self.tenant == tenant
    }
}

/// Lifecycle phase of a loan application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApplicationStatus {
    New,
    KnockoutPending,
    DocUpload,
    Underwriting,
    Hold,
    Sanctioned,
    PreDisbursement,
    Disbursed,
    Rejected,
    Closed,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 10] = [
        ApplicationStatus::New,
        ApplicationStatus::KnockoutPending,
        ApplicationStatus::DocUpload,
        ApplicationStatus::Underwriting,
        ApplicationStatus::Hold,
        ApplicationStatus::Sanctioned,
        ApplicationStatus::PreDisbursement,
        ApplicationStatus::Disbursed,
        ApplicationStatus::Rejected,
        ApplicationStatus::Closed,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::New => "NEW",
            ApplicationStatus::KnockoutPending => "KNOCKOUT_PENDING",
            ApplicationStatus::DocUpload => "DOC_UPLOAD",
            ApplicationStatus::Underwriting => "UNDERWRITING",
            ApplicationStatus::Hold => "HOLD",
            ApplicationStatus::Sanctioned => "SANCTIONED",
            ApplicationStatus::PreDisbursement => "PRE_DISBURSEMENT",
            ApplicationStatus::Disbursed => "DISBURSED",
            ApplicationStatus::Rejected => "REJECTED",
            ApplicationStatus::Closed => "CLOSED",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            ApplicationStatus::New => "New Application",
            ApplicationStatus::KnockoutPending => "Knock-out Checks",
            ApplicationStatus::DocUpload => "Document Upload",
            ApplicationStatus::Underwriting => "Underwriting In-Progress",
            ApplicationStatus::Hold => "On Hold",
            ApplicationStatus::Sanctioned => "Sanctioned",
            ApplicationStatus::PreDisbursement => "Pre-Disbursement Checks",
            ApplicationStatus::Disbursed => "Disbursed",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Closed => "Closed",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid application status")]
pub struct UnknownStatus(pub String);

impl FromStr for ApplicationStatus {
    type Err = UnknownStatus;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        ApplicationStatus::ALL
            .into_iter()
            .find(|status| status.label() == raw)
            .ok_or_else(|| UnknownStatus(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum IncomeType {
    #[default]
    Salaried,
    #[serde(rename = "Self-Employed")]
    SelfEmployed,
}

impl IncomeType {
    pub const fn label(self) -> &'static str {
        match self {
            IncomeType::Salaried => "Salaried",
            IncomeType::SelfEmployed => "Self-Employed",
        }
    }
}

/// Verification switches a client may set directly. The geo flag is
/// owned by the rule engine and lives on [`LoanApplication`] instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationFlags {
    pub is_cibil_passed: bool,
    pub is_video_kyc_verified: bool,
    pub is_penny_drop_verified: bool,
    pub is_enach_active: bool,
    pub is_agreement_signed: bool,
}

/// Client-writable part of an application: applicant profile, address,
/// financials, bank details and verification switches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationForm {
    #[serde(default)]
    pub branch: Option<String>,
    pub customer: String,

    pub first_name: String,
    pub last_name: String,
    pub mobile_no: String,
    pub email: String,
    pub dob: NaiveDate,
    pub pan_number: String,
    #[serde(default)]
    pub aadhaar_number: Option<String>,
    pub gender: Gender,

    #[serde(default)]
    pub income_type: IncomeType,
    pub res_address_line1: String,
    #[serde(default)]
    pub res_address_line2: String,
    pub res_city: String,
    pub res_state: String,
    pub res_pincode: String,
    #[serde(default)]
    pub office_address_line1: String,
    #[serde(default)]
    pub office_city: String,
    #[serde(default)]
    pub office_pincode: String,

    #[serde(default)]
    pub product: Option<u64>,
    pub requested_amount: Decimal,
    #[serde(default = "default_tenure")]
    pub requested_tenure: u32,
    #[serde(default)]
    pub monthly_income: Decimal,
    #[serde(default)]
    pub employer_name: Option<String>,
    #[serde(default)]
    pub business_name: Option<String>,
    #[serde(default)]
    pub employment_type: String,

    #[serde(default)]
    pub bank_account_number: String,
    #[serde(default)]
    pub ifsc_code: String,
    #[serde(default = "default_account_type")]
    pub account_type: String,
    #[serde(default = "default_mandate_type")]
    pub mandate_type: String,
    #[serde(default)]
    pub disbursement_consent: bool,

    #[serde(flatten)]
    pub flags: VerificationFlags,
    #[serde(default)]
    pub remarks: Option<String>,
}

fn default_tenure() -> u32 {
    12
}

fn default_account_type() -> String {
    "Savings".to_string()
}

fn default_mandate_type() -> String {
    "eNACH".to_string()
}

impl ApplicationForm {
    /// Field-level checks applied on create, replace and patch.
    pub fn validate(&self) -> Result<(), String> {
        let mut problems = Vec::new();

        for (field, value, max_len) in [
            ("customer", self.customer.as_str(), 64),
            ("first_name", self.first_name.as_str(), 100),
            ("last_name", self.last_name.as_str(), 100),
            ("mobile_no", self.mobile_no.as_str(), 15),
            ("pan_number", self.pan_number.as_str(), 10),
            ("res_address_line1", self.res_address_line1.as_str(), 255),
            ("res_city", self.res_city.as_str(), 100),
            ("res_state", self.res_state.as_str(), 100),
            ("res_pincode", self.res_pincode.as_str(), 6),
        ] {
            if value.trim().is_empty() {
                problems.push(format!("{field}: this field may not be blank"));
            } else if value.chars().count() > max_len {
                problems.push(format!("{field}: at most {max_len} characters"));
            }
        }

        if !self.email.contains('@') {
            problems.push("email: enter a valid email address".to_string());
        }
        if let Some(aadhaar) = &self.aadhaar_number {
            if aadhaar.chars().count() > 12 {
                problems.push("aadhaar_number: at most 12 characters".to_string());
            }
        }
        if self.office_pincode.chars().count() > 6 {
            problems.push("office_pincode: at most 6 characters".to_string());
        }
        if self.requested_amount.is_sign_negative() {
            problems.push("requested_amount: must not be negative".to_string());
        }
        if self.monthly_income.is_sign_negative() {
            problems.push("monthly_income: must not be negative".to_string());
        }
        if self.requested_tenure == 0 {
            problems.push("requested_tenure: must be at least one month".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems.join("; "))
        }
    }
}

/// Persisted loan application, the aggregate root of the origination flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub id: u64,
    pub application_id: Uuid,
    pub tenant: TenantId,
    #[serde(flatten)]
    pub form: ApplicationForm,
    pub is_geo_limit_passed: bool,
    pub foir_percentage: Option<Decimal>,
    pub net_cash_flow: Option<Decimal>,
    pub status: ApplicationStatus,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LoanApplication {
    pub fn new(
        id: u64,
        tenant: TenantId,
        form: ApplicationForm,
        created_by: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            application_id: Uuid::new_v4(),
            tenant,
            form,
            is_geo_limit_passed: false,
            foir_percentage: None,
            net_cash_flow: None,
            status: ApplicationStatus::New,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.form.first_name, self.form.last_name)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Document categories accepted for KYC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycType {
    Aadhaar,
    Pan,
    VoterId,
    Passport,
    SelfDeclarationVideo,
    SalarySlip,
    BankStatement,
    Itr,
}

pub const KYC_STATUS_PENDING: &str = "PENDING";
pub const KYC_STATUS_VERIFIED: &str = "VERIFIED";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KycForm {
    pub loan_application: u64,
    pub kyc_type: KycType,
    #[serde(default)]
    pub document_number: Option<String>,
    #[serde(default)]
    pub document_file: Option<String>,
    #[serde(default = "default_kyc_status")]
    pub status: String,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
}

fn default_kyc_status() -> String {
    KYC_STATUS_PENDING.to_string()
}

impl KycForm {
    pub fn validate(&self) -> Result<(), String> {
        if self.status.trim().is_empty() || self.status.chars().count() > 20 {
            return Err("status: must be 1 to 20 characters".to_string());
        }
        if let Some(number) = &self.document_number {
            if number.chars().count() > 200 {
                return Err("document_number: at most 200 characters".to_string());
            }
        }
        Ok(())
    }
}

/// Identity or income document attached to one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KycDetail {
    pub id: u64,
    #[serde(flatten)]
    pub form: KycForm,
    pub uploaded_at: DateTime<Utc>,
}

impl KycDetail {
    pub fn is_verified(&self) -> bool {
        self.form.status == KYC_STATUS_VERIFIED
    }
}

pub const ASSESSMENT_STATUS_UNDER_REVIEW: &str = "UNDER_REVIEW";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentForm {
    pub application: u64,
    #[serde(default)]
    pub cibil_score: Option<i32>,
    #[serde(default)]
    pub risk_score: Option<Decimal>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default = "default_assessment_status")]
    pub status: String,
    #[serde(default)]
    pub approved_amount: Decimal,
    #[serde(default)]
    pub approved_roi: Decimal,
}

fn default_assessment_status() -> String {
    ASSESSMENT_STATUS_UNDER_REVIEW.to_string()
}

/// Bureau and risk scoring, one per application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditAssessment {
    pub id: u64,
    #[serde(flatten)]
    pub form: AssessmentForm,
    pub assessed_at: DateTime<Utc>,
}
