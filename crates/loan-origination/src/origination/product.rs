use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::domain::TenantId;

pub const DEFAULT_MIN_AGE: i64 = 21;
pub const DEFAULT_MAX_AGE: i64 = 60;

/// Display name that switches on the video-KYC disbursement guard.
pub const PERSONAL_LOAN: &str = "Personal Loan";

/// Eligibility bounds consumed by the knockout checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityConstraints {
    #[serde(default = "default_min_age")]
    pub min_age: i64,
    #[serde(default = "default_max_age")]
    pub max_age: i64,
}

fn default_min_age() -> i64 {
    DEFAULT_MIN_AGE
}

fn default_max_age() -> i64 {
    DEFAULT_MAX_AGE
}

impl Default for EligibilityConstraints {
    fn default() -> Self {
        Self {
            min_age: DEFAULT_MIN_AGE,
            max_age: DEFAULT_MAX_AGE,
        }
    }
}

/// Pricing parameters. Carried with the product but not read by any rule yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestConfig {
    #[serde(default)]
    pub base_rate: Option<Decimal>,
    #[serde(default)]
    pub rate_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductConfiguration {
    #[serde(default)]
    pub constraints: EligibilityConstraints,
    #[serde(default)]
    pub interest_config: InterestConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductConfigError {
    #[error("product name may not be blank")]
    BlankName,
    #[error("min_age must not be negative (found {0})")]
    NegativeAge(i64),
    #[error("min_age {min_age} exceeds max_age {max_age}")]
    InvertedAgeBand { min_age: i64, max_age: i64 },
    #[error("interest base_rate must be between 0 and 100 (found {0})")]
    BaseRateOutOfRange(Decimal),
}

impl ProductConfiguration {
    pub fn validate(&self) -> Result<(), ProductConfigError> {
        let EligibilityConstraints { min_age, max_age } = self.constraints;
        if min_age < 0 {
            return Err(ProductConfigError::NegativeAge(min_age));
        }
        if min_age > max_age {
            return Err(ProductConfigError::InvertedAgeBand { min_age, max_age });
        }
        if let Some(rate) = self.interest_config.base_rate {
            if rate.is_sign_negative() || rate > Decimal::ONE_HUNDRED {
                return Err(ProductConfigError::BaseRateOutOfRange(rate));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductForm {
    pub name: String,
    #[serde(default)]
    pub configuration: ProductConfiguration,
}

impl ProductForm {
    /// Products are validated when saved so the rule engine can trust them.
    pub fn validate(&self) -> Result<(), ProductConfigError> {
        if self.name.trim().is_empty() {
            return Err(ProductConfigError::BlankName);
        }
        self.configuration.validate()
    }
}

/// Loan product reference entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanProduct {
    pub id: u64,
    pub tenant: TenantId,
    #[serde(flatten)]
    pub form: ProductForm,
}

impl LoanProduct {
    pub fn name(&self) -> &str {
        &self.form.name
    }

    pub fn configuration(&self) -> &ProductConfiguration {
        &self.form.configuration
    }
}

impl fmt::Display for LoanProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.form.name)
    }
}

/// Exact display-name match, as the disbursement guards require.
pub fn is_personal_loan(product: Option<&LoanProduct>) -> bool {
    product.map(|product| product.name() == PERSONAL_LOAN).unwrap_or(false)
}
