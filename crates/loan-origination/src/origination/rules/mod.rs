mod assumptions;
mod knockout;
mod underwriting;

pub use assumptions::UnderwritingAssumptions;
pub use knockout::{applicant_age, KnockoutResult};
pub use underwriting::{SystemDecision, UnderwritingError, UnderwritingMetrics};

use super::domain::LoanApplication;
use super::product::{EligibilityConstraints, InterestConfig, LoanProduct};

/// Evaluator bound to one application. Both stages write derived fields back
/// onto the application; persisting them is the caller's job.
pub struct RuleEngine<'a> {
    application: &'a mut LoanApplication,
    constraints: EligibilityConstraints,
    interest: InterestConfig,
    assumptions: &'a UnderwritingAssumptions,
}

impl<'a> RuleEngine<'a> {
    pub fn new(
        application: &'a mut LoanApplication,
        product: Option<&LoanProduct>,
        assumptions: &'a UnderwritingAssumptions,
    ) -> Self {
        let configuration = product
            .map(|product| product.configuration().clone())
            .unwrap_or_default();

        Self {
            application,
            constraints: configuration.constraints,
            interest: configuration.interest_config,
            assumptions,
        }
    }

    /// Pricing inputs resolved from the product, reserved for rate rules.
    pub fn interest_config(&self) -> &InterestConfig {
        &self.interest
    }

    pub fn execute_knockout_checks(&mut self) -> KnockoutResult {
        let mut result = KnockoutResult::eligible();

        let age = applicant_age(
            self.application.created_at.date_naive(),
            self.application.form.dob,
        );
        if let Some(reason) = knockout::age_violation(age, &self.constraints) {
            result.reject(reason);
        }

        // TODO: replace with a pincode-to-branch serviceability lookup.
        self.application.is_geo_limit_passed = self.assumptions.geo_limit_stub_pass;
        self.application.touch();

        result
    }

    /// Leaves the application untouched when the cash flow cannot be computed.
    pub fn calculate_underwriting_metrics(
        &mut self,
    ) -> Result<UnderwritingMetrics, UnderwritingError> {
        let net_cash_flow =
            underwriting::net_cash_flow(self.application.form.monthly_income, self.assumptions)?;
        let foir = self.assumptions.fixed_foir_percentage;

        self.application.net_cash_flow = Some(net_cash_flow);
        self.application.foir_percentage = Some(foir);
        self.application.touch();

        Ok(UnderwritingMetrics {
            net_cash_flow,
            foir,
            system_decision: SystemDecision::Approve,
        })
    }
}
