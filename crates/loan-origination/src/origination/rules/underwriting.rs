use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::assumptions::UnderwritingAssumptions;

/// Decision proposed by the metrics stage. Only approval exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemDecision {
    Approve,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnderwritingMetrics {
    pub net_cash_flow: Decimal,
    pub foir: Decimal,
    pub system_decision: SystemDecision,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnderwritingError {
    #[error("monthly_income: {0} is too large to underwrite.")]
    IncomeOverflow(Decimal),
}

/// Currency amounts are stored with two decimal places.
pub(crate) fn net_cash_flow(
    monthly_income: Decimal,
    assumptions: &UnderwritingAssumptions,
) -> Result<Decimal, UnderwritingError> {
    monthly_income
        .checked_mul(assumptions.cash_flow_ratio)
        .map(|amount| amount.round_dp(2))
        .ok_or(UnderwritingError::IncomeOverflow(monthly_income))
}
