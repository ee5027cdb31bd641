use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Placeholder policies standing in for real geo-fencing, cash-flow and FOIR
/// models. Swapping these values changes the numbers the engine writes
/// without touching the workflow around it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnderwritingAssumptions {
    /// Share of monthly income treated as net cash flow.
    pub cash_flow_ratio: Decimal,
    /// FOIR written verbatim; no obligations are read yet.
    pub fixed_foir_percentage: Decimal,
    /// Value the geo-limit stub records on every knockout run.
    pub geo_limit_stub_pass: bool,
}

impl UnderwritingAssumptions {
    pub fn default_cash_flow_ratio() -> Decimal {
        Decimal::new(40, 2)
    }

    pub fn default_fixed_foir() -> Decimal {
        Decimal::new(4500, 2)
    }
}

impl Default for UnderwritingAssumptions {
    fn default() -> Self {
        Self {
            cash_flow_ratio: Self::default_cash_flow_ratio(),
            fixed_foir_percentage: Self::default_fixed_foir(),
            geo_limit_stub_pass: true,
        }
    }
}
