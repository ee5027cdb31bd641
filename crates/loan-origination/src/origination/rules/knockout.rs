use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::origination::product::EligibilityConstraints;

/// Outcome of the pre-underwriting eligibility gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnockoutResult {
    pub is_eligible: bool,
    pub rejection_reason: Option<String>,
    /// Per-check detail. Nothing populates it yet.
    pub flags: BTreeMap<String, bool>,
}

impl KnockoutResult {
    pub(crate) fn eligible() -> Self {
        Self {
            is_eligible: true,
            rejection_reason: None,
            flags: BTreeMap::new(),
        }
    }

    pub(crate) fn reject(&mut self, reason: String) {
        self.is_eligible = false;
        self.rejection_reason = Some(reason);
    }
}

/// Whole years as elapsed days floor-divided by 365. Leap days are ignored.
pub fn applicant_age(created_on: NaiveDate, dob: NaiveDate) -> i64 {
    (created_on - dob).num_days().div_euclid(365)
}

pub(crate) fn age_violation(age: i64, constraints: &EligibilityConstraints) -> Option<String> {
    if (constraints.min_age..=constraints.max_age).contains(&age) {
        None
    } else {
        Some(format!("Age {age} Invalid"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn age_uses_365_day_years() {
        // 8 leap days push 30 calendar years past 30 * 365 days.
        assert_eq!(applicant_age(date(2025, 6, 1), date(1995, 6, 1)), 30);
        // One day short of 21 * 365 days.
        let created = date(2025, 1, 1);
        let dob = created - chrono::Duration::days(21 * 365 - 1);
        assert_eq!(applicant_age(created, dob), 20);
    }

    #[test]
    fn future_birth_dates_floor_to_negative_ages() {
        assert_eq!(applicant_age(date(2025, 1, 1), date(2025, 1, 2)), -1);
    }

    #[test]
    fn bounds_are_inclusive() {
        let constraints = EligibilityConstraints::default();
        assert_eq!(age_violation(21, &constraints), None);
        assert_eq!(age_violation(60, &constraints), None);
        assert_eq!(age_violation(20, &constraints), Some("Age 20 Invalid".to_string()));
        assert_eq!(age_violation(61, &constraints), Some("Age 61 Invalid".to_string()));
    }
}
