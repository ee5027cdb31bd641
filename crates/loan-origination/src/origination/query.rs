use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::domain::{ApplicationStatus, KycDetail, KycType, LoanApplication};

/// List parameters for the application collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub tenant: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub product: Option<u64>,
    #[serde(default)]
    pub income_type: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub ordering: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OrderField {
    CreatedAt,
    RequestedAmount,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OrderKey {
    field: OrderField,
    descending: bool,
}

const DEFAULT_ORDERING: [OrderKey; 1] = [OrderKey {
    field: OrderField::CreatedAt,
    descending: true,
}];

impl ApplicationQuery {
    /// Filter, search and order in one pass. Unknown ordering fields are
    /// skipped; an unknown status or income type is a client error.
    pub fn apply(&self, applications: Vec<LoanApplication>) -> Result<Vec<LoanApplication>, String> {
        let status = self
            .status
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                raw.parse::<ApplicationStatus>()
                    .map_err(|_| format!("status: select a valid choice. {raw} is not one of the available choices."))
            })
            .transpose()?;

        let income_type = self.income_type.as_deref().filter(|raw| !raw.is_empty());
        if let Some(raw) = income_type {
            if raw != "Salaried" && raw != "Self-Employed" {
                return Err(format!(
                    "income_type: select a valid choice. {raw} is not one of the available choices."
                ));
            }
        }

        let terms: Vec<String> = self
            .search
            .as_deref()
            .unwrap_or_default()
            .split_whitespace()
            .map(str::to_lowercase)
            .collect();

        let mut matched: Vec<LoanApplication> = applications
            .into_iter()
            .filter(|app| status.map(|wanted| app.status == wanted).unwrap_or(true))
            .filter(|app| match self.tenant.as_deref().filter(|raw| !raw.is_empty()) {
                Some(tenant) => app.tenant.0 == tenant,
                None => true,
            })
            .filter(|app| match self.branch.as_deref().filter(|raw| !raw.is_empty()) {
                Some(branch) => app.form.branch.as_deref() == Some(branch),
                None => true,
            })
            .filter(|app| match self.product {
                Some(product) => app.form.product == Some(product),
                None => true,
            })
            .filter(|app| match income_type {
                Some(raw) => app.form.income_type.label() == raw,
                None => true,
            })
            .filter(|app| terms.iter().all(|term| matches_term(app, term)))
            .collect();

        let keys = self.order_keys();
        matched.sort_by(|left, right| compare(left, right, &keys));
        Ok(matched)
    }

    fn order_keys(&self) -> Vec<OrderKey> {
        let keys: Vec<OrderKey> = self
            .ordering
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter_map(|raw| {
                let (descending, name) = match raw.strip_prefix('-') {
                    Some(name) => (true, name),
                    None => (false, raw),
                };
                let field = match name {
                    "created_at" => OrderField::CreatedAt,
                    "requested_amount" => OrderField::RequestedAmount,
                    "status" => OrderField::Status,
                    _ => return None,
                };
                Some(OrderKey { field, descending })
            })
            .collect();

        if keys.is_empty() {
            DEFAULT_ORDERING.to_vec()
        } else {
            keys
        }
    }
}

fn matches_term(app: &LoanApplication, term: &str) -> bool {
    let application_id = app.application_id.to_string();
    [
        application_id.as_str(),
        app.form.first_name.as_str(),
        app.form.last_name.as_str(),
        app.form.mobile_no.as_str(),
        app.form.pan_number.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(term))
}

fn compare(left: &LoanApplication, right: &LoanApplication, keys: &[OrderKey]) -> Ordering {
    let mut last_descending = true;
    for key in keys {
        let ordering = match key.field {
            OrderField::CreatedAt => left.created_at.cmp(&right.created_at),
            OrderField::RequestedAmount => left
                .form
                .requested_amount
                .cmp(&right.form.requested_amount),
            OrderField::Status => left.status.label().cmp(right.status.label()),
        };
        let ordering = if key.descending {
            ordering.reverse()
        } else {
            ordering
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
        last_descending = key.descending;
    }

    let by_id = left.id.cmp(&right.id);
    if last_descending {
        by_id.reverse()
    } else {
        by_id
    }
}

/// List parameters for KYC documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KycQuery {
    #[serde(default)]
    pub loan_application: Option<u64>,
    #[serde(default)]
    pub kyc_type: Option<KycType>,
}

impl KycQuery {
    pub fn matches(&self, detail: &KycDetail) -> bool {
        self.loan_application
            .map(|id| detail.form.loan_application == id)
            .unwrap_or(true)
            && self
                .kyc_type
                .map(|kind| detail.form.kyc_type == kind)
                .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::origination::tests::common::{application_form, stored_application};
    use rust_decimal::Decimal;

    fn sample() -> Vec<LoanApplication> {
        let mut first = stored_application(1, "acme", application_form());
        first.form.first_name = "Asha".to_string();
        first.form.requested_amount = Decimal::new(300_000, 0);

        let mut second = stored_application(2, "acme", application_form());
        second.form.first_name = "Vikram".to_string();
        second.form.pan_number = "ABCPV1234K".to_string();
        second.form.requested_amount = Decimal::new(150_000, 0);
        second.status = ApplicationStatus::Underwriting;
        second.created_at = first.created_at + chrono::Duration::minutes(5);

        let mut third = stored_application(3, "acme", application_form());
        third.form.first_name = "Meera".to_string();
        third.form.requested_amount = Decimal::new(500_000, 0);
        third.created_at = first.created_at + chrono::Duration::minutes(10);

        vec![first, second, third]
    }

    fn ids(applications: &[LoanApplication]) -> Vec<u64> {
        applications.iter().map(|app| app.id).collect()
    }

    #[test]
    fn default_ordering_is_newest_first() {
        let ordered = ApplicationQuery::default().apply(sample()).expect("query");
        assert_eq!(ids(&ordered), vec![3, 2, 1]);
    }

    #[test]
    fn ordering_accepts_ascending_amount_and_ignores_unknown_fields() {
        let query = ApplicationQuery {
            ordering: Some("bogus,requested_amount".to_string()),
            ..ApplicationQuery::default()
        };
        assert_eq!(ids(&query.apply(sample()).expect("query")), vec![2, 1, 3]);
    }

    #[test]
    fn search_terms_must_all_match() {
        let query = ApplicationQuery {
            search: Some("vikram abcpv".to_string()),
            ..ApplicationQuery::default()
        };
        assert_eq!(ids(&query.apply(sample()).expect("query")), vec![2]);

        let query = ApplicationQuery {
            search: Some("vikram meera".to_string()),
            ..ApplicationQuery::default()
        };
        assert!(query.apply(sample()).expect("query").is_empty());
    }

    #[test]
    fn status_filter_rejects_unknown_choices() {
        let query = ApplicationQuery {
            status: Some("UNDERWRITING".to_string()),
            ..ApplicationQuery::default()
        };
        assert_eq!(ids(&query.apply(sample()).expect("query")), vec![2]);

        let query = ApplicationQuery {
            status: Some("APPROVED".to_string()),
            ..ApplicationQuery::default()
        };
        assert!(query.apply(sample()).is_err());
    }
}
