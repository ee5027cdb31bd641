use loan_origination::origination::{
    LoanApplication, PennyDropOutcome, SanctionLetter, VerificationError, VerificationGateway,
};
use metrics_exporter_prometheus::PrometheusHandle;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Stand-in for the bank and document providers. Accounts pass the penny
/// drop when they look like an Indian account number and IFSC code.
#[derive(Debug, Default, Clone)]
pub(crate) struct SimulatedVerificationGateway;

impl SimulatedVerificationGateway {
    fn account_is_plausible(account_number: &str) -> bool {
        let len = account_number.len();
        (9..=18).contains(&len) && account_number.bytes().all(|byte| byte.is_ascii_digit())
    }

    fn ifsc_is_plausible(ifsc_code: &str) -> bool {
        let bytes = ifsc_code.as_bytes();
        bytes.len() == 11
            && bytes[..4].iter().all(u8::is_ascii_alphabetic)
            && bytes[4] == b'0'
            && bytes[5..].iter().all(u8::is_ascii_alphanumeric)
    }
}

impl VerificationGateway for SimulatedVerificationGateway {
    fn generate_sanction_letter(
        &self,
        application: &LoanApplication,
    ) -> Result<SanctionLetter, VerificationError> {
        let file_name = format!("sanction_{}.pdf", application.application_id);
        info!(application = application.id, %file_name, "sanction letter rendered");
        Ok(SanctionLetter { file_name })
    }

    fn perform_penny_drop(
        &self,
        account_number: &str,
        ifsc_code: &str,
    ) -> Result<PennyDropOutcome, VerificationError> {
        let account_number = account_number.trim();
        let ifsc_code = ifsc_code.trim();

        if Self::account_is_plausible(account_number) && Self::ifsc_is_plausible(ifsc_code) {
            Ok(PennyDropOutcome {
                verified: true,
                account_holder: Some("ACCOUNT HOLDER".to_string()),
                message: "Account verified".to_string(),
            })
        } else {
            warn!(%ifsc_code, "penny drop could not verify account");
            Ok(PennyDropOutcome {
                verified: false,
                account_holder: None,
                message: "Account or IFSC code is invalid".to_string(),
            })
        }
    }
}

pub(crate) fn parse_amount(raw: &str) -> Result<Decimal, String> {
    let amount = Decimal::from_str(raw.trim())
        .map_err(|err| format!("failed to parse '{raw}' as a decimal amount ({err})"))?;
    if amount.is_sign_negative() {
        return Err(format!("amount '{raw}' must not be negative"));
    }
    Ok(amount)
}
