use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::domain::{ApplicationStatus, LoanApplication};
use super::product::{is_personal_loan, LoanProduct};
use super::verification::PennyDropOutcome;

use ApplicationStatus::*;

/// How strictly `change-status` follows the transition table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionMode {
    /// Only edges listed in the table are accepted.
    #[default]
    Strict,
    /// Any status may follow any other; edge guards still run.
    Permissive,
}

impl FromStr for TransitionMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "permissive" | "legacy" => Ok(Self::Permissive),
            other => Err(other.to_string()),
        }
    }
}

impl fmt::Display for TransitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionMode::Strict => f.write_str("strict"),
            TransitionMode::Permissive => f.write_str("permissive"),
        }
    }
}

/// Business-rule rejections raised before any state is mutated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowViolation {
    #[error("Application not ready for Sanction")]
    NotReadyForSanction { status: ApplicationStatus },
    #[error("Bank Account Verification Failed")]
    BankVerificationFailed(PennyDropOutcome),
    #[error("Cannot Disburse: Video KYC Pending")]
    VideoKycPending,
    #[error("Cannot disburse Personal Loan without Video Verification")]
    DisbursementWithoutVideo,
    #[error("Cannot move application from {from} to {to}")]
    IllegalTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },
    #[error("Cannot {action} an application in {status}")]
    ActionNotAllowed {
        action: WorkflowAction,
        status: ApplicationStatus,
    },
}

/// Endpoints that write a status directly instead of going through
/// `change-status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    VerifyVideo,
    RunUnderwriting,
    GenerateSanction,
    DisburseLoan,
}

impl fmt::Display for WorkflowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowAction::VerifyVideo => f.write_str("verify video for"),
            WorkflowAction::RunUnderwriting => f.write_str("run underwriting on"),
            WorkflowAction::GenerateSanction => f.write_str("generate a sanction for"),
            WorkflowAction::DisburseLoan => f.write_str("disburse"),
        }
    }
}

/// Check attached to an edge of the status graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeGuard {
    /// Personal loans cannot be disbursed before video KYC passes.
    VideoKycForPersonalLoan,
}

impl EdgeGuard {
    pub fn check(
        self,
        application: &LoanApplication,
        product: Option<&LoanProduct>,
    ) -> Result<(), WorkflowViolation> {
        match self {
            EdgeGuard::VideoKycForPersonalLoan => {
                if is_personal_loan(product) && !application.form.flags.is_video_kyc_verified {
                    Err(WorkflowViolation::DisbursementWithoutVideo)
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Status finite-state machine consulted by `change-status`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransitionPolicy {
    mode: TransitionMode,
}

impl TransitionPolicy {
    pub fn new(mode: TransitionMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> TransitionMode {
        self.mode
    }

    /// Forward edges out of `from`. Staying in place is always allowed.
    pub fn allowed_targets(from: ApplicationStatus) -> &'static [ApplicationStatus] {
        match from {
            New => &[KnockoutPending, DocUpload, Underwriting, Hold, Rejected, Closed],
            KnockoutPending => &[DocUpload, Underwriting, Hold, Rejected, Closed],
            DocUpload => &[KnockoutPending, Underwriting, Hold, Rejected, Closed],
            Underwriting => &[DocUpload, Sanctioned, Hold, Rejected, Closed],
            Hold => &[
                New,
                KnockoutPending,
                DocUpload,
                Underwriting,
                Sanctioned,
                PreDisbursement,
                Rejected,
                Closed,
            ],
            Sanctioned => &[PreDisbursement, Disbursed, Hold, Rejected, Closed],
            PreDisbursement => &[Disbursed, Hold, Rejected, Closed],
            Disbursed => &[Closed],
            Rejected => &[Closed],
            Closed => &[],
        }
    }

    pub fn guards(_from: ApplicationStatus, to: ApplicationStatus) -> &'static [EdgeGuard] {
        match to {
            Disbursed => &[EdgeGuard::VideoKycForPersonalLoan],
            _ => &[],
        }
    }

    pub fn is_edge(from: ApplicationStatus, to: ApplicationStatus) -> bool {
        from == to || Self::allowed_targets(from).contains(&to)
    }

    /// Actions skip the adjacency table, but in strict mode they never
    /// reopen a closed application or pull a disbursed loan back into review.
    pub fn check_action(
        &self,
        action: WorkflowAction,
        status: ApplicationStatus,
    ) -> Result<(), WorkflowViolation> {
        if self.mode == TransitionMode::Permissive {
            return Ok(());
        }
        let blocked = match status {
            Closed => true,
            Disbursed => matches!(
                action,
                WorkflowAction::VerifyVideo | WorkflowAction::RunUnderwriting
            ),
            _ => false,
        };
        if blocked {
            Err(WorkflowViolation::ActionNotAllowed { action, status })
        } else {
            Ok(())
        }
    }

    pub fn check(
        &self,
        application: &LoanApplication,
        product: Option<&LoanProduct>,
        to: ApplicationStatus,
    ) -> Result<(), WorkflowViolation> {
        let from = application.status;
        if self.mode == TransitionMode::Strict && !Self::is_edge(from, to) {
            return Err(WorkflowViolation::IllegalTransition { from, to });
        }

        for guard in Self::guards(from, to) {
            guard.check(application, product)?;
        }
        Ok(())
    }
}
