use crate::infra::{parse_amount, SimulatedVerificationGateway};
use chrono::{Duration, Utc};
use clap::Args;
use loan_origination::error::AppError;
use loan_origination::origination::{
    ApplicationForm, AssessmentForm, CallerContext, Gender, IncomeType, KycForm, KycType,
    LoanOriginationService, LoanServiceError, MemoryLoanStore, ProductConfiguration, ProductForm,
    ScoreUpdateRequest, TransitionMode, UnderwritingAssumptions, UnderwritingResponse,
    VerificationFlags, VideoDecisionRequest, WorkflowViolation, ASSESSMENT_STATUS_UNDER_REVIEW,
    KYC_STATUS_PENDING, PERSONAL_LOAN,
};
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Applicant age in whole years at intake.
    #[arg(long, default_value_t = 30)]
    pub(crate) age: i64,
    /// Declared monthly income.
    #[arg(long, default_value = "50000.00", value_parser = parse_amount)]
    pub(crate) monthly_income: Decimal,
    /// Name of the product the application is filed under.
    #[arg(long, default_value = PERSONAL_LOAN)]
    pub(crate) product_name: String,
}

type DemoService = LoanOriginationService<MemoryLoanStore, SimulatedVerificationGateway>;

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        age,
        monthly_income,
        product_name,
    } = args;

    let service: DemoService = LoanOriginationService::new(
        Arc::new(MemoryLoanStore::new()),
        Arc::new(SimulatedVerificationGateway),
        UnderwritingAssumptions::default(),
        TransitionMode::Strict,
    );
    let caller = CallerContext::new("demo-officer", "demo-lender");

    println!("Loan origination demo");
    let product = service.create_product(
        &caller,
        ProductForm {
            name: product_name,
            configuration: ProductConfiguration::default(),
        },
    )?;
    let constraints = product.configuration().constraints;
    println!(
        "- Product {} (#{}) accepts ages {}-{}",
        product.name(),
        product.id,
        constraints.min_age,
        constraints.max_age
    );

    let created = service.create_application(&caller, demo_form(age, monthly_income, product.id))?;
    let id = created.application.id;
    println!(
        "- Application {} received -> status {}",
        created.application.application_id, created.application.status
    );

    for (kyc_type, number, file) in [
        (KycType::Pan, Some("ABCPD4321M"), None),
        (KycType::SelfDeclarationVideo, None, Some("kyc/demo/video.mp4")),
    ] {
        let detail = service.create_kyc(
            &caller,
            KycForm {
                loan_application: id,
                kyc_type,
                document_number: number.map(str::to_string),
                document_file: file.map(str::to_string),
                status: KYC_STATUS_PENDING.to_string(),
                verified_at: None,
            },
        )?;
        println!("  KYC {:?} uploaded (#{})", detail.form.kyc_type, detail.id);
    }

    match service.run_underwriting(&caller, id)? {
        UnderwritingResponse::KnockedOut(knockout) => {
            println!(
                "- Knockout failed: {}",
                knockout.rejection_reason.as_deref().unwrap_or("no reason given")
            );
            let view = service.get_application(&caller, id)?;
            println!("  Final status {}", view.application.status);
            return Ok(());
        }
        UnderwritingResponse::Completed { metrics, .. } => {
            println!(
                "- Underwriting complete: net cash flow {} | FOIR {}% | decision {:?}",
                metrics.net_cash_flow, metrics.foir, metrics.system_decision
            );
        }
    }

    let assessment = service.create_assessment(
        &caller,
        AssessmentForm {
            application: id,
            cibil_score: None,
            risk_score: None,
            remarks: None,
            status: ASSESSMENT_STATUS_UNDER_REVIEW.to_string(),
            approved_amount: Decimal::ZERO,
            approved_roi: Decimal::ZERO,
        },
    )?;
    let scored = service.update_score(
        &caller,
        assessment.id,
        ScoreUpdateRequest {
            cibil_score: Some(json!(762)),
            risk_score: Some(json!("21.40")),
            approved_amount: Some(json!(created.application.form.requested_amount.to_string())),
            remarks: Some(json!("Bureau pull clean")),
            ..ScoreUpdateRequest::default()
        },
    )?;
    println!(
        "- Credit assessment #{}: CIBIL {:?}, risk {:?}",
        scored.id, scored.form.cibil_score, scored.form.risk_score
    );

    let sanction = service.generate_sanction(&caller, id)?;
    println!("- {} -> {}", sanction.message, sanction.download_link);

    match service.disburse_loan(&caller, id) {
        Ok(disbursed) => {
            println!("- {} ({})", disbursed.message, disbursed.transaction_id);
        }
        Err(LoanServiceError::Workflow(WorkflowViolation::VideoKycPending)) => {
            println!("- Disbursement held: video KYC pending");
            let decision = service.verify_video(
                &caller,
                id,
                VideoDecisionRequest {
                    decision: Some("approve".to_string()),
                    remarks: None,
                },
            )?;
            println!("  {}", decision.status);
            let disbursed = service.disburse_loan(&caller, id)?;
            println!("- {} ({})", disbursed.message, disbursed.transaction_id);
        }
        Err(err) => {
            println!("- Disbursement failed: {err}");
        }
    }

    let view = service.get_application(&caller, id)?;
    match serde_json::to_string_pretty(&view) {
        Ok(json) => println!("  Application payload:\n{}", json),
        Err(err) => println!("  Application payload unavailable: {}", err),
    }

    Ok(())
}

fn demo_form(age: i64, monthly_income: Decimal, product: u64) -> ApplicationForm {
    let dob = Utc::now().date_naive() - Duration::days(age * 365 + 10);
    ApplicationForm {
        branch: Some("DEMO-01".to_string()),
        customer: "CUST-DEMO".to_string(),
        first_name: "Meera".to_string(),
        last_name: "Deshpande".to_string(),
        mobile_no: "9000012345".to_string(),
        email: "meera.deshpande@example.com".to_string(),
        dob,
        pan_number: "ABCPD4321M".to_string(),
        aadhaar_number: None,
        gender: Gender::Female,
        income_type: IncomeType::Salaried,
        res_address_line1: "3 Law College Road".to_string(),
        res_address_line2: String::new(),
        res_city: "Pune".to_string(),
        res_state: "Maharashtra".to_string(),
        res_pincode: "411004".to_string(),
        office_address_line1: String::new(),
        office_city: String::new(),
        office_pincode: String::new(),
        product: Some(product),
        requested_amount: Decimal::new(30_000_000, 2),
        requested_tenure: 24,
        monthly_income,
        employer_name: Some("Sahyadri Systems".to_string()),
        business_name: None,
        employment_type: "Permanent".to_string(),
        bank_account_number: "50100987654321".to_string(),
        ifsc_code: "HDFC0004321".to_string(),
        account_type: "Savings".to_string(),
        mandate_type: "eNACH".to_string(),
        disbursement_consent: true,
        flags: VerificationFlags::default(),
        remarks: None,
    }
}
