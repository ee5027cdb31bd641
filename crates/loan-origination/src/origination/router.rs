use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        FromRef, Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::auth::{Authenticator, CallerContext};
use super::domain::{ApplicationForm, AssessmentForm, KycForm};
use super::payloads::{ScoreUpdateRequest, StatusChangeRequest, VideoDecisionRequest};
use super::product::ProductForm;
use super::query::{ApplicationQuery, KycQuery};
use super::repository::{LoanStore, RepositoryError};
use super::service::{LoanOriginationService, LoanServiceError};
use super::transitions::WorkflowViolation;
use super::verification::VerificationGateway;

/// Shared state behind every origination route.
pub struct OriginationState<S, V> {
    pub service: Arc<LoanOriginationService<S, V>>,
    pub auth: Arc<Authenticator>,
}

impl<S, V> Clone for OriginationState<S, V> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            auth: self.auth.clone(),
        }
    }
}

impl<S, V> FromRef<OriginationState<S, V>> for Arc<Authenticator> {
    fn from_ref(state: &OriginationState<S, V>) -> Self {
        state.auth.clone()
    }
}

/// Router builder exposing the application, KYC, assessment and product
/// endpoints. Every route requires a bearer token.
pub fn origination_router<S, V>(
    service: Arc<LoanOriginationService<S, V>>,
    auth: Arc<Authenticator>,
) -> Router
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    let state = OriginationState { service, auth };

    Router::new()
        .route(
            "/api/v1/los/applications",
            get(list_applications::<S, V>).post(create_application::<S, V>),
        )
        .route(
            "/api/v1/los/applications/:id",
            get(get_application::<S, V>)
                .put(replace_application::<S, V>)
                .patch(patch_application::<S, V>)
                .delete(delete_application::<S, V>),
        )
        .route(
            "/api/v1/los/applications/:id/verify-video",
            post(verify_video::<S, V>),
        )
        .route(
            "/api/v1/los/applications/:id/run-underwriting",
            post(run_underwriting::<S, V>),
        )
        .route(
            "/api/v1/los/applications/:id/generate-sanction",
            post(generate_sanction::<S, V>),
        )
        .route(
            "/api/v1/los/applications/:id/disburse-loan",
            post(disburse_loan::<S, V>),
        )
        .route(
            "/api/v1/los/applications/:id/change-status",
            post(change_status::<S, V>),
        )
        .route(
            "/api/v1/los/kyc-details",
            get(list_kyc::<S, V>).post(create_kyc::<S, V>),
        )
        .route(
            "/api/v1/los/kyc-details/:id",
            get(get_kyc::<S, V>)
                .put(replace_kyc::<S, V>)
                .patch(patch_kyc::<S, V>)
                .delete(delete_kyc::<S, V>),
        )
        .route(
            "/api/v1/los/credit-assessments",
            get(list_assessments::<S, V>).post(create_assessment::<S, V>),
        )
        .route(
            "/api/v1/los/credit-assessments/:id",
            get(get_assessment::<S, V>)
                .put(replace_assessment::<S, V>)
                .patch(patch_assessment::<S, V>)
                .delete(delete_assessment::<S, V>),
        )
        .route(
            "/api/v1/los/credit-assessments/:id/update-score",
            post(update_score::<S, V>),
        )
        .route(
            "/api/v1/los/products",
            get(list_products::<S, V>).post(create_product::<S, V>),
        )
        .route(
            "/api/v1/los/products/:id",
            get(get_product::<S, V>).put(replace_product::<S, V>),
        )
        .with_state(state)
}

fn respond<T: Serialize>(status: StatusCode, result: Result<T, LoanServiceError>) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error.into_response(),
    }
}

fn no_content(result: Result<(), LoanServiceError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error.into_response(),
    }
}

fn bad_request(detail: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "detail": detail }))).into_response()
}

impl IntoResponse for LoanServiceError {
    fn into_response(self) -> Response {
        match self {
            LoanServiceError::NotFound { .. }
            | LoanServiceError::Repository(RepositoryError::NotFound)
            | LoanServiceError::Repository(RepositoryError::CrossTenant) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "detail": "Not found." })),
            )
                .into_response(),
            LoanServiceError::Workflow(WorkflowViolation::BankVerificationFailed(outcome)) => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "detail": "Bank Account Verification Failed",
                    "error": outcome,
                })),
            )
                .into_response(),
            LoanServiceError::Validation(detail) => bad_request(detail),
            LoanServiceError::Workflow(violation) => bad_request(violation.to_string()),
            LoanServiceError::Product(error) => bad_request(error.to_string()),
            LoanServiceError::Verification(error) => bad_request(error.to_string()),
            LoanServiceError::Underwriting(error) => bad_request(error.to_string()),
            LoanServiceError::Repository(RepositoryError::Conflict) => (
                StatusCode::CONFLICT,
                Json(json!({ "detail": "record already exists" })),
            )
                .into_response(),
            LoanServiceError::Repository(error @ RepositoryError::Unavailable(_)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "detail": error.to_string() })),
            )
                .into_response(),
        }
    }
}

// ---- applications -----------------------------------------------------

pub(crate) async fn list_applications<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    query: Result<Query<ApplicationQuery>, QueryRejection>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    respond(StatusCode::OK, state.service.list_applications(&caller, &query))
}

pub(crate) async fn create_application<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    body: Result<Json<ApplicationForm>, JsonRejection>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    match body {
        Ok(Json(form)) => respond(
            StatusCode::CREATED,
            state.service.create_application(&caller, form),
        ),
        Err(rejection) => bad_request(rejection.body_text()),
    }
}

pub(crate) async fn get_application<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    respond(StatusCode::OK, state.service.get_application(&caller, id))
}

pub(crate) async fn replace_application<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
    body: Result<Json<ApplicationForm>, JsonRejection>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    match body {
        Ok(Json(form)) => respond(
            StatusCode::OK,
            state.service.replace_application(&caller, id, form),
        ),
        Err(rejection) => bad_request(rejection.body_text()),
    }
}

pub(crate) async fn patch_application<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    match body {
        Ok(Json(patch)) => respond(
            StatusCode::OK,
            state.service.patch_application(&caller, id, patch),
        ),
        Err(rejection) => bad_request(rejection.body_text()),
    }
}

pub(crate) async fn delete_application<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    no_content(state.service.delete_application(&caller, id))
}

// ---- workflow actions -------------------------------------------------

pub(crate) async fn verify_video<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
    body: Option<Json<VideoDecisionRequest>>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    let request = body.map(|Json(request)| request).unwrap_or_default();
    respond(StatusCode::OK, state.service.verify_video(&caller, id, request))
}

pub(crate) async fn run_underwriting<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    respond(StatusCode::OK, state.service.run_underwriting(&caller, id))
}

pub(crate) async fn generate_sanction<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    respond(StatusCode::OK, state.service.generate_sanction(&caller, id))
}

pub(crate) async fn disburse_loan<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    respond(StatusCode::OK, state.service.disburse_loan(&caller, id))
}

pub(crate) async fn change_status<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
    body: Option<Json<StatusChangeRequest>>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    let request = body.map(|Json(request)| request).unwrap_or_default();
    respond(StatusCode::OK, state.service.change_status(&caller, id, request))
}

// ---- KYC documents ----------------------------------------------------

pub(crate) async fn list_kyc<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    query: Result<Query<KycQuery>, QueryRejection>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return bad_request(rejection.body_text()),
    };
    respond(StatusCode::OK, state.service.list_kyc(&caller, &query))
}

pub(crate) async fn create_kyc<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    body: Result<Json<KycForm>, JsonRejection>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    match body {
        Ok(Json(form)) => respond(StatusCode::CREATED, state.service.create_kyc(&caller, form)),
        Err(rejection) => bad_request(rejection.body_text()),
    }
}

pub(crate) async fn get_kyc<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    respond(StatusCode::OK, state.service.get_kyc(&caller, id))
}

pub(crate) async fn replace_kyc<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
    body: Result<Json<KycForm>, JsonRejection>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    match body {
        Ok(Json(form)) => respond(StatusCode::OK, state.service.replace_kyc(&caller, id, form)),
        Err(rejection) => bad_request(rejection.body_text()),
    }
}

pub(crate) async fn patch_kyc<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    match body {
        Ok(Json(patch)) => respond(StatusCode::OK, state.service.patch_kyc(&caller, id, patch)),
        Err(rejection) => bad_request(rejection.body_text()),
    }
}

pub(crate) async fn delete_kyc<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    no_content(state.service.delete_kyc(&caller, id))
}

// ---- credit assessments -----------------------------------------------

pub(crate) async fn list_assessments<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    respond(StatusCode::OK, state.service.list_assessments(&caller))
}

pub(crate) async fn create_assessment<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    body: Result<Json<AssessmentForm>, JsonRejection>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    match body {
        Ok(Json(form)) => respond(
            StatusCode::CREATED,
            state.service.create_assessment(&caller, form),
        ),
        Err(rejection) => bad_request(rejection.body_text()),
    }
}

pub(crate) async fn get_assessment<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    respond(StatusCode::OK, state.service.get_assessment(&caller, id))
}

pub(crate) async fn replace_assessment<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
    body: Result<Json<AssessmentForm>, JsonRejection>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    match body {
        Ok(Json(form)) => respond(
            StatusCode::OK,
            state.service.replace_assessment(&caller, id, form),
        ),
        Err(rejection) => bad_request(rejection.body_text()),
    }
}

pub(crate) async fn patch_assessment<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
    body: Result<Json<Map<String, Value>>, JsonRejection>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    match body {
        Ok(Json(patch)) => respond(
            StatusCode::OK,
            state.service.patch_assessment(&caller, id, patch),
        ),
        Err(rejection) => bad_request(rejection.body_text()),
    }
}

pub(crate) async fn delete_assessment<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    no_content(state.service.delete_assessment(&caller, id))
}

pub(crate) async fn update_score<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
    body: Option<Json<ScoreUpdateRequest>>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    let request = body.map(|Json(request)| request).unwrap_or_default();
    respond(StatusCode::OK, state.service.update_score(&caller, id, request))
}

// ---- products ---------------------------------------------------------

pub(crate) async fn list_products<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    respond(StatusCode::OK, state.service.list_products(&caller))
}

pub(crate) async fn create_product<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    body: Result<Json<ProductForm>, JsonRejection>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    match body {
        Ok(Json(form)) => respond(
            StatusCode::CREATED,
            state.service.create_product(&caller, form),
        ),
        Err(rejection) => bad_request(rejection.body_text()),
    }
}

pub(crate) async fn get_product<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    respond(StatusCode::OK, state.service.get_product(&caller, id))
}

pub(crate) async fn replace_product<S, V>(
    State(state): State<OriginationState<S, V>>,
    caller: CallerContext,
    Path(id): Path<u64>,
    body: Result<Json<ProductForm>, JsonRejection>,
) -> Response
where
    S: LoanStore + 'static,
    V: VerificationGateway + 'static,
{
    match body {
        Ok(Json(form)) => respond(
            StatusCode::OK,
            state.service.replace_product(&caller, id, form),
        ),
        Err(rejection) => bad_request(rejection.body_text()),
    }
}
