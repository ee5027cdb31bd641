use super::common::*;
use axum::body::Body;
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use crate::origination::service::LoanOriginationService;
use crate::origination::transitions::TransitionMode;

async fn create_application(router: &axum::Router, payload: Value) -> Value {
    let response = router
        .clone()
        .oneshot(json_request("POST", "/api/v1/los/applications", TOKEN, payload))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CREATED);
    read_json_body(response).await
}

fn application_uri(body: &Value, suffix: &str) -> String {
    let id = body["id"].as_u64().expect("numeric id");
    format!("/api/v1/los/applications/{id}{suffix}")
}

#[tokio::test]
async fn requests_without_token_are_unauthorized() {
    let (service, _, _) = build_service();
    let router = router_for(service);

    let response = router
        .oneshot(
            Request::get("/api/v1/los/applications")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response
            .headers()
            .get(WWW_AUTHENTICATE)
            .and_then(|value| value.to_str().ok()),
        Some("Bearer")
    );
    let body = read_json_body(response).await;
    assert_eq!(
        body["detail"],
        json!("Authentication credentials were not provided.")
    );
}

#[tokio::test]
async fn unknown_token_is_rejected() {
    let (service, _, _) = build_service();
    let router = router_for(service);

    let response = router
        .oneshot(empty_request("GET", "/api/v1/los/applications", "forged"))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(read_json_body(response).await["detail"], json!("Invalid token."));
}

#[tokio::test]
async fn create_returns_embedded_view_with_string_decimals() {
    let (service, _, _) = build_service();
    let router = router_for(service);

    let body = create_application(&router, application_payload()).await;

    assert_eq!(body["status"], json!("NEW"));
    assert_eq!(body["tenant"], json!("acme-finance"));
    assert_eq!(body["created_by"], json!("priya"));
    assert_eq!(body["requested_amount"], json!("250000.00"));
    assert_eq!(body["requested_tenure"], json!(12));
    assert_eq!(body["account_type"], json!("Savings"));
    assert_eq!(body["mandate_type"], json!("eNACH"));
    assert_eq!(body["is_video_kyc_verified"], json!(false));
    assert_eq!(body["kyc_details"], json!([]));
    assert_eq!(body["credit_assessment"], Value::Null);
    assert_eq!(body["product_name"], Value::Null);
    assert!(body["application_id"].as_str().is_some());
}

#[tokio::test]
async fn malformed_payload_is_a_bad_request() {
    let (service, _, _) = build_service();
    let router = router_for(service);

    let mut payload = application_payload();
    payload["gender"] = json!("unknown");
    let response = router
        .oneshot(json_request("POST", "/api/v1/los/applications", TOKEN, payload))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(read_json_body(response).await["detail"].is_string());
}

#[tokio::test]
async fn underwriting_route_reports_metrics() {
    let (service, _, _) = build_service();
    let router = router_for(service);
    let created = create_application(&router, application_payload()).await;

    let response = router
        .clone()
        .oneshot(empty_request(
            "POST",
            &application_uri(&created, "/run-underwriting"),
            TOKEN,
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], json!("Underwriting Complete"));
    assert_eq!(body["knockout"]["is_eligible"], json!(true));
    assert_eq!(body["metrics"]["net_cash_flow"], json!("20000.00"));
    assert_eq!(body["metrics"]["foir"], json!("45.00"));
    assert_eq!(body["metrics"]["system_decision"], json!("APPROVE"));

    let response = router
        .oneshot(empty_request("GET", &application_uri(&created, ""), TOKEN))
        .await
        .expect("router responds");
    let body = read_json_body(response).await;
    assert_eq!(body["status"], json!("UNDERWRITING"));
    assert_eq!(body["is_geo_limit_passed"], json!(true));
}

#[tokio::test]
async fn knocked_out_application_returns_bare_knockout_payload() {
    let (service, _, _) = build_service();
    let router = router_for(service);
    let mut payload = application_payload();
    payload["dob"] = json!(dob_for_age(19).to_string());
    let created = create_application(&router, payload).await;

    let response = router
        .oneshot(empty_request(
            "POST",
            &application_uri(&created, "/run-underwriting"),
            TOKEN,
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(
        body,
        json!({
            "is_eligible": false,
            "rejection_reason": "Age 19 Invalid",
            "flags": {}
        })
    );
}

#[tokio::test]
async fn failed_penny_drop_returns_gateway_outcome() {
    let (service, _, _) = build_service_with(TransitionMode::Strict, StubGateway::failing());
    let router = router_for(service);
    let created = create_application(&router, application_payload()).await;

    let response = router
        .oneshot(empty_request(
            "POST",
            &application_uri(&created, "/disburse-loan"),
            TOKEN,
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json_body(response).await;
    assert_eq!(body["detail"], json!("Bank Account Verification Failed"));
    assert_eq!(body["error"]["verified"], json!(false));
}

#[tokio::test]
async fn sanction_before_underwriting_is_rejected() {
    let (service, _, _) = build_service();
    let router = router_for(service);
    let created = create_application(&router, application_payload()).await;

    let response = router
        .oneshot(empty_request(
            "POST",
            &application_uri(&created, "/generate-sanction"),
            TOKEN,
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json_body(response).await["detail"],
        json!("Application not ready for Sanction")
    );
}

#[tokio::test]
async fn closed_application_refuses_underwriting() {
    let (service, _, _) = build_service();
    let router = router_for(service);
    let created = create_application(&router, application_payload()).await;

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &application_uri(&created, "/change-status"),
            TOKEN,
            json!({ "status": "CLOSED" }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);

    let response = router
        .clone()
        .oneshot(empty_request(
            "POST",
            &application_uri(&created, "/run-underwriting"),
            TOKEN,
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json_body(response).await["detail"],
        json!("Cannot run underwriting on an application in CLOSED")
    );

    let response = router
        .oneshot(empty_request("GET", &application_uri(&created, ""), TOKEN))
        .await
        .expect("router responds");
    assert_eq!(read_json_body(response).await["status"], json!("CLOSED"));
}

#[tokio::test]
async fn change_status_without_body_requires_status() {
    let (service, _, _) = build_service();
    let router = router_for(service);
    let created = create_application(&router, application_payload()).await;

    let response = router
        .clone()
        .oneshot(empty_request(
            "POST",
            &application_uri(&created, "/change-status"),
            TOKEN,
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json_body(response).await["detail"],
        json!("status is required")
    );

    let response = router
        .oneshot(json_request(
            "POST",
            &application_uri(&created, "/change-status"),
            TOKEN,
            json!({ "status": "HOLD", "remarks": "Awaiting salary slips" }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["status"], json!("HOLD"));
    assert_eq!(body["remarks"], json!("Awaiting salary slips"));
}

#[tokio::test]
async fn missing_and_foreign_records_are_not_found() {
    let (service, _, _) = build_service();
    let router = router_for(service);
    let created = create_application(&router, application_payload()).await;

    let response = router
        .clone()
        .oneshot(empty_request("GET", "/api/v1/los/applications/987654321", TOKEN))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(read_json_body(response).await, json!({ "detail": "Not found." }));

    let response = router
        .oneshot(empty_request("GET", &application_uri(&created, ""), OTHER_TOKEN))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_filters_by_search_and_status() {
    let (service, _, _) = build_service();
    let router = router_for(service);
    create_application(&router, application_payload()).await;
    let mut other = application_payload();
    other["first_name"] = json!("Meera");
    other["pan_number"] = json!("ABCPM9999Z");
    create_application(&router, other).await;

    let response = router
        .clone()
        .oneshot(empty_request(
            "GET",
            "/api/v1/los/applications?search=meera&status=NEW",
            TOKEN,
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    let names: Vec<&str> = body
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|item| item["first_name"].as_str())
        .collect();
    assert_eq!(names, vec!["Meera"]);

    let response = router
        .oneshot(empty_request(
            "GET",
            "/api/v1/los/applications?status=APPROVED",
            TOKEN,
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn assessment_lifecycle_over_http() {
    let (service, _, _) = build_service();
    let router = router_for(service);
    let created = create_application(&router, application_payload()).await;
    let application = created["id"].clone();

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/los/credit-assessments",
            TOKEN,
            json!({ "application": application }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::CREATED);
    let assessment = read_json_body(response).await;
    assert_eq!(assessment["status"], json!("UNDER_REVIEW"));

    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/los/credit-assessments",
            TOKEN,
            json!({ "application": application }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let id = assessment["id"].as_u64().expect("numeric id");
    let response = router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/los/credit-assessments/{id}/update-score"),
            TOKEN,
            json!({ "score": 781, "approved_amount": "200000", "remarks": "Clean bureau" }),
        ))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["cibil_score"], json!(781));
    assert_eq!(body["approved_amount"], json!("200000"));
    assert_eq!(body["remarks"], json!("Clean bureau"));

    let response = router
        .oneshot(empty_request("GET", &application_uri(&created, ""), TOKEN))
        .await
        .expect("router responds");
    let view = read_json_body(response).await;
    assert_eq!(view["credit_assessment"]["cibil_score"], json!(781));
}

#[tokio::test]
async fn delete_returns_no_content() {
    let (service, _, _) = build_service();
    let router = router_for(service);
    let created = create_application(&router, application_payload()).await;

    let response = router
        .clone()
        .oneshot(empty_request("DELETE", &application_uri(&created, ""), TOKEN))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = router
        .oneshot(empty_request("GET", &application_uri(&created, ""), TOKEN))
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn repository_outage_is_an_internal_error() {
    let service = LoanOriginationService::with_defaults(
        Arc::new(UnavailableStore),
        Arc::new(StubGateway::passing()),
    );
    let router = router_for(service);

    let response = router
        .oneshot(empty_request("GET", "/api/v1/los/applications", TOKEN))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn product_with_inverted_age_band_is_rejected() {
    let (service, _, _) = build_service();
    let router = router_for(service);

    let response = router
        .oneshot(json_request(
            "POST",
            "/api/v1/los/products",
            TOKEN,
            json!({
                "name": "Gold Loan",
                "configuration": { "constraints": { "min_age": 70, "max_age": 30 } }
            }),
        ))
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json_body(response).await["detail"],
        json!("min_age 70 exceeds max_age 30")
    );
}
