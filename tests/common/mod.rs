#![allow(dead_code)]

use axum::{
    Json, Router,
    extract::{Path, Query},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use once_cell::sync::Lazy;
use serde_json::{Value, json};
use std::collections::HashMap;

pub const TOKEN: &str = "test-token";
pub const EMPTY_RANGE_FROM: &str = "2000-01-01";

/// Base URL (including `/api`) of a mock upstream that lives for the whole
/// test binary on its own runtime thread.
pub fn upstream_url() -> &'static str {
    static UPSTREAM: Lazy<String> = Lazy::new(|| {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind mock upstream");
        let addr = listener.local_addr().expect("mock upstream addr");
        listener.set_nonblocking(true).expect("nonblocking listener");
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("mock upstream runtime");
            runtime.block_on(async move {
                let listener =
                    tokio::net::TcpListener::from_std(listener).expect("tokio listener");
                axum::serve(listener, mock_router()).await.expect("mock upstream");
            });
        });
        format!("http://{addr}/api")
    });
    &UPSTREAM
}

fn mock_router() -> Router {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/reset-password", post(reset_password))
        .route("/api/admin/get-alumni", get(alumni))
        .route("/api/admin/pending-accounts", get(pending))
        .route("/api/admin/approved-accounts", get(approved))
        .route("/api/admin/approval-email/:id", put(approval))
        .route("/api/admin/unemployed-alumni-data", get(unemployed))
        .route("/api/admin/send-sms/:id", put(send_sms))
        .route("/api/dashboard-analytics", get(analytics))
        .route("/api/careers", get(careers))
        .route("/api/program-events", get(events))
        .route("/api/clustered-certification-employment", get(clusters))
        .route("/api/unemployed-updates", post(bulk_updates))
        .route("/api/send-updates/:phone", post(single_update))
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TOKEN}"))
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Unauthenticated."})),
    )
        .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] == "secret" {
        Json(json!({
            "token": TOKEN,
            "user": {"id": 1, "email": body["email"], "type": "admin", "status": "2", "verified": true}
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid credentials"})),
        )
            .into_response()
    }
}

async fn reset_password(Json(body): Json<Value>) -> Response {
    if body["password"] != body["password_confirmation"] || body["token"].is_null() {
        return (StatusCode::UNPROCESSABLE_ENTITY, "invalid reset").into_response();
    }
    Json(json!({"message": "Password reset"})).into_response()
}

async fn alumni(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"data": [
        {"id": 1, "full_name": "Ana Cruz", "email": "ana@example.edu",
         "phone_number": "+639171234567", "batch": 2020, "employment_status": "2"},
        {"id": 2, "name": "Ben Reyes", "employment_status": 0}
    ]}))
    .into_response()
}

async fn pending(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!({"count": 3})).into_response()
}

async fn approved(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!(42)).into_response()
}

async fn approval(headers: HeaderMap, Path(id): Path<u64>, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    match body["status"].as_str() {
        Some(code @ ("0" | "1" | "2")) => {
            Json(json!({"message": format!("status for {id} set to {code}")})).into_response()
        }
        _ => (StatusCode::UNPROCESSABLE_ENTITY, "bad status").into_response(),
    }
}

async fn unemployed(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([
        {"id": 2, "name": "Ben Reyes", "email": "ben@example.edu",
         "phone": "09181234567", "year_graduated": "2019", "employment_status": "0"}
    ]))
    .into_response()
}

async fn send_sms(headers: HeaderMap, Path(_id): Path<u64>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    StatusCode::OK.into_response()
}

async fn analytics(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if params.get("from").map(String::as_str) == Some(EMPTY_RANGE_FROM) {
        return Json(json!({})).into_response();
    }
    Json(json!({
        "current": [
            {"month": "1", "registrations": 10, "unemployed": 2},
            {"month": 2, "registrations": 8, "unemployed": 1}
        ],
        "previous": [
            {"month": "2", "registrations": 5, "unemployed": 1},
            {"month": "3", "registrations": 4, "unemployed": 0}
        ],
        "region_job_year": {
            "NCR": {
                "Developer": {"2022": 4, "2023": 6},
                "Teacher": {"2023": 3},
                "Nurse": {"2023": 2},
                "Accountant": {"2022": 1},
                "Engineer": {"2022": 5},
                "Designer": {"2023": "7"}
            },
            "Region VII": {"Developer": {"2023": 2}}
        },
        "correlations": [
            {"metric": "Certification vs employment", "score": 0.82},
            {"metric": "Batch vs unemployment", "score": -0.7}
        ],
        "total_alumni": 120,
        "employed_alumni": 90
    }))
    .into_response()
}

async fn careers() -> Json<Value> {
    Json(json!([
        {"id": 7, "title": "Backend Engineer", "organization": "Acme", "location": "Cebu",
         "url": "https://jobs.example.com/7"}
    ]))
}

async fn events() -> Json<Value> {
    Json(json!({"data": []}))
}

async fn clusters() -> Json<Value> {
    Json(json!([
        {"alumni_id": 1, "cluster": 1, "x": 0.9, "y": 1.0},
        {"alumni_id": 2, "cluster": 0, "x": 0.2, "y": 0.0},
        {"alumni_id": 3, "cluster": 1, "x": 0.7, "y": 0.5}
    ]))
}

async fn bulk_updates(Json(body): Json<Value>) -> Response {
    match body["actionType"].as_str() {
        Some(action) => Json(json!({"message": format!("queued {action}")})).into_response(),
        None => (StatusCode::UNPROCESSABLE_ENTITY, "missing actionType").into_response(),
    }
}

async fn single_update(Path(phone): Path<String>) -> Json<Value> {
    Json(json!({"message": format!("sent to {phone}")}))
}
