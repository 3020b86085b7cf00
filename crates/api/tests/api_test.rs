//! HTTP tests driving the router over the in-memory store.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::{Router, body::Body, http::{Method, Request, StatusCode, header}};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use projledger_api::{AppState, create_router};
use projledger_core::project::Project;
use projledger_core::store::InMemoryStore;
use projledger_shared::types::{CompanyId, ProjectId, UserId};
use projledger_shared::{JwtConfig, JwtService};
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: Arc<InMemoryStore>,
    jwt: Arc<JwtService>,
    company: CompanyId,
    token: String,
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let jwt = Arc::new(JwtService::new(&JwtConfig {
            secret: "api-test-secret".to_string(),
            access_token_expiry_secs: 900,
        }));
        let company = CompanyId::new();
        let token = jwt
            .generate_access_token(UserId::new(), company, "owner")
            .unwrap();
        let router = create_router(AppState::new(Arc::clone(&store), Arc::clone(&jwt)));

        Self {
            router,
            store,
            jwt,
            company,
            token,
        }
    }

    async fn project(&self, price: Option<rust_decimal::Decimal>) -> ProjectId {
        let id = ProjectId::new();
        self.store
            .add_project(Project {
                id,
                company_id: self.company,
                client_id: None,
                title: "Website".into(),
                price,
                start_date: Some(date("2024-01-01")),
                due_date: Some(date("2024-12-31")),
                status: "active".into(),
            })
            .await;
        id
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send_as(&self.token, method, uri, body).await
    }

    async fn send_as(
        &self,
        token: &str,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"));
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new();
    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthenticated() {
    let app = TestApp::new();

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/payments")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, body) = app
        .send_as("not-a-jwt", Method::GET, "/api/v1/payments", None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_payment_budget_flow() {
    let app = TestApp::new();
    let project = app.project(Some(dec!(1000))).await;

    let (status, first) = app
        .send(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "project_id": project,
                "amount": 800,
                "payment_method": "bank_transfer",
                "payment_date": "2024-03-01"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(first["amount"], 800.0);

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "project_id": project,
                "amount": 300,
                "payment_method": "cash"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BUDGET_EXCEEDED");
    assert_eq!(body["remaining"], 200.0);

    let id = first["id"].as_str().unwrap().to_string();
    let (status, updated) = app
        .send(
            Method::PUT,
            &format!("/api/v1/payments/{id}"),
            Some(json!({ "amount": 1000, "notes": "paid in full" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["notes"], "paid in full");

    let (status, page) = app.send(Method::GET, "/api/v1/payments?limit=500", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"]["total"], 1);
    assert_eq!(page["pagination"]["limit"], 100);

    let (status, listed) = app
        .send(Method::GET, &format!("/api/v1/projects/{project}/payments"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .send(Method::DELETE, &format!("/api/v1/payments/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .send(Method::GET, &format!("/api/v1/payments/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_payment_validation_errors() {
    let app = TestApp::new();
    let project = app.project(None).await;

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/payments",
            Some(json!({ "project_id": project, "amount": 10, "payment_method": "barter" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_ARGUMENT");

    let (status, body) = app
        .send(
            Method::POST,
            "/api/v1/payments",
            Some(json!({
                "project_id": ProjectId::new(),
                "amount": 10,
                "payment_method": "cash"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_REFERENCE");

    let (status, body) = app
        .send(Method::GET, "/api/v1/payments/not-a-uuid", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_payments_are_tenant_scoped() {
    let app = TestApp::new();
    let project = app.project(None).await;
    let id = app
        .store
        .add_payment_row(app.company, project, dec!(50), date("2024-02-01"))
        .await;

    let outsider = app
        .jwt
        .generate_access_token(UserId::new(), CompanyId::new(), "owner")
        .unwrap();
    let (status, _) = app
        .send_as(&outsider, Method::GET, &format!("/api/v1/payments/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(Method::GET, &format!("/api/v1/payments/{id}"), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_phase_routes() {
    let app = TestApp::new();
    let project = app.project(Some(dec!(500))).await;
    let base = format!("/api/v1/projects/{project}/phases");

    let (status, phase) = app
        .send(
            Method::POST,
            &base,
            Some(json!({
                "title": "Design",
                "amount": 300,
                "start_date": "2024-02-01",
                "end_date": "2024-03-01"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(Method::POST, &base, Some(json!({ "amount": 300 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "BUDGET_EXCEEDED");
    assert_eq!(body["remaining"], 200.0);

    let (status, body) = app
        .send(
            Method::POST,
            &base,
            Some(json!({ "start_date": "2023-12-01" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "INVALID_DATE_RANGE");

    let phase_id = phase["id"].as_str().unwrap().to_string();
    let (status, updated) = app
        .send(
            Method::PUT,
            &format!("{base}/{phase_id}"),
            Some(json!({ "end_date": null })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["end_date"], Value::Null);

    let (status, page) = app.send(Method::GET, &base, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["pagination"]["total"], 1);

    let (status, _) = app
        .send(
            Method::GET,
            &format!("/api/v1/projects/{}/phases", ProjectId::new()),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .send(Method::DELETE, &format!("{base}/{phase_id}"), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_statistics_routes() {
    let app = TestApp::new();
    let project = app.project(Some(dec!(2000))).await;
    app.store
        .add_payment_row(app.company, project, dec!(1000), date("2024-03-10"))
        .await;
    app.store
        .add_payment_row(app.company, project, dec!(500), date("2024-05-10"))
        .await;
    app.store
        .add_expense(app.company, dec!(200), date("2024-03-15"), Some("direct"))
        .await;
    app.store
        .add_expense(app.company, dec!(100), date("2024-03-20"), Some("operational"))
        .await;

    let (status, report) = app
        .send(
            Method::GET,
            "/api/v1/statistics/financial?from_date=2024-03-01&to_date=2024-03-31",
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["totalRevenue"], 1000.0);
    assert_eq!(report["grossProfit"], 800.0);
    assert_eq!(report["netProfit"], 700.0);
    assert_eq!(report["profitMargin"]["percent"], 70.0);
    assert_eq!(report["dateRange"]["from_date"], "2024-03-01");

    let (status, payments) = app
        .send(Method::GET, "/api/v1/statistics/payments", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payments["total"], 1500.0);
    assert_eq!(payments["count"], 2);
    assert_eq!(payments["dateRange"], Value::Null);

    let (status, expenses) = app
        .send(Method::GET, "/api/v1/statistics/expenses", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(expenses["byType"]["operational"], 100.0);

    let (status, overview) = app
        .send(Method::GET, "/api/v1/statistics/overview", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(overview["totalProjects"], 1);
    assert_eq!(overview["totalPaymentsCount"], 2);

    let (status, projects) = app
        .send(Method::GET, "/api/v1/statistics/projects", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(projects["byStatus"]["active"], 1);

    let (status, dashboard) = app
        .send(Method::GET, "/api/v1/statistics?to_date=2024-04-01", None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dashboard["overview"]["totalPaymentsReceived"], 1000.0);
    assert_eq!(dashboard["overview"]["dateRange"]["to_date"], "2024-04-01");

    let (status, body) = app
        .send(Method::GET, "/api/v1/statistics?from_date=March", None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "from_date must be YYYY-MM-DD");
}
