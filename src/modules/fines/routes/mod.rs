use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use pocket_http::{error::AppError, extract::JsonBody};
use serde::{Deserialize, Serialize};

use super::ledger::{FineError, FineLedger};
use super::models::{FineRecord, FineSummary};

pub fn router(ledger: Arc<FineLedger>) -> Router {
    Router::new()
        .route("/", get(list_fines).post(add_fine))
        .route("/pay", post(pay_all))
        .with_state(ledger)
}

impl From<FineError> for AppError {
    fn from(err: FineError) -> Self {
        match err.field() {
            Some(field) => AppError::invalid_field(field, err.to_string()),
            None => AppError::Internal(anyhow::Error::new(err)),
        }
    }
}

async fn list_fines(State(ledger): State<Arc<FineLedger>>) -> Json<FineSummary> {
    Json(ledger.summary().await)
}

#[derive(Debug, Deserialize)]
struct AddFine {
    book_title: String,
    amount: f64,
}

async fn add_fine(
    State(ledger): State<Arc<FineLedger>>,
    JsonBody(request): JsonBody<AddFine>,
) -> Result<(StatusCode, Json<FineRecord>), AppError> {
    let fine = ledger.add_fine(&request.book_title, request.amount).await?;
    Ok((StatusCode::CREATED, Json(fine)))
}

#[derive(Debug, Serialize)]
struct Payment {
    paid: usize,
}

async fn pay_all(State(ledger): State<Arc<FineLedger>>) -> Result<Json<Payment>, AppError> {
    let paid = ledger.pay_all().await?;
    Ok(Json(Payment { paid }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::fines::store::PreferencesStore;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn add_list_and_pay() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Arc::new(FineLedger::new(
            PreferencesStore::new(dir.path().join("prefs.json")),
            "FineHistory",
        ));
        let app = router(ledger);

        let (status, fine) = send(
            &app,
            post_json("/", json!({ "book_title": "Dune", "amount": 1.5 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(fine["book_title"], "Dune");

        let (status, summary) = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(summary["total_amount"], 1.5);
        assert_eq!(summary["has_fines"], true);

        let (status, paid) = send(&app, Request::post("/pay").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(paid["paid"], 1);

        let (_, summary) = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(summary["records"], json!([]));
    }

    #[tokio::test]
    async fn negative_amount_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Arc::new(FineLedger::new(
            PreferencesStore::new(dir.path().join("prefs.json")),
            "FineHistory",
        ));

        let (status, body) = send(
            &router(ledger),
            post_json("/", json!({ "book_title": "Dune", "amount": -2.0 })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["details"][0]["field"], "amount");
    }

    #[tokio::test]
    async fn non_numeric_amount_uses_the_error_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = Arc::new(FineLedger::new(
            PreferencesStore::new(dir.path().join("prefs.json")),
            "FineHistory",
        ));

        let (status, body) = send(
            &router(ledger.clone()),
            post_json("/", json!({ "book_title": "Dune", "amount": "a lot" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "validation_error");
        assert!(!ledger.has_fines().await);
    }
}
