//! HTTP handlers for the catalog module.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use pocket_http::{error::AppError, extract::JsonBody};
use pocket_kernel::settings::CatalogSettings;
use serde::Deserialize;
use uuid::Uuid;

use super::facade::{CatalogFacade, SearchOutcome};
use super::models::{Book, Branch, Coordinate, Reservation, Review};
use super::recommend::recommend;
use super::review::{NewReview, ReviewError};

#[derive(Clone)]
pub struct CatalogState {
    facade: Arc<CatalogFacade>,
    origin: Coordinate,
    radius_km: f64,
}

impl CatalogState {
    pub fn new(facade: Arc<CatalogFacade>, settings: &CatalogSettings) -> Self {
        Self {
            facade,
            origin: Coordinate::new(settings.default_latitude, settings.default_longitude),
            radius_km: settings.default_radius_km,
        }
    }
}

pub fn router(state: CatalogState) -> Router {
    Router::new()
        .route("/books", get(search_books))
        .route("/books/{id}/reviews", get(list_reviews).post(add_review))
        .route("/genres/{genre}", get(browse_genre))
        .route("/branches", get(nearby_branches))
        .route("/reservations", get(list_reservations).post(create_reservation))
        .route("/reservations/{id}", delete(cancel_reservation))
        .route("/recommendations", post(recommendations))
        .route("/health", get(health_check))
        .with_state(state)
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        AppError::invalid_field(err.field(), err.to_string())
    }
}

async fn health_check() -> &'static str {
    "catalog module is healthy"
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

async fn search_books(
    State(state): State<CatalogState>,
    Query(params): Query<SearchParams>,
) -> Json<SearchOutcome> {
    Json(state.facade.search_books(&params.q).await)
}

async fn browse_genre(
    State(state): State<CatalogState>,
    Path(genre): Path<String>,
) -> Json<SearchOutcome> {
    Json(state.facade.browse_genre(&genre).await)
}

#[derive(Debug, Deserialize)]
struct BranchParams {
    lat: Option<f64>,
    lon: Option<f64>,
    radius_km: Option<f64>,
}

async fn nearby_branches(
    State(state): State<CatalogState>,
    Query(params): Query<BranchParams>,
) -> Result<Json<Vec<Branch>>, AppError> {
    let origin = match (params.lat, params.lon) {
        (Some(latitude), Some(longitude)) => Coordinate::new(latitude, longitude),
        (None, None) => state.origin,
        _ => return Err(AppError::bad_request("lat and lon must be given together")),
    };
    if !origin.is_valid() {
        return Err(AppError::bad_request("coordinate is out of range"));
    }

    let radius_km = params.radius_km.unwrap_or(state.radius_km);
    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(AppError::bad_request("radius_km must be a non-negative number"));
    }

    Ok(Json(state.facade.nearby_branches(origin, radius_km)))
}

async fn list_reservations(State(state): State<CatalogState>) -> Json<Vec<Reservation>> {
    Json(state.facade.reservations().await)
}

#[derive(Debug, Deserialize)]
struct CreateReservation {
    book: Book,
    branch_id: Uuid,
}

async fn create_reservation(
    State(state): State<CatalogState>,
    JsonBody(request): JsonBody<CreateReservation>,
) -> (StatusCode, Json<Reservation>) {
    let reservation = state
        .facade
        .create_reservation(request.book, request.branch_id)
        .await;
    (StatusCode::CREATED, Json(reservation))
}

async fn cancel_reservation(
    State(state): State<CatalogState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    match state.facade.cancel_reservation(id).await {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(AppError::not_found(format!("reservation {} not found", id))),
    }
}

async fn list_reviews(
    State(state): State<CatalogState>,
    Path(book_id): Path<Uuid>,
) -> Json<Vec<Review>> {
    Json(state.facade.fetch_reviews(book_id).await)
}

async fn add_review(
    State(state): State<CatalogState>,
    Path(book_id): Path<Uuid>,
    JsonBody(input): JsonBody<NewReview>,
) -> Result<(StatusCode, Json<Review>), AppError> {
    let review = input.validate(book_id)?;
    state.facade.add_review(review.clone()).await;
    Ok((StatusCode::CREATED, Json(review)))
}

#[derive(Debug, Deserialize)]
struct RecommendationRequest {
    recently_viewed: Vec<Book>,
    /// Candidate pool; the offline catalog when omitted.
    #[serde(default)]
    books: Option<Vec<Book>>,
}

async fn recommendations(
    State(state): State<CatalogState>,
    JsonBody(request): JsonBody<RecommendationRequest>,
) -> Json<Vec<Book>> {
    let picks = match &request.books {
        Some(books) => recommend(&request.recently_viewed, books),
        None => recommend(&request.recently_viewed, state.facade.fallback().books()),
    };
    Json(picks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::catalog::fallback::FallbackCatalog;
    use crate::modules::catalog::sample;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app() -> Router {
        let facade = Arc::new(CatalogFacade::offline(Arc::new(FallbackCatalog::new())));
        router(CatalogState::new(facade, &CatalogSettings::default()))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn search_reports_source_and_reason() {
        let app = app();
        let (status, body) = send(
            &app,
            Request::get("/books?q=orwell").body(Body::empty()).unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "fallback");
        assert_eq!(body["fallback_reason"], "offline");
        assert_eq!(body["books"][0]["title"], "1984");
    }

    #[tokio::test]
    async fn branches_default_to_configured_origin() {
        let app = app();
        let (status, body) = send(&app, Request::get("/branches").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 4);
        assert!(body[0]["distance_km"].is_number());

        let (status, _) = send(
            &app,
            Request::get("/branches?lat=33.9").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &app,
            Request::get("/branches?radius_km=-1").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reservation_lifecycle() {
        let app = app();
        let book = sample::books().remove(0);

        let (status, created) = send(
            &app,
            post_json(
                "/reservations",
                json!({ "book": book, "branch_id": sample::POLLAK_LIBRARY_ID }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        let (_, listed) = send(&app, Request::get("/reservations").body(Body::empty()).unwrap()).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let uri = format!("/reservations/{}", id);
        let (status, _) = send(&app, Request::delete(uri.as_str()).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = send(&app, Request::delete(uri.as_str()).body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "not_found");
    }

    #[tokio::test]
    async fn reviews_are_validated_and_prepended() {
        let app = app();
        let uri = format!("/books/{}/reviews", sample::DUNE_ID);

        let (status, body) = send(
            &app,
            post_json(&uri, json!({ "user_name": "Al", "rating": 9, "comment": "Worth every page." })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["details"][0]["field"], "rating");

        let (status, created) = send(
            &app,
            post_json(&uri, json!({ "user_name": "Al", "rating": 4, "comment": "Worth every page." })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, reviews) = send(&app, Request::get(uri.as_str()).body(Body::empty()).unwrap()).await;
        assert_eq!(reviews.as_array().unwrap().len(), 2);
        assert_eq!(reviews[0]["id"], created["id"]);
    }

    #[tokio::test]
    async fn rejected_review_bodies_use_the_error_envelope() {
        let app = app();
        let uri = format!("/books/{}/reviews", sample::DUNE_ID);

        let (status, body) = send(
            &app,
            post_json(&uri, json!({ "user_name": "Ada", "rating": 300, "comment": "Worth every page." })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "validation_error");
        assert_eq!(body["error"]["details"][0]["field"], "rating");

        let (status, body) = send(
            &app,
            post_json(&uri, json!({ "user_name": "Ada", "rating": "five", "comment": "Worth every page." })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "validation_error");

        let request = Request::post(uri.as_str())
            .header("content-type", "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "bad_request");
    }

    #[tokio::test]
    async fn recommendations_default_to_sample_pool() {
        let app = app();
        let viewed: Vec<Book> = sample::books()
            .into_iter()
            .filter(|b| b.genre == "Mystery")
            .take(1)
            .collect();

        let (status, body) = send(
            &app,
            post_json("/recommendations", json!({ "recently_viewed": viewed })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let titles: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["title"].as_str().unwrap())
            .collect();
        assert_eq!(
            titles,
            vec!["The Hound of the Baskervilles", "The Murder of Roger Ackroyd"]
        );
    }
}
