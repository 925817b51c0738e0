pub mod error;
pub mod facade;
pub mod fallback;
pub mod geo;
pub mod models;
pub mod query;
pub mod recommend;
pub mod review;
pub mod routes;
pub mod sample;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use pocket_kernel::{settings::CatalogSettings, InitCtx, Module};

use facade::CatalogFacade;
use fallback::FallbackCatalog;
use query::CatalogQuery;

/// Book search, branches, reservations and reviews.
pub struct CatalogModule {
    facade: Arc<CatalogFacade>,
    state: routes::CatalogState,
}

impl CatalogModule {
    pub fn new(facade: Arc<CatalogFacade>, settings: &CatalogSettings) -> Self {
        let state = routes::CatalogState::new(facade.clone(), settings);
        Self { facade, state }
    }

    pub fn facade(&self) -> &Arc<CatalogFacade> {
        &self.facade
    }
}

#[async_trait]
impl Module for CatalogModule {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            offline = self.facade.is_offline(),
            endpoint = %ctx.settings.catalog.search_endpoint,
            sample_books = self.facade.fallback().books().len(),
            "catalog module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let held = self.facade.reservations().await.len();
        tracing::info!(
            module = self.name(),
            reservations = held,
            "catalog module stopped"
        );
        Ok(())
    }
}

/// Build the facade described by `settings`: remote-backed unless offline.
pub fn build_facade(settings: &CatalogSettings) -> anyhow::Result<CatalogFacade> {
    let fallback = Arc::new(FallbackCatalog::new());
    if settings.offline {
        return Ok(CatalogFacade::offline(fallback));
    }
    let remote = CatalogQuery::new(settings)?;
    Ok(CatalogFacade::new(Arc::new(remote), fallback))
}

/// Create a new instance of the catalog module
pub fn create_module(settings: &CatalogSettings) -> anyhow::Result<Arc<dyn Module>> {
    let facade = Arc::new(build_facade(settings)?);
    Ok(Arc::new(CatalogModule::new(facade, settings)))
}

fn openapi_fragment() -> serde_json::Value {
    let schema_ref =
        |name: &str| serde_json::json!({ "$ref": format!("#/components/schemas/{}", name) });
    let array_of = |name: &str| serde_json::json!({ "type": "array", "items": schema_ref(name) });
    let json_content =
        |schema: serde_json::Value| serde_json::json!({ "application/json": { "schema": schema } });
    let error = json_content(schema_ref("ErrorResponse"));

    serde_json::json!({
        "paths": {
            "/books": {
                "get": {
                    "summary": "Search books, falling back to sample data",
                    "tags": ["Catalog"],
                    "parameters": [
                        { "name": "q", "in": "query", "required": false, "schema": { "type": "string" } }
                    ],
                    "responses": {
                        "200": { "description": "Search outcome", "content": json_content(schema_ref("SearchOutcome")) }
                    }
                }
            },
            "/genres/{genre}": {
                "get": {
                    "summary": "Browse a genre",
                    "tags": ["Catalog"],
                    "parameters": [
                        { "name": "genre", "in": "path", "required": true, "schema": { "type": "string" } }
                    ],
                    "responses": {
                        "200": { "description": "Search outcome", "content": json_content(schema_ref("SearchOutcome")) }
                    }
                }
            },
            "/branches": {
                "get": {
                    "summary": "Branches near a coordinate",
                    "tags": ["Catalog"],
                    "parameters": [
                        { "name": "lat", "in": "query", "required": false, "schema": { "type": "number" } },
                        { "name": "lon", "in": "query", "required": false, "schema": { "type": "number" } },
                        { "name": "radius_km", "in": "query", "required": false, "schema": { "type": "number" } }
                    ],
                    "responses": {
                        "200": { "description": "Branches, nearest first", "content": json_content(array_of("Branch")) },
                        "400": { "description": "Invalid coordinate or radius", "content": error }
                    }
                }
            },
            "/reservations": {
                "get": {
                    "summary": "Reservations held in this session",
                    "tags": ["Catalog"],
                    "responses": {
                        "200": { "description": "Reservations", "content": json_content(array_of("Reservation")) }
                    }
                },
                "post": {
                    "summary": "Reserve a book at a branch",
                    "tags": ["Catalog"],
                    "responses": {
                        "201": { "description": "Reservation created", "content": json_content(schema_ref("Reservation")) }
                    }
                }
            },
            "/reservations/{id}": {
                "delete": {
                    "summary": "Cancel a reservation",
                    "tags": ["Catalog"],
                    "parameters": [
                        { "name": "id", "in": "path", "required": true, "schema": { "type": "string", "format": "uuid" } }
                    ],
                    "responses": {
                        "204": { "description": "Cancelled" },
                        "404": { "description": "Unknown reservation", "content": error }
                    }
                }
            },
            "/books/{id}/reviews": {
                "get": {
                    "summary": "Reviews of a book, newest first",
                    "tags": ["Catalog"],
                    "parameters": [
                        { "name": "id", "in": "path", "required": true, "schema": { "type": "string", "format": "uuid" } }
                    ],
                    "responses": {
                        "200": { "description": "Reviews", "content": json_content(array_of("Review")) }
                    }
                },
                "post": {
                    "summary": "Submit a review",
                    "tags": ["Catalog"],
                    "parameters": [
                        { "name": "id", "in": "path", "required": true, "schema": { "type": "string", "format": "uuid" } }
                    ],
                    "responses": {
                        "201": { "description": "Review stored", "content": json_content(schema_ref("Review")) },
                        "422": { "description": "Review rejected", "content": error }
                    }
                }
            },
            "/recommendations": {
                "post": {
                    "summary": "Recommend available books in recently viewed genres",
                    "tags": ["Catalog"],
                    "responses": {
                        "200": { "description": "Recommended books", "content": json_content(array_of("Book")) }
                    }
                }
            }
        },
        "components": {
            "schemas": openapi_schemas()
        }
    })
}

fn openapi_schemas() -> serde_json::Value {
    let book_ref = serde_json::json!({ "$ref": "#/components/schemas/Book" });

    serde_json::json!({
        "Book": {
            "type": "object",
            "properties": {
                "id": { "type": "string", "format": "uuid" },
                "title": { "type": "string" },
                "author": { "type": "string" },
                "genre": { "type": "string" },
                "isbn": { "type": "string" },
                "is_borrowed": { "type": "boolean" },
                "cover_image_url": { "type": "string", "format": "uri" }
            },
            "required": ["id", "title", "author", "genre", "isbn", "is_borrowed"]
        },
        "Branch": {
            "type": "object",
            "properties": {
                "id": { "type": "string", "format": "uuid" },
                "name": { "type": "string" },
                "latitude": { "type": "number" },
                "longitude": { "type": "number" },
                "hours": { "type": "string" },
                "available_copies": { "type": "integer", "minimum": 0 },
                "address": { "type": "string" },
                "distance_km": { "type": "number" }
            },
            "required": ["id", "name", "latitude", "longitude", "hours", "available_copies"]
        },
        "Reservation": {
            "type": "object",
            "properties": {
                "id": { "type": "string", "format": "uuid" },
                "book": book_ref,
                "branch_id": { "type": "string", "format": "uuid" },
                "queue_position": { "type": "integer", "minimum": 1, "maximum": 5 },
                "created_at": { "type": "string", "format": "date-time" },
                "expires_at": { "type": "string", "format": "date-time" }
            },
            "required": ["id", "book", "branch_id", "queue_position", "created_at", "expires_at"]
        },
        "Review": {
            "type": "object",
            "properties": {
                "id": { "type": "string", "format": "uuid" },
                "book_id": { "type": "string", "format": "uuid" },
                "user_name": { "type": "string", "minLength": 2, "maxLength": 50 },
                "rating": { "type": "integer", "minimum": 1, "maximum": 5 },
                "comment": { "type": "string", "minLength": 10, "maxLength": 500 },
                "created_at": { "type": "string", "format": "date-time" }
            },
            "required": ["id", "book_id", "user_name", "rating", "comment", "created_at"]
        },
        "SearchOutcome": {
            "type": "object",
            "properties": {
                "books": { "type": "array", "items": book_ref },
                "source": { "type": "string", "enum": ["remote", "fallback"] },
                "fallback_reason": {
                    "type": "string",
                    "enum": ["offline", "blank_query", "network", "decoding", "empty_result"]
                },
                "advisory": { "type": "string" }
            },
            "required": ["books", "source"]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pocket_kernel::settings::Settings;

    #[test]
    fn offline_settings_build_an_offline_facade() {
        let settings = CatalogSettings {
            offline: true,
            ..CatalogSettings::default()
        };
        assert!(build_facade(&settings).unwrap().is_offline());
        assert!(!build_facade(&CatalogSettings::default()).unwrap().is_offline());
    }

    #[tokio::test]
    async fn module_lifecycle_and_openapi() {
        let settings = Settings::default();
        let module = create_module(&settings.catalog).unwrap();
        let ctx = InitCtx {
            settings: &settings,
        };

        assert_eq!(module.name(), "catalog");
        module.init(&ctx).await.unwrap();
        module.start(&ctx).await.unwrap();
        module.stop().await.unwrap();

        let spec = module.openapi().unwrap();
        assert!(spec["paths"]["/books"]["get"].is_object());
        assert!(spec["components"]["schemas"]["SearchOutcome"].is_object());
        assert_eq!(
            spec["paths"]["/branches"]["get"]["responses"]["200"]["content"]["application/json"]
                ["schema"]["items"]["$ref"],
            "#/components/schemas/Branch"
        );
    }
}
