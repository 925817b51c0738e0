pub mod ledger;
pub mod models;
pub mod routes;
pub mod store;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use pocket_kernel::{settings::FineSettings, InitCtx, Module};

use ledger::FineLedger;

/// Fine history backed by the preferences file.
pub struct FinesModule {
    ledger: Arc<FineLedger>,
}

impl FinesModule {
    pub fn new(ledger: Arc<FineLedger>) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Arc<FineLedger> {
        &self.ledger
    }
}

#[async_trait]
impl Module for FinesModule {
    fn name(&self) -> &'static str {
        "fines"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        let count = self.ledger.load().await;
        tracing::info!(
            module = self.name(),
            path = %ctx.settings.fines.storage_path.display(),
            fines = count,
            "fines module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.ledger.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(openapi_fragment())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        let outstanding = self.ledger.total_amount().await;
        tracing::info!(
            module = self.name(),
            outstanding,
            "fines module stopped"
        );
        Ok(())
    }
}

/// Create a new instance of the fines module
pub fn create_module(settings: &FineSettings) -> Arc<dyn Module> {
    Arc::new(FinesModule::new(Arc::new(FineLedger::from_settings(settings))))
}

fn openapi_fragment() -> serde_json::Value {
    serde_json::json!({
        "paths": {
            "/": {
                "get": {
                    "summary": "Outstanding fines and their total",
                    "tags": ["Fines"],
                    "responses": {
                        "200": {
                            "description": "Fine summary",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/FineSummary" }
                                }
                            }
                        }
                    }
                },
                "post": {
                    "summary": "Record a fine",
                    "tags": ["Fines"],
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {
                                    "type": "object",
                                    "properties": {
                                        "book_title": { "type": "string" },
                                        "amount": { "type": "number", "minimum": 0 }
                                    },
                                    "required": ["book_title", "amount"]
                                }
                            }
                        }
                    },
                    "responses": {
                        "201": {
                            "description": "Fine recorded",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/FineRecord" }
                                }
                            }
                        },
                        "422": {
                            "description": "Invalid title or amount",
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                }
                            }
                        }
                    }
                }
            },
            "/pay": {
                "post": {
                    "summary": "Pay every outstanding fine",
                    "tags": ["Fines"],
                    "responses": {
                        "200": { "description": "Number of fines paid" }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "FineRecord": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "string", "format": "uuid" },
                        "book_title": { "type": "string" },
                        "amount": { "type": "number", "minimum": 0 },
                        "date": { "type": "string", "format": "date-time" }
                    },
                    "required": ["id", "book_title", "amount", "date"]
                },
                "FineSummary": {
                    "type": "object",
                    "properties": {
                        "records": {
                            "type": "array",
                            "items": { "$ref": "#/components/schemas/FineRecord" }
                        },
                        "total_amount": { "type": "number" },
                        "has_fines": { "type": "boolean" }
                    },
                    "required": ["records", "total_amount", "has_fines"]
                }
            }
        }
    })
}
