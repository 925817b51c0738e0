//! Single entry point for catalog consumers.
//!
//! Book search goes to the remote catalog first and falls back to the offline
//! catalog when the remote call fails or finds nothing. Branches, reservations
//! and reviews have no remote counterpart and are always served by the
//! offline catalog.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::error::{CatalogError, CatalogErrorKind};
use super::fallback::FallbackCatalog;
use super::models::{Book, Branch, Coordinate, Reservation, Review};
use super::query::RemoteCatalog;
use crate::utils;

/// Where the books of a [`SearchOutcome`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Remote,
    Fallback,
}

/// Why the offline catalog answered instead of the remote one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    /// No remote catalog is configured.
    Offline,
    /// The query was blank, which browses the whole offline set.
    BlankQuery,
    /// Transport failure or non-2xx response.
    Network,
    /// The remote response did not decode.
    Decoding,
    /// The remote catalog answered with zero books.
    EmptyResult,
}

impl FallbackReason {
    /// User-facing notice, for the reasons that warrant one.
    fn advisory(self, subject: &str) -> Option<String> {
        match self {
            FallbackReason::Offline | FallbackReason::BlankQuery => None,
            FallbackReason::Network | FallbackReason::Decoding => Some(format!(
                "Could not load \"{}\" from the online catalog. Showing sample data.",
                subject
            )),
            FallbackReason::EmptyResult => Some(format!(
                "No online results for \"{}\". Showing sample data.",
                subject
            )),
        }
    }
}

impl From<CatalogErrorKind> for FallbackReason {
    fn from(kind: CatalogErrorKind) -> Self {
        match kind {
            CatalogErrorKind::Network => FallbackReason::Network,
            CatalogErrorKind::Decoding => FallbackReason::Decoding,
        }
    }
}

/// Outcome of a remote query as seen by the fallback policy.
#[derive(Debug)]
pub enum RemoteDecision {
    Use(Vec<Book>),
    Fallback(FallbackReason),
}

/// Decide whether a remote result is served or replaced by sample data.
/// Errors of either kind and empty result sets all fall back.
pub fn decide(result: Result<Vec<Book>, CatalogError>) -> RemoteDecision {
    match result {
        Ok(books) if books.is_empty() => RemoteDecision::Fallback(FallbackReason::EmptyResult),
        Ok(books) => RemoteDecision::Use(books),
        Err(err) => RemoteDecision::Fallback(err.kind().into()),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub books: Vec<Book>,
    pub source: ResultSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_reason: Option<FallbackReason>,
    /// Non-fatal notice for the reader, set when sample data replaced a
    /// failed or empty remote search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
}

impl SearchOutcome {
    fn remote(books: Vec<Book>) -> Self {
        Self {
            books,
            source: ResultSource::Remote,
            fallback_reason: None,
            advisory: None,
        }
    }

    fn fallback(books: Vec<Book>, reason: FallbackReason, subject: &str) -> Self {
        Self {
            books,
            source: ResultSource::Fallback,
            fallback_reason: Some(reason),
            advisory: reason.advisory(subject),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.source == ResultSource::Fallback
    }
}

pub struct CatalogFacade {
    remote: Option<Arc<dyn RemoteCatalog>>,
    fallback: Arc<FallbackCatalog>,
}

impl CatalogFacade {
    pub fn new(remote: Arc<dyn RemoteCatalog>, fallback: Arc<FallbackCatalog>) -> Self {
        Self {
            remote: Some(remote),
            fallback,
        }
    }

    /// Facade that never touches the network.
    pub fn offline(fallback: Arc<FallbackCatalog>) -> Self {
        Self {
            remote: None,
            fallback,
        }
    }

    pub fn is_offline(&self) -> bool {
        self.remote.is_none()
    }

    pub fn fallback(&self) -> &FallbackCatalog {
        &self.fallback
    }

    /// Search the remote catalog, substituting sample data on failure or an
    /// empty result. Never fails.
    pub async fn search_books(&self, query: &str) -> SearchOutcome {
        let Some(trimmed) = utils::normalize_query(query) else {
            return SearchOutcome::fallback(
                self.fallback.search_books(""),
                FallbackReason::BlankQuery,
                "",
            );
        };

        let Some(remote) = &self.remote else {
            return SearchOutcome::fallback(
                self.fallback.search_books(trimmed),
                FallbackReason::Offline,
                trimmed,
            );
        };

        let result = remote.search_books(trimmed).await;
        if let Err(err) = &result {
            tracing::warn!(query = trimmed, error = %err, "remote catalog search failed");
        }

        match decide(result) {
            RemoteDecision::Use(books) => SearchOutcome::remote(books),
            RemoteDecision::Fallback(reason) => {
                tracing::warn!(query = trimmed, ?reason, "serving sample data");
                SearchOutcome::fallback(self.fallback.search_books(trimmed), reason, trimmed)
            }
        }
    }

    /// Search by genre and label every generic-genre result with `genre`.
    pub async fn browse_genre(&self, genre: &str) -> SearchOutcome {
        let mut outcome = self.search_books(genre).await;
        if let Some(genre) = utils::normalize_query(genre) {
            outcome.books = outcome
                .books
                .into_iter()
                .map(|book| {
                    if book.has_generic_genre() {
                        book.with_genre(genre)
                    } else {
                        book
                    }
                })
                .collect();
        }
        outcome
    }

    /// Always served by the offline catalog.
    pub fn nearby_branches(&self, from: Coordinate, radius_km: f64) -> Vec<Branch> {
        self.fallback.nearby_branches(from, radius_km)
    }

    /// Always served by the offline catalog.
    pub async fn create_reservation(&self, book: Book, branch_id: Uuid) -> Reservation {
        self.fallback.create_reservation(book, branch_id).await
    }

    pub async fn reservations(&self) -> Vec<Reservation> {
        self.fallback.reservations().await
    }

    pub async fn cancel_reservation(&self, id: Uuid) -> Option<Reservation> {
        self.fallback.cancel_reservation(id).await
    }

    /// Always served by the offline catalog.
    pub async fn fetch_reviews(&self, book_id: Uuid) -> Vec<Review> {
        self.fallback.fetch_reviews(book_id).await
    }

    /// Always served by the offline catalog.
    pub async fn add_review(&self, review: Review) {
        self.fallback.add_review(review).await
    }
}
