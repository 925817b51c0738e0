//! Remote full-text book search.
//!
//! Issues `GET {endpoint}?q=<query>&limit=<n>` against an Open Library style
//! search API and maps each result document onto a [`Book`]:
//! documents without a title are dropped, the first author/subject/ISBN wins,
//! and `cover_i` becomes a cover URL.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use pocket_kernel::settings::CatalogSettings;
use serde::Deserialize;
use uuid::Uuid;

use super::error::CatalogError;
use super::models::{Book, DEFAULT_GENRE};
use crate::utils;

pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

const COVER_URL_PREFIX: &str = "https://covers.openlibrary.org/b/id/";
const COVER_URL_SUFFIX: &str = "-M.jpg";

/// Medium-size cover image URL for an Open Library cover id.
pub fn cover_url(cover_id: i64) -> String {
    format!("{}{}{}", COVER_URL_PREFIX, cover_id, COVER_URL_SUFFIX)
}

/// A searchable remote catalog.
#[async_trait]
pub trait RemoteCatalog: Send + Sync {
    /// Search by free text. A blank query yields no books and no request.
    async fn search_books(&self, query: &str) -> Result<Vec<Book>, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Deserialize)]
struct SearchDoc {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    author_name: Vec<String>,
    #[serde(default)]
    subject: Vec<String>,
    #[serde(default)]
    isbn: Vec<String>,
    #[serde(default)]
    cover_i: Option<i64>,
}

impl SearchDoc {
    fn into_book(self) -> Option<Book> {
        let title = self.title?.trim().to_string();
        if title.is_empty() {
            return None;
        }

        let author = self
            .author_name
            .into_iter()
            .next()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string());

        let genre = self
            .subject
            .into_iter()
            .map(|subject| subject.trim().to_string())
            .find(|subject| !subject.is_empty())
            .unwrap_or_else(|| DEFAULT_GENRE.to_string());

        Some(Book {
            id: Uuid::new_v4(),
            title,
            author,
            genre,
            isbn: self.isbn.into_iter().next().unwrap_or_default(),
            is_borrowed: false,
            cover_image_url: self.cover_i.map(cover_url),
        })
    }
}

/// HTTP client for the remote search endpoint.
#[derive(Debug, Clone)]
pub struct CatalogQuery {
    client: reqwest::Client,
    endpoint: String,
    limit: u32,
}

impl CatalogQuery {
    /// Build a client honoring the configured timeout and user agent.
    pub fn new(settings: &CatalogSettings) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(settings.request_timeout_ms))
            .user_agent(settings.user_agent.clone())
            .build()
            .with_context(|| "failed to build catalog HTTP client")?;

        Ok(Self::with_client(
            client,
            settings.search_endpoint.clone(),
            settings.result_limit,
        ))
    }

    pub fn with_client(client: reqwest::Client, endpoint: impl Into<String>, limit: u32) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            limit,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Query the remote catalog. Result order follows the response.
    pub async fn search(&self, query: &str) -> Result<Vec<Book>, CatalogError> {
        let Some(query) = utils::normalize_query(query) else {
            return Ok(Vec::new());
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            query,
            limit = self.limit,
            "querying remote catalog"
        );

        let limit = self.limit.to_string();
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("limit", limit.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Status { status });
        }

        let body = response.bytes().await?;
        let parsed: SearchResponse =
            serde_json::from_slice(&body).map_err(CatalogError::Decoding)?;

        let total = parsed.docs.len();
        let books: Vec<Book> = parsed
            .docs
            .into_iter()
            .filter_map(SearchDoc::into_book)
            .collect();

        tracing::debug!(
            query,
            documents = total,
            books = books.len(),
            "remote catalog responded"
        );

        Ok(books)
    }
}

#[async_trait]
impl RemoteCatalog for CatalogQuery {
    async fn search_books(&self, query: &str) -> Result<Vec<Book>, CatalogError> {
        self.search(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::catalog::error::CatalogErrorKind;
    use mockito::{Matcher, Server};

    fn query_for(server: &Server) -> CatalogQuery {
        CatalogQuery::with_client(
            reqwest::Client::new(),
            format!("{}/search.json", server.url()),
            20,
        )
    }

    #[tokio::test]
    async fn maps_documents_in_response_order() {
        let mut server = Server::new_async().await;
        let body = r#"{
            "numFound": 3,
            "docs": [
                {
                    "title": "Dune",
                    "author_name": ["Frank Herbert", "Someone Else"],
                    "subject": ["  ", "Science fiction", "Deserts"],
                    "isbn": ["9780441013593", "0441013597"],
                    "cover_i": 12345
                },
                { "author_name": ["Nobody"], "cover_i": 1 },
                { "title": "Dune Messiah" }
            ]
        }"#;

        let mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "dune".into()),
                Matcher::UrlEncoded("limit".into(), "20".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let books = query_for(&server).search("  dune ").await.unwrap();
        mock.assert_async().await;

        assert_eq!(books.len(), 2);

        let dune = &books[0];
        assert_eq!(dune.title, "Dune");
        assert_eq!(dune.author, "Frank Herbert");
        assert_eq!(dune.genre, "Science fiction");
        assert_eq!(dune.isbn, "9780441013593");
        assert!(!dune.is_borrowed);
        assert_eq!(
            dune.cover_image_url.as_deref(),
            Some("https://covers.openlibrary.org/b/id/12345-M.jpg")
        );

        let messiah = &books[1];
        assert_eq!(messiah.title, "Dune Messiah");
        assert_eq!(messiah.author, UNKNOWN_AUTHOR);
        assert_eq!(messiah.genre, DEFAULT_GENRE);
        assert_eq!(messiah.isbn, "");
        assert!(messiah.cover_image_url.is_none());
    }

    #[tokio::test]
    async fn percent_encodes_the_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::UrlEncoded("q".into(), "war & peace".into()))
            .with_status(200)
            .with_body(r#"{"docs": []}"#)
            .create_async()
            .await;

        let books = query_for(&server).search("war & peace").await.unwrap();
        mock.assert_async().await;
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn blank_query_makes_no_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let books = query_for(&server).search(" \t\n").await.unwrap();
        mock.assert_async().await;
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn non_success_status_is_a_network_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let err = query_for(&server).search("dune").await.unwrap_err();
        assert_eq!(err.kind(), CatalogErrorKind::Network);
        assert!(matches!(err, CatalogError::Status { status } if status.as_u16() == 503));
    }

    #[tokio::test]
    async fn schema_mismatch_is_a_decoding_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/search.json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"results": "not the expected shape"}"#)
            .create_async()
            .await;

        let err = query_for(&server).search("dune").await.unwrap_err();
        assert_eq!(err.kind(), CatalogErrorKind::Decoding);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_network_error() {
        let query = CatalogQuery::with_client(
            reqwest::Client::new(),
            "http://127.0.0.1:1/search.json",
            20,
        );
        let err = query.search("dune").await.unwrap_err();
        assert_eq!(err.kind(), CatalogErrorKind::Network);
    }

    #[test]
    fn cover_url_follows_template() {
        assert_eq!(
            cover_url(12345),
            "https://covers.openlibrary.org/b/id/12345-M.jpg"
        );
    }

    #[test]
    fn client_builds_from_settings() {
        let query = CatalogQuery::new(&CatalogSettings::default()).unwrap();
        assert_eq!(query.endpoint(), "https://openlibrary.org/search.json");
    }
}
