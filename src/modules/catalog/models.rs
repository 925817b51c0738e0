use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

/// Genre used when a record carries none.
pub const DEFAULT_GENRE: &str = "General";

/// Opening hours used when a branch does not publish any.
pub const DEFAULT_BRANCH_HOURS: &str = "9 AM – 6 PM";

/// How long a reservation is held.
pub const RESERVATION_HOLD: Duration = Duration::hours(24);

/// A catalog record. Records are rebuilt, never edited, once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Book {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: String,
    /// Empty when the source has no ISBN.
    pub isbn: String,
    pub is_borrowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
}

impl Book {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        genre: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
            isbn: isbn.into(),
            is_borrowed: false,
            cover_image_url: None,
        }
    }

    /// Copy of this record under another genre; the id is kept.
    pub fn with_genre(&self, genre: impl Into<String>) -> Self {
        Self {
            genre: genre.into(),
            ..self.clone()
        }
    }

    /// True when the genre is blank or the catch-all [`DEFAULT_GENRE`].
    pub fn has_generic_genre(&self) -> bool {
        let genre = self.genre.trim();
        genre.is_empty() || genre == DEFAULT_GENRE
    }
}

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A physical library location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: Uuid,
    pub name: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    #[serde(default = "default_hours")]
    pub hours: String,
    #[serde(default)]
    pub available_copies: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Kilometers from the queried point; only set by proximity queries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

fn default_hours() -> String {
    DEFAULT_BRANCH_HOURS.to_string()
}

impl Branch {
    /// Copy of this branch annotated with a query-scoped distance.
    pub fn at_distance(&self, distance_km: f64) -> Self {
        Self {
            distance_km: Some(distance_km),
            ..self.clone()
        }
    }
}

/// A hold on a book at a branch. The book is a snapshot taken at reservation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: Uuid,
    pub book: Book,
    pub branch_id: Uuid,
    pub queue_position: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
}

impl Reservation {
    pub fn new(book: Book, branch_id: Uuid, queue_position: u32, created_at: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            book,
            branch_id,
            queue_position,
            created_at,
            expires_at: created_at + RESERVATION_HOLD,
        }
    }
}

/// A reader's review of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub book_id: Uuid,
    pub user_name: String,
    pub rating: u8,
    pub comment: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
