use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// A fine charged against a borrowed book.
///
/// The title is copied in so the history survives catalog changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FineRecord {
    pub id: Uuid,
    pub book_title: String,
    pub amount: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

impl FineRecord {
    pub fn new(book_title: impl Into<String>, amount: f64, date: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_title: book_title.into(),
            amount,
            date,
        }
    }
}

/// Outstanding fines together with their sum.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FineSummary {
    pub records: Vec<FineRecord>,
    pub total_amount: f64,
    pub has_fines: bool,
}
