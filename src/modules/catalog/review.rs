//! Review submission and validation.

use serde::Deserialize;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use super::models::Review;

pub const MIN_NAME_CHARS: usize = 2;
pub const MAX_NAME_CHARS: usize = 50;
pub const MIN_COMMENT_CHARS: usize = 10;
pub const MAX_COMMENT_CHARS: usize = 500;
pub const RATING_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("Please enter your name.")]
    MissingName,

    #[error(
        "Your name must be between {} and {} characters long.",
        MIN_NAME_CHARS,
        MAX_NAME_CHARS
    )]
    NameLength,

    #[error("Please enter a comment for your review.")]
    MissingComment,

    #[error(
        "Your comment must be between {} and {} characters long.",
        MIN_COMMENT_CHARS,
        MAX_COMMENT_CHARS
    )]
    CommentLength,

    #[error("Rating must be between 1 and 5, got {0}.")]
    Rating(i64),
}

impl ReviewError {
    /// Name of the offending input field.
    pub fn field(&self) -> &'static str {
        match self {
            ReviewError::MissingName | ReviewError::NameLength => "user_name",
            ReviewError::MissingComment | ReviewError::CommentLength => "comment",
            ReviewError::Rating(_) => "rating",
        }
    }
}

/// Unvalidated review input as a reader submits it.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub user_name: String,
    /// Wide so out-of-range numbers reach validation.
    pub rating: i64,
    pub comment: String,
}

impl NewReview {
    /// Trim and bound-check the input, producing a dated review of `book_id`.
    pub fn validate(&self, book_id: Uuid) -> Result<Review, ReviewError> {
        let user_name = self.user_name.trim();
        let comment = self.comment.trim();

        if user_name.is_empty() {
            return Err(ReviewError::MissingName);
        }
        if !(MIN_NAME_CHARS..=MAX_NAME_CHARS).contains(&user_name.chars().count()) {
            return Err(ReviewError::NameLength);
        }
        if comment.is_empty() {
            return Err(ReviewError::MissingComment);
        }
        if !(MIN_COMMENT_CHARS..=MAX_COMMENT_CHARS).contains(&comment.chars().count()) {
            return Err(ReviewError::CommentLength);
        }
        let rating = u8::try_from(self.rating)
            .ok()
            .filter(|rating| RATING_RANGE.contains(rating))
            .ok_or(ReviewError::Rating(self.rating))?;

        Ok(Review {
            id: Uuid::new_v4(),
            book_id,
            user_name: user_name.to_string(),
            rating,
            comment: comment.to_string(),
            created_at: OffsetDateTime::now_utc(),
        })
    }
}
