//! Offline catalog backed by the sample dataset.
//!
//! Serves book search, branch proximity, reservations and reviews from local
//! state. Reservations and reviews live in this instance only; construct one
//! per application run and share it by reference.

use std::ops::RangeInclusive;

use rand::Rng;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::geo::haversine_km;
use super::models::{Book, Branch, Coordinate, Reservation, Review};
use super::sample;
use crate::utils;

/// Queue positions handed out to new reservations.
pub const QUEUE_POSITIONS: RangeInclusive<u32> = 1..=5;

pub struct FallbackCatalog {
    books: Vec<Book>,
    branches: Vec<Branch>,
    reservations: Mutex<Vec<Reservation>>,
    reviews: Mutex<Vec<Review>>,
}

impl FallbackCatalog {
    /// Catalog seeded with the bundled sample data.
    pub fn new() -> Self {
        Self::with_data(sample::books(), sample::branches(), sample::reviews())
    }

    pub fn with_data(books: Vec<Book>, branches: Vec<Branch>, reviews: Vec<Review>) -> Self {
        Self {
            books,
            branches,
            reservations: Mutex::new(Vec::new()),
            reviews: Mutex::new(reviews),
        }
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn find_book(&self, id: Uuid) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    /// Case-insensitive substring match on title, author, genre and ISBN.
    /// A blank query browses the whole set.
    pub fn search_books(&self, query: &str) -> Vec<Book> {
        let Some(query) = utils::normalize_query(query) else {
            return self.books.clone();
        };
        let needle = query.to_lowercase();

        self.books
            .iter()
            .filter(|book| {
                [&book.title, &book.author, &book.genre, &book.isbn]
                    .iter()
                    .any(|field| utils::contains_folded(field, &needle))
            })
            .cloned()
            .collect()
    }

    /// Branches within `radius_km` of `from`, nearest first, each annotated
    /// with its distance.
    pub fn nearby_branches(&self, from: Coordinate, radius_km: f64) -> Vec<Branch> {
        let mut nearby: Vec<(f64, &Branch)> = self
            .branches
            .iter()
            .map(|branch| (haversine_km(from, branch.coordinate), branch))
            .filter(|(distance, _)| *distance <= radius_km)
            .collect();
        nearby.sort_by(|a, b| a.0.total_cmp(&b.0));

        nearby
            .into_iter()
            .map(|(distance, branch)| branch.at_distance(distance))
            .collect()
    }

    /// Place a hold on `book` at `branch_id` with a random queue position.
    pub async fn create_reservation(&self, book: Book, branch_id: Uuid) -> Reservation {
        let queue_position = rand::rng().random_range(QUEUE_POSITIONS);
        let reservation =
            Reservation::new(book, branch_id, queue_position, OffsetDateTime::now_utc());

        tracing::info!(
            reservation = %reservation.id,
            book = %reservation.book.title,
            branch = %branch_id,
            queue_position,
            "reservation created"
        );

        self.reservations.lock().await.push(reservation.clone());
        reservation
    }

    pub async fn reservations(&self) -> Vec<Reservation> {
        self.reservations.lock().await.clone()
    }

    /// Remove a reservation; `None` when it was not held here.
    pub async fn cancel_reservation(&self, id: Uuid) -> Option<Reservation> {
        let mut reservations = self.reservations.lock().await;
        let index = reservations.iter().position(|r| r.id == id)?;
        let cancelled = reservations.remove(index);
        tracing::info!(reservation = %id, "reservation cancelled");
        Some(cancelled)
    }

    /// Reviews of a book, newest submission first.
    pub async fn fetch_reviews(&self, book_id: Uuid) -> Vec<Review> {
        self.reviews
            .lock()
            .await
            .iter()
            .filter(|review| review.book_id == book_id)
            .cloned()
            .collect()
    }

    pub async fn add_review(&self, review: Review) {
        tracing::info!(
            review = %review.id,
            book = %review.book_id,
            rating = review.rating,
            "review added"
        );
        self.reviews.lock().await.insert(0, review);
    }
}

impl Default for FallbackCatalog {
    fn default() -> Self {
        Self::new()
    }
}
