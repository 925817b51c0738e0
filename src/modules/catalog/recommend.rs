use std::collections::HashSet;

use super::models::Book;

/// Books sharing a genre with something recently viewed and currently on the
/// shelf, ordered by title ignoring case.
pub fn recommend(recently_viewed: &[Book], all_books: &[Book]) -> Vec<Book> {
    let genres: HashSet<&str> = recently_viewed
        .iter()
        .map(|book| book.genre.as_str())
        .collect();
    if genres.is_empty() {
        return Vec::new();
    }

    let mut picks: Vec<Book> = all_books
        .iter()
        .filter(|book| !book.is_borrowed && genres.contains(book.genre.as_str()))
        .cloned()
        .collect();
    picks.sort_by_cached_key(|book| book.title.to_lowercase());
    picks
}
