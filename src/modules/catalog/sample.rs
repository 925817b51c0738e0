//! Seed data for the offline catalog: twenty books, five branches around
//! Fullerton, CA, and two reviews.

use time::macros::datetime;
use uuid::Uuid;

use super::models::{Book, Branch, Coordinate, Review};

const fn book_id(n: u128) -> Uuid {
    Uuid::from_u128(0x0b00_0000_0000_4000_8000_0000_0000_0000 | n)
}

const fn branch_id(n: u128) -> Uuid {
    Uuid::from_u128(0x0b4a_0000_0000_4000_8000_0000_0000_0000 | n)
}

const fn review_id(n: u128) -> Uuid {
    Uuid::from_u128(0x04e7_0000_0000_4000_8000_0000_0000_0000 | n)
}

pub const DUNE_ID: Uuid = book_id(1);
pub const HOBBIT_ID: Uuid = book_id(7);
pub const POLLAK_LIBRARY_ID: Uuid = branch_id(1);

// (title, author, genre, isbn, borrowed)
const BOOKS: [(&str, &str, &str, &str, bool); 20] = [
    ("Dune", "Frank Herbert", "Sci-Fi", "9780441013593", false),
    ("Neuromancer", "William Gibson", "Sci-Fi", "9780441569595", true),
    ("Foundation", "Isaac Asimov", "Sci-Fi", "9780553293357", true),
    ("The Left Hand of Darkness", "Ursula K. Le Guin", "Sci-Fi", "9780441478125", false),
    ("Pride and Prejudice", "Jane Austen", "Romance", "9780141439518", false),
    ("Jane Eyre", "Charlotte Brontë", "Romance", "9780141441146", false),
    ("The Hobbit", "J.R.R. Tolkien", "Fantasy", "9780547928227", true),
    ("A Wizard of Earthsea", "Ursula K. Le Guin", "Fantasy", "9780547773742", false),
    ("The Name of the Wind", "Patrick Rothfuss", "Fantasy", "9780756404741", false),
    ("The Hound of the Baskervilles", "Arthur Conan Doyle", "Mystery", "9780141199214", false),
    ("The Murder of Roger Ackroyd", "Agatha Christie", "Mystery", "9780062073563", false),
    ("Gone Girl", "Gillian Flynn", "Thriller", "9780307588371", true),
    ("The Girl with the Dragon Tattoo", "Stieg Larsson", "Thriller", "9780307454546", false),
    ("Sapiens", "Yuval Noah Harari", "History", "9780062316097", false),
    ("The Guns of August", "Barbara W. Tuchman", "History", "9780345476098", false),
    ("A Brief History of Time", "Stephen Hawking", "Science", "9780553380163", false),
    ("The Selfish Gene", "Richard Dawkins", "Science", "9780198788607", false),
    ("Educated", "Tara Westover", "Biography", "9780399590504", true),
    ("Steve Jobs", "Walter Isaacson", "Biography", "9781451648539", false),
    ("1984", "George Orwell", "Classics", "9780451524935", false),
];

pub fn books() -> Vec<Book> {
    BOOKS
        .iter()
        .zip(1u128..)
        .map(|(&(title, author, genre, isbn, is_borrowed), n)| Book {
            id: book_id(n),
            title: title.to_string(),
            author: author.to_string(),
            genre: genre.to_string(),
            isbn: isbn.to_string(),
            is_borrowed,
            cover_image_url: None,
        })
        .collect()
}

pub fn branches() -> Vec<Branch> {
    let branch = |n: u128,
                  name: &str,
                  (latitude, longitude): (f64, f64),
                  hours: &str,
                  available_copies: u32,
                  address: &str| Branch {
        id: branch_id(n),
        name: name.to_string(),
        coordinate: Coordinate::new(latitude, longitude),
        hours: hours.to_string(),
        available_copies,
        address: Some(address.to_string()),
        distance_km: None,
    };

    vec![
        branch(
            1,
            "Pollak Library, CSUF",
            (33.8814, -117.8854),
            "7 AM – 11 PM",
            5,
            "800 N State College Blvd, Fullerton, CA 92831",
        ),
        branch(
            2,
            "Fullerton Public Library",
            (33.8704, -117.9243),
            "10 AM – 8 PM",
            3,
            "353 W Commonwealth Ave, Fullerton, CA 92832",
        ),
        branch(
            3,
            "Placentia Library",
            (33.8722, -117.8703),
            "10 AM – 7 PM",
            1,
            "411 E Chapman Ave, Placentia, CA 92870",
        ),
        branch(
            4,
            "Anaheim Central Library",
            (33.8353, -117.9145),
            "9 AM – 6 PM",
            0,
            "500 W Broadway, Anaheim, CA 92805",
        ),
        branch(
            5,
            "Los Angeles Central Library",
            (34.0505, -118.2551),
            "10 AM – 8 PM",
            7,
            "630 W 5th St, Los Angeles, CA 90071",
        ),
    ]
}

pub fn reviews() -> Vec<Review> {
    vec![
        Review {
            id: review_id(1),
            book_id: DUNE_ID,
            user_name: "Maya".to_string(),
            rating: 5,
            comment: "Dense, strange and completely absorbing. The ecology alone is worth it."
                .to_string(),
            created_at: datetime!(2025-11-02 18:30 UTC),
        },
        Review {
            id: review_id(2),
            book_id: HOBBIT_ID,
            user_name: "Jordan".to_string(),
            rating: 4,
            comment: "A cozy adventure that reads aloud beautifully.".to_string(),
            created_at: datetime!(2025-11-05 09:15 UTC),
        },
    ]
}
