//! Data models for the Bookstore

pub mod book;
pub mod review;

// Re-export commonly used types
pub use book::{Book, BookQuery, CreateBook, UpdateBook};
pub use review::{CreateReview, Review};
