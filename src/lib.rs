//! A command-line client for a personal movie and TV tracking service.
//!
//! moviemate talks to the MovieMate REST API: it lists and filters the
//! collection, shows details with ratings, reviews and watch progress,
//! imports titles from TMDB or OMDB, and turns recommendations into
//! collection entries.
//!
//! # Features
//!
//! - Filtered lists of all content, movies, or TV shows
//! - Ratings, reviews, and episode tracking on the detail page
//! - One-step import of recommended titles
//! - Search and import from external catalogs, or manual entry
//!
//! # Usage
//!
//! ```bash
//! # Everything currently being watched
//! cargo run -- list --status watching
//!
//! # Rate item 7
//! cargo run -- rate 7 9
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod prompt;
pub mod types;
pub mod views;
