//! Core trait abstractions for the product scraper.
//!
//! Applications implement these to supply page rendering and persistence.

pub mod renderer;
pub mod store;
