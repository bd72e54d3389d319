//! Data types for the product scraper.

pub mod api;
pub mod config;
pub mod job;
pub mod product;
