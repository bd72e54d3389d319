//! Storage implementations for the product scraper.
//!
//! Available backends:
//! - `MemoryStore` - In-memory storage (always available)

pub mod memory;

pub use memory::MemoryStore;
