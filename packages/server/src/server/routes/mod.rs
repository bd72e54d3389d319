// HTTP routes
pub mod crawl;
pub mod health;
pub mod jobs;
pub mod scrape;

pub use crawl::*;
pub use health::*;
pub use jobs::*;
pub use scrape::*;
