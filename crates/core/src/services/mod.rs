pub mod aggregator;
pub mod cache;
pub mod quote_service;
pub mod scheduler;
pub mod scraper_service;
