pub mod traits;

// Upstream implementations
pub mod google_finance;
pub mod yahoo_finance;
