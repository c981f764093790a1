pub mod holding;
pub mod record;
pub mod settings;
pub mod snapshot;
