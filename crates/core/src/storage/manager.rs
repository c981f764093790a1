use std::path::Path;

use crate::errors::CoreError;
use crate::models::holding::Holding;

/// Loads the static holdings list. Any failure here is fatal: without a valid
/// list there is nothing to aggregate, so callers stop before the scheduler
/// is started.
pub struct HoldingsLoader;

impl HoldingsLoader {
    /// Parse and validate a JSON array of holdings.
    ///
    /// Flow: JSON → `Vec<Holding>` → per-holding invariants → cost basis filled in
    pub fn load_from_str(json: &str) -> Result<Vec<Holding>, CoreError> {
        let holdings: Vec<Holding> = serde_json::from_str(json)
            .map_err(|e| CoreError::Deserialization(format!("Malformed holdings list: {e}")))?;

        if holdings.is_empty() {
            return Err(CoreError::Config("holdings list is empty".into()));
        }

        holdings
            .into_iter()
            .enumerate()
            .map(|(index, holding)| {
                holding.validate(index)?;
                Ok(holding.normalized())
            })
            .collect()
    }

    /// Read and validate a holdings file from disk.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Vec<Holding>, CoreError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("cannot read holdings file {}: {e}", path.display()))
        })?;
        Self::load_from_str(&json)
    }
}
