use async_trait::async_trait;
use crate::{error::Result, types::ListingPayload};

/// Transport abstraction for the listing endpoint
///
/// Implementors issue exactly one request per call and hand back the
/// decoded payload untouched. Version checks and sorting happen in the
/// client, not here.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch the listing for a logical path (always starting with `/`)
    ///
    /// Returns `ListingError::Transport` for any non-success status
    async fn fetch_listing(&self, logical_path: &str) -> Result<ListingPayload>;

    /// Get a human-readable identifier for this source (for logging/debugging)
    fn identifier(&self) -> String;
}
