pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod listing;
pub mod location;
pub mod protocol;
pub mod reltime;
pub mod render;
pub mod source;
pub mod types;

pub use client::{ListingClient, LoadOutcome, LoadState};
pub use config::ClientConfig;
pub use error::{ListingError, Result};
pub use http::HttpListingSource;
pub use listing::{normalize_payload, sort_listing};
pub use location::resolve_location;
pub use protocol::{negotiate, ProtocolVersion, SUPPORTED_PROTOCOL};
pub use reltime::{relative_time, RelativeTime};
pub use render::{ListingView, NavMetadata, Navigator, Renderer, TextRenderer};
pub use source::ListingSource;
pub use types::{BrowseState, Entry, Listing, ListingPayload, WireEntry, WireListingBody};
