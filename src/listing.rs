use std::cmp::Reverse;

use chrono::{DateTime, Utc};

use crate::{
    error::{ListingError, Result},
    types::{Entry, Listing, ListingPayload, WireEntry, WireListingBody},
};

/// Decode and sort a payload.
///
/// Missing collections become empty. The only failure is a server entry
/// without a valid RFC 3339 `last_modified`.
pub fn normalize_payload(payload: ListingPayload) -> Result<Listing> {
    decode_payload(payload).map(sort_listing)
}

/// Build a [`Listing`] from either payload shape, without sorting.
///
/// The nested `listing` container wins when present.
pub fn decode_payload(payload: ListingPayload) -> Result<Listing> {
    let ListingPayload {
        version,
        listing,
        flat,
    } = payload;
    let body: WireListingBody = listing.unwrap_or(flat);

    let files = decode_entries(body.files.unwrap_or_default(), false)?;
    let directories = decode_entries(body.directories.unwrap_or_default(), true)?;

    Ok(Listing {
        version,
        files,
        directories,
        truncated: body.truncated.unwrap_or(false),
    })
}

/// Order files and directories independently, most recent first.
///
/// The sort is stable, so entries with equal timestamps keep their payload
/// order and sorting twice gives the same result.
pub fn sort_listing(mut listing: Listing) -> Listing {
    sort_entries(&mut listing.files);
    sort_entries(&mut listing.directories);
    listing
}

pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by_key(|entry| Reverse(entry.last_modified));
}

fn decode_entries(wire: Vec<WireEntry>, is_directory: bool) -> Result<Vec<Entry>> {
    wire.into_iter()
        .map(|entry| decode_entry(entry, is_directory))
        .collect()
}

fn decode_entry(wire: WireEntry, is_directory: bool) -> Result<Entry> {
    let raw = wire
        .last_modified
        .ok_or_else(|| ListingError::invalid_timestamp(format!("<missing> on {}", wire.url)))?;
    let last_modified = parse_timestamp(&raw)?;

    Ok(Entry {
        url: wire.url,
        thumb_url: wire.thumb_url,
        name: wire.name,
        last_modified: Some(last_modified),
        is_directory,
    })
}

/// Parse an RFC 3339 timestamp as sent by the listing endpoint.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| ListingError::invalid_timestamp(raw))
}
