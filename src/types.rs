use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One file or directory as shown in the browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    /// Server-relative resource path
    pub url: String,
    /// Server-relative thumbnail path
    pub thumb_url: String,
    /// Display name
    pub name: String,
    /// Absent only for synthetic navigation entries
    pub last_modified: Option<DateTime<Utc>>,
    pub is_directory: bool,
}

impl Entry {
    /// True for the root and parent shortcuts, which never come from the server
    pub fn is_synthetic(&self) -> bool {
        self.last_modified.is_none()
    }
}

/// A normalized directory listing for one logical path
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Version string exactly as received
    pub version: String,
    pub files: Vec<Entry>,
    pub directories: Vec<Entry>,
    /// Whether the server capped the number of entries
    pub truncated: bool,
}

/// Where the user is browsing, derived from the current location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseState {
    /// Path below the mount prefix, always starting with `/`
    pub logical_path: String,
    pub is_root: bool,
    /// Logical path with the last segment removed; empty means root
    pub parent_path: String,
}

/// Entry as it appears on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireEntry {
    pub url: String,
    pub thumb_url: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<String>,
}

/// Collections of a listing, either at the top level (0.1.x) or nested
/// under `listing` (0.2.x)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WireListingBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<WireEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directories: Option<Vec<WireEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated: Option<bool>,
}

/// Raw decoded response of the listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingPayload {
    /// Kept as text even when missing or not a string, so the version
    /// check is the one to reject it
    #[serde(default, deserialize_with = "version_text")]
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listing: Option<WireListingBody>,
    #[serde(flatten)]
    pub flat: WireListingBody,
}

fn version_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(version) => version,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_entry_serializes_timestamp() {
        let entry = Entry {
            url: "/a.txt".to_string(),
            thumb_url: "/thumb".to_string(),
            name: "a.txt".to_string(),
            last_modified: Some(Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()),
            is_directory: false,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["last_modified"], "2021-01-01T00:00:00Z");
        assert_eq!(json["is_directory"], false);
    }

    #[test]
    fn test_missing_version_decodes_empty() {
        let payload: ListingPayload = serde_json::from_str(r#"{"listing": {}}"#).unwrap();
        assert_eq!(payload.version, "");
        assert!(payload.listing.is_some());
    }

    #[test]
    fn test_non_string_version_kept_as_text() {
        let payload: ListingPayload =
            serde_json::from_str(r#"{"version": 20, "files": []}"#).unwrap();
        assert_eq!(payload.version, "20");
        assert_eq!(payload.flat.files.map(|f| f.len()), Some(0));

        let payload: ListingPayload = serde_json::from_str(r#"{"version": null}"#).unwrap();
        assert_eq!(payload.version, "");
    }
}
