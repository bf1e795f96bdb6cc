use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ListingError, Result},
    protocol::{ProtocolVersion, SUPPORTED_PROTOCOL},
    reltime::RelativeTime,
};

/// Default mount prefix that every browse location must start with
pub const DEFAULT_MOUNT_PREFIX: &str = "/browse";

/// Settings for a listing client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the listing endpoint
    pub listing_origin: String,
    /// Base URL thumbnails are resolved against (defaults to the listing origin)
    #[serde(default)]
    pub thumbnail_origin: Option<String>,
    #[serde(default = "default_mount_prefix")]
    pub mount_prefix: String,
    #[serde(default)]
    pub supported_protocol: ProtocolVersion,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_just_now_secs")]
    pub just_now_secs: u64,
}

fn default_mount_prefix() -> String {
    DEFAULT_MOUNT_PREFIX.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_just_now_secs() -> u64 {
    600
}

impl ClientConfig {
    pub fn new(listing_origin: String) -> Self {
        Self {
            listing_origin,
            thumbnail_origin: None,
            mount_prefix: default_mount_prefix(),
            supported_protocol: SUPPORTED_PROTOCOL,
            request_timeout_secs: default_timeout_secs(),
            just_now_secs: default_just_now_secs(),
        }
    }

    /// Parse and validate a JSON configuration document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path).await?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        check_origin("listing_origin", &self.listing_origin)?;
        if let Some(origin) = &self.thumbnail_origin {
            check_origin("thumbnail_origin", origin)?;
        }

        if !self.mount_prefix.starts_with('/') {
            return Err(invalid(format!(
                "mount_prefix must start with '/': {:?}",
                self.mount_prefix
            )));
        }
        if self.mount_prefix.len() > 1 && self.mount_prefix.ends_with('/') {
            return Err(invalid(format!(
                "mount_prefix must not end with '/': {:?}",
                self.mount_prefix
            )));
        }
        if self.request_timeout_secs == 0 {
            return Err(invalid("request_timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn thumbnail_origin(&self) -> &str {
        self.thumbnail_origin
            .as_deref()
            .unwrap_or(&self.listing_origin)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn relative_time(&self) -> RelativeTime {
        RelativeTime::new(Duration::from_secs(self.just_now_secs))
    }
}

fn check_origin(field: &str, origin: &str) -> Result<()> {
    if origin.starts_with("http://") || origin.starts_with("https://") {
        Ok(())
    } else {
        Err(invalid(format!(
            "{} must be an http(s) URL: {:?}",
            field, origin
        )))
    }
}

fn invalid(message: String) -> ListingError {
    ListingError::InvalidConfig { message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::from_json_str(r#"{"listing_origin": "http://list:8080"}"#)
            .unwrap();
        assert_eq!(config.mount_prefix, "/browse");
        assert_eq!(config.supported_protocol, SUPPORTED_PROTOCOL);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.thumbnail_origin(), "http://list:8080");
        assert_eq!(config, ClientConfig::new("http://list:8080".to_string()));
    }

    #[test]
    fn test_overrides() {
        let config = ClientConfig::from_json_str(
            r#"{
                "listing_origin": "https://list",
                "thumbnail_origin": "https://thumbs",
                "mount_prefix": "/user",
                "supported_protocol": {"major": 0, "minor": 1}
            }"#,
        )
        .unwrap();
        assert_eq!(config.thumbnail_origin(), "https://thumbs");
        assert_eq!(config.mount_prefix, "/user");
        assert_eq!(config.supported_protocol, ProtocolVersion { major: 0, minor: 1 });
    }

    #[test]
    fn test_rejects_bad_values() {
        let cases = [
            r#"{"listing_origin": "ftp://list"}"#,
            r#"{"listing_origin": "http://list", "thumbnail_origin": "thumbs"}"#,
            r#"{"listing_origin": "http://list", "mount_prefix": "browse"}"#,
            r#"{"listing_origin": "http://list", "mount_prefix": "/browse/"}"#,
            r#"{"listing_origin": "http://list", "request_timeout_secs": 0}"#,
        ];
        for json in cases {
            assert!(
                matches!(
                    ClientConfig::from_json_str(json),
                    Err(ListingError::InvalidConfig { .. })
                ),
                "{} should be rejected",
                json
            );
        }
    }

    #[test]
    fn test_missing_origin_is_serialization_error() {
        assert!(matches!(
            ClientConfig::from_json_str("{}"),
            Err(ListingError::Serialization(_))
        ));
    }
}
