use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ListingError, Result};

/// The `(major, minor)` pair this client understands. Bump it when the
/// wire contract changes.
pub const SUPPORTED_PROTOCOL: ProtocolVersion = ProtocolVersion { major: 0, minor: 2 };

/// A `major.minor` compatibility marker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolVersion {
    pub major: u8,
    pub minor: u8,
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        SUPPORTED_PROTOCOL
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.x", self.major, self.minor)
    }
}

/// A version as received from the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WireVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl WireVersion {
    /// Parse the compact `"MNP"` form or the dotted `"M.N.P"` form. Every
    /// field is a single digit.
    pub fn parse(raw: &str) -> Option<Self> {
        let fields: Vec<u8> = if raw.contains('.') {
            raw.split('.').map(single_digit).collect::<Option<_>>()?
        } else {
            raw.chars().map(digit).collect::<Option<_>>()?
        };

        match fields[..] {
            [major, minor, patch] => Some(Self {
                major,
                minor,
                patch,
            }),
            _ => None,
        }
    }
}

/// A dotted field must be exactly one ASCII digit, no sign or padding
fn single_digit(field: &str) -> Option<u8> {
    let mut chars = field.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => digit(c),
        _ => None,
    }
}

fn digit(c: char) -> Option<u8> {
    c.is_ascii_digit().then(|| c as u8 - b'0')
}

/// Check a received version string against the supported pair.
///
/// Only major and minor are compared; the patch field is ignored.
/// Malformed strings are a mismatch too.
pub fn negotiate(received: &str, supported: ProtocolVersion) -> Result<WireVersion> {
    match WireVersion::parse(received) {
        Some(version) if version.major == supported.major && version.minor == supported.minor => {
            Ok(version)
        }
        _ => Err(ListingError::ProtocolMismatch {
            received: received.to_string(),
            supported: supported.to_string(),
        }),
    }
}
