use crate::{
    error::{ListingError, Result},
    types::BrowseState,
};

/// Derive the browse state from a location path under `mount_prefix`.
///
/// Locations outside the mount prefix fail with
/// [`ListingError::InvalidLocation`], whose `redirect_to` is the bare prefix.
/// The prefix has to match on a segment boundary, so `/browsex` is not
/// under `/browse`.
pub fn resolve_location(path: &str, mount_prefix: &str) -> Result<BrowseState> {
    let prefix = mount_prefix.trim_end_matches('/');

    let remainder = match path.strip_prefix(prefix) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => {
            return Err(ListingError::InvalidLocation {
                location: path.to_string(),
                redirect_to: bare_prefix(prefix),
            })
        }
    };

    let logical_path = if remainder.is_empty() {
        "/".to_string()
    } else {
        remainder.to_string()
    };

    Ok(BrowseState::new(logical_path))
}

impl BrowseState {
    pub fn new(logical_path: String) -> Self {
        let is_root = logical_path == "/";
        let parent_path = parent_of(&logical_path);
        Self {
            logical_path,
            is_root,
            parent_path,
        }
    }

    /// Location of the parent directory under `mount_prefix`.
    ///
    /// An empty parent path means the root, which is the mount prefix itself.
    pub fn parent_url(&self, mount_prefix: &str) -> String {
        let prefix = mount_prefix.trim_end_matches('/');
        if self.parent_path.is_empty() {
            bare_prefix(prefix)
        } else {
            format!("{}{}", prefix, self.parent_path)
        }
    }
}

/// Location of the filesystem root under `mount_prefix`.
pub fn root_url(mount_prefix: &str) -> String {
    format!("{}/", mount_prefix.trim_end_matches('/'))
}

fn bare_prefix(prefix: &str) -> String {
    if prefix.is_empty() {
        "/".to_string()
    } else {
        prefix.to_string()
    }
}

/// Truncate at the last `/`. A single trailing slash is ignored so that
/// `/a/b/` has the same parent as `/a/b`.
fn parent_of(logical_path: &str) -> String {
    if logical_path == "/" {
        return String::new();
    }
    let trimmed = logical_path.strip_suffix('/').unwrap_or(logical_path);
    match trimmed.rfind('/') {
        Some(idx) => trimmed[..idx].to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_path() {
        let state = resolve_location("/browse/a/b/c", "/browse").unwrap();
        assert_eq!(state.logical_path, "/a/b/c");
        assert!(!state.is_root);
        assert_eq!(state.parent_path, "/a/b");
        assert_eq!(state.parent_url("/browse"), "/browse/a/b");
    }

    #[test]
    fn test_single_segment_parent_is_mount_prefix() {
        let state = resolve_location("/browse/a", "/browse").unwrap();
        assert_eq!(state.parent_path, "");
        assert_eq!(state.parent_url("/browse"), "/browse");
    }

    #[test]
    fn test_empty_remainder_is_root() {
        for path in ["/browse", "/browse/"] {
            let state = resolve_location(path, "/browse").unwrap();
            assert_eq!(state.logical_path, "/");
            assert!(state.is_root);
        }
    }

    #[test]
    fn test_outside_prefix_redirects_to_bare_prefix() {
        match resolve_location("/elsewhere/a", "/browse") {
            Err(ListingError::InvalidLocation {
                location,
                redirect_to,
            }) => {
                assert_eq!(location, "/elsewhere/a");
                assert_eq!(redirect_to, "/browse");
            }
            other => panic!("Expected InvalidLocation, got {:?}", other),
        }
    }

    #[test]
    fn test_prefix_must_end_on_segment() {
        assert!(matches!(
            resolve_location("/browsefoo", "/browse"),
            Err(ListingError::InvalidLocation { .. })
        ));
    }

    #[test]
    fn test_trailing_slash_on_prefix_config() {
        let state = resolve_location("/browse/x/y", "/browse/").unwrap();
        assert_eq!(state.logical_path, "/x/y");
        assert_eq!(state.parent_url("/browse/"), "/browse/x");
    }

    #[test]
    fn test_trailing_slash_on_location() {
        let state = resolve_location("/browse/a/b/", "/browse").unwrap();
        assert_eq!(state.logical_path, "/a/b/");
        assert_eq!(state.parent_path, "/a");
    }

    #[test]
    fn test_root_url() {
        assert_eq!(root_url("/browse"), "/browse/");
        assert_eq!(root_url("/browse/"), "/browse/");
    }
}
