use std::io::Write;
use std::sync::Mutex;

use crate::{
    error::ListingError,
    location::root_url,
    reltime::RelativeTime,
    types::{BrowseState, Entry, Listing},
};

/// Thumbnail shown for the synthetic root and parent entries
const DIRECTORY_THUMB: &str = "/thumbdir";

/// Navigation shortcuts shown above the listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavMetadata {
    pub show_root: bool,
    pub show_parent: bool,
    pub parent_url: String,
    pub root_url: String,
}

impl NavMetadata {
    pub fn for_state(browse: &BrowseState, mount_prefix: &str) -> Self {
        Self {
            show_root: !browse.is_root,
            show_parent: !browse.is_root,
            parent_url: browse.parent_url(mount_prefix),
            root_url: root_url(mount_prefix),
        }
    }
}

/// Everything a renderer needs for one successful load
#[derive(Debug, Clone)]
pub struct ListingView {
    pub directories: Vec<Entry>,
    pub files: Vec<Entry>,
    pub browse: BrowseState,
    pub nav: NavMetadata,
    pub truncated: bool,
}

impl ListingView {
    pub fn new(listing: Listing, browse: BrowseState, mount_prefix: &str) -> Self {
        let nav = NavMetadata::for_state(&browse, mount_prefix);
        Self {
            directories: listing.directories,
            files: listing.files,
            browse,
            nav,
            truncated: listing.truncated,
        }
    }

    /// Display order: root shortcut, parent shortcut, directories, files.
    ///
    /// The shortcuts are prepended, never sorted with the rest.
    pub fn entries(&self) -> Vec<Entry> {
        let mut entries = Vec::with_capacity(self.directories.len() + self.files.len() + 2);
        if self.nav.show_root {
            entries.push(synthetic("/", &self.nav.root_url));
        }
        if self.nav.show_parent {
            entries.push(synthetic("..", &self.nav.parent_url));
        }
        entries.extend(self.directories.iter().cloned());
        entries.extend(self.files.iter().cloned());
        entries
    }
}

fn synthetic(name: &str, url: &str) -> Entry {
    Entry {
        url: url.to_string(),
        thumb_url: DIRECTORY_THUMB.to_string(),
        name: name.to_string(),
        last_modified: None,
        is_directory: true,
    }
}

/// Resolve a server-relative thumbnail path against the thumbnail origin
pub fn thumbnail_url(thumbnail_origin: &str, thumb_url: &str) -> String {
    format!(
        "{}/{}",
        thumbnail_origin.trim_end_matches('/'),
        thumb_url.trim_start_matches('/')
    )
}

/// Rendering surface for listings
pub trait Renderer: Send + Sync {
    /// Show a successfully loaded listing
    fn render(&self, view: &ListingView);

    /// Show a failed load as a single terminal item
    fn render_error(&self, error: &ListingError);
}

/// Location control used when the current location is invalid
pub trait Navigator: Send + Sync {
    /// Replace the current location without adding a history entry
    fn replace(&self, location: &str);
}

/// Renders listings as plain text lines
pub struct TextRenderer<W> {
    out: Mutex<W>,
    formatter: RelativeTime,
    thumbnail_origin: Option<String>,
}

impl<W: Write + Send> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            formatter: RelativeTime::default(),
            thumbnail_origin: None,
        }
    }

    pub fn with_formatter(mut self, formatter: RelativeTime) -> Self {
        self.formatter = formatter;
        self
    }

    /// Append a thumbnail column resolved against `origin`
    pub fn with_thumbnails(mut self, origin: String) -> Self {
        self.thumbnail_origin = Some(origin);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn line(&self, entry: &Entry) -> String {
        let name = if entry.is_directory && !entry.is_synthetic() {
            format!("{}/", entry.name)
        } else {
            entry.name.clone()
        };
        let when = if entry.is_synthetic() {
            String::new()
        } else {
            self.formatter
                .format_local(entry.last_modified.as_ref())
                .unwrap_or_else(|e| e.to_string())
        };

        let mut line = format!("{:<32} {:<16} {}", name, when, entry.url);
        if let Some(origin) = &self.thumbnail_origin {
            line.push(' ');
            line.push_str(&thumbnail_url(origin, &entry.thumb_url));
        }
        line.trim_end().to_string()
    }

    fn write_lines(&self, lines: &[String]) {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        for line in lines {
            if let Err(e) = writeln!(out, "{}", line) {
                tracing::warn!(error = %e, "failed to write listing output");
                return;
            }
        }
    }
}

impl<W: Write + Send> Renderer for TextRenderer<W> {
    fn render(&self, view: &ListingView) {
        let mut lines = vec![format!("Index of {}", view.browse.logical_path)];
        lines.extend(view.entries().iter().map(|entry| self.line(entry)));
        if view.truncated {
            lines.push("(listing truncated by server)".to_string());
        }
        self.write_lines(&lines);
    }

    fn render_error(&self, error: &ListingError) {
        self.write_lines(&[format!("error: {}", error)]);
    }
}
