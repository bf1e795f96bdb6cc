use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    config::ClientConfig,
    error::{ListingError, Result},
    listing::{decode_payload, sort_listing},
    location::resolve_location,
    protocol::negotiate,
    render::{ListingView, Navigator, Renderer},
    source::ListingSource,
    types::{BrowseState, ListingPayload},
};

/// Stages of a single load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Resolving,
    Fetching,
    Negotiating,
    Normalizing,
    Rendered,
    Failed,
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadState::Idle => "idle",
            LoadState::Resolving => "resolving",
            LoadState::Fetching => "fetching",
            LoadState::Negotiating => "negotiating",
            LoadState::Normalizing => "normalizing",
            LoadState::Rendered => "rendered",
            LoadState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// How a load ended
#[derive(Debug)]
pub enum LoadOutcome {
    /// The location was outside the mount prefix; the navigator was told
    /// to replace it with `to`
    Redirected { to: String },
    /// The listing was handed to the renderer
    Rendered(ListingView),
    /// The error was handed to the renderer. `stage` is the state the load
    /// was in when it failed.
    Failed { stage: LoadState, error: ListingError },
    /// A newer navigation started while this one was in flight; nothing
    /// was rendered
    Discarded { logical_path: String },
}

impl LoadOutcome {
    /// Final state of the load. Redirected and discarded loads never reach
    /// a terminal state and report `Idle`.
    pub fn state(&self) -> LoadState {
        match self {
            LoadOutcome::Rendered(_) => LoadState::Rendered,
            LoadOutcome::Failed { .. } => LoadState::Failed,
            LoadOutcome::Redirected { .. } | LoadOutcome::Discarded { .. } => LoadState::Idle,
        }
    }
}

/// The navigation that is allowed to render
#[derive(Debug, Default)]
struct CurrentNavigation {
    generation: u64,
    logical_path: Option<String>,
}

/// Loads and renders directory listings, one navigation at a time
///
/// Every call to [`load`](Self::load) is a fresh navigation. If a newer
/// navigation starts before an older response arrives, the older response
/// is dropped instead of rendered.
pub struct ListingClient {
    source: Arc<dyn ListingSource>,
    config: ClientConfig,
    generation: AtomicU64,
    current: RwLock<CurrentNavigation>,
}

impl ListingClient {
    /// Create a new client with the given transport
    pub fn new(source: Arc<dyn ListingSource>, config: ClientConfig) -> Self {
        Self {
            source,
            config,
            generation: AtomicU64::new(0),
            current: RwLock::new(CurrentNavigation::default()),
        }
    }

    /// Run one full load for `location` (the path component of the current
    /// location) and hand the result to `renderer`.
    ///
    /// No retries are attempted. A failed load is rendered as a single
    /// error item.
    pub async fn load(
        &self,
        location: &str,
        navigator: &dyn Navigator,
        renderer: &dyn Renderer,
    ) -> LoadOutcome {
        transition(LoadState::Idle, LoadState::Resolving);
        let browse = match resolve_location(location, &self.config.mount_prefix) {
            Ok(browse) => browse,
            Err(ListingError::InvalidLocation { redirect_to, .. }) => {
                tracing::info!(location, to = %redirect_to, "location outside mount prefix, redirecting");
                navigator.replace(&redirect_to);
                return LoadOutcome::Redirected { to: redirect_to };
            }
            Err(error) => return self.fail(LoadState::Resolving, error, renderer),
        };

        let generation = self.begin(&browse).await;

        transition(LoadState::Resolving, LoadState::Fetching);
        let fetched = self.source.fetch_listing(&browse.logical_path).await;

        if !self.is_current(generation, &browse).await {
            tracing::info!(
                logical_path = %browse.logical_path,
                source = %self.source.identifier(),
                "discarding stale listing response"
            );
            return LoadOutcome::Discarded {
                logical_path: browse.logical_path,
            };
        }

        let payload = match fetched {
            Ok(payload) => payload,
            Err(error) => return self.fail(LoadState::Fetching, error, renderer),
        };

        match self.process(payload, browse) {
            Ok(view) => {
                renderer.render(&view);
                transition(LoadState::Normalizing, LoadState::Rendered);
                LoadOutcome::Rendered(view)
            }
            Err((stage, error)) => self.fail(stage, error, renderer),
        }
    }

    /// Fetch, negotiate and normalize a listing without rendering it.
    ///
    /// This does not take part in stale-response tracking, and an invalid
    /// location is returned as an error rather than followed.
    pub async fn fetch_view(&self, location: &str) -> Result<ListingView> {
        let browse = resolve_location(location, &self.config.mount_prefix)?;
        let payload = self.source.fetch_listing(&browse.logical_path).await?;
        self.process(payload, browse).map_err(|(_, e)| e)
    }

    /// Negotiate, decode and sort. Synchronous once the payload is here.
    fn process(
        &self,
        payload: ListingPayload,
        browse: BrowseState,
    ) -> std::result::Result<ListingView, (LoadState, ListingError)> {
        transition(LoadState::Fetching, LoadState::Negotiating);
        let version = negotiate(&payload.version, self.config.supported_protocol)
            .map_err(|e| (LoadState::Negotiating, e))?;
        tracing::debug!(?version, "protocol accepted");

        transition(LoadState::Negotiating, LoadState::Normalizing);
        let listing = decode_payload(payload).map_err(|e| (LoadState::Normalizing, e))?;
        let listing = sort_listing(listing);

        Ok(ListingView::new(listing, browse, &self.config.mount_prefix))
    }

    /// Register a new navigation and return its generation
    async fn begin(&self, browse: &BrowseState) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut current = self.current.write().await;
        if generation > current.generation {
            current.generation = generation;
            current.logical_path = Some(browse.logical_path.clone());
        }
        generation
    }

    async fn is_current(&self, generation: u64, browse: &BrowseState) -> bool {
        let current = self.current.read().await;
        current.generation == generation
            && current.logical_path.as_deref() == Some(browse.logical_path.as_str())
    }

    fn fail(&self, stage: LoadState, error: ListingError, renderer: &dyn Renderer) -> LoadOutcome {
        tracing::warn!(%stage, %error, "listing load failed");
        transition(stage, LoadState::Failed);
        renderer.render_error(&error);
        LoadOutcome::Failed { stage, error }
    }
}

fn transition(from: LoadState, to: LoadState) {
    tracing::debug!(%from, %to, "load state");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{WireEntry, WireListingBody};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct StaticSource {
        version: &'static str,
    }

    #[async_trait]
    impl ListingSource for StaticSource {
        async fn fetch_listing(&self, logical_path: &str) -> Result<ListingPayload> {
            Ok(ListingPayload {
                version: self.version.to_string(),
                listing: Some(WireListingBody {
                    files: Some(vec![WireEntry {
                        url: format!("{}/f.txt", logical_path.trim_end_matches('/')),
                        thumb_url: "/thumb".to_string(),
                        name: "f.txt".to_string(),
                        last_modified: Some("2021-01-01T00:00:00Z".to_string()),
                    }]),
                    directories: None,
                    truncated: None,
                }),
                flat: WireListingBody::default(),
            })
        }

        fn identifier(&self) -> String {
            "static".to_string()
        }
    }

    #[derive(Default)]
    struct Recorder {
        rendered: Mutex<Vec<String>>,
        errors: Mutex<Vec<String>>,
        redirects: Mutex<Vec<String>>,
    }

    impl Renderer for Recorder {
        fn render(&self, view: &ListingView) {
            self.rendered
                .lock()
                .unwrap()
                .push(view.browse.logical_path.clone());
        }

        fn render_error(&self, error: &ListingError) {
            self.errors.lock().unwrap().push(error.to_string());
        }
    }

    impl Navigator for Recorder {
        fn replace(&self, location: &str) {
            self.redirects.lock().unwrap().push(location.to_string());
        }
    }

    fn client(version: &'static str) -> ListingClient {
        ListingClient::new(
            Arc::new(StaticSource { version }),
            ClientConfig::new("http://list".to_string()),
        )
    }

    #[tokio::test]
    async fn test_rendered() {
        let recorder = Recorder::default();
        let outcome = client("020").load("/browse/a", &recorder, &recorder).await;

        assert_eq!(outcome.state(), LoadState::Rendered);
        assert_eq!(*recorder.rendered.lock().unwrap(), vec!["/a"]);
        assert!(recorder.errors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_protocol_mismatch_fails_in_negotiation() {
        let recorder = Recorder::default();
        let outcome = client("010").load("/browse", &recorder, &recorder).await;

        match outcome {
            LoadOutcome::Failed { stage, error } => {
                assert_eq!(stage, LoadState::Negotiating);
                assert!(matches!(error, ListingError::ProtocolMismatch { .. }));
            }
            other => panic!("Expected Failed, got {:?}", other),
        }
        assert!(recorder.rendered.lock().unwrap().is_empty());
        assert_eq!(recorder.errors.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_redirect() {
        let recorder = Recorder::default();
        let outcome = client("020").load("/other", &recorder, &recorder).await;

        assert!(matches!(outcome, LoadOutcome::Redirected { ref to } if to == "/browse"));
        assert_eq!(*recorder.redirects.lock().unwrap(), vec!["/browse"]);
        assert!(recorder.rendered.lock().unwrap().is_empty());
        assert!(recorder.errors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_view() {
        let view = client("020").fetch_view("/browse/x").await.unwrap();
        assert_eq!(view.files[0].url, "/x/f.txt");
        assert!(view.nav.show_parent);
    }
}
