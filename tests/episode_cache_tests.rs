//! Episode cache behavior: coalescing, fallback caching, cancellation.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio_util::sync::CancellationToken;

use mortydex::api::{ApiError, UNKNOWN_EPISODE};
use mortydex::episode_cache::{EpisodeLookup, EpisodeNameCache};

/// Counts lookups and serves a scripted response per URL.
#[derive(Clone)]
struct ScriptedLookup {
    calls: Arc<AtomicUsize>,
    response: fn(&str) -> Result<String, ApiError>,
}

impl ScriptedLookup {
    fn new(response: fn(&str) -> Result<String, ApiError>) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            response,
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EpisodeLookup for ScriptedLookup {
    fn episode_name(
        &self,
        url: String,
        _cancel: CancellationToken,
    ) -> impl Future<Output = Result<String, ApiError>> + Send + 'static {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self.response;
        async move { response(&url) }
    }
}

fn named(url: &str) -> Result<String, ApiError> {
    Ok(format!("Episode for {url}"))
}

#[tokio::test]
async fn test_resolved_lookup_is_cached() {
    let lookup = ScriptedLookup::new(named);
    let cache = EpisodeNameCache::new(lookup.clone());

    let first = cache.episode_name("ep/1").await;
    let second = cache.episode_name("ep/1").await;

    assert_eq!(first, "Episode for ep/1");
    assert_eq!(second, first);
    assert_eq!(lookup.call_count(), 1);
    assert_eq!(cache.cached("ep/1").as_deref(), Some("Episode for ep/1"));
}

#[tokio::test]
async fn test_concurrent_lookups_share_one_request() {
    let lookup = ScriptedLookup::new(named);
    let cache = EpisodeNameCache::new(lookup.clone());

    let (a, b, c) = tokio::join!(
        cache.episode_name("ep/1"),
        cache.episode_name("ep/1"),
        cache.episode_name("ep/1"),
    );

    assert_eq!(a, "Episode for ep/1");
    assert_eq!(b, a);
    assert_eq!(c, a);
    assert_eq!(lookup.call_count(), 1);
}

#[tokio::test]
async fn test_distinct_urls_do_not_share() {
    let lookup = ScriptedLookup::new(named);
    let cache = EpisodeNameCache::new(lookup.clone());

    let (a, b) = tokio::join!(cache.episode_name("ep/1"), cache.episode_name("ep/2"));
    assert_ne!(a, b);
    assert_eq!(lookup.call_count(), 2);
}

#[tokio::test]
async fn test_failure_caches_fallback() {
    let lookup = ScriptedLookup::new(|_| {
        Err(ApiError::Http {
            status: 404,
            message: "There is nothing here".into(),
        })
    });
    let cache = EpisodeNameCache::new(lookup.clone());

    assert_eq!(cache.episode_name("ep/1").await, UNKNOWN_EPISODE);
    // The fallback is cached; the lookup is not retried.
    assert_eq!(cache.episode_name("ep/1").await, UNKNOWN_EPISODE);
    assert_eq!(lookup.call_count(), 1);
    assert_eq!(cache.cached("ep/1").as_deref(), Some(UNKNOWN_EPISODE));
}

#[tokio::test]
async fn test_cancelled_lookup_is_not_cached() {
    let lookup = ScriptedLookup::new(|_| Err(ApiError::Cancelled));
    let cache = EpisodeNameCache::new(lookup.clone());

    assert_eq!(cache.episode_name("ep/1").await, UNKNOWN_EPISODE);
    assert_eq!(cache.cached("ep/1"), None);

    // A retry issues a fresh lookup.
    assert_eq!(cache.episode_name("ep/1").await, UNKNOWN_EPISODE);
    assert_eq!(lookup.call_count(), 2);
}

#[tokio::test]
async fn test_first_episode_name_empty_list() {
    let lookup = ScriptedLookup::new(named);
    let cache = EpisodeNameCache::new(lookup.clone());

    assert_eq!(cache.first_episode_name(&[]).await, UNKNOWN_EPISODE);
    assert_eq!(lookup.call_count(), 0);

    let urls = vec!["ep/7".to_string(), "ep/8".to_string()];
    assert_eq!(cache.first_episode_name(&urls).await, "Episode for ep/7");
    assert_eq!(lookup.call_count(), 1);
}
