//! Episode name cache with in-flight request coalescing.
//!
//! Concurrent lookups for the same episode URL share one underlying
//! request; once resolved the name is served from memory. Failed lookups
//! cache the fallback label so a flaky episode does not get hammered,
//! except cancellation, which leaves the slot empty so a later lookup can
//! retry.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use tokio_util::sync::CancellationToken;

use crate::api::{ApiError, EpisodeGateway, UNKNOWN_EPISODE};

/// Source of episode names, abstracted so tests can count calls.
pub trait EpisodeLookup: Clone + Send + Sync + 'static {
    fn episode_name(
        &self,
        url: String,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<String, ApiError>> + Send + 'static;
}

impl EpisodeLookup for EpisodeGateway {
    fn episode_name(
        &self,
        url: String,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<String, ApiError>> + Send + 'static {
        let gateway = self.clone();
        async move { gateway.episode_name_by_url(&url, Some(&cancel)).await }
    }
}

type PendingLookup = Shared<BoxFuture<'static, String>>;

#[derive(Default)]
struct CacheInner {
    resolved: HashMap<String, String>,
    pending: HashMap<String, PendingLookup>,
}

pub struct EpisodeNameCache<G: EpisodeLookup = EpisodeGateway> {
    lookup: G,
    cancel: CancellationToken,
    inner: Arc<Mutex<CacheInner>>,
}

impl<G: EpisodeLookup> Clone for EpisodeNameCache<G> {
    fn clone(&self) -> Self {
        Self {
            lookup: self.lookup.clone(),
            cancel: self.cancel.clone(),
            inner: Arc::clone(&self.inner),
        }
    }
}

fn lock(inner: &Mutex<CacheInner>) -> MutexGuard<'_, CacheInner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl<G: EpisodeLookup> EpisodeNameCache<G> {
    pub fn new(lookup: G) -> Self {
        Self {
            lookup,
            cancel: CancellationToken::new(),
            inner: Arc::new(Mutex::new(CacheInner::default())),
        }
    }

    /// Resolve an episode URL to its name, coalescing duplicate in-flight
    /// lookups. Always yields a displayable string.
    pub async fn episode_name(&self, url: &str) -> String {
        let shared = {
            // The hit check and the pending insert happen under one guard
            // so two racing callers cannot both start a lookup.
            let mut guard = lock(&self.inner);
            if let Some(name) = guard.resolved.get(url) {
                return name.clone();
            }
            if let Some(pending) = guard.pending.get(url) {
                pending.clone()
            } else {
                let shared = self.start_lookup(url.to_string());
                guard.pending.insert(url.to_string(), shared.clone());
                shared
            }
        };
        shared.await
    }

    /// Name of a character's first appearance, or the fallback label when
    /// the episode list is empty.
    pub async fn first_episode_name(&self, episode_urls: &[String]) -> String {
        match episode_urls.first() {
            Some(url) => self.episode_name(url).await,
            None => UNKNOWN_EPISODE.to_string(),
        }
    }

    /// Cached name, if the lookup has already resolved.
    pub fn cached(&self, url: &str) -> Option<String> {
        lock(&self.inner).resolved.get(url).cloned()
    }

    /// Cancel every in-flight lookup. Used on shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    fn start_lookup(&self, url: String) -> PendingLookup {
        let lookup = self.lookup.clone();
        let cancel = self.cancel.clone();
        let inner = Arc::clone(&self.inner);
        async move {
            let result = lookup.episode_name(url.clone(), cancel).await;
            let mut guard = lock(&inner);
            guard.pending.remove(&url);
            match result {
                Ok(name) => {
                    guard.resolved.insert(url, name.clone());
                    name
                }
                // Cancelled lookups stay uncached so a retry is possible.
                Err(ApiError::Cancelled) => UNKNOWN_EPISODE.to_string(),
                Err(_) => {
                    guard
                        .resolved
                        .insert(url, UNKNOWN_EPISODE.to_string());
                    UNKNOWN_EPISODE.to_string()
                }
            }
        }
        .boxed()
        .shared()
    }
}
