//! Rick and Morty API client and resource gateways

use std::sync::OnceLock;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use crate::state::{
    Character, CharacterFilters, CharacterGender, CharacterPage, CharacterStatus, Episode,
    LocationRef, PageInfo,
};

pub const API_BASE: &str = "https://rickandmortyapi.com/api";

/// Fallback label for any episode name that could not be resolved.
pub const UNKNOWN_EPISODE: &str = "Unknown Episode";

// ============================================================================
// HTTP client
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum ApiError {
    /// Non-2xx response; message comes from the body's `error` field when
    /// the body parses, otherwise a generic status line.
    Http { status: u16, message: String },
    /// Transport-level failure or a response body that failed to decode.
    Network(String),
    /// The request was cancelled. Never wrapped; callers must be able to
    /// tell this apart from a real failure.
    Cancelled,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Http { message, .. } => write!(f, "{}", message),
            ApiError::Network(message) => write!(f, "Network error: {}", message),
            ApiError::Cancelled => write!(f, "request cancelled"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ApiError::Cancelled)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}

/// Serialize query parameters, skipping unset and empty values.
/// Spaces encode as `+`.
pub fn build_query_string(params: &[(&str, Option<String>)]) -> String {
    let mut query = String::new();
    for (key, value) in params {
        let Some(value) = value else { continue };
        if value.is_empty() {
            continue;
        }
        query.push(if query.is_empty() { '?' } else { '&' });
        query.push_str(key);
        query.push('=');
        query.push_str(&urlencoding::encode(value).replace("%20", "+"));
    }
    query
}

/// Generic GET wrapper over the API. No retries, no caching.
#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: String,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    pub fn new() -> Self {
        Self::with_base_url(API_BASE)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    pub async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<T, ApiError> {
        if let Some(token) = cancel {
            if token.is_cancelled() {
                return Err(ApiError::Cancelled);
            }
        }

        let url = format!("{}{}", self.base_url, path);
        let request = http_client().get(&url).send();
        let response = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => return Err(ApiError::Cancelled),
                response = request => response,
            },
            None => request.await,
        }
        .map_err(|err| ApiError::Network(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let fallback = format!(
                "HTTP {}: {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("request failed")
            );
            let message = match response.json::<ErrorBody>().await {
                Ok(body) if !body.error.is_empty() => body.error,
                _ => fallback,
            };
            return Err(ApiError::Http {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| ApiError::Network(err.to_string()))
    }
}

// ============================================================================
// Wire records (view models live in state.rs)
// ============================================================================

// The API's `url` and `created` fields are dropped at this boundary.

#[derive(Clone, Debug, Deserialize)]
struct CharacterRecord {
    id: u32,
    name: String,
    status: CharacterStatus,
    species: String,
    #[serde(rename = "type")]
    kind: String,
    gender: CharacterGender,
    origin: LocationRecord,
    location: LocationRecord,
    image: String,
    episode: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
struct LocationRecord {
    name: String,
    url: String,
}

#[derive(Clone, Debug, Deserialize)]
struct PageResponse {
    info: PageInfo,
    results: Vec<CharacterRecord>,
}

#[derive(Clone, Debug, Deserialize)]
struct EpisodeRecord {
    id: u32,
    name: String,
    air_date: String,
    episode: String,
}

fn map_character(record: CharacterRecord) -> Character {
    Character {
        id: record.id,
        name: record.name,
        status: record.status,
        species: record.species,
        kind: record.kind,
        gender: record.gender,
        origin: LocationRef {
            name: record.origin.name,
            url: record.origin.url,
        },
        location: LocationRef {
            name: record.location.name,
            url: record.location.url,
        },
        image: record.image,
        episode: record.episode,
    }
}

fn map_episode(record: EpisodeRecord) -> Episode {
    Episode {
        id: record.id,
        name: record.name,
        air_date: record.air_date,
        code: record.episode,
    }
}

fn join_ids(ids: &[u32]) -> String {
    ids.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

// ============================================================================
// Character gateway
// ============================================================================

#[derive(Clone, Debug, Default)]
pub struct CharacterGateway {
    client: ApiClient,
}

impl CharacterGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Fetch one page of the filtered character list.
    pub async fn get_characters(
        &self,
        filters: &CharacterFilters,
        page: u32,
        cancel: Option<&CancellationToken>,
    ) -> Result<CharacterPage, ApiError> {
        let query = build_query_string(&filters.query_pairs(page));
        let response: PageResponse = self.client.get(&format!("/character{query}"), cancel).await?;
        Ok(CharacterPage {
            info: response.info,
            characters: response.results.into_iter().map(map_character).collect(),
        })
    }

    pub async fn get_character_by_id(
        &self,
        id: u32,
        cancel: Option<&CancellationToken>,
    ) -> Result<Character, ApiError> {
        let record: CharacterRecord = self.client.get(&format!("/character/{id}"), cancel).await?;
        Ok(map_character(record))
    }

    /// Batch lookup. Empty input resolves without touching the network.
    pub async fn get_characters_by_ids(
        &self,
        ids: &[u32],
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<Character>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        // A single id hits the bare-object endpoint, not a one-element array.
        if let [id] = ids {
            return Ok(vec![self.get_character_by_id(*id, cancel).await?]);
        }
        let records: Vec<CharacterRecord> = self
            .client
            .get(&format!("/character/{}", join_ids(ids)), cancel)
            .await?;
        Ok(records.into_iter().map(map_character).collect())
    }
}

// ============================================================================
// Episode gateway
// ============================================================================

/// Parse the numeric id out of a `/episode/<digits>` reference URL.
/// Tolerates a trailing slash; anything else yields `None`.
pub fn extract_episode_id(url: &str) -> Option<u32> {
    let mut segments = url.trim_end_matches('/').rsplit('/');
    let id = segments.next()?;
    if segments.next()? != "episode" {
        return None;
    }
    if id.is_empty() || !id.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    id.parse().ok()
}

/// Parse many reference URLs, silently dropping the unparseable ones.
pub fn extract_episode_ids(urls: &[String]) -> Vec<u32> {
    urls.iter().filter_map(|url| extract_episode_id(url)).collect()
}

#[derive(Clone, Debug, Default)]
pub struct EpisodeGateway {
    client: ApiClient,
}

impl EpisodeGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn get_episode_by_id(
        &self,
        id: u32,
        cancel: Option<&CancellationToken>,
    ) -> Result<Episode, ApiError> {
        let record: EpisodeRecord = self.client.get(&format!("/episode/{id}"), cancel).await?;
        Ok(map_episode(record))
    }

    pub async fn get_episodes_by_ids(
        &self,
        ids: &[u32],
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<Episode>, ApiError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        if let [id] = ids {
            return Ok(vec![self.get_episode_by_id(*id, cancel).await?]);
        }
        let records: Vec<EpisodeRecord> = self
            .client
            .get(&format!("/episode/{}", join_ids(ids)), cancel)
            .await?;
        Ok(records.into_iter().map(map_episode).collect())
    }

    /// Resolve an episode reference URL to its display name. Any failure
    /// other than cancellation becomes the fallback label; cancellation is
    /// re-raised so the cache layer can decide whether to persist.
    pub async fn episode_name_by_url(
        &self,
        url: &str,
        cancel: Option<&CancellationToken>,
    ) -> Result<String, ApiError> {
        let Some(id) = extract_episode_id(url) else {
            return Ok(UNKNOWN_EPISODE.to_string());
        };
        match self.get_episode_by_id(id, cancel).await {
            Ok(episode) => Ok(episode.name),
            Err(ApiError::Cancelled) => Err(ApiError::Cancelled),
            Err(_) => Ok(UNKNOWN_EPISODE.to_string()),
        }
    }
}
