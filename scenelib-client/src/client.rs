//! Scene service REST client
//!
//! Stateless mapping of library operations onto the scene service's HTTP
//! contract. Every method is exactly one request/response round trip; no
//! retries, no caching.
//!
//! | Operation | Method | Path |
//! |---|---|---|
//! | list | GET | `/api/scenes` |
//! | search | GET | `/api/scenes/search/{query}` |
//! | stats | GET | `/api/stats` |
//! | create | POST | `/api/scenes` |
//! | update | PUT | `/api/scenes/{id}` |
//! | delete | DELETE | `/api/scenes/{id}` |
//!
//! The service also exposes health, single-scene lookup, narration audio
//! generation, render jobs and the rendered video listing.

use crate::error::ClientError;
use async_trait::async_trait;
use reqwest::StatusCode;
use scenelib_common::config::ClientSettings;
use scenelib_common::{SceneRecord, StatsSnapshot};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

const USER_AGENT: &str = concat!("scenelib/", env!("CARGO_PKG_VERSION"));

/// Seam between the library store and the service
///
/// [`RemoteClient`] is the production implementation.
#[async_trait]
pub trait SceneBackend: Send + Sync {
    /// Full catalog in service order
    async fn list_all(&self) -> Result<Vec<SceneRecord>, ClientError>;

    /// Filtered catalog; `query` is embedded verbatim as a path segment
    async fn search_by_query(&self, query: &str) -> Result<SearchResults, ClientError>;

    /// Persist a new scene
    async fn create(&self, record: &SceneRecord) -> Result<SceneRecord, ClientError>;

    /// Replace an existing scene
    async fn update(&self, id: i64, record: &SceneRecord) -> Result<SceneRecord, ClientError>;

    /// Remove a scene; absent ids fail with `NotFound`
    async fn delete(&self, id: i64) -> Result<(), ClientError>;

    /// Aggregate statistics over the full catalog
    async fn fetch_stats(&self) -> Result<StatsSnapshot, ClientError>;
}

/// Search response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResults {
    pub scenes: Vec<SceneRecord>,
    /// Match count reported by the service
    pub total: u64,
}

#[derive(Debug, Deserialize)]
struct ScenesResponse {
    scenes: Vec<SceneRecord>,
    #[serde(default)]
    total: Option<u64>,
}

/// Create/update responses come wrapped as `{ message, scene }`; a bare
/// record is accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SceneEnvelope {
    Wrapped {
        #[serde(default)]
        message: Option<String>,
        scene: SceneRecord,
    },
    Bare(SceneRecord),
}

impl SceneEnvelope {
    fn into_scene(self) -> SceneRecord {
        match self {
            SceneEnvelope::Wrapped { message, scene } => {
                if let Some(message) = message {
                    debug!(scene_id = scene.scene_id, message = %message, "Service acknowledged");
                }
                scene
            }
            SceneEnvelope::Bare(scene) => scene,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Service health report
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: String,
}

/// Accepted narration audio job
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AudioJob {
    pub message: String,
    pub scene_id: i64,
}

/// Render quality preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for RenderQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RenderQuality::Low => "low",
            RenderQuality::Medium => "medium",
            RenderQuality::High => "high",
        })
    }
}

impl FromStr for RenderQuality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(RenderQuality::Low),
            "medium" => Ok(RenderQuality::Medium),
            "high" => Ok(RenderQuality::High),
            other => Err(format!("unknown render quality '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    scene_ids: Option<&'a [i64]>,
    quality: RenderQuality,
}

/// Accepted render job
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RenderJob {
    pub message: String,
    pub render_id: Uuid,
    pub status: String,
}

/// Rendered video on the service host
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct VideoFile {
    pub filename: String,
    pub path: String,
    pub size: u64,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    videos: Vec<VideoFile>,
}

/// What a request addresses; decides how 404 is reported
#[derive(Debug, Clone, Copy)]
enum Target {
    Collection,
    Scene(i64),
}

/// Scene service client
#[derive(Debug, Clone)]
pub struct RemoteClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl RemoteClient {
    /// Create a client for `base_url` (no trailing slash needed)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ClientError> {
        Self::new(&settings.backend_url, settings.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a prepared request and map transport/status failures
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        target: Target,
    ) -> Result<reqwest::Response, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = extract_detail(&body);

        if status == StatusCode::NOT_FOUND {
            if let Target::Scene(id) = target {
                return Err(ClientError::NotFound { id, detail });
            }
        }

        if status.is_client_error() {
            if let Some(detail) = detail {
                return Err(ClientError::Validation(detail));
            }
        } else if let Some(detail) = detail {
            warn!(status = status.as_u16(), detail = %detail, "Service reported failure");
        }

        Err(ClientError::Server(status.as_u16()))
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ClientError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    /// Service liveness
    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let request = self.http_client.get(self.url("/api/health"));
        let response = self.send(request, Target::Collection).await?;
        Self::parse(response).await
    }

    /// Single scene by id
    pub async fn get(&self, id: i64) -> Result<SceneRecord, ClientError> {
        debug!(scene_id = id, "Fetching scene");
        let request = self.http_client.get(self.url(&format!("/api/scenes/{}", id)));
        let response = self.send(request, Target::Scene(id)).await?;
        Self::parse(response).await
    }

    /// Start narration audio generation for a scene
    pub async fn generate_audio(&self, id: i64) -> Result<AudioJob, ClientError> {
        let request = self
            .http_client
            .post(self.url(&format!("/api/generate-audio/{}", id)));
        let response = self.send(request, Target::Scene(id)).await?;
        let job: AudioJob = Self::parse(response).await?;
        info!(scene_id = id, "Audio generation started");
        Ok(job)
    }

    /// Start a render job; `None` renders every scene
    pub async fn render(
        &self,
        scene_ids: Option<&[i64]>,
        quality: RenderQuality,
    ) -> Result<RenderJob, ClientError> {
        let body = RenderRequest { scene_ids, quality };
        let request = self.http_client.post(self.url("/api/render")).json(&body);
        let response = self.send(request, Target::Collection).await?;
        let job: RenderJob = Self::parse(response).await?;
        info!(render_id = %job.render_id, quality = %quality, "Render started");
        Ok(job)
    }

    /// Rendered videos available on the service host
    pub async fn list_videos(&self) -> Result<Vec<VideoFile>, ClientError> {
        let request = self.http_client.get(self.url("/api/videos"));
        let response = self.send(request, Target::Collection).await?;
        let body: VideosResponse = Self::parse(response).await?;
        Ok(body.videos)
    }
}

#[async_trait]
impl SceneBackend for RemoteClient {
    async fn list_all(&self) -> Result<Vec<SceneRecord>, ClientError> {
        let request = self.http_client.get(self.url("/api/scenes"));
        let response = self.send(request, Target::Collection).await?;
        let body: ScenesResponse = Self::parse(response).await?;
        debug!(count = body.scenes.len(), "Listed scenes");
        Ok(body.scenes)
    }

    async fn search_by_query(&self, query: &str) -> Result<SearchResults, ClientError> {
        let request = self
            .http_client
            .get(self.url(&format!("/api/scenes/search/{}", query)));
        let response = self.send(request, Target::Collection).await?;
        let body: ScenesResponse = Self::parse(response).await?;
        let total = body.total.unwrap_or(body.scenes.len() as u64);
        debug!(query = %query, total, "Searched scenes");
        Ok(SearchResults {
            scenes: body.scenes,
            total,
        })
    }

    async fn create(&self, record: &SceneRecord) -> Result<SceneRecord, ClientError> {
        let request = self.http_client.post(self.url("/api/scenes")).json(record);
        let response = self.send(request, Target::Collection).await?;
        let envelope: SceneEnvelope = Self::parse(response).await?;
        let scene = envelope.into_scene();
        info!(scene_id = scene.scene_id, concept = %scene.concept, "Scene created");
        Ok(scene)
    }

    async fn update(&self, id: i64, record: &SceneRecord) -> Result<SceneRecord, ClientError> {
        let request = self
            .http_client
            .put(self.url(&format!("/api/scenes/{}", id)))
            .json(record);
        let response = self.send(request, Target::Scene(id)).await?;
        let envelope: SceneEnvelope = Self::parse(response).await?;
        let scene = envelope.into_scene();
        info!(scene_id = id, "Scene updated");
        Ok(scene)
    }

    async fn delete(&self, id: i64) -> Result<(), ClientError> {
        let request = self
            .http_client
            .delete(self.url(&format!("/api/scenes/{}", id)));
        self.send(request, Target::Scene(id)).await?;
        info!(scene_id = id, "Scene deleted");
        Ok(())
    }

    async fn fetch_stats(&self) -> Result<StatsSnapshot, ClientError> {
        let request = self.http_client.get(self.url("/api/stats"));
        let response = self.send(request, Target::Collection).await?;
        Self::parse(response).await
    }
}

/// Pull a human-readable message out of an error body
///
/// `detail` is normally a string; request-validation failures carry a list
/// of `{ msg }` objects instead, which are joined.
fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        serde_json::Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()))
                .map(str::to_string)
                .collect();
            if messages.is_empty() {
                None
            } else {
                Some(messages.join("; "))
            }
        }
        _ => None,
    }
}
