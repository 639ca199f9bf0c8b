//! In-process fake of the scene service
//!
//! Serves the same REST contract as the real service from an in-memory
//! collection, bound to an ephemeral localhost port.

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use scenelib_common::SceneRecord;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use uuid::Uuid;

#[derive(Clone)]
struct FakeState {
    scenes: Arc<Mutex<Vec<SceneRecord>>>,
    failing: Arc<AtomicBool>,
    audio_files: u64,
}

/// Running fake service; aborted on drop
pub struct FakeService {
    pub base_url: String,
    state: FakeState,
    handle: JoinHandle<()>,
}

impl FakeService {
    /// Start serving `seed` on 127.0.0.1 with an ephemeral port
    pub async fn start(seed: Vec<SceneRecord>) -> Self {
        let state = FakeState {
            scenes: Arc::new(Mutex::new(seed)),
            failing: Arc::new(AtomicBool::new(false)),
            audio_files: 2,
        };

        let app = router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Should bind ephemeral port");
        let addr = listener.local_addr().expect("Should have local addr");

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake service crashed");
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
            handle,
        }
    }

    /// Answer every request with a bare 500
    pub fn set_failing(&self, failing: bool) {
        self.state.failing.store(failing, Ordering::SeqCst);
    }

    /// Server-side collection
    pub fn scenes(&self) -> Vec<SceneRecord> {
        self.state.scenes.lock().unwrap().clone()
    }
}

impl Drop for FakeService {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn router(state: FakeState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/scenes", get(list_scenes).post(create_scene))
        .route(
            "/api/scenes/:id",
            get(get_scene).put(update_scene).delete(delete_scene),
        )
        .route("/api/scenes/search/:query", get(search_scenes))
        .route("/api/stats", get(stats))
        .route("/api/generate-audio/:id", post(generate_audio))
        .route("/api/render", post(render))
        .route("/api/videos", get(videos))
        .layer(middleware::from_fn_with_state(state.clone(), fail_switch))
        .with_state(state)
}

async fn fail_switch(State(state): State<FakeState>, request: Request, next: Next) -> Response {
    if state.failing.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
    }
    next.run(request).await
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "detail": "Scene not found" })),
    )
        .into_response()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "ML Animation Platform" }))
}

async fn list_scenes(State(state): State<FakeState>) -> Json<Value> {
    let scenes = state.scenes.lock().unwrap().clone();
    let total = scenes.len();
    Json(json!({ "scenes": scenes, "total": total }))
}

async fn get_scene(State(state): State<FakeState>, Path(id): Path<i64>) -> Response {
    let scenes = state.scenes.lock().unwrap();
    match scenes.iter().find(|s| s.scene_id == id) {
        Some(scene) => Json(scene.clone()).into_response(),
        None => not_found(),
    }
}

/// Mirrors the service's request validation error shape
fn reject_blank_concept(body: &Value) -> Option<Response> {
    let concept = body.get("concept").and_then(|c| c.as_str()).unwrap_or("");
    if concept.is_empty() {
        return Some(
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({
                    "detail": [{ "loc": ["body", "concept"], "msg": "field required" }]
                })),
            )
                .into_response(),
        );
    }
    None
}

async fn create_scene(State(state): State<FakeState>, Json(body): Json<Value>) -> Response {
    if let Some(rejection) = reject_blank_concept(&body) {
        return rejection;
    }
    let scene: SceneRecord = match serde_json::from_value(body) {
        Ok(scene) => scene,
        Err(_) => return StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    };

    let mut scenes = state.scenes.lock().unwrap();
    if scenes.iter().any(|s| s.scene_id == scene.scene_id) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "Scene ID already exists" })),
        )
            .into_response();
    }
    scenes.push(scene.clone());
    Json(json!({ "message": "Scene created successfully", "scene": scene })).into_response()
}

async fn update_scene(
    State(state): State<FakeState>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> Response {
    let mut scenes = state.scenes.lock().unwrap();
    let Some(existing) = scenes.iter_mut().find(|s| s.scene_id == id) else {
        return not_found();
    };
    if let Some(rejection) = reject_blank_concept(&body) {
        return rejection;
    }
    let mut scene: SceneRecord = match serde_json::from_value(body) {
        Ok(scene) => scene,
        Err(_) => return StatusCode::UNPROCESSABLE_ENTITY.into_response(),
    };
    scene.scene_id = id;
    *existing = scene.clone();
    Json(json!({ "message": "Scene updated successfully", "scene": scene })).into_response()
}

async fn delete_scene(State(state): State<FakeState>, Path(id): Path<i64>) -> Response {
    let mut scenes = state.scenes.lock().unwrap();
    let before = scenes.len();
    scenes.retain(|s| s.scene_id != id);
    if scenes.len() == before {
        return not_found();
    }
    Json(json!({ "message": "Scene deleted successfully" })).into_response()
}

async fn search_scenes(State(state): State<FakeState>, Path(query): Path<String>) -> Json<Value> {
    let needle = query.to_lowercase();
    let scenes: Vec<SceneRecord> = state
        .scenes
        .lock()
        .unwrap()
        .iter()
        .filter(|s| {
            s.concept.to_lowercase().contains(&needle)
                || s.narration.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect();
    let total = scenes.len();
    Json(json!({ "scenes": scenes, "total": total }))
}

async fn stats(State(state): State<FakeState>) -> Json<Value> {
    let scenes = state.scenes.lock().unwrap();
    let mut visual_types: BTreeMap<String, u64> = BTreeMap::new();
    for scene in scenes.iter() {
        *visual_types.entry(scene.visual.to_string()).or_default() += 1;
    }
    Json(json!({
        "total_scenes": scenes.len(),
        "visual_types": visual_types,
        "audio_files": state.audio_files,
    }))
}

async fn generate_audio(State(state): State<FakeState>, Path(id): Path<i64>) -> Response {
    let exists = state.scenes.lock().unwrap().iter().any(|s| s.scene_id == id);
    if !exists {
        return not_found();
    }
    Json(json!({ "message": "Audio generation started", "scene_id": id })).into_response()
}

async fn render(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({
        "message": "Rendering started",
        "render_id": Uuid::new_v4(),
        "status": "processing",
        "echo_quality": body.get("quality").cloned().unwrap_or(Value::Null),
    }))
}

async fn videos() -> Json<Value> {
    Json(json!({
        "videos": [{
            "filename": "AutoExplainer.mp4",
            "path": "/app/media/videos/AutoExplainer.mp4",
            "size": 1048576
        }]
    }))
}
