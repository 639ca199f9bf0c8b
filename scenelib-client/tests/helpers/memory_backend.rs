//! In-memory scene backend with scripted failures
//!
//! Implements `SceneBackend` directly so store and search behaviour can be
//! checked without a network. Every call is recorded.

use async_trait::async_trait;
use scenelib_client::{ClientError, SceneBackend, SearchResults};
use scenelib_common::{SceneRecord, StatsSnapshot, VisualType};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Backend operation, used to script failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Search,
    Create,
    Update,
    Delete,
    Stats,
}

/// Recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Search(String),
    Create(SceneRecord),
    Update(i64, SceneRecord),
    Delete(i64),
    Stats,
}

/// Holds a search until released
#[derive(Default)]
pub struct Gate {
    pub entered: Notify,
    pub release: Notify,
}

#[derive(Default)]
pub struct MemoryBackend {
    scenes: Mutex<Vec<SceneRecord>>,
    failures: Mutex<HashMap<Op, ClientError>>,
    calls: Mutex<Vec<Call>>,
    gates: Mutex<HashMap<String, Arc<Gate>>>,
    audio_files: u64,
}

impl MemoryBackend {
    pub fn with_scenes(scenes: Vec<SceneRecord>) -> Self {
        Self {
            scenes: Mutex::new(scenes),
            ..Default::default()
        }
    }

    /// Make every call of `op` fail with `error` until cleared
    pub fn fail(&self, op: Op, error: ClientError) {
        self.failures.lock().unwrap().insert(op, error);
    }

    pub fn clear_failures(&self) {
        self.failures.lock().unwrap().clear();
    }

    /// Hold searches for `query` (decoded) until the gate is released
    pub fn gate_search(&self, query: &str) -> Arc<Gate> {
        let gate = Arc::new(Gate::default());
        self.gates
            .lock()
            .unwrap()
            .insert(query.to_string(), Arc::clone(&gate));
        gate
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    pub fn scenes(&self) -> Vec<SceneRecord> {
        self.scenes.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: Op) -> Result<(), ClientError> {
        match self.failures.lock().unwrap().get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl SceneBackend for MemoryBackend {
    async fn list_all(&self) -> Result<Vec<SceneRecord>, ClientError> {
        self.record(Call::List);
        self.check(Op::List)?;
        Ok(self.scenes())
    }

    async fn search_by_query(&self, query: &str) -> Result<SearchResults, ClientError> {
        self.record(Call::Search(query.to_string()));

        let decoded = urlencoding::decode(query)
            .map(|q| q.into_owned())
            .unwrap_or_else(|_| query.to_string());

        let gate = self.gates.lock().unwrap().get(&decoded).cloned();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        self.check(Op::Search)?;

        let needle = decoded.to_lowercase();
        let scenes: Vec<SceneRecord> = self
            .scenes()
            .into_iter()
            .filter(|s| {
                s.concept.to_lowercase().contains(&needle)
                    || s.narration.to_lowercase().contains(&needle)
            })
            .collect();
        let total = scenes.len() as u64;
        Ok(SearchResults { scenes, total })
    }

    async fn create(&self, record: &SceneRecord) -> Result<SceneRecord, ClientError> {
        self.record(Call::Create(record.clone()));
        self.check(Op::Create)?;

        let mut scenes = self.scenes.lock().unwrap();
        if scenes.iter().any(|s| s.scene_id == record.scene_id) {
            return Err(ClientError::Validation("Scene ID already exists".to_string()));
        }
        scenes.push(record.clone());
        Ok(record.clone())
    }

    async fn update(&self, id: i64, record: &SceneRecord) -> Result<SceneRecord, ClientError> {
        self.record(Call::Update(id, record.clone()));
        self.check(Op::Update)?;

        let mut scenes = self.scenes.lock().unwrap();
        match scenes.iter_mut().find(|s| s.scene_id == id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(record.clone())
            }
            None => Err(not_found(id)),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), ClientError> {
        self.record(Call::Delete(id));
        self.check(Op::Delete)?;

        let mut scenes = self.scenes.lock().unwrap();
        let before = scenes.len();
        scenes.retain(|s| s.scene_id != id);
        if scenes.len() == before {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn fetch_stats(&self) -> Result<StatsSnapshot, ClientError> {
        self.record(Call::Stats);
        self.check(Op::Stats)?;

        let scenes = self.scenes();
        let mut visual_types: BTreeMap<String, u64> = BTreeMap::new();
        for scene in &scenes {
            *visual_types.entry(scene.visual.to_string()).or_default() += 1;
        }
        Ok(StatsSnapshot {
            total_scenes: scenes.len() as u64,
            visual_types,
            audio_files: self.audio_files,
        })
    }
}

/// Same shape the service reports for a missing scene
pub fn not_found(id: i64) -> ClientError {
    ClientError::NotFound {
        id,
        detail: Some("Scene not found".to_string()),
    }
}

/// Minimal valid record
pub fn scene(id: i64, concept: &str, visual: VisualType) -> SceneRecord {
    SceneRecord {
        scene_id: id,
        concept: concept.to_string(),
        explanation: vec![format!("About {}", concept)],
        equations: vec![String::new()],
        visual,
        narration: format!("Narration for {}", concept),
    }
}
