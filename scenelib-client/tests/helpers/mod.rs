//! Test helper modules for scenelib-client integration tests
//!
//! - FakeService: in-process HTTP fake of the scene service
//! - MemoryBackend: in-memory `SceneBackend` with scripted failures
//! - RecordingNotifier: captures user notices

#![allow(dead_code)]

pub mod fake_service;
pub mod memory_backend;

pub use fake_service::FakeService;
pub use memory_backend::{not_found, scene, Call, Gate, MemoryBackend, Op};

use scenelib_client::notify::{NoticeKind, Notifier};
use std::sync::Mutex;

/// Collects every notice for later assertions
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeKind, String)>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<(NoticeKind, String)> {
        self.notices.lock().unwrap().clone()
    }

    pub fn last(&self) -> Option<(NoticeKind, String)> {
        self.notices.lock().unwrap().last().cloned()
    }

    pub fn errors(&self) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|(kind, _)| *kind == NoticeKind::Error)
            .map(|(_, message)| message)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, kind: NoticeKind, message: &str) {
        self.notices.lock().unwrap().push((kind, message.to_string()));
    }
}
