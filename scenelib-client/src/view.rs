//! Front-end view state
//!
//! One tagged value instead of independent flags, so an editor can never be
//! open without knowing whether it creates or edits.

use scenelib_common::{EditMode, SceneDraft, SceneRecord};

/// Which screen the front end shows
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ViewState {
    #[default]
    Dashboard,
    Library,
    /// `None` creates a new scene, `Some` edits that record
    Editor { scene: Option<SceneRecord> },
}

impl ViewState {
    pub fn show_dashboard(&mut self) {
        *self = ViewState::Dashboard;
    }

    pub fn show_library(&mut self) {
        *self = ViewState::Library;
    }

    pub fn open_editor(&mut self, scene: Option<SceneRecord>) {
        *self = ViewState::Editor { scene };
    }

    /// Leave the editor (after save or cancel); other views are unchanged
    pub fn close_editor(&mut self) {
        if matches!(self, ViewState::Editor { .. }) {
            *self = ViewState::Library;
        }
    }

    /// Draft and validation mode for the open editor
    pub fn editor_draft(&self) -> Option<(SceneDraft, EditMode)> {
        match self {
            ViewState::Editor { scene: None } => Some((SceneDraft::new_scene(), EditMode::Create)),
            ViewState::Editor { scene: Some(record) } => Some((
                SceneDraft::from_record(record),
                EditMode::Edit {
                    original_id: record.scene_id,
                },
            )),
            _ => None,
        }
    }

    /// The editor locks the id field when editing an existing record
    pub fn id_locked(&self) -> bool {
        matches!(self, ViewState::Editor { scene: Some(_) })
    }
}
