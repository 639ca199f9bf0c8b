//! Scene draft validation
//!
//! A [`SceneDraft`] is what the editor holds while the user types: raw
//! text-area buffers and the visual tag as a plain string. Validation turns
//! it into a [`SceneRecord`] that is safe to send to the service.
//!
//! # Rules
//! - `concept` must be non-empty after trimming
//! - `explanation`/`equations` are normalized (blank lines dropped, never empty)
//! - `visual` must be one of the known tags
//! - a new scene's id must be non-negative; an edited scene keeps its id

use crate::model::{SceneRecord, VisualType};
use crate::normalizer::FieldInput;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a draft is rejected before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Required field is empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Field value is not one of the accepted options
    #[error("Invalid value for {field}: '{value}'")]
    InvalidEnum {
        field: &'static str,
        value: String,
    },

    /// New scenes need a non-negative id
    #[error("Scene id must be non-negative, got {0}")]
    NegativeId(i64),

    /// Edits never change a scene's identity
    #[error("Scene id cannot change from {original} to {supplied}")]
    IdChanged { original: i64, supplied: i64 },
}

/// Whether a draft creates a new scene or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    /// Caller assigns a fresh id
    Create,
    /// Id is locked to the record being edited
    Edit { original_id: i64 },
}

/// Editor contents before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneDraft {
    pub scene_id: i64,
    pub concept: String,
    pub explanation: FieldInput,
    pub equations: FieldInput,
    pub visual: String,
    pub narration: String,
}

impl SceneDraft {
    /// Blank editor for a new scene
    pub fn new_scene() -> Self {
        Self {
            scene_id: 0,
            concept: String::new(),
            explanation: FieldInput::default(),
            equations: FieldInput::default(),
            visual: VisualType::None.as_str().to_string(),
            narration: String::new(),
        }
    }

    /// Editor loaded with an existing record
    pub fn from_record(record: &SceneRecord) -> Self {
        Self {
            scene_id: record.scene_id,
            concept: record.concept.clone(),
            explanation: FieldInput::Lines(record.explanation.clone()),
            equations: FieldInput::Lines(record.equations.clone()),
            visual: record.visual.as_str().to_string(),
            narration: record.narration.clone(),
        }
    }

    /// Validate and normalize into a record ready for the service
    pub fn validate(self, mode: EditMode) -> Result<SceneRecord, ValidationError> {
        validate(self, mode)
    }
}

impl Default for SceneDraft {
    fn default() -> Self {
        Self::new_scene()
    }
}

/// Validate a draft, see module docs for the rules
pub fn validate(draft: SceneDraft, mode: EditMode) -> Result<SceneRecord, ValidationError> {
    if draft.concept.trim().is_empty() {
        return Err(ValidationError::MissingField("concept"));
    }

    let visual = draft
        .visual
        .parse::<VisualType>()
        .map_err(|e| ValidationError::InvalidEnum {
            field: "visual",
            value: e.0,
        })?;

    match mode {
        EditMode::Create if draft.scene_id < 0 => {
            return Err(ValidationError::NegativeId(draft.scene_id));
        }
        EditMode::Edit { original_id } if draft.scene_id != original_id => {
            return Err(ValidationError::IdChanged {
                original: original_id,
                supplied: draft.scene_id,
            });
        }
        _ => {}
    }

    Ok(SceneRecord {
        scene_id: draft.scene_id,
        concept: draft.concept,
        explanation: draft.explanation.normalize(),
        equations: draft.equations.normalize(),
        visual,
        narration: draft.narration,
    })
}
