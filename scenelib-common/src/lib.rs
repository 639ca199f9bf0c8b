//! # Scene Library Common
//!
//! Shared code for the scene library client including:
//! - Scene record model and visual tags
//! - Aggregate statistics snapshot
//! - Editor text normalization
//! - Draft validation
//! - Configuration loading

pub mod config;
pub mod error;
pub mod model;
pub mod normalizer;
pub mod validation;

pub use error::{Error, Result};
pub use model::{SceneRecord, StatsSnapshot, VisualType};
pub use validation::{EditMode, SceneDraft, ValidationError};
