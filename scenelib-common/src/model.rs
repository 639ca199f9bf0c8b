//! Scene catalog model
//!
//! Canonical in-memory representation of one scene and of the aggregate
//! statistics the service computes over the whole catalog.
//!
//! Field names match the service's JSON attribute names verbatim
//! (`scene_id`, `concept`, `explanation`, `equations`, `visual`, `narration`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Animation template a scene is rendered with
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum VisualType {
    /// Text and equations only
    #[default]
    None,
    /// Scatter plot with fitted line
    LinearRegression,
    /// Loss over training iterations
    LossCurve,
    /// Point descending a parabola
    GradientDescent,
    /// Layered node graph
    NeuralNetwork,
}

impl VisualType {
    /// Every tag, in the order the editor offers them
    pub const ALL: [VisualType; 5] = [
        VisualType::None,
        VisualType::LinearRegression,
        VisualType::LossCurve,
        VisualType::GradientDescent,
        VisualType::NeuralNetwork,
    ];

    /// Wire representation of the tag
    pub fn as_str(&self) -> &'static str {
        match self {
            VisualType::None => "none",
            VisualType::LinearRegression => "linear_regression",
            VisualType::LossCurve => "loss_curve",
            VisualType::GradientDescent => "gradient_descent",
            VisualType::NeuralNetwork => "neural_network",
        }
    }
}

impl fmt::Display for VisualType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the known visual tags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVisualType(pub String);

impl fmt::Display for UnknownVisualType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown visual type '{}'", self.0)
    }
}

impl std::error::Error for UnknownVisualType {}

impl FromStr for VisualType {
    type Err = UnknownVisualType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VisualType::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVisualType(s.to_string()))
    }
}

/// One catalog record
///
/// `explanation` and `equations` are never empty once a record has passed
/// validation: an all-blank input collapses to a single empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneRecord {
    /// Caller-assigned unique key, immutable after creation
    pub scene_id: i64,
    /// Short label shown as the card title
    pub concept: String,
    /// Ordered explanatory points; the first is used as the preview
    pub explanation: Vec<String>,
    /// Ordered equations in free-form notation
    pub equations: Vec<String>,
    /// Animation template tag
    pub visual: VisualType,
    /// Narration text (may be empty)
    #[serde(default)]
    pub narration: String,
}

impl SceneRecord {
    /// Preview excerpt (first explanation point)
    pub fn preview(&self) -> Option<&str> {
        self.explanation.first().map(String::as_str)
    }

    /// Equation shown on the scene card (first equation)
    pub fn headline_equation(&self) -> Option<&str> {
        self.equations.first().map(String::as_str)
    }
}

/// Aggregate statistics over the full catalog
///
/// Recomputed by the service; mirrored here read-only. Visual type keys are
/// kept as raw strings because they are passed through from storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Number of records in the catalog
    pub total_scenes: u64,
    /// Occurrence count per visual tag actually present
    #[serde(default)]
    pub visual_types: BTreeMap<String, u64>,
    /// Number of narration audio assets known to the service
    #[serde(default)]
    pub audio_files: u64,
}
