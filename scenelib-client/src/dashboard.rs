//! Dashboard aggregation derived from a library snapshot

use crate::store::LibrarySnapshot;
use scenelib_common::SceneRecord;

/// Number of scenes listed under "recent"
pub const RECENT_LIMIT: usize = 6;

/// One row of the visual type distribution
#[derive(Debug, Clone, PartialEq)]
pub struct VisualShare {
    pub tag: String,
    /// Tag with underscores shown as spaces
    pub label: String,
    pub count: u64,
    /// `count / max(total_scenes, 1)`
    pub fraction: f64,
}

/// Read-only dashboard figures
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardSummary {
    pub total_scenes: u64,
    /// Distinct visual tags in use
    pub animation_types: usize,
    pub audio_files: u64,
    pub distribution: Vec<VisualShare>,
    pub recent: Vec<SceneRecord>,
}

impl DashboardSummary {
    /// Figures for `snapshot`; zeros when stats have not loaded yet
    pub fn from_snapshot(snapshot: &LibrarySnapshot) -> Self {
        let recent = snapshot.scenes.iter().take(RECENT_LIMIT).cloned().collect();

        let Some(stats) = &snapshot.stats else {
            return Self {
                total_scenes: 0,
                animation_types: 0,
                audio_files: 0,
                distribution: Vec::new(),
                recent,
            };
        };

        let denominator = stats.total_scenes.max(1) as f64;
        let distribution = stats
            .visual_types
            .iter()
            .map(|(tag, &count)| VisualShare {
                tag: tag.clone(),
                label: tag.replace('_', " "),
                count,
                fraction: count as f64 / denominator,
            })
            .collect();

        Self {
            total_scenes: stats.total_scenes,
            animation_types: stats.visual_types.len(),
            audio_files: stats.audio_files,
            distribution,
            recent,
        }
    }
}
