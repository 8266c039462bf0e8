// src/placement/error.rs

use super::core::PreviewStyle;

/// Everything the placement pipeline can report. None of these are fatal;
/// callers log them and carry on with the frame.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PlacementError {
    #[error("required placement reference is missing: {0}")]
    ConfigurationMissing(&'static str),
    #[error("prefab '{0}' is not in the placement catalog")]
    UnknownPrefab(String),
    #[error("invalid placement configuration: {0}")]
    InvalidConfiguration(String),
    #[error("could not spawn '{prefab}': {reason}")]
    SpawnFailed { prefab: String, reason: String },
    /// Styling only; the verdict is still computed and still gates commit.
    #[error("no preview material for the {0:?} style")]
    PreviewMaterialMissing(PreviewStyle),
    #[error("a preview instance already exists")]
    PreviewAlreadyPresent,
}
