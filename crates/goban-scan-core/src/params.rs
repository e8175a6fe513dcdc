use crate::corners::CornerOrder;
use crate::error::ScanError;
use serde::{Deserialize, Serialize};

/// Per-intersection color sampling settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerParams {
    /// Radius of the sampling ring around each intersection, in board units
    /// (1.0 spans the whole board).
    pub ring_radius: f64,
    /// Number of evenly spaced reads on the ring.
    pub ring_samples: usize,
    /// Offset of the four diagonal neighbour reads, in cell widths.
    pub diagonal_offset: f64,
    /// Constant added to the hue/contrast discriminator.
    pub feature_offset: f64,
}

impl Default for SamplerParams {
    fn default() -> Self {
        Self {
            ring_radius: 0.012,
            ring_samples: 7,
            diagonal_offset: 0.7,
            feature_offset: 64.0,
        }
    }
}

/// Agglomerative clustering settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterParams {
    /// Cluster count at which the cheap nearest-neighbour phase hands over
    /// to the exact all-pairs phase.
    pub quick_target: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self { quick_target: 50 }
    }
}

/// What to do with intersections where no pixel could be read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingCellPolicy {
    /// Leave them out of clustering and report them as unresolved.
    #[default]
    Exclude,
    /// Cluster them with the mean feature of all readable intersections.
    Neutral,
}

/// Full configuration of a board scan.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanParams {
    pub sampler: SamplerParams,
    pub cluster: ClusterParams,
    pub corner_order: CornerOrder,
    pub missing_cells: MissingCellPolicy,
}

impl ScanParams {
    pub fn validate(&self) -> Result<(), ScanError> {
        let s = &self.sampler;
        if s.ring_samples == 0 {
            return Err(ScanError::InvalidParams("ring_samples must be > 0".into()));
        }
        if !s.ring_radius.is_finite() || s.ring_radius < 0.0 {
            return Err(ScanError::InvalidParams(format!(
                "ring_radius must be finite and >= 0, got {}",
                s.ring_radius
            )));
        }
        if !s.diagonal_offset.is_finite() || s.diagonal_offset <= 0.0 {
            return Err(ScanError::InvalidParams(format!(
                "diagonal_offset must be finite and > 0, got {}",
                s.diagonal_offset
            )));
        }
        if !s.feature_offset.is_finite() {
            return Err(ScanError::InvalidParams("feature_offset must be finite".into()));
        }
        if self.cluster.quick_target < crate::classify::CLASS_COUNT {
            return Err(ScanError::InvalidParams(format!(
                "quick_target must be >= {}, got {}",
                crate::classify::CLASS_COUNT,
                self.cluster.quick_target
            )));
        }
        Ok(())
    }
}
