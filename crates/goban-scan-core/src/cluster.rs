//! Agglomerative clustering of intersection features.
//!
//! Clusters start as singletons and only ever grow by merging. Distances are
//! Manhattan distances between centroids. Reducing 361 points straight to 3
//! with all-pairs scans is cubic, so [`quick_partition`] first collapses the
//! set greedily (nearest neighbour of the smallest cluster) and
//! [`partition`] finishes with exact closest-pair merges on the few that are
//! left.

use crate::coords::BoardCoord;
use crate::error::ClusterError;
use crate::sampler::Feature;
use log::debug;
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// A clustered intersection.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterPoint {
    pub coord: BoardCoord,
    pub feature: Feature,
}

/// Growable group of intersections with a running centroid.
#[derive(Clone, Debug, PartialEq)]
pub struct PointCluster {
    centroid: Feature,
    members: Vec<ClusterPoint>,
}

impl PointCluster {
    pub fn singleton(point: ClusterPoint) -> Self {
        Self {
            centroid: point.feature,
            members: vec![point],
        }
    }

    #[inline]
    pub fn centroid(&self) -> Feature {
        self.centroid
    }

    #[inline]
    pub fn members(&self) -> &[ClusterPoint] {
        &self.members
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn coords(&self) -> impl Iterator<Item = BoardCoord> + '_ {
        self.members.iter().map(|p| p.coord)
    }

    /// Absorb `other`. The centroid is the size-weighted mean of both
    /// centroids; members are not rescanned.
    pub fn merge(&mut self, other: PointCluster) {
        let n0 = self.members.len() as f64;
        let n1 = other.members.len() as f64;
        let n = n0 + n1;
        if n > 0.0 {
            self.centroid = Feature {
                x: (self.centroid.x * n0 + other.centroid.x * n1) / n,
                y: (self.centroid.y * n0 + other.centroid.y * n1) / n,
            };
        }
        self.members.extend(other.members);
    }

    #[inline]
    pub fn distance_to(&self, other: &PointCluster) -> f64 {
        self.centroid.manhattan(&other.centroid)
    }

    /// `100 - mean Manhattan deviation` of the members from the centroid.
    /// Tighter clusters score higher.
    pub fn spread(&self) -> f64 {
        if self.members.is_empty() {
            return 100.0;
        }
        let total: f64 = self
            .members
            .iter()
            .map(|p| p.feature.manhattan(&self.centroid))
            .sum();
        100.0 - total / self.members.len() as f64
    }
}

/// Greedy reduction to `target` clusters.
///
/// `clusters` is kept ordered by non-increasing size: the last (smallest)
/// cluster is popped, merged into its nearest neighbour, and the result is
/// re-inserted in front of the first strictly smaller cluster. Stops early
/// only if nothing is left to merge with.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(clusters), fields(n = clusters.len()))
)]
pub fn quick_partition(clusters: &mut Vec<PointCluster>, target: usize) {
    let start = clusters.len();
    while clusters.len() > target {
        let Some(smallest) = clusters.pop() else {
            break;
        };
        let Some(nearest) = nearest_index(clusters, &smallest) else {
            clusters.push(smallest);
            break;
        };
        let mut merged = clusters.remove(nearest);
        merged.merge(smallest);
        let at = clusters
            .iter()
            .position(|c| c.len() < merged.len())
            .unwrap_or(clusters.len());
        clusters.insert(at, merged);
    }
    debug!("quick partition {start} -> {} clusters", clusters.len());
}

fn nearest_index(clusters: &[PointCluster], probe: &PointCluster) -> Option<usize> {
    let mut best = None;
    let mut best_dist = f64::INFINITY;
    for (i, c) in clusters.iter().enumerate() {
        let d = probe.distance_to(c);
        if d < best_dist || best.is_none() {
            best = Some(i);
            best_dist = d;
        }
    }
    best
}

/// Exact reduction to `target` clusters by repeatedly merging the globally
/// closest pair.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(clusters), fields(n = clusters.len()))
)]
pub fn partition(clusters: &mut Vec<PointCluster>, target: usize) -> Result<(), ClusterError> {
    if target == 0 {
        return Err(ClusterError::ZeroTarget);
    }
    if clusters.len() < target {
        return Err(ClusterError::Underflow {
            available: clusters.len(),
            target,
        });
    }
    while clusters.len() > target {
        let mut pair = None;
        let mut best = f64::INFINITY;
        for i in 0..clusters.len() {
            for j in i + 1..clusters.len() {
                let d = clusters[i].distance_to(&clusters[j]);
                if d < best || pair.is_none() {
                    best = d;
                    pair = Some((i, j));
                }
            }
        }
        let Some((i, j)) = pair else {
            break;
        };
        let absorbed = clusters.remove(j);
        clusters[i].merge(absorbed);
    }
    Ok(())
}
