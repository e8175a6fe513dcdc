use crate::cluster::PointCluster;
use crate::error::ClusterError;
use serde::{Deserialize, Serialize};

/// Number of visual classes: black stones, white stones, bare board.
pub(crate) const CLASS_COUNT: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoneClass {
    Black,
    White,
    Board,
}

/// The three final clusters with their semantic labels.
#[derive(Clone, Debug)]
pub struct StoneSets {
    pub black: PointCluster,
    pub white: PointCluster,
    pub board: PointCluster,
}

impl StoneSets {
    pub fn get(&self, class: StoneClass) -> &PointCluster {
        match class {
            StoneClass::Black => &self.black,
            StoneClass::White => &self.white,
            StoneClass::Board => &self.board,
        }
    }

    /// Mean [`PointCluster::spread`] over the three sets; higher means the
    /// clusters are tighter. Diagnostic only.
    pub fn match_score(&self) -> f64 {
        (self.black.spread() + self.white.spread() + self.board.spread()) / 3.0
    }
}

/// Label three clusters.
///
/// The darkest centroid is black. Of the other two, ordering by the
/// hue/contrast discriminator, the higher one is board and the lower one
/// white: bare board matches its diagonal surroundings best.
pub fn assign_sets(clusters: Vec<PointCluster>) -> Result<StoneSets, ClusterError> {
    let clusters: [PointCluster; CLASS_COUNT] = clusters.try_into().map_err(|rest: Vec<_>| {
        ClusterError::WrongClusterCount {
            expected: CLASS_COUNT,
            got: rest.len(),
        }
    })?;

    let mut by_y = [0usize, 1, 2];
    by_y.sort_by(|&i, &j| clusters[i].centroid().y.total_cmp(&clusters[j].centroid().y));
    let black = by_y[0];

    let mut by_x = [0usize, 1, 2];
    by_x.sort_by(|&i, &j| clusters[i].centroid().x.total_cmp(&clusters[j].centroid().x));
    let board = if by_x[2] == black { by_x[1] } else { by_x[2] };
    let white = if by_x[0] == black { by_x[1] } else { by_x[0] };

    let [c0, c1, c2] = clusters;
    let mut slots = [Some(c0), Some(c1), Some(c2)];
    match (slots[black].take(), slots[white].take(), slots[board].take()) {
        (Some(black), Some(white), Some(board)) => Ok(StoneSets {
            black,
            white,
            board,
        }),
        _ => Err(ClusterError::WrongClusterCount {
            expected: CLASS_COUNT,
            got: CLASS_COUNT,
        }),
    }
}
