use crate::classify::{assign_sets, StoneClass, StoneSets, CLASS_COUNT};
use crate::cluster::{partition, quick_partition, ClusterPoint, PointCluster};
use crate::coords::BoardCoord;
use crate::corners::BoardCorners;
use crate::error::ScanError;
use crate::frame::ProjectiveFrame;
use crate::image::RgbImageView;
use crate::params::{MissingCellPolicy, ScanParams};
use crate::sampler::{sample_board, ColorSample, Feature};
use crate::sgf::MoveList;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Runs the full image-to-position pipeline with fixed parameters.
///
/// A scanner holds no per-image state and can be shared between threads.
#[derive(Clone, Debug)]
pub struct BoardScanner {
    params: ScanParams,
}

impl BoardScanner {
    pub fn new(params: ScanParams) -> Result<Self, ScanError> {
        params.validate()?;
        Ok(Self { params })
    }

    #[inline]
    pub fn params(&self) -> &ScanParams {
        &self.params
    }

    /// Scan using 8 raw corner values laid out per `params.corner_order`.
    pub fn scan_values(
        &self,
        image: &RgbImageView<'_>,
        values: &[f64],
    ) -> Result<ScanResult, ScanError> {
        let corners = BoardCorners::from_values(values, self.params.corner_order)?;
        self.scan(image, &corners)
    }

    /// Classify every intersection of the board bounded by `corners`.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(width = image.width, height = image.height))
    )]
    pub fn scan(
        &self,
        image: &RgbImageView<'_>,
        corners: &BoardCorners,
    ) -> Result<ScanResult, ScanError> {
        let frame = ProjectiveFrame::new(*corners)?;
        let samples = sample_board(image, &frame, &self.params.sampler);

        let (points, unresolved) = self.cluster_points(&samples);
        if !unresolved.is_empty() {
            warn!(
                "{} intersections have no readable pixels ({:?} policy)",
                unresolved.len(),
                self.params.missing_cells
            );
        }

        let mut clusters: Vec<PointCluster> =
            points.into_iter().map(PointCluster::singleton).collect();
        quick_partition(&mut clusters, self.params.cluster.quick_target);
        partition(&mut clusters, CLASS_COUNT)?;
        let sets = assign_sets(clusters)?;

        let result = ScanResult::new(*corners, samples, &sets, unresolved);
        info!(
            "board scanned: {} black, {} white, {} empty, match {:.1}",
            result.black.len(),
            result.white.len(),
            result.board.len(),
            result.match_score
        );
        Ok(result)
    }

    /// Turn samples into clustering points, applying the missing-cell policy.
    fn cluster_points(&self, samples: &[ColorSample]) -> (Vec<ClusterPoint>, Vec<BoardCoord>) {
        let mut points = Vec::with_capacity(samples.len());
        let mut missing = Vec::new();
        for s in samples {
            match s.feature {
                Some(feature) => points.push(ClusterPoint {
                    coord: s.coord,
                    feature,
                }),
                None => missing.push(s.coord),
            }
        }

        match self.params.missing_cells {
            MissingCellPolicy::Exclude => (points, missing),
            MissingCellPolicy::Neutral => {
                let Some(neutral) = mean_feature(&points) else {
                    return (points, missing);
                };
                debug!(
                    "substituting ({:.2}, {:.2}) for {} cells",
                    neutral.x,
                    neutral.y,
                    missing.len()
                );
                points.extend(missing.into_iter().map(|coord| ClusterPoint {
                    coord,
                    feature: neutral,
                }));
                (points, Vec::new())
            }
        }
    }
}

fn mean_feature(points: &[ClusterPoint]) -> Option<Feature> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (x, y) = points
        .iter()
        .fold((0.0, 0.0), |(x, y), p| (x + p.feature.x, y + p.feature.y));
    Some(Feature::new(x / n, y / n))
}

/// Summary of one labelled cluster.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClusterSummary {
    pub class: StoneClass,
    pub centroid: Feature,
    pub size: usize,
    /// [`PointCluster::spread`] of the cluster.
    pub spread: f64,
}

/// Outcome of a board scan.
///
/// Coordinate lists are sorted row-major. Every intersection appears in
/// exactly one of `black`, `white`, `board` or `unresolved`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub corners: BoardCorners,
    pub black: Vec<BoardCoord>,
    pub white: Vec<BoardCoord>,
    pub board: Vec<BoardCoord>,
    /// Intersections excluded from clustering for lack of readable pixels.
    pub unresolved: Vec<BoardCoord>,
    /// Black, white and board clusters, in that order.
    pub clusters: Vec<ClusterSummary>,
    /// Mean cluster spread; higher means a more confident split.
    pub match_score: f64,
    pub samples: Vec<ColorSample>,
}

impl ScanResult {
    fn new(
        corners: BoardCorners,
        samples: Vec<ColorSample>,
        sets: &StoneSets,
        mut unresolved: Vec<BoardCoord>,
    ) -> Self {
        let sorted = |cluster: &PointCluster| {
            let mut coords: Vec<BoardCoord> = cluster.coords().collect();
            coords.sort_unstable();
            coords
        };
        let clusters = [StoneClass::Black, StoneClass::White, StoneClass::Board]
            .into_iter()
            .map(|class| {
                let c = sets.get(class);
                ClusterSummary {
                    class,
                    centroid: c.centroid(),
                    size: c.len(),
                    spread: c.spread(),
                }
            })
            .collect();
        unresolved.sort_unstable();
        Self {
            corners,
            black: sorted(&sets.black),
            white: sorted(&sets.white),
            board: sorted(&sets.board),
            unresolved,
            clusters,
            match_score: sets.match_score(),
            samples,
        }
    }

    pub fn move_list(&self) -> MoveList {
        MoveList::new(self.black.clone(), self.white.clone())
    }

    /// The position as `(;AB...AW...)`.
    pub fn to_sgf(&self) -> String {
        self.move_list().to_sgf()
    }

    /// Class assigned to `coord`, `None` if it was unresolved.
    pub fn class_of(&self, coord: BoardCoord) -> Option<StoneClass> {
        [
            (StoneClass::Black, &self.black),
            (StoneClass::White, &self.white),
            (StoneClass::Board, &self.board),
        ]
        .into_iter()
        .find(|(_, coords)| coords.binary_search(&coord).is_ok())
        .map(|(class, _)| class)
    }

    /// Pretty JSON report of the whole result.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::CELL_COUNT;
    use crate::geometry::Point;
    use crate::image::RgbImage;

    fn uniform_scan(params: ScanParams, size: usize) -> Result<ScanResult, ScanError> {
        let img = RgbImage::filled(size, size, [190, 150, 90]);
        let scanner = BoardScanner::new(params)?;
        scanner.scan_values(
            &img.view(),
            &[10.0, 10.0, 10.0, 370.0, 370.0, 370.0, 370.0, 10.0],
        )
    }

    #[test]
    fn every_intersection_is_classified_once() {
        let result = uniform_scan(ScanParams::default(), 380).expect("scan");
        let total = result.black.len() + result.white.len() + result.board.len();
        assert_eq!(total, CELL_COUNT);
        assert!(result.unresolved.is_empty());
        let mut all: Vec<BoardCoord> = result
            .black
            .iter()
            .chain(&result.white)
            .chain(&result.board)
            .copied()
            .collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), CELL_COUNT);
        for coord in BoardCoord::all() {
            assert!(result.class_of(coord).is_some());
        }
    }

    #[test]
    fn cluster_summaries_follow_class_order() {
        let result = uniform_scan(ScanParams::default(), 380).expect("scan");
        let classes: Vec<StoneClass> = result.clusters.iter().map(|c| c.class).collect();
        assert_eq!(
            classes,
            vec![StoneClass::Black, StoneClass::White, StoneClass::Board]
        );
        assert_eq!(result.clusters[0].size, result.black.len());
        assert!((result.match_score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn cropped_image_excludes_unreadable_cells() {
        let result = uniform_scan(ScanParams::default(), 200).expect("scan");
        assert!(!result.unresolved.is_empty());
        let total = result.black.len() + result.white.len() + result.board.len();
        assert_eq!(total + result.unresolved.len(), CELL_COUNT);
        let far = BoardCoord::new(18, 18).expect("coord");
        assert_eq!(result.class_of(far), None);
    }

    #[test]
    fn neutral_policy_clusters_every_cell() {
        let params = ScanParams {
            missing_cells: MissingCellPolicy::Neutral,
            ..ScanParams::default()
        };
        let result = uniform_scan(params, 200).expect("scan");
        assert!(result.unresolved.is_empty());
        let total = result.black.len() + result.white.len() + result.board.len();
        assert_eq!(total, CELL_COUNT);
    }

    #[test]
    fn board_outside_image_is_a_cluster_underflow() {
        let img = RgbImage::filled(50, 50, [190, 150, 90]);
        let scanner = BoardScanner::new(ScanParams::default()).expect("scanner");
        let corners = BoardCorners::new([
            Point::new(1000.0, 1000.0),
            Point::new(1000.0, 1400.0),
            Point::new(1400.0, 1400.0),
            Point::new(1400.0, 1000.0),
        ])
        .expect("corners");
        let err = scanner.scan(&img.view(), &corners).unwrap_err();
        assert!(matches!(
            err,
            ScanError::Cluster(crate::ClusterError::Underflow {
                available: 0,
                target: 3
            })
        ));
    }

    #[test]
    fn duplicate_corner_fails_before_sampling() {
        let img = RgbImage::filled(50, 50, [190, 150, 90]);
        let scanner = BoardScanner::new(ScanParams::default()).expect("scanner");
        let err = scanner
            .scan_values(&img.view(), &[5.0, 5.0, 5.0, 5.0, 40.0, 40.0, 5.0, 40.0])
            .unwrap_err();
        assert!(matches!(err, ScanError::Corners(_)));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let mut params = ScanParams::default();
        params.cluster.quick_target = 1;
        assert!(matches!(
            BoardScanner::new(params),
            Err(ScanError::InvalidParams(_))
        ));
    }

    #[test]
    fn report_serializes() {
        let result = uniform_scan(ScanParams::default(), 380).expect("scan");
        let json = result.to_json_pretty().expect("json");
        let back: ScanResult = serde_json::from_str(&json).expect("parse");
        assert_eq!(back.to_sgf(), result.to_sgf());
    }
}
