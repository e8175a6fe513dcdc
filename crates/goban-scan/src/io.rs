//! JSON scan configuration.
//!
//! A [`ScanConfig`] describes one scan job: where the photo is, where its
//! board corners are, and where to write the outputs. The CLI builds one
//! from its flags for `scan` and loads one from disk for `run`.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use goban_scan_core::{BoardCorners, CornerOrder, CornerParseError, ScanParams};
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum IoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Request-scoped description of one scan.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Photo of the board.
    pub image_path: String,
    /// Eight numbers: four `x, y` corner pairs laid out per `corner_order`.
    pub corners: Vec<f64>,
    /// Overrides `params.corner_order` when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_order: Option<CornerOrder>,
    /// Where to write the SGF. `None` means standard output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sgf_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overlay_path: Option<String>,
    /// Full [`goban_scan_core::ScanResult`] as JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,
    #[serde(default)]
    pub params: ScanParams,
}

impl ScanConfig {
    pub fn new(image_path: impl Into<String>, corners: Vec<f64>) -> Self {
        Self {
            image_path: image_path.into(),
            corners,
            corner_order: None,
            sgf_path: None,
            overlay_path: None,
            report_path: None,
            params: ScanParams::default(),
        }
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, IoError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), IoError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Parameters with the top-level corner order folded in.
    pub fn effective_params(&self) -> ScanParams {
        let mut params = self.params.clone();
        if let Some(order) = self.corner_order {
            params.corner_order = order;
        }
        params
    }

    pub fn board_corners(&self) -> Result<BoardCorners, CornerParseError> {
        BoardCorners::from_values(&self.corners, self.effective_params().corner_order)
    }
}

/// Load scan parameters from a JSON file. Missing fields take defaults.
pub fn load_params(path: impl AsRef<Path>) -> Result<ScanParams, IoError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use goban_scan_core::MissingCellPolicy;

    const FIXTURE: [f64; 8] = [582.0, 224.0, 277.0, 117.0, 399.0, 437.0, 45.0, 280.0];

    #[test]
    fn minimal_config_uses_defaults() {
        let json = r#"{ "image_path": "board.jpg", "corners": [0, 0, 100, 0, 100, 100, 0, 100] }"#;
        let cfg: ScanConfig = serde_json::from_str(json).expect("parse");
        assert_eq!(cfg.image_path, "board.jpg");
        assert!(cfg.sgf_path.is_none());
        assert_eq!(cfg.effective_params().corner_order, CornerOrder::Cyclic);
        let corners = cfg.board_corners().expect("corners");
        assert_eq!(corners.c().x, 100.0);
    }

    #[test]
    fn top_level_order_overrides_params() {
        let json = r#"{
            "image_path": "board.jpg",
            "corners": [582, 224, 277, 117, 399, 437, 45, 280],
            "corner_order": "detector",
            "params": { "missing_cells": "neutral" }
        }"#;
        let cfg: ScanConfig = serde_json::from_str(json).expect("parse");
        let params = cfg.effective_params();
        assert_eq!(params.corner_order, CornerOrder::Detector);
        assert_eq!(params.missing_cells, MissingCellPolicy::Neutral);
        let corners = cfg.board_corners().expect("corners");
        assert_eq!(corners.a().x, 277.0);
        assert_eq!(corners.b().y, 280.0);
        assert_eq!(corners.c().y, 437.0);
    }

    #[test]
    fn write_then_load_keeps_paths() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("scan.json");

        let mut cfg = ScanConfig::new("photo.png", FIXTURE.to_vec());
        cfg.corner_order = Some(CornerOrder::Detector);
        cfg.sgf_path = Some("out.sgf".to_string());
        cfg.write_json(&path).expect("write");

        let loaded = ScanConfig::load_json(&path).expect("load");
        assert_eq!(loaded.sgf_path.as_deref(), Some("out.sgf"));
        assert_eq!(loaded.corners, FIXTURE.to_vec());
        assert_eq!(loaded.corner_order, Some(CornerOrder::Detector));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ScanConfig::load_json("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }
}
