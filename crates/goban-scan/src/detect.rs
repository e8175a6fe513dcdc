use std::fs;
use std::path::Path;

use crate::core::{
    BoardCorners, BoardScanner, CornerParseError, RgbImageView, ScanError, ScanParams, ScanResult,
    StoneClass,
};
use crate::io::{IoError, ScanConfig};
use image::{DynamicImage, Rgb};
use log::info;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Overlay colour of intersections classified as black stones.
pub const OVERLAY_BLACK: [u8; 3] = [255, 255, 255];
/// Overlay colour of intersections classified as white stones.
pub const OVERLAY_WHITE: [u8; 3] = [0, 0, 0];
/// Overlay colour of empty intersections.
pub const OVERLAY_BOARD: [u8; 3] = [139, 90, 43];
/// Overlay colour of intersections that could not be read.
pub const OVERLAY_UNRESOLVED: [u8; 3] = [255, 0, 0];

/// Errors produced by the high-level facade helpers.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("invalid RGB image buffer length (expected {expected} bytes, got {got})")]
    InvalidRgbBuffer { expected: usize, got: usize },

    #[error("invalid RGB image dimensions (width={width}, height={height})")]
    InvalidRgbDimensions { width: u32, height: u32 },

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Corners(#[from] CornerParseError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] IoError),

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Convert an `image::RgbImage` into the lightweight `goban-scan-core` view type.
pub fn rgb_view(img: &::image::RgbImage) -> RgbImageView<'_> {
    RgbImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        channels: 3,
        data: img.as_raw(),
    }
}

/// Copy a packed RGB8 buffer into an `image::RgbImage`.
pub fn rgb_image_from_slice(
    width: u32,
    height: u32,
    pixels: &[u8],
) -> Result<::image::RgbImage, DetectError> {
    if width == 0 || height == 0 {
        return Err(DetectError::InvalidRgbDimensions { width, height });
    }
    let expected = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(3))
        .ok_or(DetectError::InvalidRgbDimensions { width, height })?;
    if pixels.len() != expected {
        return Err(DetectError::InvalidRgbBuffer {
            expected,
            got: pixels.len(),
        });
    }
    ::image::RgbImage::from_raw(width, height, pixels.to_vec()).ok_or(
        DetectError::InvalidRgbBuffer {
            expected,
            got: pixels.len(),
        },
    )
}

/// Decode an image file into RGB8.
pub fn load_rgb(path: impl AsRef<Path>) -> Result<::image::RgbImage, DetectError> {
    Ok(image::open(path)?.to_rgb8())
}

/// Run the full scan on an RGB image.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(img, corners, params), fields(width = img.width(), height = img.height()))
)]
pub fn scan_rgb(
    img: &::image::RgbImage,
    corners: &BoardCorners,
    params: ScanParams,
) -> Result<ScanResult, DetectError> {
    let scanner = BoardScanner::new(params)?;
    Ok(scanner.scan(&rgb_view(img), corners)?)
}

/// Run the full scan on any decoded image; non-RGB8 inputs are converted first.
pub fn scan_image(
    img: &DynamicImage,
    corners: &BoardCorners,
    params: ScanParams,
) -> Result<ScanResult, DetectError> {
    match img {
        DynamicImage::ImageRgb8(rgb) => scan_rgb(rgb, corners, params),
        other => scan_rgb(&other.to_rgb8(), corners, params),
    }
}

/// Copy of `img` with a 3x3 marker at every sampled intersection.
///
/// Stones are drawn in the opposite colour so they stand out against the
/// stone underneath; board points are brown and unreadable points red.
pub fn render_overlay(img: &::image::RgbImage, result: &ScanResult) -> ::image::RgbImage {
    let mut out = img.clone();
    let (w, h) = (out.width() as i64, out.height() as i64);
    for sample in &result.samples {
        let rgb = match result.class_of(sample.coord) {
            Some(StoneClass::Black) => OVERLAY_BLACK,
            Some(StoneClass::White) => OVERLAY_WHITE,
            Some(StoneClass::Board) => OVERLAY_BOARD,
            None => OVERLAY_UNRESOLVED,
        };
        if !sample.pixel.x.is_finite() || !sample.pixel.y.is_finite() {
            continue;
        }
        let cx = sample.pixel.x.floor() as i64;
        let cy = sample.pixel.y.floor() as i64;
        for y in cy - 1..=cy + 1 {
            for x in cx - 1..=cx + 1 {
                if x >= 0 && y >= 0 && x < w && y < h {
                    out.put_pixel(x as u32, y as u32, Rgb(rgb));
                }
            }
        }
    }
    out
}

/// Run one configured scan and write every requested output file.
///
/// The SGF is only written when `sgf_path` is set; printing it otherwise is
/// left to the caller.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(config), fields(image = %config.image_path))
)]
pub fn execute(config: &ScanConfig) -> Result<ScanResult, DetectError> {
    let corners = config.board_corners()?;
    let img = load_rgb(&config.image_path)?;
    info!(
        "loaded {} ({}x{})",
        config.image_path,
        img.width(),
        img.height()
    );
    let result = scan_rgb(&img, &corners, config.effective_params())?;

    if let Some(path) = &config.sgf_path {
        write_text(path, &result.to_sgf())?;
        info!("wrote SGF to {path}");
    }
    if let Some(path) = &config.report_path {
        let json = result
            .to_json_pretty()
            .map_err(|e| DetectError::Config(IoError::Json(e)))?;
        write_text(path, &json)?;
        info!("wrote report to {path}");
    }
    if let Some(path) = &config.overlay_path {
        render_overlay(&img, &result).save(path)?;
        info!("wrote overlay to {path}");
    }
    Ok(result)
}

fn write_text(path: &str, text: &str) -> Result<(), DetectError> {
    fs::write(path, text).map_err(|source| DetectError::Write {
        path: path.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{BoardCoord, CornerOrder, ProjectiveFrame, RgbImage};

    const BOARD_RGB: [u8; 3] = [128, 128, 128];

    fn square_corners() -> BoardCorners {
        BoardCorners::parse("20,20,380,20,380,380,20,380", CornerOrder::Cyclic).expect("corners")
    }

    fn coord(col: usize, row: usize) -> BoardCoord {
        BoardCoord::new(col, row).expect("coord")
    }

    fn board_with_stones() -> ::image::RgbImage {
        let frame = ProjectiveFrame::new(square_corners()).expect("frame");
        let mut img = RgbImage::filled(400, 400, BOARD_RGB);
        for c in [coord(3, 3), coord(9, 9), coord(15, 15)] {
            img.fill_disc(frame.cell_point(c), 6.0, [20, 20, 20]);
        }
        for c in [coord(3, 15), coord(15, 3)] {
            img.fill_disc(frame.cell_point(c), 6.0, [235, 235, 235]);
        }
        rgb_image_from_slice(img.width as u32, img.height as u32, &img.data).expect("rgb image")
    }

    #[test]
    fn view_matches_image_layout() {
        let img = ::image::RgbImage::from_pixel(7, 5, Rgb([1, 2, 3]));
        let view = rgb_view(&img);
        assert_eq!((view.width, view.height, view.channels), (7, 5, 3));
        assert_eq!(view.data.len(), 7 * 5 * 3);
    }

    #[test]
    fn slice_conversion_checks_length() {
        let err = rgb_image_from_slice(4, 4, &[0u8; 10]).unwrap_err();
        assert!(matches!(
            err,
            DetectError::InvalidRgbBuffer {
                expected: 48,
                got: 10
            }
        ));
        assert!(matches!(
            rgb_image_from_slice(0, 4, &[]),
            Err(DetectError::InvalidRgbDimensions { .. })
        ));
    }

    #[test]
    fn scan_finds_painted_stones() {
        let img = board_with_stones();
        let result = scan_rgb(&img, &square_corners(), ScanParams::default()).expect("scan");
        assert_eq!(result.black, vec![coord(3, 3), coord(9, 9), coord(15, 15)]);
        let mut white = result.white.clone();
        white.sort();
        let mut expected = vec![coord(3, 15), coord(15, 3)];
        expected.sort();
        assert_eq!(white, expected);
        assert_eq!(result.to_sgf(), result.move_list().to_sgf());
    }

    #[test]
    fn grayscale_input_is_converted() {
        let rgb = board_with_stones();
        let luma = DynamicImage::ImageRgb8(rgb).grayscale();
        let result = scan_image(&luma, &square_corners(), ScanParams::default()).expect("scan");
        assert_eq!(result.black.len(), 3);
        assert_eq!(result.white.len(), 2);
    }

    #[test]
    fn overlay_marks_stones_in_opposite_colour() {
        let img = board_with_stones();
        let result = scan_rgb(&img, &square_corners(), ScanParams::default()).expect("scan");
        let overlay = render_overlay(&img, &result);
        let frame = ProjectiveFrame::new(square_corners()).expect("frame");

        let at = |c: BoardCoord| {
            let p = frame.cell_point(c);
            overlay.get_pixel(p.x.floor() as u32, p.y.floor() as u32).0
        };
        assert_eq!(at(coord(9, 9)), OVERLAY_BLACK);
        assert_eq!(at(coord(3, 15)), OVERLAY_WHITE);
        assert_eq!(at(coord(0, 0)), OVERLAY_BOARD);
        // Untouched away from intersections.
        assert_eq!(overlay.get_pixel(30, 30).0, BOARD_RGB);
    }

    #[test]
    fn execute_writes_requested_outputs() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let image_path = dir.path().join("board.png");
        board_with_stones().save(&image_path).expect("save png");

        let mut config = ScanConfig::new(
            image_path.to_string_lossy(),
            square_corners().to_values(CornerOrder::Cyclic).to_vec(),
        );
        let sgf_path = dir.path().join("board.sgf");
        let report_path = dir.path().join("report.json");
        let overlay_path = dir.path().join("overlay.png");
        config.sgf_path = Some(sgf_path.to_string_lossy().into_owned());
        config.report_path = Some(report_path.to_string_lossy().into_owned());
        config.overlay_path = Some(overlay_path.to_string_lossy().into_owned());

        let result = execute(&config).expect("execute");
        let sgf = fs::read_to_string(&sgf_path).expect("sgf");
        assert_eq!(sgf, result.to_sgf());
        let report: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&report_path).expect("report"))
                .expect("json");
        assert!(report.get("black").is_some());
        let overlay = load_rgb(&overlay_path).expect("overlay");
        assert_eq!(overlay.dimensions(), (400, 400));
    }

    #[test]
    fn execute_reports_missing_image() {
        let config = ScanConfig::new(
            "/no/such/board.png",
            square_corners().to_values(CornerOrder::Cyclic).to_vec(),
        );
        assert!(matches!(execute(&config), Err(DetectError::Image(_))));
    }
}
