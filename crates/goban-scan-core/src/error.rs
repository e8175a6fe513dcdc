/// Invalid board corner geometry, detected when the frame is built.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("corner {index} has a non-finite coordinate")]
    NonFinite { index: usize },
    #[error("corners {first} and {second} coincide")]
    DuplicateCorner { first: usize, second: usize },
    #[error("corner {index} is collinear with its neighbours")]
    CollinearCorners { index: usize },
    #[error("corners do not form a convex quadrilateral in cyclic order")]
    NonConvex,
    #[error("corner {index} lies on the vanishing line")]
    CornerOnHorizon { index: usize },
}

/// Failure turning raw numbers or text into board corners.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CornerParseError {
    #[error("expected 8 corner values, got {got}")]
    WrongCount { got: usize },
    #[error("invalid corner value {value:?}")]
    InvalidNumber { value: String },
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Agglomerative clustering could not produce the requested partition.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ClusterError {
    #[error("cannot partition {available} clusters into {target}")]
    Underflow { available: usize, target: usize },
    #[error("partition target must be at least 1")]
    ZeroTarget,
    #[error("expected exactly {expected} clusters, got {got}")]
    WrongClusterCount { expected: usize, got: usize },
}

/// Malformed move-list document.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SgfError {
    #[error("move list must be wrapped in \"(;\" and \")\"")]
    MissingDelimiters,
    #[error("unexpected character {found:?} at byte {offset}")]
    UnexpectedChar { found: char, offset: usize },
    #[error("unsupported property {0:?}")]
    UnsupportedProperty(String),
    #[error("invalid board coordinate {0:?}")]
    InvalidCoord(String),
    #[error("unterminated property value at byte {offset}")]
    Unterminated { offset: usize },
}

/// Errors returned by [`crate::BoardScanner`].
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    #[error("invalid image buffer length (expected {expected} bytes, got {got})")]
    InvalidImageBuffer { expected: usize, got: usize },
    #[error("invalid image dimensions (width={width}, height={height})")]
    InvalidImageDimensions { width: usize, height: usize },
    #[error("unsupported channel count {0} (expected 3 or 4)")]
    UnsupportedChannels(usize),
    #[error("invalid scan parameters: {0}")]
    InvalidParams(String),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Corners(#[from] CornerParseError),
    #[error(transparent)]
    Cluster(#[from] ClusterError),
}
