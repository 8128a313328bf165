use linfa_linalg::LinalgError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WhiteningError>;

/// An error when whitening a pixel matrix
#[derive(Error, Debug)]
pub enum WhiteningError {
    /// When there are fewer than two pixels, the covariance is undefined
    #[error("at least two pixels are needed to estimate a covariance, got {0}")]
    NotEnoughSamples(usize),
    /// When the covariance has a non-positive or vanishing eigenvalue: a constant or rank
    /// deficient colour channel, e.g. a grey-scale image
    #[error(
        "degenerate input: covariance eigenvalue #{index} is {eigenvalue:e}, not above the threshold {threshold:e}"
    )]
    DegenerateInput {
        index: usize,
        eigenvalue: f64,
        threshold: f64,
    },
    #[error("eigenvalue tolerance should be positive but is {0}")]
    InvalidTolerance(f32),
    /// Errors encountered during linear algebra operations
    #[error("Linalg Error: {0}")]
    Linalg(#[from] LinalgError),
    #[error(transparent)]
    MelicaError(#[from] melica::error::Error),
}
