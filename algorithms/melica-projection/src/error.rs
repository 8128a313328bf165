use melica_clustering::{TwoMeansError, TwoMeansParamsError};
use melica_whitening::WhiteningError;
use rayon::ThreadPoolBuildError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProjectionError>;

/// An error when fitting a projection with an invalid hyperparameter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionParamsError {
    #[error("n_runs cannot be 0")]
    NRuns,
    #[error("max_n_iterations cannot be 0")]
    MaxIterations,
    #[error("subsample_stride cannot be 0")]
    SubsampleStride,
    #[error("num_workers cannot be 0")]
    NumWorkers,
    #[error("eigenvalue_tolerance should be positive and finite but is {0}")]
    EigenvalueTolerance(f32),
    #[error("angular_resolution should be a divisor of 180 degrees but is {0}")]
    AngularResolution(usize),
    #[error("precomputed centroids should be finite and distinct")]
    PrecomputedCentroids,
    /// When the input is not an `(height, width, 3)` image
    #[error("malformed image: {0}")]
    ImageShape(String),
}

impl From<TwoMeansParamsError> for ProjectionParamsError {
    fn from(err: TwoMeansParamsError) -> Self {
        match err {
            TwoMeansParamsError::NRuns => ProjectionParamsError::NRuns,
            TwoMeansParamsError::MaxIterations => ProjectionParamsError::MaxIterations,
            TwoMeansParamsError::PrecomputedCentroids => {
                ProjectionParamsError::PrecomputedCentroids
            }
        }
    }
}

/// Image shape errors are configuration errors, everything else passes through
pub(crate) fn load_error(err: melica::error::Error) -> ProjectionError {
    match err {
        melica::error::Error::InvalidImageShape(msg) => {
            ProjectionParamsError::ImageShape(msg).into()
        }
        other => other.into(),
    }
}

/// An error of the projection pursuit
///
/// Every fatal error names the stage of the pipeline that failed.
#[derive(Error, Debug)]
pub enum ProjectionError {
    /// When any of the hyperparameters are set the wrong value, raised before any computation
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] ProjectionParamsError),
    /// When the covariance of the pixels cannot be whitened
    #[error("stage `whiten` failed: {0}")]
    DegenerateInput(#[from] WhiteningError),
    #[error("stage `search IC1` could not start its worker pool: {0}")]
    WorkerPool(#[from] ThreadPoolBuildError),
    /// When a vector expected to be a direction is not of unit length
    #[error("direction has norm {0} instead of 1")]
    NotUnitNorm(f64),
    /// When two axes expected to be orthogonal are not
    #[error("axes are not orthogonal, their dot product is {0}")]
    NotOrthogonal(f64),
    #[error("a direction set needs at least one direction")]
    EmptyDirectionSet,
    #[error("projection axis {0} does not exist, the basis has 3 axes")]
    InvalidAxis(usize),
    /// When a projection layer cannot be split in lesion and skin
    #[error("stage `segment` failed: {0}")]
    Segmentation(#[from] TwoMeansError),
    #[error(transparent)]
    MelicaError(#[from] melica::error::Error),
}
