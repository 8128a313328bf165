use thiserror::Error;

/// An error when fitting with an invalid hyperparameter
#[derive(Error, Debug)]
pub enum TwoMeansParamsError {
    #[error("n_runs cannot be 0")]
    NRuns,
    #[error("max_n_iterations cannot be 0")]
    MaxIterations,
    #[error("precomputed centroids must be finite and distinct")]
    PrecomputedCentroids,
}

/// An error when splitting observations in two groups
#[derive(Error, Debug)]
pub enum TwoMeansError {
    /// When any of the hyperparameters are set the wrong value
    #[error("Invalid hyperparameter: {0}")]
    InvalidParams(#[from] TwoMeansParamsError),
    /// When there are fewer observations than clusters
    #[error("Fitting failed: {0} observations cannot form two clusters")]
    NotEnoughSamples(usize),
    /// When all the observations share the same value
    #[error("Fitting failed: fewer distinct observations than clusters")]
    ConstantObservations,
    /// When every run ended with an empty cluster
    #[error("Fitting failed: every run ended with an empty cluster")]
    EmptyCluster,
    #[error(transparent)]
    MelicaError(#[from] melica::error::Error),
}

impl TwoMeansError {
    /// Whether the error comes from the observations themselves rather than from the
    /// configuration: such observations cannot be split in two groups at all.
    pub fn is_degenerate(&self) -> bool {
        matches!(
            self,
            TwoMeansError::NotEnoughSamples(_)
                | TwoMeansError::ConstantObservations
                | TwoMeansError::EmptyCluster
        )
    }
}
