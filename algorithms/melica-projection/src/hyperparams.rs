use crate::error::{ProjectionError, ProjectionParamsError};
use crate::pipeline::ProjectionPursuit;
use crate::search::SearchStrategy;
use melica::{Float, ParamGuard};
use melica_clustering::{TwoMeans, TwoMeansInit, TwoMeansValidParams};
use melica_whitening::{WhitenerParams, WhitenerValidParams};
use rand::Rng;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Projection pursuit hyperparameters
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionPursuitValidParams<F: Float> {
    n_runs: usize,
    max_n_iterations: u64,
    init_method: TwoMeansInit<F>,
    subsample_stride: usize,
    num_workers: usize,
    random_seed: u64,
    strategy: SearchStrategy,
    keep_score_surface: bool,
    eigenvalue_tolerance: F,
    angular_resolution: usize,
}

impl<F: Float> ProjectionPursuitValidParams<F> {
    /// Number of restarts of every clustering call
    pub fn n_runs(&self) -> usize {
        self.n_runs
    }

    /// Iteration cap of every clustering restart
    pub fn max_n_iterations(&self) -> u64 {
        self.max_n_iterations
    }

    pub fn init_method(&self) -> &TwoMeansInit<F> {
        &self.init_method
    }

    /// One pixel out of `subsample_stride` is kept along both axes of the image
    pub fn subsample_stride(&self) -> usize {
        self.subsample_stride
    }

    /// Number of worker threads of the parallel search
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    pub fn random_seed(&self) -> u64 {
        self.random_seed
    }

    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    pub fn keep_score_surface(&self) -> bool {
        self.keep_score_surface
    }

    pub fn eigenvalue_tolerance(&self) -> F {
        self.eigenvalue_tolerance
    }

    /// Step of the angular grids of both searches, in degrees
    pub fn angular_resolution(&self) -> usize {
        self.angular_resolution
    }

    /// Whitening hyperparameters derived from these ones
    pub fn whitener(&self) -> WhitenerParams<F> {
        WhitenerParams::new().eigenvalue_tolerance(self.eigenvalue_tolerance)
    }

    /// Checked clustering hyperparameters derived from these ones, drawing from `rng`
    pub fn clustering<R: Rng>(
        &self,
        rng: R,
    ) -> Result<TwoMeansValidParams<F, R>, ProjectionError> {
        TwoMeans::params_with_rng(rng)
            .n_runs(self.n_runs)
            .max_n_iterations(self.max_n_iterations)
            .init_method(self.init_method.clone())
            .check()
            .map_err(|err| ProjectionParamsError::from(err).into())
    }

    pub(crate) fn checked_whitener(&self) -> Result<WhitenerValidParams<F>, ProjectionError> {
        Ok(self.whitener().check()?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionPursuitParams<F: Float>(ProjectionPursuitValidParams<F>);

impl<F: Float> Default for ProjectionPursuitParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> ProjectionPursuit<F> {
    pub fn params() -> ProjectionPursuitParams<F> {
        ProjectionPursuitParams::new()
    }
}

impl<F: Float> ProjectionPursuitParams<F> {
    /// Create new projection pursuit hyperparameters with default values
    ///
    /// Defaults are:
    /// * `n_runs = 5`
    /// * `max_n_iterations = 25`
    /// * `init_method = TwoMeansInit::Random`
    /// * `subsample_stride = 1`
    /// * `num_workers` = available parallelism minus one, at least one
    /// * `random_seed = 42`
    /// * `strategy = SearchStrategy::Parallel`
    /// * `keep_score_surface = false`
    /// * `eigenvalue_tolerance = 1e-10`
    /// * `angular_resolution = 1`
    pub fn new() -> Self {
        Self(ProjectionPursuitValidParams {
            n_runs: 5,
            max_n_iterations: 25,
            init_method: TwoMeansInit::Random,
            subsample_stride: 1,
            num_workers: default_num_workers(),
            random_seed: 42,
            strategy: SearchStrategy::Parallel,
            keep_score_surface: false,
            eigenvalue_tolerance: F::cast(1e-10),
            angular_resolution: 1,
        })
    }

    /// Set the number of restarts of every clustering call.
    ///
    /// More restarts make the score of a direction less dependent on the initial centroids.
    pub fn n_runs(mut self, n_runs: usize) -> Self {
        self.0.n_runs = n_runs;
        self
    }

    /// Set the iteration cap of every clustering restart.
    pub fn max_n_iterations(mut self, max_n_iterations: u64) -> Self {
        self.0.max_n_iterations = max_n_iterations;
        self
    }

    /// Change the initialization of the clustering centroids.
    pub fn init_method(mut self, init_method: TwoMeansInit<F>) -> Self {
        self.0.init_method = init_method;
        self
    }

    /// Keep one pixel out of `stride` along both axes before searching. The projections
    /// are then laid out on the reduced grid.
    pub fn subsample_stride(mut self, stride: usize) -> Self {
        self.0.subsample_stride = stride;
        self
    }

    /// Set the number of threads of the parallel search.
    pub fn num_workers(mut self, num_workers: usize) -> Self {
        self.0.num_workers = num_workers;
        self
    }

    /// Seed the Gram-Schmidt vector and every clustering call for reproducible results.
    pub fn random_seed(mut self, random_seed: u64) -> Self {
        self.0.random_seed = random_seed;
        self
    }

    /// Choose how the search of the first axis is executed, refer [`SearchStrategy`]
    pub fn strategy(mut self, strategy: SearchStrategy) -> Self {
        self.0.strategy = strategy;
        self
    }

    /// Keep the score of every candidate direction in the fitted model.
    pub fn keep_score_surface(mut self, keep: bool) -> Self {
        self.0.keep_score_surface = keep;
        self
    }

    /// Set the smallest covariance eigenvalue accepted, relative to the largest one.
    pub fn eigenvalue_tolerance(mut self, tolerance: F) -> Self {
        self.0.eigenvalue_tolerance = tolerance;
        self
    }

    /// Set the step of the angular grids in degrees. It has to divide 180, the default of one
    /// degree gives `64 800` candidates for the first axis and `360` for the second one.
    pub fn angular_resolution(mut self, degrees: usize) -> Self {
        self.0.angular_resolution = degrees;
        self
    }
}

impl<F: Float> ParamGuard for ProjectionPursuitParams<F> {
    type Checked = ProjectionPursuitValidParams<F>;
    type Error = ProjectionError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        let params = &self.0;
        let tolerance = params.eigenvalue_tolerance;
        let error = if params.n_runs == 0 {
            Some(ProjectionParamsError::NRuns)
        } else if params.max_n_iterations == 0 {
            Some(ProjectionParamsError::MaxIterations)
        } else if params.subsample_stride == 0 {
            Some(ProjectionParamsError::SubsampleStride)
        } else if params.num_workers == 0 {
            Some(ProjectionParamsError::NumWorkers)
        } else if tolerance <= F::zero() || !tolerance.is_finite() {
            Some(ProjectionParamsError::EigenvalueTolerance(
                tolerance.to_f32().unwrap_or(f32::NAN),
            ))
        } else if params.angular_resolution == 0 || 180 % params.angular_resolution != 0 {
            Some(ProjectionParamsError::AngularResolution(
                params.angular_resolution,
            ))
        } else if !valid_init(&params.init_method) {
            Some(ProjectionParamsError::PrecomputedCentroids)
        } else {
            None
        };

        match error {
            Some(error) => Err(error.into()),
            None => Ok(params),
        }
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}

fn valid_init<F: Float>(init: &TwoMeansInit<F>) -> bool {
    match init {
        TwoMeansInit::Precomputed([a, b]) => a.is_finite() && b.is_finite() && a != b,
        _ => true,
    }
}

/// Available parallelism minus one core left to the caller, at least one worker
pub fn default_num_workers() -> usize {
    std::thread::available_parallelism()
        .map_or(1, usize::from)
        .saturating_sub(1)
        .max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn autotraits() {
        fn has_autotraits<T: Send + Sync + Sized + Unpin>() {}
        has_autotraits::<ProjectionPursuitParams<f64>>();
        has_autotraits::<ProjectionPursuitValidParams<f64>>();
        has_autotraits::<ProjectionParamsError>();
        has_autotraits::<ProjectionError>();
    }

    #[test]
    fn defaults() {
        let params = ProjectionPursuit::<f64>::params().check_unwrap();
        assert_eq!(params.n_runs(), 5);
        assert_eq!(params.max_n_iterations(), 25);
        assert_eq!(params.subsample_stride(), 1);
        assert_eq!(params.random_seed(), 42);
        assert_eq!(params.strategy(), SearchStrategy::Parallel);
        assert_eq!(params.angular_resolution(), 1);
        assert!(params.num_workers() >= 1);
        assert!(!params.keep_score_surface());
    }

    fn rejected(params: ProjectionPursuitParams<f64>) -> ProjectionParamsError {
        match params.check() {
            Err(ProjectionError::InvalidConfiguration(err)) => err,
            other => panic!("expected an invalid configuration, got {:?}", other),
        }
    }

    #[test]
    fn zero_counts_are_rejected() {
        let params = ProjectionPursuit::params;
        assert_eq!(rejected(params().n_runs(0)), ProjectionParamsError::NRuns);
        assert_eq!(
            rejected(params().max_n_iterations(0)),
            ProjectionParamsError::MaxIterations
        );
        assert_eq!(
            rejected(params().subsample_stride(0)),
            ProjectionParamsError::SubsampleStride
        );
        assert_eq!(
            rejected(params().num_workers(0)),
            ProjectionParamsError::NumWorkers
        );
    }

    #[test]
    fn resolution_must_divide_half_turn() {
        let params = ProjectionPursuit::params;
        assert_eq!(
            rejected(params().angular_resolution(7)),
            ProjectionParamsError::AngularResolution(7)
        );
        assert_eq!(
            rejected(params().angular_resolution(0)),
            ProjectionParamsError::AngularResolution(0)
        );
        for degrees in &[1, 2, 5, 10, 45, 90, 180] {
            assert!(params().angular_resolution(*degrees).check().is_ok());
        }
    }

    #[test]
    fn tolerance_must_be_positive() {
        let err = rejected(ProjectionPursuit::params().eigenvalue_tolerance(0.));
        assert!(matches!(err, ProjectionParamsError::EigenvalueTolerance(_)));
        let err = rejected(ProjectionPursuit::params().eigenvalue_tolerance(f64::NAN));
        assert!(matches!(err, ProjectionParamsError::EigenvalueTolerance(_)));
    }

    #[test]
    fn precomputed_centroids_are_checked_upfront() {
        let params = ProjectionPursuit::params;
        assert_eq!(
            rejected(params().init_method(TwoMeansInit::Precomputed([1., 1.]))),
            ProjectionParamsError::PrecomputedCentroids
        );
        assert_eq!(
            rejected(params().init_method(TwoMeansInit::Precomputed([f64::NAN, 1.]))),
            ProjectionParamsError::PrecomputedCentroids
        );
        assert!(params()
            .init_method(TwoMeansInit::Precomputed([-1., 1.]))
            .check()
            .is_ok());
    }

    #[test]
    fn derived_clustering_params() {
        use rand::SeedableRng;
        use rand_xoshiro::Xoshiro256Plus;

        let params = ProjectionPursuit::<f64>::params()
            .n_runs(3)
            .max_n_iterations(40)
            .check_unwrap();
        let clustering = params
            .clustering(Xoshiro256Plus::seed_from_u64(0))
            .unwrap();
        assert_eq!(clustering.n_runs(), 3);
        assert_eq!(clustering.max_n_iterations(), 40);
    }
}
