use crate::TwoMeansParamsError;

use super::init::TwoMeansInit;
use melica::{Float, ParamGuard};
use rand::Rng;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
/// The set of hyperparameters that can be specified for the execution of
/// the [two-group K-means algorithm](crate::TwoMeans).
pub struct TwoMeansValidParams<F: Float, R: Rng> {
    /// Number of time the algorithm will be run with different centroid seeds.
    n_runs: usize,
    /// We exit the training loop when the number of training iterations
    /// exceeds `max_n_iterations` even if no observation changed cluster
    /// during the last iteration.
    max_n_iterations: u64,
    /// The initialization strategy used to initialize the centroids.
    init: TwoMeansInit<F>,
    /// The random number generator
    rng: R,
}

#[derive(Clone, Debug, PartialEq)]
/// An helper struct used to construct a set of [valid hyperparameters](TwoMeansValidParams) for
/// the [two-group K-means algorithm](crate::TwoMeans) (using the builder pattern).
pub struct TwoMeansParams<F: Float, R: Rng>(TwoMeansValidParams<F, R>);

impl<F: Float, R: Rng> TwoMeansParams<F, R> {
    /// `new` lets us configure our training algorithm parameters:
    /// * the training of one run is considered complete when no observation
    ///   changes cluster during an iteration;
    /// * we exit the training loop when the number of training iterations
    ///   exceeds `max_n_iterations` even if the convergence condition has not been met;
    /// * as the result depends on the initial centroids we run the algorithm
    ///   `n_runs` times and keep the run with the lowest inertia, that is the
    ///   smallest sum of squared distances to the closest centroid.
    ///
    /// Defaults are provided if optional parameters are not specified:
    /// * `max_n_iterations = 25`
    /// * `n_runs = 5`
    /// * `init = Random`
    pub fn new(rng: R) -> Self {
        Self(TwoMeansValidParams {
            n_runs: 5,
            max_n_iterations: 25,
            init: TwoMeansInit::Random,
            rng,
        })
    }

    /// Change the value of `n_runs`
    pub fn n_runs(mut self, n_runs: usize) -> Self {
        self.0.n_runs = n_runs;
        self
    }

    /// Change the value of `max_n_iterations`
    pub fn max_n_iterations(mut self, max_n_iterations: u64) -> Self {
        self.0.max_n_iterations = max_n_iterations;
        self
    }

    /// Change the value of `init`
    pub fn init_method(mut self, init: TwoMeansInit<F>) -> Self {
        self.0.init = init;
        self
    }

    /// Specify the random number generator used to seed the runs
    pub fn with_rng<R2: Rng>(self, rng: R2) -> TwoMeansParams<F, R2> {
        TwoMeansParams(self.0.with_rng(rng))
    }
}

impl<F: Float, R: Rng> ParamGuard for TwoMeansParams<F, R> {
    type Checked = TwoMeansValidParams<F, R>;
    type Error = TwoMeansParamsError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        if self.0.n_runs == 0 {
            Err(TwoMeansParamsError::NRuns)
        } else if self.0.max_n_iterations == 0 {
            Err(TwoMeansParamsError::MaxIterations)
        } else if let TwoMeansInit::Precomputed([a, b]) = self.0.init {
            if a.is_finite() && b.is_finite() && a != b {
                Ok(&self.0)
            } else {
                Err(TwoMeansParamsError::PrecomputedCentroids)
            }
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}

impl<F: Float, R: Rng> TwoMeansValidParams<F, R> {
    /// The final results will be the best output of n_runs consecutive runs in terms of inertia.
    pub fn n_runs(&self) -> usize {
        self.n_runs
    }

    /// We exit the training loop when the number of training iterations
    /// exceeds `max_n_iterations` even if no run has converged.
    pub fn max_n_iterations(&self) -> u64 {
        self.max_n_iterations
    }

    /// Cluster initialization strategy
    pub fn init_method(&self) -> &TwoMeansInit<F> {
        &self.init
    }

    /// Returns the random generator
    pub fn rng(&self) -> &R {
        &self.rng
    }

    /// The same checked hyperparameters with another random generator.
    ///
    /// Used to give every independent clustering problem its own random stream.
    pub fn with_rng<R2: Rng>(&self, rng: R2) -> TwoMeansValidParams<F, R2> {
        TwoMeansValidParams {
            n_runs: self.n_runs,
            max_n_iterations: self.max_n_iterations,
            init: self.init.clone(),
            rng,
        }
    }
}
