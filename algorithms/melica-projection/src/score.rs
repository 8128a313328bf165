//! Fisher index of a direction
//!
//! The records are projected on the direction, the projection is split in two groups by the
//! two-group k-means and the score is
//!
//! ```text
//! (m₁ - m₂)² / (σ₁² + σ₂² + ε),    ε = 1e-10
//! ```
//!
//! with `mᵢ` the mean and `σᵢ²` the sample variance of group `i`. A projection that cannot
//! be split in two groups of at least two values scores zero.

use crate::direction::Direction;
use melica::traits::Fit;
use melica::Float;
use melica_clustering::{ClusterStats, TwoMeans, TwoMeansError, TwoMeansValidParams};
use ndarray::{ArrayBase, ArrayView1, Data, Ix2};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

/// Added to the summed variances so that two flat groups get a finite score
pub const FISHER_EPSILON: f64 = 1e-10;

/// Fisher index of two clusters, `None` if a cluster has no variance estimate
pub fn fisher_index<F: Float>(clusters: &[ClusterStats<F>; 2]) -> Option<F> {
    let [first, second] = clusters;
    let spread = first.variance()? + second.variance()? + F::cast(FISHER_EPSILON);
    Some((first.mean() - second.mean()).powi(2) / spread)
}

/// Score of one candidate direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation<F> {
    pub score: F,
    /// Whether the projection could not be split and the score fell back to zero
    pub degenerate: bool,
}

/// Scores directions by the Fisher index of the two-group split of the projected records
///
/// Every direction gets its own clustering random generator, derived from the seed, the
/// stream of the scorer and the index of the direction in its set. The score of a direction
/// thus only depends on those three values and not on the order nor the thread in which the
/// directions are evaluated.
#[derive(Debug, Clone, PartialEq)]
pub struct SeparabilityScorer<F: Float> {
    clustering: TwoMeansValidParams<F, Xoshiro256Plus>,
    seed: u64,
    stream: u64,
}

impl<F: Float> SeparabilityScorer<F> {
    /// Score with the given clustering hyperparameters, whose generator is replaced by one
    /// derived from `seed` for every direction
    pub fn new<R: Rng>(clustering: &TwoMeansValidParams<F, R>, seed: u64) -> Self {
        SeparabilityScorer {
            clustering: clustering.with_rng(Xoshiro256Plus::seed_from_u64(seed)),
            seed,
            stream: 0,
        }
    }

    /// Use independent generators for another pass over the same direction indices
    pub fn with_stream(mut self, stream: u64) -> Self {
        self.stream = stream;
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn stream(&self) -> u64 {
        self.stream
    }

    /// Separability score of `direction`, the candidate at `index` of its set
    pub fn score(
        &self,
        whitened: &ArrayBase<impl Data<Elem = F>, Ix2>,
        direction: &Direction<F>,
        index: usize,
    ) -> F {
        self.evaluate(whitened, direction.view(), index).score
    }

    /// Score along with the outcome of the clustering
    pub fn evaluate(
        &self,
        whitened: &ArrayBase<impl Data<Elem = F>, Ix2>,
        direction: ArrayView1<F>,
        index: usize,
    ) -> Evaluation<F> {
        let projection = whitened.dot(&direction);
        let clustering = self.clustering.with_rng(self.rng_for(index));
        let fitted: Result<TwoMeans<F>, TwoMeansError> = clustering.fit(&projection);

        match fitted.map(|model| fisher_index(model.clusters())) {
            Ok(Some(score)) => Evaluation {
                score,
                degenerate: false,
            },
            Ok(None) => {
                tracing::trace!(index, "single value cluster, direction scored 0");
                Evaluation {
                    score: F::zero(),
                    degenerate: true,
                }
            }
            Err(err) => {
                tracing::trace!(index, error = %err, "degenerate projection, direction scored 0");
                Evaluation {
                    score: F::zero(),
                    degenerate: true,
                }
            }
        }
    }

    fn rng_for(&self, index: usize) -> Xoshiro256Plus {
        // the seeding of xoshiro expands the 64 bits with splitmix, nearby keys are fine
        let key = self.seed
            ^ self.stream.rotate_left(40)
            ^ (index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        Xoshiro256Plus::seed_from_u64(key)
    }
}
