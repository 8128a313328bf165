use melica::Float;
use ndarray::{ArrayBase, Data, Ix1};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
/// Specifies centroid initialization algorithm for the two-group K-means.
pub enum TwoMeansInit<F: Float> {
    /// Pick two observations with distinct values uniformly at random.
    Random,
    /// Pick the first centroid uniformly, the second one with a probability proportional to
    /// its squared distance from the first. This is the two cluster case of the
    /// [K-means++](https://en.wikipedia.org/wiki/K-means%2B%2B) seeding.
    KMeansPlusPlus,
    /// Use the given centroids. All runs start from the same point, so more than one run is
    /// wasted work.
    Precomputed([F; 2]),
}

impl<F: Float> TwoMeansInit<F> {
    /// Runs the chosen initialization routine.
    ///
    /// `observations` must contain at least two distinct values.
    pub(crate) fn run<R: Rng>(
        &self,
        observations: &ArrayBase<impl Data<Elem = F>, Ix1>,
        rng: &mut R,
    ) -> [F; 2] {
        match self {
            Self::Random => random_init(observations, rng),
            Self::KMeansPlusPlus => k_means_plus_plus(observations, rng),
            Self::Precomputed(centroids) => *centroids,
        }
    }
}

/// Pick an observation uniformly, then another one among those with a different value.
fn random_init<F: Float, R: Rng>(
    observations: &ArrayBase<impl Data<Elem = F>, Ix1>,
    rng: &mut R,
) -> [F; 2] {
    let first = observations[rng.gen_range(0..observations.len())];
    let n_different = observations.iter().filter(|&&x| x != first).count();
    let nth = rng.gen_range(0..n_different);
    let second = observations
        .iter()
        .cloned()
        .filter(|&x| x != first)
        .nth(nth)
        .unwrap_or(first);

    [first, second]
}

fn k_means_plus_plus<F: Float, R: Rng>(
    observations: &ArrayBase<impl Data<Elem = F>, Ix1>,
    rng: &mut R,
) -> [F; 2] {
    let first = observations[rng.gen_range(0..observations.len())];
    let weights = observations
        .iter()
        .map(|&x| (x - first).powi(2).to_f64().unwrap_or(0.));

    match WeightedIndex::new(weights) {
        Ok(dist) => [first, observations[dist.sample(rng)]],
        // every weight is zero only when the observations are constant
        Err(_) => random_init(observations, rng),
    }
}
