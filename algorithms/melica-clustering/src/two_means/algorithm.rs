use crate::two_means::errors::TwoMeansError;
use crate::two_means::{TwoMeansParams, TwoMeansValidParams};
use melica::traits::Fit;
use melica::Float;
use ndarray::{Array1, ArrayBase, Data, Ix1, Zip};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Summary of one cluster of scalar observations.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClusterStats<F> {
    count: usize,
    mean: F,
    variance: Option<F>,
}

impl<F: Float> ClusterStats<F> {
    /// Number of observations in the cluster
    pub fn count(&self) -> usize {
        self.count
    }

    /// Mean of the observations in the cluster
    pub fn mean(&self) -> F {
        self.mean
    }

    /// Unbiased sample variance (divisor `count - 1`) of the observations in the cluster,
    /// `None` for a single observation.
    pub fn variance(&self) -> Option<F> {
        self.variance
    }
}

#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Clone, Debug, PartialEq)]
/// Two-group K-means splits scalar observations in two clusters,
/// where each observation belongs to the cluster with the nearest mean.
///
/// The mean of the observations within a cluster is called *centroid*.
///
/// ## Algorithm
///
/// This is the standard algorithm (also known as Lloyd's Algorithm) specialised for
/// one dimensional data and exactly two clusters: the nearest centroid of an observation is
/// decided by comparing it to the midpoint of the two centroids.
///
/// - initialisation step: pick two distinct observations as centroids (see
///   [`TwoMeansInit`](crate::TwoMeansInit));
/// - assignment step: assign each observation to the nearest centroid, the first one on ties;
/// - update step: recompute the centroid of each cluster.
///
/// Assignment and update are repeated until no observation changes cluster or
/// `max_n_iterations` is reached. Not reaching convergence is not an error: the
/// partition of the last iteration is kept.
///
/// The result depends on the initial centroids, so the whole procedure is repeated
/// `n_runs` times and the run with the lowest inertia wins, the first one on ties. All runs
/// draw from the random generator of the hyperparameters, which makes the result a pure
/// function of the observations and the hyperparameters.
///
/// The fitted clusters are ordered: cluster `0` has the lower mean.
///
/// ## Tutorial
///
/// ```
/// use melica::traits::Fit;
/// use melica_clustering::TwoMeans;
/// use ndarray::array;
///
/// let observations = array![0.1, -0.2, 0.0, 9.8, 10.1, 10.0];
/// let model = TwoMeans::params().n_runs(3).fit(&observations).unwrap();
///
/// assert_eq!(model.memberships(), &array![0, 0, 0, 1, 1, 1]);
/// assert_eq!(model.clusters()[1].count(), 3);
/// ```
pub struct TwoMeans<F> {
    centroids: [F; 2],
    memberships: Array1<usize>,
    clusters: [ClusterStats<F>; 2],
    inertia: F,
    n_iterations: u64,
}

impl<F: Float> TwoMeans<F> {
    pub fn params() -> TwoMeansParams<F, Xoshiro256Plus> {
        TwoMeansParams::new(Xoshiro256Plus::seed_from_u64(42))
    }

    pub fn params_with_rng<R: Rng>(rng: R) -> TwoMeansParams<F, R> {
        TwoMeansParams::new(rng)
    }

    /// Return the two centroids, the lower one first
    pub fn centroids(&self) -> &[F; 2] {
        &self.centroids
    }

    /// Return the cluster index of every training observation
    pub fn memberships(&self) -> &Array1<usize> {
        &self.memberships
    }

    /// Return the count, mean and variance of both clusters
    pub fn clusters(&self) -> &[ClusterStats<F>; 2] {
        &self.clusters
    }

    /// Return the sum of squared distances between each training observation and its
    /// centroid, averaged across all training observations.
    pub fn inertia(&self) -> F {
        self.inertia
    }

    /// Number of iterations of the winning run
    pub fn n_iterations(&self) -> u64 {
        self.n_iterations
    }

    /// Given scalar observations, return for each the index of the closest centroid.
    pub fn predict(&self, observations: &ArrayBase<impl Data<Elem = F>, Ix1>) -> Array1<usize> {
        observations.mapv(|x| closest_centroid(&self.centroids, x))
    }
}

impl<F: Float, R: Rng + Clone, D: Data<Elem = F>> Fit<ArrayBase<D, Ix1>, TwoMeansError>
    for TwoMeansValidParams<F, R>
{
    type Object = TwoMeans<F>;

    /// Given scalar `observations`, `fit` splits them in two clusters.
    ///
    /// # Errors
    ///
    /// If there are fewer than two observations, if all observations are equal or if every
    /// run ended with an empty cluster.
    fn fit(&self, observations: &ArrayBase<D, Ix1>) -> Result<Self::Object, TwoMeansError> {
        let n_samples = observations.len();
        if n_samples < 2 {
            return Err(TwoMeansError::NotEnoughSamples(n_samples));
        }
        let first = observations[0];
        if observations.iter().all(|&x| x == first) {
            return Err(TwoMeansError::ConstantObservations);
        }

        let mut rng = self.rng().clone();
        let mut memberships = Array1::zeros(n_samples);
        let mut best: Option<Run<F>> = None;

        for _ in 0..self.n_runs() {
            let centroids = self.init_method().run(observations, &mut rng);
            let run = lloyd(
                observations,
                centroids,
                self.max_n_iterations(),
                &mut memberships,
            );

            // We keep the partition which minimizes the inertia over the n runs
            if let Some((centroids, inertia, n_iterations)) = run {
                let improves = best.as_ref().map_or(true, |b| inertia < b.inertia);
                if improves {
                    best = Some(Run {
                        centroids,
                        memberships: memberships.clone(),
                        inertia,
                        n_iterations,
                    });
                }
            }
        }

        let mut best = best.ok_or(TwoMeansError::EmptyCluster)?;
        if best.centroids[0] > best.centroids[1] {
            best.centroids.swap(0, 1);
            best.memberships.mapv_inplace(|m| 1 - m);
        }
        let clusters = cluster_stats(observations, &best.memberships)
            .ok_or(TwoMeansError::EmptyCluster)?;

        Ok(TwoMeans {
            centroids: best.centroids,
            memberships: best.memberships,
            clusters,
            inertia: best.inertia / F::cast(n_samples),
            n_iterations: best.n_iterations,
        })
    }
}

struct Run<F> {
    centroids: [F; 2],
    memberships: Array1<usize>,
    inertia: F,
    n_iterations: u64,
}

/// One run of Lloyd's algorithm from the given centroids.
///
/// Returns the final centroids, the inertia and the number of iterations, or `None` if a
/// cluster became empty.
fn lloyd<F: Float>(
    observations: &ArrayBase<impl Data<Elem = F>, Ix1>,
    mut centroids: [F; 2],
    max_n_iterations: u64,
    memberships: &mut Array1<usize>,
) -> Option<([F; 2], F, u64)> {
    update_memberships(&centroids, observations, memberships);

    let mut n_iterations = 0;
    while n_iterations < max_n_iterations {
        n_iterations += 1;
        centroids = compute_centroids(observations, memberships)?;
        if update_memberships(&centroids, observations, memberships) == 0 {
            break;
        }
    }

    // the last assignment may have emptied a cluster
    let centroids = compute_centroids(observations, memberships)?;
    let inertia = Zip::from(observations)
        .and(&*memberships)
        .fold(F::zero(), |acc, &x, &m| acc + (x - centroids[m]).powi(2));

    Some((centroids, inertia, n_iterations))
}

/// Assign every observation to its closest centroid, returning how many changed cluster.
fn update_memberships<F: Float>(
    centroids: &[F; 2],
    observations: &ArrayBase<impl Data<Elem = F>, Ix1>,
    memberships: &mut Array1<usize>,
) -> usize {
    let mut changed = 0;
    Zip::from(observations)
        .and(memberships)
        .for_each(|&x, membership| {
            let closest = closest_centroid(centroids, x);
            if closest != *membership {
                *membership = closest;
                changed += 1;
            }
        });
    changed
}

/// The mean of each cluster, `None` if a cluster is empty.
fn compute_centroids<F: Float>(
    observations: &ArrayBase<impl Data<Elem = F>, Ix1>,
    memberships: &Array1<usize>,
) -> Option<[F; 2]> {
    let mut sums = [F::zero(); 2];
    let mut counts = [0usize; 2];
    Zip::from(observations)
        .and(memberships)
        .for_each(|&x, &m| {
            sums[m] += x;
            counts[m] += 1;
        });

    if counts.contains(&0) {
        return None;
    }
    Some([
        sums[0] / F::cast(counts[0]),
        sums[1] / F::cast(counts[1]),
    ])
}

/// Count, mean and unbiased variance of both clusters, `None` if a cluster is empty.
fn cluster_stats<F: Float>(
    observations: &ArrayBase<impl Data<Elem = F>, Ix1>,
    memberships: &Array1<usize>,
) -> Option<[ClusterStats<F>; 2]> {
    let means = compute_centroids(observations, memberships)?;
    let mut counts = [0usize; 2];
    let mut squares = [F::zero(); 2];
    Zip::from(observations)
        .and(memberships)
        .for_each(|&x, &m| {
            counts[m] += 1;
            squares[m] += (x - means[m]).powi(2);
        });

    let stats = |c: usize| ClusterStats {
        count: counts[c],
        mean: means[c],
        variance: if counts[c] > 1 {
            Some(squares[c] / F::cast(counts[c] - 1))
        } else {
            None
        },
    };
    Some([stats(0), stats(1)])
}

/// Index of the centroid closest to `x`, the first one on ties.
pub(crate) fn closest_centroid<F: Float>(centroids: &[F; 2], x: F) -> usize {
    if (x - centroids[1]).abs() < (x - centroids[0]).abs() {
        1
    } else {
        0
    }
}
