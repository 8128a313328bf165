//! Exhaustive search of the most separable direction of a [`DirectionSet`]
//!
//! Every candidate is scored independently from the others on the same read-only records,
//! the search is therefore an embarrassingly parallel map followed by a max-reduction.
//! The reduction keeps the highest score and, among equal scores, the candidate enumerated
//! first, so the winner does not depend on how the candidates were spread over threads.

use crate::direction::{Angles, Direction, DirectionSet, SamplingDomain};
use crate::error::{ProjectionError, Result};
use crate::score::{Evaluation, SeparabilityScorer};
use melica::Float;
use ndarray::{Array1, Array2, ArrayBase, ArrayView2, Data, Ix2};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// How the candidates of a search are evaluated
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// One candidate after the other on the calling thread
    Sequential,
    /// On a dedicated pool of worker threads, created before the search and released right
    /// after it
    Parallel,
}

/// Score of every candidate of a search
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreSurface<F> {
    /// Spherical grid, indexed by `(θ / resolution - 1, φ / resolution - 1)`
    Spherical(Array2<F>),
    /// Circular grid or explicit candidates, in enumeration order
    Sequence(Array1<F>),
}

/// Winner of a search
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome<F> {
    direction: Direction<F>,
    score: F,
    index: usize,
    angles: Option<Angles>,
    n_candidates: usize,
    n_degenerate: usize,
    surface: Option<ScoreSurface<F>>,
}

impl<F: Float> SearchOutcome<F> {
    /// The direction with the highest score
    pub fn direction(&self) -> &Direction<F> {
        &self.direction
    }

    pub fn score(&self) -> F {
        self.score
    }

    /// Position of the winner in the enumeration order of its set
    pub fn index(&self) -> usize {
        self.index
    }

    /// Grid angles of the winner, `None` for explicit candidates
    pub fn angles(&self) -> Option<Angles> {
        self.angles
    }

    pub fn n_candidates(&self) -> usize {
        self.n_candidates
    }

    /// Number of candidates whose projection could not be split in two groups
    pub fn n_degenerate(&self) -> usize {
        self.n_degenerate
    }

    /// Score of every candidate, if it was requested
    pub fn surface(&self) -> Option<&ScoreSurface<F>> {
        self.surface.as_ref()
    }
}

/// Best-direction search over a [`DirectionSet`]
///
/// ```
/// use melica::prelude::*;
/// use melica_clustering::TwoMeans;
/// use melica_projection::{BestDirectionSearch, Direction, DirectionSet, SeparabilityScorer};
/// use ndarray::array;
///
/// let records = array![[0., 0., 0.], [0., 1., 0.], [0., 2., 1.], [5., 0., 0.], [5., 1., 0.], [5., 2., 1.]];
/// let scorer = SeparabilityScorer::new(&TwoMeans::params().check_unwrap(), 42);
/// let set = DirectionSet::from_directions(&[
///     Direction::new([0., 1., 0.]).unwrap(),
///     Direction::new([1., 0., 0.]).unwrap(),
/// ])
/// .unwrap();
///
/// let outcome = BestDirectionSearch::new(&scorer).run(&records, &set).unwrap();
/// assert_eq!(outcome.index(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct BestDirectionSearch<'a, F: Float> {
    scorer: &'a SeparabilityScorer<F>,
    strategy: SearchStrategy,
    num_workers: usize,
    keep_surface: bool,
}

impl<'a, F: Float> BestDirectionSearch<'a, F> {
    /// Sequential search without score surface
    pub fn new(scorer: &'a SeparabilityScorer<F>) -> Self {
        BestDirectionSearch {
            scorer,
            strategy: SearchStrategy::Sequential,
            num_workers: 1,
            keep_surface: false,
        }
    }

    pub fn strategy(mut self, strategy: SearchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Number of threads of the parallel strategy, zero is raised to one
    pub fn num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers.max(1);
        self
    }

    pub fn keep_surface(mut self, keep_surface: bool) -> Self {
        self.keep_surface = keep_surface;
        self
    }

    /// Score every direction of `set` on the `whitened` records and return the best one
    ///
    /// # Errors
    ///
    /// If the worker pool of the parallel strategy cannot be created.
    pub fn run(
        &self,
        whitened: &ArrayBase<impl Data<Elem = F>, Ix2>,
        set: &DirectionSet<F>,
    ) -> Result<SearchOutcome<F>> {
        tracing::debug!(
            strategy = ?self.strategy,
            num_workers = self.num_workers,
            n_candidates = set.len(),
            domain = ?set.domain(),
            "searching best direction"
        );

        let whitened = whitened.view();
        let evaluations: Vec<Evaluation<F>> = match self.strategy {
            SearchStrategy::Sequential => (0..set.len())
                .map(|index| self.evaluate(&whitened, set, index))
                .collect(),
            SearchStrategy::Parallel => self.evaluate_parallel(&whitened, set)?,
        };

        let (index, score) = evaluations
            .iter()
            .map(|evaluation| evaluation.score)
            .enumerate()
            .fold(None, |best, candidate| {
                Some(best.map_or(candidate, |best| better(best, candidate)))
            })
            .ok_or(ProjectionError::EmptyDirectionSet)?;
        let n_degenerate = evaluations.iter().filter(|e| e.degenerate).count();
        let surface = if self.keep_surface {
            Some(surface(set, &evaluations)?)
        } else {
            None
        };

        tracing::debug!(
            index,
            score = ?score,
            n_degenerate,
            "best direction found"
        );

        Ok(SearchOutcome {
            direction: set.get(index),
            score,
            index,
            angles: set.angles(index),
            n_candidates: set.len(),
            n_degenerate,
            surface,
        })
    }

    fn evaluate(
        &self,
        whitened: &ArrayView2<F>,
        set: &DirectionSet<F>,
        index: usize,
    ) -> Evaluation<F> {
        self.scorer
            .evaluate(whitened, set.directions().row(index), index)
    }

    fn evaluate_parallel(
        &self,
        whitened: &ArrayView2<F>,
        set: &DirectionSet<F>,
    ) -> Result<Vec<Evaluation<F>>> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.num_workers)
            .thread_name(|i| format!("melica-search-{}", i))
            .build()?;

        // the pool is joined and released when dropped at the end of this scope
        let evaluations: Vec<Evaluation<F>> = pool.install(|| {
            (0..set.len())
                .into_par_iter()
                .map(|index| self.evaluate(whitened, set, index))
                .collect()
        });

        Ok(evaluations)
    }
}

/// The candidate with the highest score, the one enumerated first on ties
fn better<F: Float>(best: (usize, F), candidate: (usize, F)) -> (usize, F) {
    let (best_index, best_score) = best;
    let (index, score) = candidate;
    if score > best_score || (score == best_score && index < best_index) {
        candidate
    } else {
        best
    }
}

fn surface<F: Float>(
    set: &DirectionSet<F>,
    evaluations: &[Evaluation<F>],
) -> Result<ScoreSurface<F>> {
    let scores: Array1<F> = evaluations.iter().map(|e| e.score).collect();
    let surface = match set.domain() {
        SamplingDomain::Spherical { resolution } => {
            let shape = (360 / resolution, 180 / resolution);
            ScoreSurface::Spherical(
                scores
                    .into_shape(shape)
                    .map_err(melica::error::Error::from)?,
            )
        }
        SamplingDomain::Circular { .. } | SamplingDomain::Explicit => {
            ScoreSurface::Sequence(scores)
        }
    };

    Ok(surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use melica::ParamGuard;
    use melica_clustering::TwoMeans;
    use ndarray::{Array, Axis};
    use ndarray_rand::rand::SeedableRng;
    use ndarray_rand::rand_distr::Normal;
    use ndarray_rand::RandomExt;
    use rand_xoshiro::Xoshiro256Plus;

    fn scorer(seed: u64) -> SeparabilityScorer<f64> {
        SeparabilityScorer::new(&TwoMeans::params().n_runs(3).check_unwrap(), seed)
    }

    // two groups apart along [1, 1, 0] / √2
    fn records() -> Array2<f64> {
        let mut rng = Xoshiro256Plus::seed_from_u64(42);
        let mut records: Array2<f64> =
            Array::random_using((400, 3), Normal::new(0., 0.3).unwrap(), &mut rng);
        for mut row in records.axis_iter_mut(Axis(0)).skip(200) {
            row[0] += 3.;
            row[1] += 3.;
        }
        records
    }

    #[test]
    fn autotraits() {
        fn has_autotraits<T: Send + Sync + Sized + Unpin>() {}
        has_autotraits::<SearchOutcome<f64>>();
        has_autotraits::<ScoreSurface<f64>>();
        has_autotraits::<BestDirectionSearch<'static, f64>>();
        has_autotraits::<SearchStrategy>();
    }

    #[test]
    fn ties_go_to_first_candidate() {
        assert_eq!(better((3, 1.), (5, 1.)), (3, 1.));
        assert_eq!(better((5, 1.), (3, 1.)), (3, 1.));
        assert_eq!(better((3, 1.), (5, 2.)), (5, 2.));
        assert_eq!(better((3, 2.), (1, 1.)), (3, 2.));
    }

    #[test]
    fn single_candidate_wins_unconditionally() {
        let records = records();
        let scorer = scorer(0);
        let direction = Direction::new([0., 0., 1.]).unwrap();
        let set = DirectionSet::from_directions(&[direction]).unwrap();

        for strategy in &[SearchStrategy::Sequential, SearchStrategy::Parallel] {
            let outcome = BestDirectionSearch::new(&scorer)
                .strategy(*strategy)
                .num_workers(2)
                .run(&records, &set)
                .unwrap();
            assert_eq!(outcome.index(), 0);
            assert_eq!(outcome.direction(), &direction);
            assert_eq!(outcome.score(), scorer.score(&records, &direction, 0));
            assert_eq!(outcome.angles(), None);
        }
    }

    #[test]
    fn finds_separating_direction_on_coarse_sphere() {
        let records = records();
        let scorer = scorer(1);
        let set = DirectionSet::spherical(15).unwrap();

        let outcome = BestDirectionSearch::new(&scorer)
            .keep_surface(true)
            .run(&records, &set)
            .unwrap();

        let diagonal = Direction::normalize([1., 1., 0.]).unwrap();
        let alignment = outcome.direction().dot(&diagonal).abs();
        assert!(alignment > 0.9, "{:?}", outcome.direction());
        assert_eq!(outcome.n_candidates(), 24 * 12);

        match outcome.surface() {
            Some(ScoreSurface::Spherical(surface)) => {
                assert_eq!(surface.dim(), (24, 12));
                let max = surface.fold(0., |m: f64, &s| m.max(s));
                assert_eq!(max, outcome.score());
                match outcome.angles() {
                    Some(Angles::Spherical { theta, phi }) => {
                        assert_eq!(surface[[theta / 15 - 1, phi / 15 - 1]], outcome.score())
                    }
                    other => panic!("expected spherical angles, got {:?}", other),
                }
            }
            other => panic!("expected a spherical surface, got {:?}", other),
        }
    }

    #[test]
    fn strategies_agree() {
        let records = records();
        let scorer = scorer(7);
        let set = DirectionSet::spherical(10).unwrap();

        let sequential = BestDirectionSearch::new(&scorer)
            .keep_surface(true)
            .run(&records, &set)
            .unwrap();
        let parallel = BestDirectionSearch::new(&scorer)
            .strategy(SearchStrategy::Parallel)
            .num_workers(3)
            .keep_surface(true)
            .run(&records, &set)
            .unwrap();

        assert_eq!(sequential, parallel);
    }

    #[test]
    fn degenerate_candidates_are_counted() {
        let mut records = records();
        records.column_mut(2).fill(0.);
        let scorer = scorer(0);
        let set = DirectionSet::from_directions(&[
            Direction::new([0., 0., 1.]).unwrap(),
            Direction::new([0., 0., -1.]).unwrap(),
            Direction::normalize([1., 1., 0.]).unwrap(),
        ])
        .unwrap();

        let outcome = BestDirectionSearch::new(&scorer)
            .keep_surface(true)
            .run(&records, &set)
            .unwrap();
        assert_eq!(outcome.n_degenerate(), 2);
        assert_eq!(outcome.index(), 2);
        match outcome.surface() {
            Some(ScoreSurface::Sequence(scores)) => {
                assert_eq!(scores.len(), 3);
                assert_eq!(scores[0], 0.);
                assert_eq!(scores[1], 0.);
            }
            other => panic!("expected a sequence, got {:?}", other),
        }
    }

    #[test]
    fn circular_surface_is_a_sequence() {
        let records = records();
        let scorer = scorer(0);
        let first = Direction::new([1., 0., 0.]).unwrap();
        let second = Direction::new([0., 1., 0.]).unwrap();
        let set = DirectionSet::circular(&first, &second, 5).unwrap();

        let outcome = BestDirectionSearch::new(&scorer)
            .keep_surface(true)
            .run(&records, &set)
            .unwrap();

        match outcome.surface() {
            Some(ScoreSurface::Sequence(scores)) => assert_eq!(scores.len(), 72),
            other => panic!("expected a sequence, got {:?}", other),
        }
        // close to the diagonal, either way
        match outcome.angles() {
            Some(Angles::Circular { alpha }) => assert!((30..=60).contains(&(alpha % 180))),
            other => panic!("expected circular angles, got {:?}", other),
        }
    }
}
