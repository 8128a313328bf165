//! # Projection pursuit
//!
//! `melica-projection` searches an orthonormal basis of the whitened colour space of an RGB
//! image whose axes separate the pixels in two groups as well as possible, and projects the
//! image on it. On dermoscopy images the first axis usually isolates a pigmented lesion from
//! the surrounding skin.
//!
//! ## The Big Picture
//!
//! The pipeline composes the other crates of the workspace:
//!
//! 1. the pixels are whitened by [`melica_whitening`];
//! 2. the first axis `IC1` maximizes the Fisher index of the two-group split of the
//!    projection (scored with [`melica_clustering::TwoMeans`]) over a grid of the whole
//!    sphere, `64 800` candidates at one degree;
//! 3. the second axis `IC2` maximizes the same index on the great circle orthogonal to `IC1`;
//! 4. the third axis is `IC3 = IC1 × IC2`;
//! 5. the whitened pixels are projected on the three axes and folded back into an image.
//!
//! The search of `IC1` dominates the cost and runs on a dedicated pool of worker threads
//! with [`SearchStrategy::Parallel`]. Every candidate direction gets a clustering generator
//! derived from the seed and its index, so both strategies return the same basis.
//!
//! ## Example
//!
//! ```
//! use melica::prelude::*;
//! use melica_datasets::generate::{jittered_two_tone, LESION, SKIN};
//! use melica_projection::{ProjectionPursuit, SearchStrategy};
//! use rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256Plus;
//!
//! // skin above, lesion below, with some noise on every channel
//! let mut rng = Xoshiro256Plus::seed_from_u64(42);
//! let image = jittered_two_tone(8, 8, SKIN, LESION, 0.05, &mut rng);
//!
//! let model = ProjectionPursuit::params()
//!     .angular_resolution(10)
//!     .strategy(SearchStrategy::Sequential)
//!     .fit(&image)
//!     .unwrap();
//!
//! assert_eq!(model.projections().dim(), (8, 8, 3));
//! assert!(model.basis().max_overlap() < 1e-10);
//! ```

mod basis;
mod direction;
mod error;
mod hyperparams;
mod pipeline;
mod score;
mod search;

pub use basis::{complete_basis, orthogonal_complement, OrthonormalBasis};
pub use direction::{Angles, Direction, DirectionSet, SamplingDomain};
pub use error::{ProjectionError, ProjectionParamsError, Result};
pub use hyperparams::{
    default_num_workers, ProjectionPursuitParams, ProjectionPursuitValidParams,
};
pub use pipeline::ProjectionPursuit;
pub use score::{fisher_index, Evaluation, SeparabilityScorer, FISHER_EPSILON};
pub use search::{BestDirectionSearch, ScoreSurface, SearchOutcome, SearchStrategy};
