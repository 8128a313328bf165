//! `melica` searches colour images for the projections that best split them into two
//! classes, the way a dermatoscopy lesion separates from the surrounding skin.
//!
//! The pipeline whitens the RGB channels, scans every direction of the unit sphere on a
//! one degree grid for the projection with the largest Fisher index between two k-means
//! clusters, then completes an orthonormal basis: a second direction searched on the
//! circle orthogonal to the first, a third one given by their cross product.
//!
//! ## The big picture
//!
//! The workspace is split the same way as the algorithms it hosts:
//!
//! * `melica` (this crate) holds the shared pieces: the [`Float`] bound, the
//!   [`ParamGuard`] checked-hyperparameter pattern, the [`Fit`](traits::Fit) and
//!   [`Transformer`](traits::Transformer) traits and the [`PixelMatrix`] that flattens an
//!   `H×W×3` image into an `N×3` record matrix;
//! * `melica-whitening` decorrelates the channels;
//! * `melica-clustering` provides the two-group k-means used as a separability oracle;
//! * `melica-projection` drives the direction searches and the whole pipeline;
//! * `melica-datasets` generates synthetic images for tests, examples and benches.

pub mod dataset;
pub mod error;
mod param_guard;
pub mod prelude;
pub mod traits;

pub use dataset::{Float, PixelMatrix, CHANNELS};
pub use error::{Error, Result};
pub use param_guard::ParamGuard;
