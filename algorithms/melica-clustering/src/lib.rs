//! `melica-clustering` provides the clustering oracle of the `melica` projection pipeline.
//!
//! ## The big picture
//!
//! Every candidate direction of the projection search is scored by splitting the one
//! dimensional projection of the pixels in two groups. Any clusterer minimizing the
//! within-group variance fits the bill: we provide a two-group k-means specialised for
//! scalar observations, restarted a configurable number of times from random seeds, which
//! returns the per-cluster count, mean and variance the Fisher index needs.
//!
//! ## Current state
//!
//! Right now `melica-clustering` provides:
//! * [Two-group K-Means](TwoMeans)
#[allow(clippy::new_ret_no_self)]
mod two_means;

pub use two_means::*;
