//! Provide traits for different classes of algorithms
//!

use std::error::Error;

/// Transformation algorithms
///
/// A transformer takes records and maps them to a new representation. It is applied to the
/// output of a fitting step, for example a fitted whitening map or a fitted projection basis.
pub trait Transformer<R, T> {
    fn transform(&self, x: R) -> T;
}

/// Fittable algorithms
///
/// A fittable algorithm takes records and creates a concept of some kind about them. The
/// hyperparameters live in the implementing struct, the learned state in `Self::Object`.
/// Randomized algorithms carry their random number generator in the hyperparameters, so that
/// fitting twice with the same parameters gives the same result.
pub trait Fit<R, E: Error + From<crate::error::Error>> {
    type Object;

    fn fit(&self, records: &R) -> Result<Self::Object, E>;
}
