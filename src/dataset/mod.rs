//! Pixel records
//!
//! This module implements the pixel matrix, the flat `N×3` view of an RGB image every
//! algorithm of the workspace consumes, and the floating point bound shared by all crates.
use ndarray::{Array2, NdFloat};

use num_traits::{FromPrimitive, NumCast, Signed};
use rand::distributions::uniform::SampleUniform;

use std::iter::Sum;

#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

mod impl_pixels;

/// Number of colour channels of an input image (R, G, B).
pub const CHANNELS: usize = 3;

/// Floating point numbers
///
/// This trait bound multiplexes to the most common assumption of floating point number and
/// implement them for 32bit and 64bit floating points. Pixel intensities, projections and
/// separability scores all use it.
pub trait Float:
    NdFloat
    + FromPrimitive
    + Default
    + Signed
    + Sum
    + SampleUniform
    + approx::AbsDiffEq<Epsilon = Self>
{
    fn cast<T: NumCast>(x: T) -> Self {
        NumCast::from(x).unwrap()
    }
}

impl Float for f32 {}

impl Float for f64 {}

/// Pixel matrix
///
/// The records of an `H×W×3` image as an `N×3` matrix, `N = H×W`, in row-major pixel order:
/// pixel `(i, j)` of the (possibly subsampled) grid is record `i * W + j`. The grid is kept
/// along with the records so that one value per record can be folded back into an image.
///
/// A pixel matrix is immutable once built.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct PixelMatrix<F> {
    records: Array2<F>,
    grid: (usize, usize),
}
