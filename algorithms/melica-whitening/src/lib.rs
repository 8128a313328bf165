//! # Whitening
//!
//! `melica-whitening` decorrelates the colour channels of a [`PixelMatrix`](melica::PixelMatrix)
//! so that the channels of the transformed records have unit variance and no covariance.
//!
//! The whitening matrix is derived from the eigendecomposition `Σ = E·D·Eᵀ` of the sample
//! covariance of the centered records: `W = E·D^(-1/2)`, and the records are mapped to
//! `Z = (X - μ)·W`. A rank deficient covariance (a grey-scale or flat image) has no such map
//! and is reported as [`WhiteningError::DegenerateInput`].
//!
//! ## The Big Picture
//!
//! `melica-whitening` is the first stage of the `melica` projection pipeline: every
//! direction search of `melica-projection` runs on whitened records.
//!
//! ## Example
//!
//! ```
//! use melica::prelude::*;
//! use melica_whitening::Whitener;
//! use ndarray::Array;
//!
//! let image = Array::from_shape_fn((4, 4, 3), |(i, j, c)| ((i * 7 + j * 3 + c * c * 5) % 11) as f64);
//! let pixels = PixelMatrix::from_image(&image).unwrap();
//!
//! let whitener = Whitener::params().fit(&pixels).unwrap();
//! let whitened = whitener.transform(&pixels);
//! assert_eq!(whitened.dim(), (16, 3));
//! ```

mod error;
mod hyperparams;
mod whitening;

pub use error::{Result, WhiteningError};
pub use hyperparams::{WhitenerParams, WhitenerValidParams};
pub use whitening::{Whitener, WhiteningTransform};
