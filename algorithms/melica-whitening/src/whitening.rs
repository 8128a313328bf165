//! Methods for uncorrelating pixel data
//!
//! Given a pixel matrix `X` with covariance matrix `Σ = E·D·Eᵀ`, fitting a [`Whitener`]
//! outputs the mean `μ` of the records and the whitening matrix `W = E·D^(-1/2)` such that
//! `Wᵀ·Σ·W = I`. Applying the map to the records gives `Z = (X - μ)·W`, whose covariance is
//! the identity.

use crate::error::{Result, WhiteningError};
use crate::hyperparams::{WhitenerParams, WhitenerValidParams};
use linfa_linalg::eigh::Eigh;
use melica::traits::{Fit, Transformer};
use melica::{Float, PixelMatrix};
use ndarray::{Array1, Array2, ArrayBase, ArrayView1, ArrayView2, Axis, Data, Ix2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Covariance whitening
///
/// Fitting returns a [`WhiteningTransform`] that can be used to whiten the fitted records
/// or any other records with the same channels.
pub struct Whitener;

impl Whitener {
    pub fn params<F: Float>() -> WhitenerParams<F> {
        WhitenerParams::new()
    }
}

impl<F: Float> Fit<PixelMatrix<F>, WhiteningError> for WhitenerValidParams<F> {
    type Object = WhiteningTransform<F>;

    /// Estimate the mean and the whitening matrix of the pixels
    ///
    /// # Errors
    ///
    /// If there are fewer than two pixels, or if any eigenvalue of the covariance is not
    /// larger than `eigenvalue_tolerance` times the largest one.
    fn fit(&self, pixels: &PixelMatrix<F>) -> Result<Self::Object> {
        let records = pixels.records();
        let nsamples = pixels.nsamples();
        if nsamples < 2 {
            return Err(WhiteningError::NotEnoughSamples(nsamples));
        }

        // safe unwrap because we already returned an error on too few samples
        let mean = records.mean_axis(Axis(0)).unwrap();
        let centered = &records - &mean.view().insert_axis(Axis(0));
        let sigma = centered.t().dot(&centered) / F::cast(nsamples - 1);

        let (eigenvalues, eigenvectors) = sigma.eigh()?;
        tracing::debug!(eigenvalues = %eigenvalues, "covariance eigendecomposition");

        let largest = eigenvalues
            .iter()
            .cloned()
            .fold(F::min_positive_value(), |a, b| a.max(b));
        let threshold = self.eigenvalue_tolerance() * largest;
        if let Some((index, &eigenvalue)) = eigenvalues
            .iter()
            .enumerate()
            .find(|(_, value)| !(**value > threshold))
        {
            return Err(WhiteningError::DegenerateInput {
                index,
                eigenvalue: eigenvalue.to_f64().unwrap_or(f64::NAN),
                threshold: threshold.to_f64().unwrap_or(f64::NAN),
            });
        }

        // Scale the column of each eigenvector by the inverse square root of its eigenvalue
        let scale = eigenvalues.mapv(|x| x.sqrt().recip());
        let matrix = &eigenvectors * &scale.insert_axis(Axis(0));

        Ok(WhiteningTransform {
            mean,
            matrix,
            eigenvalues,
        })
    }
}

/// Fitted whitening map `(μ, W)`
///
/// Transforming the records used during fitting yields records with identity covariance.
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct WhiteningTransform<F> {
    mean: Array1<F>,
    matrix: Array2<F>,
    eigenvalues: Array1<F>,
}

impl<F: Float> WhiteningTransform<F> {
    /// The means subtracted from the channels before whitening
    pub fn mean(&self) -> ArrayView1<F> {
        self.mean.view()
    }

    /// The `3×3` whitening matrix `W = E·D^(-1/2)`
    pub fn matrix(&self) -> ArrayView2<F> {
        self.matrix.view()
    }

    /// The eigenvalues of the covariance, in the order of the columns of `W`
    pub fn eigenvalues(&self) -> ArrayView1<F> {
        self.eigenvalues.view()
    }

    /// Whiten records with the same channels as the fitted ones
    pub fn whiten<D: Data<Elem = F>>(&self, records: &ArrayBase<D, Ix2>) -> Array2<F> {
        assert_eq!(
            records.ncols(),
            self.mean.len(),
            "The number of channels must match the fitted ones."
        );

        (records - &self.mean.view().insert_axis(Axis(0))).dot(&self.matrix)
    }
}

impl<F: Float> Transformer<&PixelMatrix<F>, Array2<F>> for WhiteningTransform<F> {
    fn transform(&self, pixels: &PixelMatrix<F>) -> Array2<F> {
        self.whiten(&pixels.records())
    }
}

impl<F: Float, D: Data<Elem = F>> Transformer<&ArrayBase<D, Ix2>, Array2<F>>
    for WhiteningTransform<F>
{
    fn transform(&self, records: &ArrayBase<D, Ix2>) -> Array2<F> {
        self.whiten(records)
    }
}
