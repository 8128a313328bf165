use crate::error::WhiteningError;
use melica::{Float, ParamGuard};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Covariance whitening hyperparameters
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
pub struct WhitenerValidParams<F: Float> {
    eigenvalue_tolerance: F,
}

impl<F: Float> WhitenerValidParams<F> {
    /// Smallest accepted eigenvalue, relative to the largest one
    pub fn eigenvalue_tolerance(&self) -> F {
        self.eigenvalue_tolerance
    }
}

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq)]
pub struct WhitenerParams<F: Float>(WhitenerValidParams<F>);

impl<F: Float> Default for WhitenerParams<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Float> WhitenerParams<F> {
    /// Create new whitening parameters with default values
    ///
    /// Defaults are:
    /// * `eigenvalue_tolerance = 1e-10`
    pub fn new() -> Self {
        Self(WhitenerValidParams {
            eigenvalue_tolerance: F::cast(1e-10),
        })
    }

    /// Set the smallest eigenvalue accepted, as a fraction of the largest eigenvalue of the
    /// covariance. A covariance with a smaller eigenvalue is considered rank deficient.
    pub fn eigenvalue_tolerance(mut self, tolerance: F) -> Self {
        self.0.eigenvalue_tolerance = tolerance;
        self
    }
}

impl<F: Float> ParamGuard for WhitenerParams<F> {
    type Checked = WhitenerValidParams<F>;
    type Error = WhiteningError;

    fn check_ref(&self) -> Result<&Self::Checked, Self::Error> {
        if self.0.eigenvalue_tolerance <= F::zero() || !self.0.eigenvalue_tolerance.is_finite() {
            Err(WhiteningError::InvalidTolerance(
                self.0.eigenvalue_tolerance.to_f32().unwrap_or(f32::NAN),
            ))
        } else {
            Ok(&self.0)
        }
    }

    fn check(self) -> Result<Self::Checked, Self::Error> {
        self.check_ref()?;
        Ok(self.0)
    }
}
