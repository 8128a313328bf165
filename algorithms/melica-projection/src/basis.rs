//! Orthonormal basis of the whitened colour space
//!
//! The first axis comes out of the search over the whole sphere. The second one is searched
//! on the great circle orthogonal to the first: the plane is spanned by Gram-Schmidt on a
//! random vector `r`,
//!
//! ```text
//! v₁ = normalize(r - (r·ic₁)·ic₁)
//! v₂ = ic₁ × v₁
//! ```
//!
//! and the third axis is not searched at all, `ic₃ = normalize(ic₁ × ic₂)`.

use crate::direction::{norm_tolerance, Direction, DirectionSet};
use crate::error::{ProjectionError, Result};
use crate::score::SeparabilityScorer;
use crate::search::{BestDirectionSearch, SearchOutcome};
use melica::Float;
use ndarray::{Array2, ArrayBase, Data, Ix2};
use ndarray_rand::rand_distr::StandardNormal;
use rand::Rng;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Number of random vectors drawn before giving up on Gram-Schmidt
const MAX_SEED_DRAWS: usize = 16;

/// Three mutually orthogonal unit axes, in discovery order
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthonormalBasis<F> {
    axes: [Direction<F>; 3],
}

impl<F: Float> OrthonormalBasis<F> {
    /// Complete two orthogonal axes with their cross product
    ///
    /// # Errors
    ///
    /// If `ic1` and `ic2` are not orthogonal.
    pub fn from_axes(ic1: Direction<F>, ic2: Direction<F>) -> Result<Self> {
        let overlap = ic1.dot(&ic2);
        if overlap.abs() > norm_tolerance() {
            return Err(ProjectionError::NotOrthogonal(
                overlap.to_f64().unwrap_or(f64::NAN),
            ));
        }
        let ic3 = Direction::normalize(ic1.cross(&ic2))?;

        Ok(OrthonormalBasis {
            axes: [ic1, ic2, ic3],
        })
    }

    pub fn ic1(&self) -> &Direction<F> {
        &self.axes[0]
    }

    pub fn ic2(&self) -> &Direction<F> {
        &self.axes[1]
    }

    pub fn ic3(&self) -> &Direction<F> {
        &self.axes[2]
    }

    pub fn axes(&self) -> &[Direction<F>; 3] {
        &self.axes
    }

    /// The `3×3` matrix with axis `k` in column `k`, projecting `N×3` records with a single
    /// product
    pub fn matrix(&self) -> Array2<F> {
        Array2::from_shape_fn((3, 3), |(row, axis)| self.axes[axis].coords()[row])
    }

    /// Largest absolute dot product between two different axes
    pub fn max_overlap(&self) -> F {
        let [a, b, c] = &self.axes;
        a.dot(b).abs().max(a.dot(c).abs()).max(b.dot(c).abs())
    }
}

/// Two unit vectors spanning the plane orthogonal to `axis`, by Gram-Schmidt on a standard
/// normal vector drawn from `rng`
///
/// # Errors
///
/// If every draw was too close to `axis` to be orthogonalized, which only happens with a
/// broken generator.
pub fn orthogonal_complement<F: Float, R: Rng>(
    axis: &Direction<F>,
    rng: &mut R,
) -> Result<(Direction<F>, Direction<F>)> {
    let u = axis.coords();
    for _ in 0..MAX_SEED_DRAWS {
        let r: [F; 3] = [
            F::cast(rng.sample::<f64, _>(StandardNormal)),
            F::cast(rng.sample::<f64, _>(StandardNormal)),
            F::cast(rng.sample::<f64, _>(StandardNormal)),
        ];
        let along = r[0] * u[0] + r[1] * u[1] + r[2] * u[2];
        let residual = [r[0] - along * u[0], r[1] - along * u[1], r[2] - along * u[2]];

        // a seed almost parallel to the axis loses every significant digit
        let scale = (r[0] * r[0] + r[1] * r[1] + r[2] * r[2]).sqrt();
        let remaining = (residual[0].powi(2) + residual[1].powi(2) + residual[2].powi(2)).sqrt();
        if !(remaining > F::cast(1e-3) * scale) {
            continue;
        }

        let first = Direction::normalize(residual)?;
        let second = Direction::normalize(axis.cross(&first))?;
        return Ok((first, second));
    }

    Err(ProjectionError::NotOrthogonal(1.))
}

/// Complete `ic1` into an orthonormal basis: search the second axis on the circle
/// orthogonal to `ic1` on a grid of `resolution` degrees and derive the third.
///
/// The circular search always runs on the calling thread.
pub fn complete_basis<F: Float, R: Rng>(
    whitened: &ArrayBase<impl Data<Elem = F>, Ix2>,
    ic1: &Direction<F>,
    scorer: &SeparabilityScorer<F>,
    resolution: usize,
    keep_surface: bool,
    rng: &mut R,
) -> Result<(OrthonormalBasis<F>, SearchOutcome<F>)> {
    let (first, second) = orthogonal_complement(ic1, rng)?;
    let set = DirectionSet::circular(&first, &second, resolution)?;

    let outcome = BestDirectionSearch::new(scorer)
        .keep_surface(keep_surface)
        .run(whitened, &set)?;
    let basis = OrthonormalBasis::from_axes(*ic1, *outcome.direction())?;

    Ok((basis, outcome))
}
