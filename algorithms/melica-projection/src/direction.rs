//! Unit vectors of the colour space and the grids of candidate directions
//!
//! A [`DirectionSet`] enumerates the candidates of one search pass in a fixed order, the
//! order decides which direction wins a tie.
//!
//! * spherical grid: `v(θ, φ) = [cos θ sin φ, sin θ sin φ, cos φ]` with `θ` in `1°..=360°`
//!   (outer loop) and `φ` in `1°..=180°` (inner loop), direction `(θ/r - 1)·(180/r) + φ/r - 1`
//!   for a resolution of `r` degrees;
//! * circular grid: `v(α) = cos α·v₁ + sin α·v₂` with `α` in `1°..=360°`, for an orthonormal
//!   pair `(v₁, v₂)`.

use crate::error::{ProjectionError, ProjectionParamsError, Result};
use melica::Float;
use ndarray::{aview1, Array1, Array2, ArrayView1, ArrayView2};
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Accepted distance between the norm of a direction and one
pub(crate) fn norm_tolerance<F: Float>() -> F {
    F::epsilon().sqrt()
}

/// A unit vector of the three dimensional colour space
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Direction<F> {
    coords: [F; 3],
}

impl<F: Float> Direction<F> {
    /// Wrap `coords` as a direction
    ///
    /// # Errors
    ///
    /// If the norm of `coords` is not one within `sqrt(F::epsilon())`.
    pub fn new(coords: [F; 3]) -> Result<Self> {
        let norm = norm(&coords);
        if (norm - F::one()).abs() > norm_tolerance() {
            return Err(ProjectionError::NotUnitNorm(norm.to_f64().unwrap_or(f64::NAN)));
        }

        Ok(Direction { coords })
    }

    /// Scale `coords` to unit length
    ///
    /// # Errors
    ///
    /// If `coords` is the zero vector, or too close to it to be scaled.
    pub fn normalize(coords: [F; 3]) -> Result<Self> {
        let norm = norm(&coords);
        if !(norm > F::epsilon()) || !norm.is_finite() {
            return Err(ProjectionError::NotUnitNorm(norm.to_f64().unwrap_or(f64::NAN)));
        }

        Self::new([coords[0] / norm, coords[1] / norm, coords[2] / norm])
    }

    /// Direction of polar angle `phi` and azimuth `theta`, both in degrees
    pub fn spherical(theta: F, phi: F) -> Self {
        let (sin_theta, cos_theta) = theta.to_radians().sin_cos();
        let (sin_phi, cos_phi) = phi.to_radians().sin_cos();
        let direction = Direction {
            coords: [cos_theta * sin_phi, sin_theta * sin_phi, cos_phi],
        };
        debug_assert!(direction.is_unit());

        direction
    }

    /// Direction at angle `alpha` (degrees) on the great circle spanned by the orthonormal
    /// pair `(first, second)`, `first` at zero degrees
    pub fn circular(first: &Direction<F>, second: &Direction<F>, alpha: F) -> Self {
        let (sin_alpha, cos_alpha) = alpha.to_radians().sin_cos();
        let (u, v) = (first.coords, second.coords);
        let direction = Direction {
            coords: [
                cos_alpha * u[0] + sin_alpha * v[0],
                cos_alpha * u[1] + sin_alpha * v[1],
                cos_alpha * u[2] + sin_alpha * v[2],
            ],
        };
        debug_assert!(direction.is_unit());

        direction
    }

    pub fn coords(&self) -> [F; 3] {
        self.coords
    }

    pub fn view(&self) -> ArrayView1<'_, F> {
        aview1(&self.coords)
    }

    pub fn to_array(&self) -> Array1<F> {
        self.view().to_owned()
    }

    pub fn dot(&self, other: &Direction<F>) -> F {
        dot(&self.coords, &other.coords)
    }

    /// Cross product `self × other`, a unit vector only for orthogonal directions
    pub fn cross(&self, other: &Direction<F>) -> [F; 3] {
        cross(&self.coords, &other.coords)
    }

    /// The opposite direction
    pub fn flip(&self) -> Self {
        Direction {
            coords: [-self.coords[0], -self.coords[1], -self.coords[2]],
        }
    }

    pub fn is_unit(&self) -> bool {
        (norm(&self.coords) - F::one()).abs() <= norm_tolerance()
    }
}

pub(crate) fn dot<F: Float>(a: &[F; 3], b: &[F; 3]) -> F {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub(crate) fn cross<F: Float>(a: &[F; 3], b: &[F; 3]) -> [F; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm<F: Float>(a: &[F; 3]) -> F {
    dot(a, a).sqrt()
}

/// Angles of a candidate of a grid, in degrees
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Angles {
    Spherical { theta: usize, phi: usize },
    Circular { alpha: usize },
}

/// How the directions of a set were enumerated
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingDomain {
    /// Full sphere, `(360 / resolution) × (180 / resolution)` directions
    Spherical { resolution: usize },
    /// Great circle of a plane, `360 / resolution` directions
    Circular { resolution: usize },
    /// Directions given by the caller
    Explicit,
}

/// Ordered candidates of one search pass
///
/// The directions are stored as the rows of an `n×3` matrix, so that projecting records on
/// all of them is a single matrix product.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionSet<F> {
    directions: Array2<F>,
    domain: SamplingDomain,
}

impl<F: Float> DirectionSet<F> {
    /// Every direction of the sphere on a grid of `resolution` degrees, `θ` outer and `φ`
    /// inner.
    ///
    /// # Errors
    ///
    /// If the resolution is zero or does not divide 180.
    pub fn spherical(resolution: usize) -> Result<Self> {
        check_resolution(resolution)?;
        let (n_theta, n_phi) = (360 / resolution, 180 / resolution);

        let mut directions = Array2::zeros((n_theta * n_phi, 3));
        for (index, mut row) in directions.rows_mut().into_iter().enumerate() {
            let (theta, phi) = spherical_angles(index, resolution);
            let direction = Direction::spherical(F::cast(theta), F::cast(phi));
            row.assign(&direction.view());
        }

        Ok(DirectionSet {
            directions,
            domain: SamplingDomain::Spherical { resolution },
        })
    }

    /// Every direction of the plane spanned by the orthonormal pair `(first, second)`, on a
    /// grid of `resolution` degrees
    ///
    /// # Errors
    ///
    /// If the resolution is zero or does not divide 180.
    pub fn circular(
        first: &Direction<F>,
        second: &Direction<F>,
        resolution: usize,
    ) -> Result<Self> {
        check_resolution(resolution)?;
        debug_assert!(first.dot(second).abs() <= norm_tolerance());

        let mut directions = Array2::zeros((360 / resolution, 3));
        for (index, mut row) in directions.rows_mut().into_iter().enumerate() {
            let alpha = (index + 1) * resolution;
            let direction = Direction::circular(first, second, F::cast(alpha));
            row.assign(&direction.view());
        }

        Ok(DirectionSet {
            directions,
            domain: SamplingDomain::Circular { resolution },
        })
    }

    /// Candidates given explicitly, searched in the order of the slice
    pub fn from_directions(directions: &[Direction<F>]) -> Result<Self> {
        if directions.is_empty() {
            return Err(ProjectionError::EmptyDirectionSet);
        }

        let directions =
            Array2::from_shape_fn((directions.len(), 3), |(i, k)| directions[i].coords[k]);
        Ok(DirectionSet {
            directions,
            domain: SamplingDomain::Explicit,
        })
    }

    pub fn len(&self) -> usize {
        self.directions.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn domain(&self) -> SamplingDomain {
        self.domain
    }

    /// The `n×3` matrix of the candidates, one per row
    pub fn directions(&self) -> ArrayView2<F> {
        self.directions.view()
    }

    /// The candidate at `index` in enumeration order
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds
    pub fn get(&self, index: usize) -> Direction<F> {
        let row = self.directions.row(index);
        Direction {
            coords: [row[0], row[1], row[2]],
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Direction<F>> + '_ {
        (0..self.len()).map(move |index| self.get(index))
    }

    /// Grid angles of the candidate at `index`, `None` for explicit candidates
    pub fn angles(&self, index: usize) -> Option<Angles> {
        match self.domain {
            SamplingDomain::Spherical { resolution } => {
                let (theta, phi) = spherical_angles(index, resolution);
                Some(Angles::Spherical { theta, phi })
            }
            SamplingDomain::Circular { resolution } => Some(Angles::Circular {
                alpha: (index + 1) * resolution,
            }),
            SamplingDomain::Explicit => None,
        }
    }
}

/// Angles in degrees of the spherical candidate at `index`
fn spherical_angles(index: usize, resolution: usize) -> (usize, usize) {
    let n_phi = 180 / resolution;
    (
        (index / n_phi + 1) * resolution,
        (index % n_phi + 1) * resolution,
    )
}

fn check_resolution(resolution: usize) -> Result<()> {
    if resolution == 0 || 180 % resolution != 0 {
        return Err(ProjectionParamsError::AngularResolution(resolution).into());
    }
    Ok(())
}
