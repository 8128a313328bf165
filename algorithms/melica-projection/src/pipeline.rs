//! Projection pursuit of the three most separable colour axes
//!
//! The pipeline is linear: the image is flattened (and optionally subsampled) into a pixel
//! matrix, whitened, the first axis is searched over the sphere, the basis is completed on
//! the orthogonal circle and the whitened pixels are projected on the three axes. Any failure
//! aborts the whole fit, there is no partial result.

use crate::basis::{complete_basis, OrthonormalBasis};
use crate::direction::DirectionSet;
use crate::error::{load_error, ProjectionError, Result};
use crate::hyperparams::ProjectionPursuitValidParams;
use crate::score::SeparabilityScorer;
use crate::search::{BestDirectionSearch, SearchOutcome};
use melica::traits::{Fit, Transformer};
use melica::{Float, PixelMatrix};
use melica_clustering::{TwoMeans, TwoMeansError};
use melica_whitening::WhiteningTransform;
use ndarray::{Array1, Array2, Array3, ArrayBase, ArrayView1, ArrayView2, ArrayView3, Axis, Data, Ix3};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
#[cfg(feature = "serde")]
use serde_crate::{Deserialize, Serialize};

/// Clustering generators of the second axis search are drawn from this stream, the first
/// axis uses stream `0`
const IC2_STREAM: u64 = 1;

/// Fitted projection pursuit
///
/// Holds the whitening map `(μ, W)`, the orthonormal basis `{IC1, IC2, IC3}`, the outcome of
/// both searches and the projection of the fitted image on the basis.
///
/// ## Example
///
/// ```no_run
/// use melica::prelude::*;
/// use melica_projection::ProjectionPursuit;
/// use ndarray::Array3;
///
/// # let image = Array3::<f64>::zeros((64, 64, 3));
/// // any (height, width, 3) image with full rank colour covariance
/// let model = ProjectionPursuit::params()
///     .subsample_stride(4)
///     .fit(&image)
///     .unwrap();
///
/// let projections = model.projections();
/// assert_eq!(projections.dim(), (16, 16, 3));
/// let lesion = model.segment(0).unwrap();
/// ```
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(crate = "serde_crate")
)]
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionPursuit<F: Float> {
    params: ProjectionPursuitValidParams<F>,
    whitening: WhiteningTransform<F>,
    basis: OrthonormalBasis<F>,
    ic1_search: SearchOutcome<F>,
    ic2_search: SearchOutcome<F>,
    projections: Array3<F>,
}

impl<F: Float, D: Data<Elem = F>> Fit<ArrayBase<D, Ix3>, ProjectionError>
    for ProjectionPursuitValidParams<F>
{
    type Object = ProjectionPursuit<F>;

    /// Search the basis of an `(height, width, 3)` image
    ///
    /// # Errors
    ///
    /// If the image does not have three channels, if its colour covariance is rank
    /// deficient or if the worker pool cannot be started.
    fn fit(&self, image: &ArrayBase<D, Ix3>) -> Result<Self::Object> {
        let _span = tracing::info_span!("projection_pursuit").entered();

        let pixels = PixelMatrix::from_image_strided(image, self.subsample_stride())
            .map_err(load_error)?;
        let (height, width) = pixels.grid();
        tracing::info!(
            height,
            width,
            stride = self.subsample_stride(),
            "stage load: {} pixels",
            pixels.nsamples()
        );

        let whitening = self.checked_whitener()?.fit(&pixels)?;
        let whitened = whitening.transform(&pixels);
        tracing::info!(eigenvalues = %whitening.eigenvalues(), "stage whiten: done");

        let seed = self.random_seed();
        let clustering = self.clustering(Xoshiro256Plus::seed_from_u64(seed))?;
        let scorer = SeparabilityScorer::new(&clustering, seed);

        let spherical = DirectionSet::spherical(self.angular_resolution())?;
        let ic1_search = BestDirectionSearch::new(&scorer)
            .strategy(self.strategy())
            .num_workers(self.num_workers())
            .keep_surface(self.keep_score_surface())
            .run(&whitened, &spherical)?;
        tracing::info!(
            direction = ?ic1_search.direction().coords(),
            angles = ?ic1_search.angles(),
            score = %ic1_search.score(),
            n_degenerate = ic1_search.n_degenerate(),
            "stage search IC1: done"
        );

        let mut rng = Xoshiro256Plus::seed_from_u64(seed);
        let (basis, ic2_search) = complete_basis(
            &whitened,
            ic1_search.direction(),
            &scorer.clone().with_stream(IC2_STREAM),
            self.angular_resolution(),
            self.keep_score_surface(),
            &mut rng,
        )?;
        tracing::info!(
            ic2 = ?basis.ic2().coords(),
            ic3 = ?basis.ic3().coords(),
            score = %ic2_search.score(),
            "stage build basis: done"
        );

        let projections = project(&whitened, &basis, &pixels)?;
        tracing::info!(dim = ?projections.dim(), "stage project: done");

        Ok(ProjectionPursuit {
            params: self.clone(),
            whitening,
            basis,
            ic1_search,
            ic2_search,
            projections,
        })
    }
}

/// Project the `N×3` whitened records of `pixels` on the basis and fold them into a
/// `(height, width, 3)` array, layer `k` on axis `k`
fn project<F: Float>(
    whitened: &Array2<F>,
    basis: &OrthonormalBasis<F>,
    pixels: &PixelMatrix<F>,
) -> Result<Array3<F>> {
    let projected = whitened.dot(&basis.matrix());
    let layers: Vec<ArrayView1<F>> = projected.columns().into_iter().collect();

    Ok(pixels.stack_layers(&layers)?)
}

impl<F: Float> ProjectionPursuit<F> {
    /// The hyperparameters of the fit
    pub fn fitted_params(&self) -> &ProjectionPursuitValidParams<F> {
        &self.params
    }

    /// The whitening map fitted on the (subsampled) image
    pub fn whitening(&self) -> &WhiteningTransform<F> {
        &self.whitening
    }

    pub fn basis(&self) -> &OrthonormalBasis<F> {
        &self.basis
    }

    /// Outcome of the search of the first axis over the sphere
    pub fn ic1_search(&self) -> &SearchOutcome<F> {
        &self.ic1_search
    }

    /// Outcome of the search of the second axis over the orthogonal circle
    pub fn ic2_search(&self) -> &SearchOutcome<F> {
        &self.ic2_search
    }

    /// The `(height, width, 3)` projections of the fitted image, on the subsampled grid
    pub fn projections(&self) -> ArrayView3<F> {
        self.projections.view()
    }

    /// Grid of the projections
    pub fn grid(&self) -> (usize, usize) {
        let (height, width, _) = self.projections.dim();
        (height, width)
    }

    /// Projection of the fitted image on axis `axis` (`0` for IC1)
    pub fn projection(&self, axis: usize) -> Result<ArrayView2<F>> {
        if axis >= 3 {
            return Err(ProjectionError::InvalidAxis(axis));
        }

        Ok(self.projections.index_axis(Axis(2), axis))
    }

    /// Split the projection on `axis` in two groups with the configured clustering
    ///
    /// Returns a `(height, width)` mask, `1` for the pixels of the group with the higher mean
    /// projection and `0` for the others. Since the sign of an axis is arbitrary, which
    /// group is the lesion depends on the image.
    ///
    /// # Errors
    ///
    /// If the axis does not exist or if the projection cannot be split.
    pub fn segment(&self, axis: usize) -> Result<Array2<usize>> {
        let layer = self.projection(axis)?;
        let values: Array1<F> = layer.iter().cloned().collect();

        let clustering = self
            .params
            .clustering(Xoshiro256Plus::seed_from_u64(self.params.random_seed()))?;
        let model: std::result::Result<TwoMeans<F>, TwoMeansError> = clustering.fit(&values);
        let model = model?;
        tracing::debug!(
            axis,
            low = model.clusters()[0].count(),
            high = model.clusters()[1].count(),
            "stage segment: done"
        );

        Ok(model
            .memberships()
            .clone()
            .into_shape(self.grid())
            .map_err(melica::error::Error::from)?)
    }
}

/// Project a new image of any size on the fitted basis, without subsampling
impl<F: Float, D: Data<Elem = F>> Transformer<&ArrayBase<D, Ix3>, Result<Array3<F>>>
    for ProjectionPursuit<F>
{
    fn transform(&self, image: &ArrayBase<D, Ix3>) -> Result<Array3<F>> {
        let pixels = PixelMatrix::from_image(image).map_err(load_error)?;
        let whitened = self.whitening.transform(&pixels);
        project(&whitened, &self.basis, &pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SearchStrategy;
    use approx::assert_abs_diff_eq;
    use crate::ProjectionParamsError;
    use melica::ParamGuard;
    use ndarray::s;
    use ndarray_rand::{rand_distr::Uniform, RandomExt};

    // uniform noise on every channel, the first channel also splits the rows in two bands
    fn banded(height: usize, width: usize) -> Array3<f64> {
        let mut rng = Xoshiro256Plus::seed_from_u64(11);
        let mut image: Array3<f64> =
            Array3::random_using((height, width, 3), Uniform::new(0., 0.1), &mut rng);
        image
            .slice_mut(s![height / 2.., .., 0])
            .mapv_inplace(|x| x + 1.);
        image
    }

    fn quick() -> crate::ProjectionPursuitParams<f64> {
        ProjectionPursuit::params()
            .angular_resolution(10)
            .strategy(SearchStrategy::Sequential)
    }

    #[test]
    fn autotraits() {
        fn has_autotraits<T: Send + Sync + Sized + Unpin>() {}
        has_autotraits::<ProjectionPursuit<f64>>();
    }

    #[test]
    fn output_has_image_shape() {
        let image = banded(6, 10);
        let model = quick().fit(&image).unwrap();

        assert_eq!(model.projections().dim(), (6, 10, 3));
        assert_eq!(model.grid(), (6, 10));
        assert_eq!(model.projection(2).unwrap().dim(), (6, 10));
        assert!(matches!(
            model.projection(3),
            Err(ProjectionError::InvalidAxis(3))
        ));
    }

    #[test]
    fn projections_are_whitened_records_on_the_basis() {
        let image = banded(8, 8);
        let model = quick().fit(&image).unwrap();

        let pixels = PixelMatrix::from_image(&image).unwrap();
        let whitened = model.whitening().transform(&pixels);
        let ic2 = whitened.dot(&model.basis().ic2().view());
        let layer = model.projection(1).unwrap();
        assert_abs_diff_eq!(layer.iter().cloned().collect::<Array1<f64>>(), ic2, epsilon = 1e-12);
    }

    #[test]
    fn transform_reproduces_fitted_projections() {
        let image = banded(8, 6);
        let model = quick().fit(&image).unwrap();

        let projected = model.transform(&image).unwrap();
        assert_abs_diff_eq!(projected, model.projections(), epsilon = 1e-12);
    }

    #[test]
    fn transform_rejects_wrong_channels() {
        let model = quick().fit(&banded(8, 6)).unwrap();
        let grey = Array3::<f64>::zeros((4, 4, 1));
        assert!(matches!(
            model.transform(&grey),
            Err(ProjectionError::InvalidConfiguration(
                ProjectionParamsError::ImageShape(_)
            ))
        ));
    }

    #[test]
    fn fit_rejects_wrong_channels_as_configuration() {
        let rgba = Array3::<f64>::zeros((4, 4, 4));
        let res = quick().fit(&rgba);
        assert!(matches!(
            res,
            Err(ProjectionError::InvalidConfiguration(
                ProjectionParamsError::ImageShape(_)
            ))
        ));
    }

    #[test]
    fn bad_centroids_fail_before_loading() {
        use melica_clustering::TwoMeansInit;

        // a malformed image would fail at load, so the configuration is checked first
        let rgba = Array3::<f64>::zeros((4, 4, 4));
        let res = quick()
            .init_method(TwoMeansInit::Precomputed([0.5, 0.5]))
            .fit(&rgba);
        assert!(matches!(
            res,
            Err(ProjectionError::InvalidConfiguration(
                ProjectionParamsError::PrecomputedCentroids
            ))
        ));
    }

    #[test]
    fn first_axis_separates_bands() {
        let image = banded(8, 8);
        let model = quick().fit(&image).unwrap();

        let mask = model.segment(0).unwrap();
        let top = mask[[0, 0]];
        assert!(mask.rows().into_iter().take(4).all(|row| row.iter().all(|&m| m == top)));
        assert!(mask
            .rows()
            .into_iter()
            .skip(4)
            .all(|row| row.iter().all(|&m| m == 1 - top)));
    }

    #[test]
    fn invalid_configuration_fails_before_computing() {
        let image = banded(4, 4);
        let res = ProjectionPursuit::params().n_runs(0).fit(&image);
        assert!(matches!(res, Err(ProjectionError::InvalidConfiguration(_))));
    }
}
