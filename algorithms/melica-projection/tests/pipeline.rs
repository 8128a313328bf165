use approx::assert_abs_diff_eq;
use melica::prelude::*;
use melica_datasets::generate;
use melica_clustering::TwoMeansInit;
use melica_projection::{
    Angles, ProjectionError, ProjectionParamsError, ProjectionPursuit, ProjectionPursuitParams,
    ScoreSurface, SearchStrategy,
};
use melica_whitening::WhiteningError;
use ndarray::{Array2, Array3, Axis};
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

fn lesion(height: usize, width: usize, seed: u64) -> (Array3<f64>, Array2<usize>) {
    generate::lesion(height, width, &mut Xoshiro256Plus::seed_from_u64(seed))
}

fn coarse() -> ProjectionPursuitParams<f64> {
    ProjectionPursuit::params()
        .angular_resolution(5)
        .num_workers(2)
}

fn covariance(records: &Array2<f64>) -> Array2<f64> {
    let mean = records.mean_axis(Axis(0)).unwrap();
    let centered = records - &mean;
    centered.t().dot(&centered) / (records.nrows() - 1) as f64
}

#[test]
fn two_flat_blocks_are_rejected_by_whitening() {
    let image = generate::two_tone(4, 4, [0., 0., 0.], [1., 1., 1.]);

    match ProjectionPursuit::params().fit(&image) {
        Err(err @ ProjectionError::DegenerateInput(WhiteningError::DegenerateInput { .. })) => {
            assert!(err.to_string().contains("whiten"))
        }
        other => panic!("expected a degenerate input, got {:?}", other),
    }
}

#[test]
fn jittered_blocks_are_perfectly_separated() {
    let mut rng = Xoshiro256Plus::seed_from_u64(42);
    let image = generate::jittered_two_tone(4, 4, [0., 0., 0.], [1., 1., 1.], 1e-3, &mut rng);

    let model = ProjectionPursuit::params().fit(&image).unwrap();
    assert_eq!(model.ic1_search().n_candidates(), 64_800);
    assert!(model.ic1_search().score() > 1e3);

    let mask = model.segment(0).unwrap();
    assert_eq!(mask.iter().filter(|&&m| m == 1).count(), 8);
    let top = mask[[0, 0]];
    for ((i, _), &label) in mask.indexed_iter() {
        let expected = if i < 2 { top } else { 1 - top };
        assert_eq!(label, expected);
    }
}

#[test]
fn basis_is_orthonormal() {
    let (image, _) = lesion(20, 16, 0);
    let model = coarse().fit(&image).unwrap();
    let basis = model.basis();

    assert!(basis.ic1().dot(basis.ic2()).abs() < 1e-10);
    assert!(basis.ic1().dot(basis.ic3()).abs() < 1e-10);
    assert!(basis.ic2().dot(basis.ic3()).abs() < 1e-10);
    for axis in basis.axes() {
        assert_abs_diff_eq!(axis.dot(axis), 1., epsilon = 1e-12);
    }
}

#[test]
fn projections_have_whitened_statistics() {
    let (image, _) = lesion(16, 16, 1);
    let model = coarse().fit(&image).unwrap();

    // a rotation of whitened records is still whitened
    let records = model
        .projections()
        .to_owned()
        .into_shape((16 * 16, 3))
        .unwrap();
    assert_abs_diff_eq!(covariance(&records), Array2::eye(3), epsilon = 1e-9);
}

#[test]
fn output_has_input_shape() {
    let (image, _) = lesion(12, 20, 2);
    let model = coarse().fit(&image).unwrap();

    assert_eq!(model.projections().dim(), (12, 20, 3));
    assert_eq!(model.segment(0).unwrap().dim(), (12, 20));
}

#[test]
fn subsampling_reduces_the_grid() {
    let (image, _) = lesion(8, 8, 3);

    let strided = coarse().subsample_stride(4).fit(&image).unwrap();
    assert_eq!(strided.projections().dim(), (2, 2, 3));

    let full = coarse().subsample_stride(1).fit(&image).unwrap();
    assert_eq!(full.projections().dim(), (8, 8, 3));
}

#[test]
fn first_axis_segments_the_lesion() {
    let (image, truth) = lesion(24, 24, 4);
    let model = coarse().fit(&image).unwrap();

    let mask = model.segment(0).unwrap();
    let agree = mask
        .iter()
        .zip(truth.iter())
        .filter(|(m, t)| m == t)
        .count();
    // the sign of the axis is arbitrary
    let accuracy = agree.max(mask.len() - agree) as f64 / mask.len() as f64;
    assert!(accuracy > 0.95, "accuracy {}", accuracy);
}

#[test]
fn same_seed_same_basis() {
    let (image, _) = lesion(12, 12, 5);
    let params = coarse().random_seed(7);

    let first = params.clone().fit(&image).unwrap();
    let second = params.fit(&image).unwrap();
    assert_eq!(first.basis(), second.basis());
    assert_eq!(first, second);
}

#[test]
fn strategies_find_the_same_basis() {
    let (image, _) = lesion(12, 12, 6);

    let sequential = coarse()
        .strategy(SearchStrategy::Sequential)
        .fit(&image)
        .unwrap();
    let parallel = coarse()
        .strategy(SearchStrategy::Parallel)
        .num_workers(3)
        .fit(&image)
        .unwrap();

    assert_eq!(sequential.ic1_search(), parallel.ic1_search());
    assert_eq!(sequential.basis(), parallel.basis());
}

#[test]
fn score_surfaces_on_request() {
    let (image, _) = lesion(10, 10, 7);

    let model = coarse().fit(&image).unwrap();
    assert!(model.ic1_search().surface().is_none());

    let model = coarse().keep_score_surface(true).fit(&image).unwrap();
    match model.ic1_search().surface() {
        Some(ScoreSurface::Spherical(surface)) => {
            assert_eq!(surface.dim(), (72, 36));
            assert!(surface.iter().all(|&s| s >= 0.));
        }
        other => panic!("expected a spherical surface, got {:?}", other),
    }
    match model.ic2_search().surface() {
        Some(ScoreSurface::Sequence(scores)) => assert_eq!(scores.len(), 72),
        other => panic!("expected a sequence, got {:?}", other),
    }
    assert!(matches!(
        model.ic1_search().angles(),
        Some(Angles::Spherical { .. })
    ));
    assert!(matches!(
        model.ic2_search().angles(),
        Some(Angles::Circular { .. })
    ));
}

#[test]
fn fitted_model_projects_other_images() {
    let (small, _) = lesion(8, 8, 8);
    let (large, _) = lesion(16, 24, 9);

    let model = coarse().fit(&small).unwrap();
    let projected = model.transform(&large).unwrap();
    assert_eq!(projected.dim(), (16, 24, 3));
}

#[test]
fn wrong_channel_count_is_rejected() {
    let image = Array3::<f64>::zeros((4, 4, 4));
    let res = ProjectionPursuit::params().fit(&image);
    match res {
        Err(ProjectionError::InvalidConfiguration(ProjectionParamsError::ImageShape(msg))) => {
            assert!(msg.contains("(4, 4, 4)"), "{}", msg)
        }
        other => panic!("expected an invalid configuration, got {:?}", other),
    }
}

#[test]
fn equal_precomputed_centroids_are_rejected_upfront() {
    let mut rng = Xoshiro256Plus::seed_from_u64(5);
    let (skin, lesion) = (generate::SKIN, generate::LESION);
    let image = generate::jittered_two_tone(4, 4, skin, lesion, 0.01, &mut rng);
    let res = coarse()
        .init_method(TwoMeansInit::Precomputed([1.0, 1.0]))
        .fit(&image);
    assert!(matches!(
        res,
        Err(ProjectionError::InvalidConfiguration(
            ProjectionParamsError::PrecomputedCentroids
        ))
    ));
}
