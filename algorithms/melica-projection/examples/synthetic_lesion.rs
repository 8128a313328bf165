use melica::traits::{Fit, Transformer};
use melica_datasets::generate;
use melica_projection::ProjectionPursuit;
use ndarray_npy::write_npy;
use ndarray_rand::rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use std::error::Error;
use tracing_subscriber::EnvFilter;

// Search the separating colour axes of a synthetic lesion, then save the projections and
// the segmentation to disk for plotting.
fn main() -> Result<(), Box<dyn Error>> {
    // `RUST_LOG=melica_projection=debug` shows the configuration of every search
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // A dark ellipse on skin coloured noise, along with the true lesion pixels
    let mut rng = Xoshiro256Plus::seed_from_u64(42);
    let (image, truth) = generate::lesion(128, 160, &mut rng);

    // Search on one pixel out of four along both axes, on the full one degree grids
    let model = ProjectionPursuit::params()
        .subsample_stride(4)
        .n_runs(5)
        .max_n_iterations(25)
        .fit(&image)?;

    let ic1 = model.ic1_search();
    println!(
        "IC1 {:?} at {:?}, score {:.3} ({} degenerate candidates)",
        ic1.direction().coords(),
        ic1.angles(),
        ic1.score(),
        ic1.n_degenerate()
    );

    // The fitted basis applies to the full resolution image as well
    let projections = model.transform(&image)?;
    let mask = model.segment(0)?;

    // Save to disk, we use the `npy` format for compatibility with NumPy
    write_npy("image.npy", &image)?;
    write_npy("projections.npy", &projections)?;
    write_npy("segmentation.npy", &mask.mapv(|x| x as u64))?;
    write_npy("truth.npy", &truth.mapv(|x| x as u64))?;

    Ok(())
}
