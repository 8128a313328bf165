//! `melica-datasets` provides synthetic RGB images ready to be used in tests, examples and
//! benchmarks of the `melica` workspace.
//!
//! ## The Big Picture
//!
//! Dermoscopy images cannot be shipped with the workspace, so the pipeline is exercised on
//! generated images whose ground truth is known: which pixels belong to the lesion and which
//! to the surrounding skin.
//!
//! ## Current State
//!
//! Currently the following images are provided in [`generate`]:
//!
//! * [`two_tone`](generate::two_tone): two flat colour blocks, top and bottom half
//! * [`jittered_two_tone`](generate::jittered_two_tone): the same blocks with a small
//!   uniform noise on every channel
//! * [`lesion`](generate::lesion): a dark elliptic lesion on noisy skin, along with its mask
//!
//! All images are `(height, width, 3)` arrays of intensities in `[0, 1]`, channel order R, G, B.
//!
//! ```
//! use melica_datasets::generate;
//! use ndarray_rand::rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256Plus;
//!
//! let mut rng = Xoshiro256Plus::seed_from_u64(42);
//! let (image, mask) = generate::lesion(32, 48, &mut rng);
//! assert_eq!(image.dim(), (32, 48, 3));
//! assert_eq!(mask.dim(), (32, 48));
//! ```

pub mod generate;
