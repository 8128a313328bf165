//! Utility functions for generating synthetic RGB images

use ndarray::{Array, Array2, Array3, Axis, Zip};
use ndarray_rand::{
    rand::Rng,
    rand_distr::{Distribution, Normal, Uniform},
    RandomExt,
};

/// Mean colour of healthy skin
pub const SKIN: [f64; 3] = [0.87, 0.67, 0.56];

/// Mean colour of a pigmented lesion
pub const LESION: [f64; 3] = [0.38, 0.23, 0.17];

/// Two flat colour blocks: rows `0..height / 2` are painted with `top`, the remaining rows
/// with `bottom`.
///
/// The covariance of such an image has rank one at most, every pixel lies on the segment
/// between the two colours.
pub fn two_tone(height: usize, width: usize, top: [f64; 3], bottom: [f64; 3]) -> Array3<f64> {
    Array::from_shape_fn((height, width, 3), |(i, _, c)| {
        if i < height / 2 {
            top[c]
        } else {
            bottom[c]
        }
    })
}

/// Special case of [`two_tone`] with every intensity moved by an independent uniform draw
/// in `[-amplitude, amplitude)`.
///
/// A small amplitude keeps the two blocks apart while making the covariance full rank.
pub fn jittered_two_tone(
    height: usize,
    width: usize,
    top: [f64; 3],
    bottom: [f64; 3],
    amplitude: f64,
    rng: &mut impl Rng,
) -> Array3<f64> {
    let image = two_tone(height, width, top, bottom);
    if amplitude <= 0. {
        return image;
    }

    let jitter = Array3::random_using(image.dim(), Uniform::new(-amplitude, amplitude), rng);
    image + jitter
}

/// Special case of [`lesion_with_colours`] with the usual skin and lesion colours and a
/// noise of standard deviation `0.05`.
pub fn lesion(height: usize, width: usize, rng: &mut impl Rng) -> (Array3<f64>, Array2<usize>) {
    lesion_with_colours(height, width, SKIN, LESION, 0.05, rng)
}

/// Generate an elliptic lesion in the middle of a patch of skin.
///
/// The ellipse is centered in the image, its half-axes are a third of the height and of the
/// width. Every intensity gets an independent gaussian noise of standard deviation `noise`
/// and is clipped to `[0, 1]`.
///
/// Returns the image and the ground truth mask, `1` for lesion pixels and `0` for skin.
///
/// # Panics
///
/// If `noise` is not finite.
pub fn lesion_with_colours(
    height: usize,
    width: usize,
    skin: [f64; 3],
    lesion: [f64; 3],
    noise: f64,
    rng: &mut impl Rng,
) -> (Array3<f64>, Array2<usize>) {
    let mask = ellipse_mask(height, width);

    let mut image = Array3::zeros((height, width, 3));
    Zip::from(image.lanes_mut(Axis(2)))
        .and(&mask)
        .for_each(|mut pixel, &label| {
            let colour = if label == 1 { &lesion } else { &skin };
            pixel.assign(&ndarray::aview1(colour));
        });

    if noise > 0. {
        let normal = Normal::new(0., noise).expect("noise must be finite");
        image.mapv_inplace(|x| (x + normal.sample(rng)).max(0.).min(1.));
    }

    (image, mask)
}

/// Centered ellipse with half-axes a third of each side, `1` inside and `0` outside
pub fn ellipse_mask(height: usize, width: usize) -> Array2<usize> {
    let (ci, cj) = ((height as f64 - 1.) / 2., (width as f64 - 1.) / 2.);
    let (ri, rj) = (height as f64 / 3., width as f64 / 3.);

    Array2::from_shape_fn((height, width), |(i, j)| {
        let di = (i as f64 - ci) / ri;
        let dj = (j as f64 - cj) / rj;
        (di * di + dj * dj <= 1.) as usize
    })
}
