use super::{Float, PixelMatrix, CHANNELS};
use crate::error::{Error, Result};
use ndarray::{s, Array2, Array3, ArrayBase, ArrayView1, ArrayView2, Axis, Data, Ix3};

impl<F: Float> PixelMatrix<F> {
    /// Create a pixel matrix from `N×3` records laid out on a `(height, width)` grid
    pub fn new(records: Array2<F>, grid: (usize, usize)) -> Result<Self> {
        let (height, width) = grid;
        if records.ncols() != CHANNELS {
            return Err(Error::InvalidImageShape(format!(
                "expected {} channels, got {}",
                CHANNELS,
                records.ncols()
            )));
        }
        if height == 0 || width == 0 {
            return Err(Error::InvalidImageShape(format!(
                "empty grid {}x{}",
                height, width
            )));
        }
        if records.nrows() != height * width {
            return Err(Error::InvalidImageShape(format!(
                "{} records do not fill a {}x{} grid",
                records.nrows(),
                height,
                width
            )));
        }
        if records.iter().any(|x| !x.is_finite()) {
            return Err(Error::Parameters(
                "pixel intensities must be finite".to_string(),
            ));
        }

        Ok(PixelMatrix { records, grid })
    }

    /// Flatten an `(height, width, 3)` image, keeping every pixel
    pub fn from_image<D: Data<Elem = F>>(image: &ArrayBase<D, Ix3>) -> Result<Self> {
        Self::from_image_strided(image, 1)
    }

    /// Flatten an `(height, width, 3)` image, keeping one pixel out of `stride` along both
    /// axes, starting with the first row and column.
    ///
    /// An `8×8` image with a stride of `4` gives the pixels of rows and columns `0` and `4`,
    /// that is a `2×2` grid.
    pub fn from_image_strided<D: Data<Elem = F>>(
        image: &ArrayBase<D, Ix3>,
        stride: usize,
    ) -> Result<Self> {
        let (height, width, channels) = image.dim();
        if channels != CHANNELS {
            return Err(Error::InvalidImageShape(format!(
                "expected (height, width, {}) but got ({}, {}, {})",
                CHANNELS, height, width, channels
            )));
        }
        if stride == 0 {
            return Err(Error::Parameters("stride cannot be 0".to_string()));
        }

        let sampled = image.slice(s![..;stride, ..;stride, ..]);
        let (sub_height, sub_width, _) = sampled.dim();
        let records = sampled
            .as_standard_layout()
            .into_owned()
            .into_shape((sub_height * sub_width, CHANNELS))?;

        Self::new(records, (sub_height, sub_width))
    }

    /// The `N×3` records
    pub fn records(&self) -> ArrayView2<F> {
        self.records.view()
    }

    /// Number of pixels
    pub fn nsamples(&self) -> usize {
        self.records.nrows()
    }

    /// The `(height, width)` grid the records are laid out on
    pub fn grid(&self) -> (usize, usize) {
        self.grid
    }

    /// Fold one value per record back into a `(height, width)` image
    pub fn reshape<T: Clone>(&self, values: ArrayView1<T>) -> Result<Array2<T>> {
        if values.len() != self.nsamples() {
            return Err(Error::InvalidImageShape(format!(
                "{} values for {} pixels",
                values.len(),
                self.nsamples()
            )));
        }

        Ok(values.to_owned().into_shape(self.grid)?)
    }

    /// Fold several per-record layers into a `(height, width, layers)` image, layer `k` in
    /// channel `k`
    pub fn stack_layers(&self, layers: &[ArrayView1<F>]) -> Result<Array3<F>> {
        let (height, width) = self.grid;
        let mut image = Array3::zeros((height, width, layers.len()));
        for (k, layer) in layers.iter().enumerate() {
            let layer = self.reshape(layer.view())?;
            image.index_axis_mut(Axis(2), k).assign(&layer);
        }

        Ok(image)
    }
}
