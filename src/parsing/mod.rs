use ndarray::{s, Array2};

pub mod error;
pub mod idx;
pub mod mnist;
pub mod prepare;

pub use error::{FormatError, MnistError};
use idx::ImageSet;
use prepare::{prepare_features, prepare_targets, Element, NUM_CLASSES};

/// Digit class of one example, as stored in the label file
pub type Label = u8;

/// Row-major pixel intensities of one image
pub type RawImage = Vec<u8>;

/// Images and labels of one split, exactly as read from disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDataset {
    rows: usize,
    cols: usize,
    images: Vec<RawImage>,
    labels: Vec<Label>,
}

impl RawDataset {
    /// Pair an image file with a label file. Both must hold the same number of records
    pub fn new(set: ImageSet, labels: Vec<Label>) -> Result<RawDataset, MnistError> {
        if set.images.len() != labels.len() {
            return Err(MnistError::Shape(format!(
                "{} images but {} labels",
                set.images.len(),
                labels.len()
            )));
        }

        Ok(RawDataset {
            rows: set.rows,
            cols: set.cols,
            images: set.images,
            labels,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn images(&self) -> &[RawImage] {
        &self.images
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Normalize the pixels and encode the labels at the requested precision
    pub fn prepare<T: Element>(&self) -> Result<Dataset<T>, MnistError> {
        let data = if self.images.is_empty() {
            let pixels = self.rows.checked_mul(self.cols).ok_or_else(|| {
                MnistError::Shape(format!("{}x{} pixels overflow usize", self.rows, self.cols))
            })?;
            Array2::zeros((0, pixels))
        } else {
            prepare_features(&self.images)?
        };
        let target = prepare_targets(&self.labels, NUM_CLASSES)?;

        Ok(Dataset { data, target })
    }
}

/// Prepared inputs and targets, one row per example
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<T> {
    pub data: Array2<T>,
    pub target: Array2<T>,
}

impl<T: Element> Dataset<T> {
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Split off the last `floor(len * valid_fraction)` rows as a validation set.
    /// Row order is preserved, nothing is shuffled
    pub fn split(self, valid_fraction: f64) -> Result<(Dataset<T>, Dataset<T>), MnistError> {
        let (num_train, _) = split_sizes(self.len(), valid_fraction)?;

        let train = Dataset {
            data: self.data.slice(s![..num_train, ..]).to_owned(),
            target: self.target.slice(s![..num_train, ..]).to_owned(),
        };
        let valid = Dataset {
            data: self.data.slice(s![num_train.., ..]).to_owned(),
            target: self.target.slice(s![num_train.., ..]).to_owned(),
        };

        Ok((train, valid))
    }
}

/// Reject validation fractions outside [0, 1), NaN included
pub fn check_fraction(valid_fraction: f64) -> Result<(), MnistError> {
    if !(0.0..1.0).contains(&valid_fraction) {
        return Err(MnistError::Config(format!(
            "validation fraction must be in [0, 1), got {}",
            valid_fraction
        )));
    }

    Ok(())
}

/// Number of (training, validation) rows for `num_examples` rows and the given fraction
pub fn split_sizes(num_examples: usize, valid_fraction: f64) -> Result<(usize, usize), MnistError> {
    check_fraction(valid_fraction)?;

    let num_valid = (num_examples as f64 * valid_fraction).floor() as usize;
    let num_train = num_examples.saturating_sub(num_valid);

    if num_train == 0 {
        return Err(MnistError::Config(format!(
            "validation fraction {} leaves no training rows out of {}",
            valid_fraction, num_examples
        )));
    }

    Ok((num_train, num_valid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array;

    fn numbered(n: usize) -> Dataset<f64> {
        Dataset {
            data: Array::from_shape_fn((n, 3), |(i, j)| (i * 3 + j) as f64),
            target: Array::from_shape_fn((n, 2), |(i, _)| i as f64),
        }
    }

    #[test]
    fn split_sizes_cover_every_row() {
        for &f in &[0.0, 0.01, 0.1, 0.25, 0.5, 0.9, 0.999] {
            for n in 1..200 {
                match split_sizes(n, f) {
                    Ok((train, valid)) => {
                        assert_eq!(train + valid, n);
                        assert!(train >= 1);
                        assert_eq!(valid, (n as f64 * f).floor() as usize);
                    }
                    Err(e) => panic!("n={} f={} failed: {}", n, f, e),
                }
            }
        }
    }

    #[test]
    fn mnist_sized_split() {
        assert_eq!(split_sizes(60_000, 0.1).unwrap(), (54_000, 6_000));
        assert_eq!(split_sizes(60_000, 0.0).unwrap(), (60_000, 0));
    }

    #[test]
    fn fraction_outside_unit_interval_is_rejected() {
        for &f in &[1.0, 1.5, -0.1, f64::NAN] {
            assert!(matches!(
                split_sizes(100, f).unwrap_err(),
                MnistError::Config(_)
            ));
        }
    }

    #[test]
    fn empty_training_partition_is_rejected() {
        assert!(matches!(
            split_sizes(0, 0.2).unwrap_err(),
            MnistError::Config(_)
        ));
    }

    #[test]
    fn split_keeps_row_order() {
        let (train, valid) = numbered(10).split(0.3).unwrap();

        assert_eq!(train.len(), 7);
        assert_eq!(valid.len(), 3);
        assert_eq!(train.data.row(0).to_vec(), vec![0.0, 1.0, 2.0]);
        assert_eq!(valid.data.row(0).to_vec(), vec![21.0, 22.0, 23.0]);
        assert_eq!(valid.target.column(0).to_vec(), vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn raw_dataset_requires_matching_counts() {
        let set = ImageSet {
            rows: 1,
            cols: 2,
            images: vec![vec![1, 2], vec![3, 4]],
        };

        assert!(matches!(
            RawDataset::new(set, vec![1]).unwrap_err(),
            MnistError::Shape(_)
        ));
    }

    #[test]
    fn prepare_builds_both_matrices() {
        let set = ImageSet {
            rows: 1,
            cols: 2,
            images: vec![vec![0, 255], vec![255, 0]],
        };
        let raw = RawDataset::new(set, vec![4, 7]).unwrap();

        let dataset = raw.prepare::<f32>().unwrap();

        assert_eq!(dataset.data.dim(), (2, 2));
        assert_eq!(dataset.target.dim(), (2, NUM_CLASSES));
        assert_eq!(dataset.data[[1, 0]], 0.999f32);
        assert_eq!(dataset.target[[0, 4]], 0.9f32);
        assert_eq!(dataset.target[[1, 4]], 0.1f32);
    }

    #[test]
    fn empty_split_keeps_declared_width() {
        let set = ImageSet {
            rows: 28,
            cols: 28,
            images: vec![],
        };
        let raw = RawDataset::new(set, vec![]).unwrap();

        let dataset = raw.prepare::<f64>().unwrap();

        assert!(dataset.is_empty());
        assert_eq!(dataset.data.dim(), (0, 784));
        assert_eq!(dataset.target.dim(), (0, NUM_CLASSES));
    }
}
