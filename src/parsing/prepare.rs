use ndarray::{Array2, NdFloat};
use serde::Serialize;

use super::error::MnistError;
use super::{Label, RawImage};

pub const NUM_CLASSES: usize = 10;
pub const HIGH_TARGET: f64 = 0.9;
pub const LOW_TARGET: f64 = 0.1;

const PIXEL_RANGE: f64 = 255f64;

/// Width of the prepared matrices, chosen on the command line
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Precision {
    F32,
    F64,
}

impl Precision {
    pub fn name(self) -> &'static str {
        match self {
            Precision::F32 => "f32",
            Precision::F64 => "f64",
        }
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// Floating point width of the prepared matrices (f32 or f64)
pub trait Element: NdFloat + Serialize + sealed::Sealed {
    fn from_weight(value: f64) -> Self;
}

impl Element for f32 {
    fn from_weight(value: f64) -> Self {
        value as f32
    }
}

impl Element for f64 {
    fn from_weight(value: f64) -> Self {
        value
    }
}

/// Map a pixel intensity into [0.1, 0.999].
/// A full-intensity pixel would land on exactly 1.0, which is pulled back to 0.999
pub fn pixel_weight(px: u8) -> f64 {
    let weight = f64::from(px) / PIXEL_RANGE * 0.9 + 0.1;
    if weight == 1.0 {
        return 0.999;
    }

    weight
}

/// Diagnostic inverse of `pixel_weight`, kept in its historical form:
/// `round((255 * w - 255) / 0.9)`.
///
/// This does not recover the source pixel (weights in [0.1, 0.999] map into -255..=0),
/// and the 0.999 clamp is lossy in any case.
pub fn reverse_pixel_weight(weight: f64) -> i32 {
    ((PIXEL_RANGE * weight - PIXEL_RANGE) / 0.9).round() as i32
}

/// Build the input matrix: one row per image, one column per pixel
pub fn prepare_features<T: Element>(images: &[RawImage]) -> Result<Array2<T>, MnistError> {
    let cols = images.first().map_or(0, Vec::len);

    if let Some((i, image)) = images
        .iter()
        .enumerate()
        .find(|(_, image)| image.len() != cols)
    {
        return Err(MnistError::Shape(format!(
            "image {} has {} pixels, image 0 has {}",
            i,
            image.len(),
            cols
        )));
    }

    let table: Vec<T> = (0..=u8::MAX)
        .map(|px| T::from_weight(pixel_weight(px)))
        .collect();
    let weights: Vec<T> = images
        .iter()
        .flatten()
        .map(|&px| table[px as usize])
        .collect();

    Array2::from_shape_vec((images.len(), cols), weights)
        .map_err(|e| MnistError::Shape(e.to_string()))
}

/// Build the target matrix: 0.9 in the label's column, 0.1 everywhere else
pub fn prepare_targets<T: Element>(
    labels: &[Label],
    classes: usize,
) -> Result<Array2<T>, MnistError> {
    let mut target = Array2::from_elem((labels.len(), classes), T::from_weight(LOW_TARGET));

    for (row, &label) in labels.iter().enumerate() {
        let col = label as usize;
        if col >= classes {
            return Err(MnistError::Range {
                row,
                label,
                classes,
            });
        }

        target[[row, col]] = T::from_weight(HIGH_TARGET);
    }

    Ok(target)
}
