//! Reader and writer for the IDX container used by MNIST.
//!
//! ```text
//! label file:  magic 0x00000801 | count            | count bytes
//! image file:  magic 0x00000803 | count | rows | cols | count * rows * cols bytes
//! ```
//!
//! Every header field is a big-endian `i32`. Pixels are stored row-major.

use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::debug;

use super::error::{FormatError, MnistError};
use super::{Label, RawImage};

pub const LABEL_MAGIC: i32 = 0x0000_0801;
pub const IMAGE_MAGIC: i32 = 0x0000_0803;

// Upper bound on what a header count alone may make us reserve up front
const MAX_PREALLOC: usize = 1 << 16;

/// The images of one IDX file together with the geometry its header declares
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSet {
    pub rows: usize,
    pub cols: usize,
    pub images: Vec<RawImage>,
}

impl ImageSet {
    pub fn pixels_per_image(&self) -> Result<usize, MnistError> {
        self.rows.checked_mul(self.cols).ok_or_else(|| {
            MnistError::Shape(format!("{}x{} pixels overflow usize", self.rows, self.cols))
        })
    }
}

fn read_magic<R: Read>(reader: &mut R, expected: i32) -> Result<(), MnistError> {
    let actual = reader.read_i32::<BigEndian>()?;
    if actual != expected {
        return Err(FormatError::BadMagic { expected, actual }.into());
    }

    Ok(())
}

/// Read a header field that must be usable as a length
fn read_len<R: Read>(reader: &mut R, field: &'static str) -> Result<usize, MnistError> {
    let value = reader.read_i32::<BigEndian>()?;

    usize::try_from(value).map_err(|_| {
        FormatError::CountOverflow {
            field,
            value: value.into(),
        }
        .into()
    })
}

fn header_field(value: usize, field: &'static str) -> Result<i32, MnistError> {
    i32::try_from(value).map_err(|_| {
        FormatError::CountOverflow {
            field,
            value: i64::try_from(value).unwrap_or(i64::MAX),
        }
        .into()
    })
}

/// Parse an IDX label file.
/// Label values are returned as stored, range checking happens when targets are built
pub fn read_labels<R: Read>(mut reader: R) -> Result<Vec<Label>, MnistError> {
    read_magic(&mut reader, LABEL_MAGIC)?;
    let count = read_len(&mut reader, "count")?;
    debug!("label header: count={}", count);

    let mut labels = Vec::with_capacity(count.min(MAX_PREALLOC));
    reader.by_ref().take(count as u64).read_to_end(&mut labels)?;

    if labels.len() != count {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {} labels, stream ended after {}", count, labels.len()),
        )
        .into());
    }

    Ok(labels)
}

/// Parse an IDX image file
pub fn read_images<R: Read>(mut reader: R) -> Result<ImageSet, MnistError> {
    read_magic(&mut reader, IMAGE_MAGIC)?;
    let count = read_len(&mut reader, "count")?;
    let rows = read_len(&mut reader, "rows")?;
    let cols = read_len(&mut reader, "cols")?;
    debug!("image header: count={} rows={} cols={}", count, rows, cols);

    let pixels = rows
        .checked_mul(cols)
        .ok_or(FormatError::CountOverflow {
            field: "rows * cols",
            value: rows as i64 * cols as i64,
        })?;

    if pixels == 0 && count > 0 {
        return Err(FormatError::EmptyImages { count, rows, cols }.into());
    }

    let mut images = Vec::with_capacity(count.min(MAX_PREALLOC));

    for index in 0..count {
        let mut image = Vec::with_capacity(pixels.min(MAX_PREALLOC));
        let actual = reader.by_ref().take(pixels as u64).read_to_end(&mut image)?;

        if actual != pixels {
            return Err(FormatError::TruncatedImage {
                index,
                expected: pixels,
                actual,
            }
            .into());
        }

        images.push(image);
    }

    Ok(ImageSet { rows, cols, images })
}

/// Write labels as an IDX label file
pub fn write_labels<W: Write>(mut writer: W, labels: &[Label]) -> Result<(), MnistError> {
    writer.write_i32::<BigEndian>(LABEL_MAGIC)?;
    writer.write_i32::<BigEndian>(header_field(labels.len(), "count")?)?;
    writer.write_all(labels)?;
    writer.flush()?;

    Ok(())
}

/// Write images as an IDX image file. Every image must hold exactly `rows * cols` pixels
pub fn write_images<W: Write>(mut writer: W, set: &ImageSet) -> Result<(), MnistError> {
    let pixels = set.pixels_per_image()?;

    if let Some((i, image)) = set
        .images
        .iter()
        .enumerate()
        .find(|(_, image)| image.len() != pixels)
    {
        return Err(MnistError::Shape(format!(
            "image {} has {} pixels, header declares {}x{}",
            i,
            image.len(),
            set.rows,
            set.cols
        )));
    }

    writer.write_i32::<BigEndian>(IMAGE_MAGIC)?;
    writer.write_i32::<BigEndian>(header_field(set.images.len(), "count")?)?;
    writer.write_i32::<BigEndian>(header_field(set.rows, "rows")?)?;
    writer.write_i32::<BigEndian>(header_field(set.cols, "cols")?)?;

    for image in &set.images {
        writer.write_all(image)?;
    }
    writer.flush()?;

    Ok(())
}
