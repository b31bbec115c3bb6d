use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use json::{array, object, JsonValue};

use super::SplitShape;
use crate::parsing::prepare::Precision;

/// Describe an export: precision, validation fraction and the shape of every matrix.
/// Splits are keyed by name, e.g. `splits.train.inputs = [rows, cols]`
pub fn manifest(precision: Precision, valid_fraction: f64, shapes: &[SplitShape]) -> JsonValue {
    let mut data = object! {
        precision: precision.name(),
        valid_fraction: valid_fraction,
        splits: object! {}
    };

    for shape in shapes {
        data["splits"][shape.split] = object! {
            inputs: array![shape.rows, shape.input_cols],
            targets: array![shape.rows, shape.target_cols]
        };
    }

    data
}

pub fn write_manifest(path: &Path, manifest: &JsonValue) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(manifest.pretty(2).as_bytes())?;

    Ok(())
}
