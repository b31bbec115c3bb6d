use std::fs;
use std::io;
use std::path::Path;

use log::info;
use serde::Serialize;

use crate::parsing::mnist::Splits;
use crate::parsing::prepare::{Element, Precision};
use crate::parsing::Dataset;

pub mod manifest;
pub mod tables;

/// Dimensions of one prepared split
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SplitShape {
    pub split: &'static str,
    pub rows: usize,
    pub input_cols: usize,
    pub target_cols: usize,
}

impl SplitShape {
    pub fn of<T>(split: &'static str, dataset: &Dataset<T>) -> SplitShape {
        SplitShape {
            split,
            rows: dataset.data.nrows(),
            input_cols: dataset.data.ncols(),
            target_cols: dataset.target.ncols(),
        }
    }
}

fn named<T>(splits: &Splits<T>) -> [(&'static str, &Dataset<T>); 3] {
    [
        ("train", &splits.train),
        ("valid", &splits.valid),
        ("test", &splits.test),
    ]
}

pub fn shapes<T>(splits: &Splits<T>) -> Vec<SplitShape> {
    named(splits)
        .into_iter()
        .map(|(name, dataset)| SplitShape::of(name, dataset))
        .collect()
}

/// Write `{train,valid,test}_{inputs,targets}.csv`, `shapes.csv` and `manifest.json` into `out_dir`
pub fn export_splits<T: Element>(
    out_dir: &Path,
    splits: &Splits<T>,
    precision: Precision,
    valid_fraction: f64,
) -> io::Result<()> {
    fs::create_dir_all(out_dir)?;

    for (name, dataset) in named(splits) {
        tables::write_matrix(&out_dir.join(format!("{}_inputs.csv", name)), &dataset.data)?;
        tables::write_matrix(&out_dir.join(format!("{}_targets.csv", name)), &dataset.target)?;
        info!("exported {} rows of {}", dataset.len(), name);
    }

    let shapes = shapes(splits);
    tables::write_records(&out_dir.join("shapes.csv"), &shapes)?;
    manifest::write_manifest(
        &out_dir.join("manifest.json"),
        &manifest::manifest(precision, valid_fraction, &shapes),
    )?;

    Ok(())
}
