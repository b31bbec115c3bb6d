use std::io;
use std::path::Path;

use ndarray::Array2;
use serde::Serialize;

/// Write a matrix as headerless CSV, one record per row
pub fn write_matrix<T: Serialize>(path: &Path, matrix: &Array2<T>) -> io::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    for row in matrix.rows() {
        writer.serialize(row.iter().collect::<Vec<_>>())?;
    }
    writer.flush()?;

    Ok(())
}

/// Write serde records as CSV with a header row taken from the field names
pub fn write_records<S: Serialize>(path: &Path, records: &[S]) -> io::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;

    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    Ok(())
}
