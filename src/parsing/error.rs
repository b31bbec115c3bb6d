use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Malformed IDX content
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("bad magic: expected {expected:#010x}, got {actual:#010x}")]
    BadMagic { expected: i32, actual: i32 },

    /// A header count or dimension is negative or does not fit in memory
    #[error("count overflow: header field `{field}` is {value}")]
    CountOverflow { field: &'static str, value: i64 },

    /// Images of zero pixels: nothing in the file backs the declared records
    #[error("image header declares {count} images of {rows}x{cols} pixels")]
    EmptyImages {
        count: usize,
        rows: usize,
        cols: usize,
    },

    #[error("truncated image {index}: expected {expected} bytes, got {actual}")]
    TruncatedImage {
        index: usize,
        expected: usize,
        actual: usize,
    },
}

/// Errors produced while reading, preparing or splitting the dataset
#[derive(Debug, Error)]
pub enum MnistError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("format error: {0}")]
    Format(#[from] FormatError),

    #[error("shape error: {0}")]
    Shape(String),

    #[error("range error: label {label} at row {row} is outside 0..{classes}")]
    Range {
        row: usize,
        label: u8,
        classes: usize,
    },

    #[error("config error: {0}")]
    Config(String),

    /// Any of the above, tagged with the file it came from
    #[error("{}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: Box<MnistError>,
    },
}

impl MnistError {
    pub fn in_file(self, path: impl Into<PathBuf>) -> MnistError {
        MnistError::File {
            path: path.into(),
            source: Box::new(self),
        }
    }

    /// The underlying error with any file context stripped
    pub fn root(&self) -> &MnistError {
        match self {
            MnistError::File { source, .. } => source.root(),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_peels_nested_file_context() {
        let err = MnistError::Config("bad".into())
            .in_file("inner")
            .in_file("outer");

        assert!(matches!(err.root(), MnistError::Config(msg) if msg == "bad"));
    }

    #[test]
    fn file_context_names_the_path() {
        let err = MnistError::Format(FormatError::BadMagic {
            expected: 0x801,
            actual: 0x803,
        })
        .in_file("data/train-labels-idx1-ubyte");

        let msg = err.to_string();
        assert!(msg.starts_with("data/train-labels-idx1-ubyte: "));
        assert!(msg.contains("0x00000801"));
        assert!(msg.contains("0x00000803"));
    }
}
