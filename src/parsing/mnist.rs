use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::error::MnistError;
use super::idx::{read_images, read_labels, ImageSet};
use super::prepare::Element;
use super::{check_fraction, Dataset, Label, RawDataset};

const FILE_SUFFIX: &str = "-ubyte";

/// Which pair of files to read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

impl Split {
    fn prefix(self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Test => "t10k",
        }
    }

    pub fn images_prefix(self) -> String {
        format!("{}-images", self.prefix())
    }

    pub fn labels_prefix(self) -> String {
        format!("{}-labels", self.prefix())
    }
}

/// Resolved image and label paths of one split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitFiles {
    pub images: PathBuf,
    pub labels: PathBuf,
}

impl SplitFiles {
    pub fn locate(dir: &Path, split: Split) -> Result<SplitFiles, MnistError> {
        Ok(SplitFiles {
            images: find_file(dir, &split.images_prefix())?,
            labels: find_file(dir, &split.labels_prefix())?,
        })
    }
}

/// The three prepared sets used for training
#[derive(Debug, Clone, PartialEq)]
pub struct Splits<T> {
    pub train: Dataset<T>,
    pub valid: Dataset<T>,
    pub test: Dataset<T>,
}

/// Find `<prefix>*-ubyte` in `dir`, e.g. both `train-images-idx3-ubyte` and
/// `train-images.idx3-ubyte` match `train-images`.
/// If several files match, the first in lexicographic order wins
pub fn find_file(dir: &Path, prefix: &str) -> Result<PathBuf, MnistError> {
    let entries = fs::read_dir(dir).map_err(|e| MnistError::from(e).in_file(dir))?;
    let mut candidates = vec![];

    for entry in entries {
        let path = entry.map_err(|e| MnistError::from(e).in_file(dir))?.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with(prefix) && name.ends_with(FILE_SUFFIX));

        if matches && path.is_file() {
            candidates.push(path);
        }
    }

    candidates.sort();
    if candidates.len() > 1 {
        debug!(
            "{} candidates for {}*{}, using {}",
            candidates.len(),
            prefix,
            FILE_SUFFIX,
            candidates[0].display()
        );
    }

    candidates.into_iter().next().ok_or_else(|| {
        MnistError::from(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no file matching {}*{}", prefix, FILE_SUFFIX),
        ))
        .in_file(dir)
    })
}

pub fn read_label_file(path: &Path) -> Result<Vec<Label>, MnistError> {
    File::open(path)
        .map_err(MnistError::from)
        .and_then(|file| read_labels(BufReader::new(file)))
        .map_err(|e| e.in_file(path))
}

pub fn read_image_file(path: &Path) -> Result<ImageSet, MnistError> {
    File::open(path)
        .map_err(MnistError::from)
        .and_then(|file| read_images(BufReader::new(file)))
        .map_err(|e| e.in_file(path))
}

/// Read one split's image and label files without preparing them
pub fn load_raw(files: &SplitFiles) -> Result<RawDataset, MnistError> {
    let labels = read_label_file(&files.labels)?;
    info!("read {} labels from {}", labels.len(), files.labels.display());

    let images = read_image_file(&files.images)?;
    info!(
        "read {} images of {}x{} from {}",
        images.images.len(),
        images.rows,
        images.cols,
        files.images.display()
    );

    RawDataset::new(images, labels).map_err(|e| e.in_file(&files.images))
}

/// Read and prepare one split
pub fn load_split<T: Element>(dir: &Path, split: Split) -> Result<Dataset<T>, MnistError> {
    let files = SplitFiles::locate(dir, split)?;
    let raw = load_raw(&files)?;

    // only the targets can fail here: the reader already guarantees equal image sizes
    raw.prepare().map_err(|e| e.in_file(&files.labels))
}

/// Load the training files split into train/validation, and the test files as a whole
pub fn load_all<T: Element>(dir: &Path, valid_fraction: f64) -> Result<Splits<T>, MnistError> {
    check_fraction(valid_fraction)?;

    let (train, valid) = load_split(dir, Split::Train)?.split(valid_fraction)?;
    info!(
        "split training data into {} train and {} validation rows",
        train.len(),
        valid.len()
    );

    let test = load_split(dir, Split::Test)?;
    info!("loaded {} test rows", test.len());

    Ok(Splits { train, valid, test })
}
