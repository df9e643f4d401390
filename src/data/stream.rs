use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use crate::data::idx::{
    parse_label_header, IdxError, IdxFile, ImageHeader, IMAGE_HEADER_SIZE, LABEL_HEADER_SIZE,
};
use crate::data::sample::{MnistRow, Sample};
use crate::data::source::SampleSource;

/// Which half of the dataset to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

/// Locations of a paired image/label file set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetPaths {
    pub images: PathBuf,
    pub labels: PathBuf,
}

impl DatasetPaths {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(images: P, labels: Q) -> DatasetPaths {
        DatasetPaths { images: images.into(), labels: labels.into() }
    }

    /// Standard MNIST file names for `split` inside `dir`.
    pub fn split<P: AsRef<Path>>(dir: P, split: Split) -> DatasetPaths {
        let dir = dir.as_ref();
        let (images, labels) = match split {
            Split::Train => ("train-images.idx3-ubyte", "train-labels.idx1-ubyte"),
            Split::Test => ("t10k-images.idx3-ubyte", "t10k-labels.idx1-ubyte"),
        };
        DatasetPaths::new(dir.join(images), dir.join(labels))
    }
}

/// Both file handles plus the validated header. Opened and dropped together.
#[derive(Debug)]
struct OpenFiles {
    images: File,
    labels: File,
    header: ImageHeader,
}

/// Random-access reader over an IDX image/label pair.
///
/// Rows are read from disk on demand, so memory use does not grow with the
/// dataset. The stream is either closed or open; reads on a closed stream
/// fail with `IdxError::NotOpen`. An instance keeps a cursor and seeks its
/// own handles, so it must not be shared between concurrent consumers.
#[derive(Debug)]
pub struct IdxStream {
    paths: DatasetPaths,
    files: Option<OpenFiles>,
    cursor: usize,
}

impl IdxStream {
    pub fn new(paths: DatasetPaths) -> IdxStream {
        IdxStream { paths, files: None, cursor: 0 }
    }

    pub fn paths(&self) -> &DatasetPaths {
        &self.paths
    }

    pub fn is_open(&self) -> bool {
        self.files.is_some()
    }

    /// Opens both files and validates their headers.
    ///
    /// Fails on a wrong magic number, disagreeing item counts, or files too
    /// short for the declared item count. Re-opening an open stream closes it
    /// first. The cursor is reset to 0.
    pub fn open(&mut self) -> Result<()> {
        self.close();

        let mut images = File::open(&self.paths.images)
            .with_context(|| format!("cannot open image file {}", self.paths.images.display()))?;
        let mut labels = File::open(&self.paths.labels)
            .with_context(|| format!("cannot open label file {}", self.paths.labels.display()))?;

        let images_len = file_len(&images, &self.paths.images)?;
        let labels_len = file_len(&labels, &self.paths.labels)?;

        if images_len < IMAGE_HEADER_SIZE {
            return Err(truncated(IdxFile::Images, &self.paths.images, IMAGE_HEADER_SIZE, images_len));
        }
        let mut image_header = [0u8; IMAGE_HEADER_SIZE as usize];
        images.read_exact(&mut image_header)?;
        let header = ImageHeader::parse(&image_header)?;

        if labels_len < LABEL_HEADER_SIZE {
            return Err(truncated(IdxFile::Labels, &self.paths.labels, LABEL_HEADER_SIZE, labels_len));
        }
        let mut label_header = [0u8; LABEL_HEADER_SIZE as usize];
        labels.read_exact(&mut label_header)?;
        let label_count = parse_label_header(&label_header)?;

        if label_count != header.count {
            return Err(IdxError::CountMismatch { images: header.count, labels: label_count }.into());
        }
        let images_required = header.required_len()?;
        if images_len < images_required {
            return Err(truncated(IdxFile::Images, &self.paths.images, images_required, images_len));
        }
        let labels_required = LABEL_HEADER_SIZE + header.count as u64;
        if labels_len < labels_required {
            return Err(truncated(IdxFile::Labels, &self.paths.labels, labels_required, labels_len));
        }

        debug!(
            "Opened IDX dataset {}: {} items of {}x{}",
            self.paths.images.display(),
            header.count,
            header.rows,
            header.cols
        );

        self.files = Some(OpenFiles { images, labels, header });
        self.cursor = 0;
        Ok(())
    }

    /// Releases both file handles. Closing a closed stream is a no-op.
    pub fn close(&mut self) {
        self.files = None;
    }

    /// Opens the stream, runs `f`, and closes the stream again whether `f`
    /// succeeded or not.
    pub fn using<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut IdxStream) -> Result<T>,
    {
        self.open()?;
        let result = f(self);
        self.close();
        result
    }

    /// Number of items declared by the (validated) headers; 0 while closed.
    pub fn count(&self) -> usize {
        self.files.as_ref().map_or(0, |f| f.header.count)
    }

    /// Image dimensions `(rows, cols)`, if open.
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.files.as_ref().map(|f| (f.header.rows, f.header.cols))
    }

    /// Reads row `index`, or returns `Ok(None)` if `index >= count()`.
    ///
    /// Pixels are normalized to `[0, 1]`. The label byte is returned as
    /// stored; class range is a property of the dataset, not checked here.
    pub fn read_at(&mut self, index: usize) -> Result<Option<MnistRow>> {
        let files = self.files.as_mut().ok_or(IdxError::NotOpen)?;
        if index >= files.header.count {
            return Ok(None);
        }

        let header = files.header;
        let pixels = header.pixels_per_image().ok_or_else(|| header.overflow())?;
        let offset = header.offset_of(index).ok_or_else(|| header.overflow())?;

        let mut raw = vec![0u8; pixels];
        files.images.seek(SeekFrom::Start(offset))?;
        files.images.read_exact(&mut raw)
            .with_context(|| format!("cannot read image {}", index))?;

        let mut label = [0u8; 1];
        files.labels.seek(SeekFrom::Start(LABEL_HEADER_SIZE + index as u64))?;
        files.labels.read_exact(&mut label)
            .with_context(|| format!("cannot read label {}", index))?;

        let pixels = raw.iter().map(|&b| b as f64 / 255.0).collect();
        Ok(Some(MnistRow { label: label[0], pixels }))
    }

    /// Rewinds the cursor without touching the files.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }
}

/// Sequential reading from the cursor. Yields `None` once the cursor reaches
/// `count()`, which is 0 while the stream is closed.
impl Iterator for IdxStream {
    type Item = Result<MnistRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= IdxStream::count(self) {
            return None;
        }
        match self.read_at(self.cursor) {
            Ok(Some(row)) => {
                self.cursor += 1;
                Some(Ok(row))
            }
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl SampleSource for IdxStream {
    fn len(&self) -> usize {
        self.count()
    }

    fn sample_at(&mut self, index: usize) -> Result<Option<Sample>> {
        Ok(self.read_at(index)?.map(Sample::from))
    }
}

fn file_len(file: &File, path: &Path) -> Result<u64> {
    Ok(file.metadata()
        .with_context(|| format!("cannot stat {}", path.display()))?
        .len())
}

fn truncated(file: IdxFile, path: &Path, expected: u64, actual: u64) -> anyhow::Error {
    IdxError::Truncated { file, path: path.to_path_buf(), expected, actual }.into()
}
