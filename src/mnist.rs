//! IDX-format image/label ingestion (MNIST and friends).
//!
//! This is an external collaborator of the engine: it only produces
//! [`Sample`]s. Pixels are scaled to [0, 1] and labels become one-hot target
//! vectors.

use crate::sample::Sample;
use log::info;
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use thiserror::Error;

const IMAGE_MAGIC: u32 = 0x0803;
const LABEL_MAGIC: u32 = 0x0801;
const NUM_CLASSES: usize = 10;

/// Errors while decoding an IDX dataset.
#[derive(Debug, Error)]
pub enum MnistError {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),

    #[error("bad magic: expected {expected:#06x}, got {got:#06x}")]
    BadMagic { expected: u32, got: u32 },

    #[error("mismatch between {images} images and {labels} labels")]
    CountMismatch { images: u32, labels: u32 },

    #[error("label {0} out of range (expected 0..10)")]
    BadLabel(u8),
}

fn read_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

fn expect_magic<R: Read>(r: &mut R, expected: u32) -> Result<(), MnistError> {
    let got = read_u32(r)?;
    if got != expected {
        return Err(MnistError::BadMagic { expected, got });
    }
    Ok(())
}

/// Read an IDX image/label pair (`<prefix>-images-idx3-ubyte` and
/// `<prefix>-labels-idx1-ubyte`) from `dir` into samples.
pub fn read_mnist(dir: &Path, prefix: &str) -> Result<Vec<Sample>, MnistError> {
    let image_path = dir.join(format!("{prefix}-images-idx3-ubyte"));
    let label_path = dir.join(format!("{prefix}-labels-idx1-ubyte"));

    info!("reading idx data from {}", image_path.display());

    let mut images = BufReader::new(File::open(&image_path)?);
    let mut labels = BufReader::new(File::open(&label_path)?);

    expect_magic(&mut images, IMAGE_MAGIC)?;
    expect_magic(&mut labels, LABEL_MAGIC)?;

    let num_images = read_u32(&mut images)?;
    let num_labels = read_u32(&mut labels)?;
    if num_images != num_labels {
        return Err(MnistError::CountMismatch {
            images: num_images,
            labels: num_labels,
        });
    }

    let rows = read_u32(&mut images)? as usize;
    let cols = read_u32(&mut images)? as usize;
    info!("loading {} images of {}x{} pixels", num_images, rows, cols);

    let mut pixel_buf = vec![0u8; rows * cols];
    let mut label_buf = [0u8; 1];
    let mut samples = Vec::with_capacity(num_images as usize);

    for _ in 0..num_images {
        images.read_exact(&mut pixel_buf)?;
        labels.read_exact(&mut label_buf)?;

        let label = label_buf[0];
        if label as usize >= NUM_CLASSES {
            return Err(MnistError::BadLabel(label));
        }

        let inputs: Vec<f64> = pixel_buf.iter().map(|&p| f64::from(p) / 255.0).collect();
        let mut targets = vec![0.0; NUM_CLASSES];
        targets[label as usize] = 1.0;

        samples.push(Sample::new(inputs, targets));
    }

    Ok(samples)
}
