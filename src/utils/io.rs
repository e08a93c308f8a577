//! Raw weight buffers and text input/label loaders
//!
//! Weight files are a flat sequence of little-endian f32 values with no
//! header and no shape metadata; the shape is established out of band, so
//! the loader must be told exactly how many values to expect and rejects
//! files of any other size.

use std::error::Error;
use std::fs;
use std::path::Path;

use crate::error::NetError;
use crate::tensor::Tensor;

/// Load exactly `expected_len` f32 values from a headerless binary file.
///
/// Values are read in the row-major order of the corresponding tensor.
/// Returns [`NetError::WeightSizeMismatch`] if the file holds any other
/// number of values.
pub fn load_weights(path: impl AsRef<Path>, expected_len: usize) -> Result<Vec<f32>, Box<dyn Error>> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;
    if bytes.len() != expected_len * 4 {
        return Err(Box::new(NetError::WeightSizeMismatch {
            path: path.display().to_string(),
            expected: expected_len,
            found: bytes.len() / 4,
        }));
    }

    let values = bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect();
    Ok(values)
}

/// Write a flat f32 buffer as little-endian bytes, no header.
pub fn save_weights(path: impl AsRef<Path>, values: &[f32]) -> Result<(), Box<dyn Error>> {
    let mut bytes = Vec::with_capacity(values.len() * 4);
    for value in values {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    fs::write(path, bytes)?;
    Ok(())
}

/// Parse a whitespace-separated sequence of decimals into a one-row tensor
/// of length `len`.
pub fn load_input(path: impl AsRef<Path>, len: usize) -> Result<Tensor, Box<dyn Error>> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let mut x = Tensor::vector(len);
    let mut count = 0;

    for (i, token) in contents.split_whitespace().take(len).enumerate() {
        x[i] = token.parse::<f32>()?;
        count += 1;
    }
    if count != len {
        return Err(Box::new(NetError::InvalidConfig(format!(
            "input file {} holds {} values, expected {}",
            path.display(),
            count,
            len
        ))));
    }
    Ok(x)
}

/// Parse a single decimal class label.
pub fn load_label(path: impl AsRef<Path>) -> Result<usize, Box<dyn Error>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents.trim().parse::<usize>()?)
}
