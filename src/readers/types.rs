use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub trait DataReader {
    /// Read the first band as floating point values
    fn read_data(&self) -> Result<Data, RasterError>;

    /// Read the first band as integer flag words
    fn read_flags(&self) -> Result<Data<u32>, RasterError>;
}

#[derive(Error, Debug)]
pub enum RasterError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to decode TIFF: {0}")]
    Decode(#[source] tiff::TiffError),
    #[error("Failed to encode TIFF: {0}")]
    Encode(#[source] tiff::TiffError),
    #[error("Unsupported pixel format in {0}")]
    UnsupportedFormat(PathBuf),
    #[error("Unknown raster file type: {0}")]
    UnknownFileType(PathBuf),
    #[error("Raster is {got_width}x{got_height}, expected {width}x{height}")]
    Dimensions {
        width: u32,
        height: u32,
        got_width: u32,
        got_height: u32,
    },
    #[error("Buffer holds {got} values, expected {expected}")]
    BufferLength { expected: usize, got: usize },
}

/// One raster band, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct Data<T = f32> {
    pub width: u32,
    pub height: u32,
    pub buffer: Vec<T>,
}

impl<T> Data<T> {
    pub fn num_pixels(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<(), RasterError> {
        if self.width != width || self.height != height {
            return Err(RasterError::Dimensions {
                width,
                height,
                got_width: self.width,
                got_height: self.height,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    GeoTiff,
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let valid = self.buffer.iter().copied().filter(|x| !x.is_nan());
        let min_value = valid.clone().fold(f32::NAN, f32::min);
        let max_value = valid.fold(f32::NAN, f32::max);

        write!(
            f,
            "Width: {}\nHeight: {}\nBuffer Length: {}\nMin value: {}\nMax value: {}",
            self.width,
            self.height,
            self.buffer.len(),
            min_value,
            max_value,
        )
    }
}
