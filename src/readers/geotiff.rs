use super::{Data, DataReader, RasterError};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::TiffEncoder;
use tiff::encoder::colortype::{Gray8, Gray32Float};

pub struct GeoTiffReader {
    pub file_name: PathBuf,
}

impl GeoTiffReader {
    fn decode(&self) -> Result<(u32, u32, DecodingResult), RasterError> {
        let file = File::open(&self.file_name).map_err(|source| RasterError::Open {
            path: self.file_name.clone(),
            source,
        })?;

        let reader = BufReader::new(file);

        let mut decoder = Decoder::new(reader).map_err(RasterError::Decode)?;
        let (width, height) = decoder.dimensions().map_err(RasterError::Decode)?;
        let image = decoder.read_image().map_err(RasterError::Decode)?;

        Ok((width, height, image))
    }
}

impl DataReader for GeoTiffReader {
    fn read_data(&self) -> Result<Data, RasterError> {
        let (width, height, image) = self.decode()?;

        let buffer: Vec<f32> = match image {
            DecodingResult::U8(data) => data.iter().map(|&x| x as f32).collect(),
            DecodingResult::U16(data) => data.iter().map(|&x| x as f32).collect(),
            DecodingResult::U32(data) => data.iter().map(|&x| x as f32).collect(),
            DecodingResult::I16(data) => data.iter().map(|&x| x as f32).collect(),
            DecodingResult::I32(data) => data.iter().map(|&x| x as f32).collect(),
            DecodingResult::F32(data) => data,
            DecodingResult::F64(data) => data.iter().map(|&x| x as f32).collect(),
            _ => return Err(RasterError::UnsupportedFormat(self.file_name.clone())),
        };

        Ok(Data {
            width,
            height,
            buffer,
        })
    }

    fn read_flags(&self) -> Result<Data<u32>, RasterError> {
        let (width, height, image) = self.decode()?;

        let buffer: Vec<u32> = match image {
            DecodingResult::U8(data) => data.iter().map(|&x| x as u32).collect(),
            DecodingResult::U16(data) => data.iter().map(|&x| x as u32).collect(),
            DecodingResult::U32(data) => data,
            DecodingResult::I16(data) => data.iter().map(|&x| x as u32).collect(),
            DecodingResult::I32(data) => data.iter().map(|&x| x as u32).collect(),
            // Float masks: NaN and negatives map to 0
            DecodingResult::F32(data) => data.iter().map(|&x| x as u32).collect(),
            _ => return Err(RasterError::UnsupportedFormat(self.file_name.clone())),
        };

        Ok(Data {
            width,
            height,
            buffer,
        })
    }
}

fn check_length(width: u32, height: u32, len: usize) -> Result<(), RasterError> {
    let expected = width as usize * height as usize;
    if len != expected {
        return Err(RasterError::BufferLength { expected, got: len });
    }
    Ok(())
}

fn create_encoder(path: &Path) -> Result<TiffEncoder<BufWriter<File>>, RasterError> {
    let file = File::create(path).map_err(|source| RasterError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let writer = BufWriter::new(file);
    TiffEncoder::new(writer).map_err(RasterError::Encode)
}

/// Write one float32 band
pub fn write_f32(path: &Path, width: u32, height: u32, data: &[f32]) -> Result<(), RasterError> {
    check_length(width, height, data.len())?;
    create_encoder(path)?
        .write_image::<Gray32Float>(width, height, data)
        .map_err(RasterError::Encode)
}

/// Write one uint8 band
pub fn write_u8(path: &Path, width: u32, height: u32, data: &[u8]) -> Result<(), RasterError> {
    check_length(width, height, data.len())?;
    create_encoder(path)?
        .write_image::<Gray8>(width, height, data)
        .map_err(RasterError::Encode)
}
