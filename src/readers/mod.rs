pub mod geotiff;
pub mod types;
pub mod utils;

pub use geotiff::{GeoTiffReader, write_f32, write_u8};
pub use types::{Data, DataReader, FileType, RasterError};
pub use utils::reader_from_filetype;

use std::path::Path;

pub fn create_reader(file_name: &Path) -> Result<Box<dyn DataReader + Send + Sync>, RasterError> {
    match reader_from_filetype(file_name)? {
        FileType::GeoTiff => Ok(Box::new(GeoTiffReader {
            file_name: file_name.to_path_buf(),
        })),
    }
}
