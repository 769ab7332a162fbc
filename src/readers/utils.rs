use super::types::{FileType, RasterError};
use std::path::Path;

pub fn reader_from_filetype(path: &Path) -> Result<FileType, RasterError> {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("tif") | Some("tiff") => Ok(FileType::GeoTiff),
        _ => Err(RasterError::UnknownFileType(path.to_path_buf())),
    }
}
