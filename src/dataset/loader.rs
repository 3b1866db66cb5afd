//! Default image loader.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::{ImageReader, RgbImage};

use crate::error::DatasetError;

/// Opens `path`, decodes it and converts it to 8-bit RGB.
///
/// The format is sniffed from the file contents, not the extension. The file
/// is closed when this returns, whether decoding succeeded or not.
///
/// # Errors
/// - [`DatasetError::FileAccess`] if the file cannot be opened or read.
/// - [`DatasetError::ImageDecode`] if the bytes are not a supported image.
pub fn load_rgb(path: &Path) -> Result<RgbImage, DatasetError> {
    let file_access = |source: std::io::Error| DatasetError::FileAccess {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(file_access)?;
    let reader = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(file_access)?;

    let image = reader.decode().map_err(|source| DatasetError::ImageDecode {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(image.into_rgb8())
}
