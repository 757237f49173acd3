use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::{DynamicImage, ImageFormat, RgbaImage};
use log::debug;

use crate::error::SessionError;

/// Formats a working buffer can be written as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
    Tiff,
    Gif,
    Tga,
}

impl SaveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Jpeg => "jpg",
            SaveFormat::Bmp => "bmp",
            SaveFormat::Tiff => "tiff",
            SaveFormat::Gif => "gif",
            SaveFormat::Tga => "tga",
        }
    }

    pub fn image_format(self) -> ImageFormat {
        match self {
            SaveFormat::Png => ImageFormat::Png,
            SaveFormat::Jpeg => ImageFormat::Jpeg,
            SaveFormat::Bmp => ImageFormat::Bmp,
            SaveFormat::Tiff => ImageFormat::Tiff,
            SaveFormat::Gif => ImageFormat::Gif,
            SaveFormat::Tga => ImageFormat::Tga,
        }
    }

    pub fn supports_alpha(self) -> bool {
        !matches!(self, SaveFormat::Jpeg)
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl fmt::Display for SaveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl FromStr for SaveFormat {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_start_matches('.').to_lowercase().as_str() {
            "png" => Ok(SaveFormat::Png),
            "jpg" | "jpeg" => Ok(SaveFormat::Jpeg),
            "bmp" => Ok(SaveFormat::Bmp),
            "tif" | "tiff" => Ok(SaveFormat::Tiff),
            "gif" => Ok(SaveFormat::Gif),
            "tga" => Ok(SaveFormat::Tga),
            _ => Err(SessionError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Decodes any supported image and converts it to RGBA.
pub fn load_rgba(path: &Path) -> Result<RgbaImage, SessionError> {
    let img = image::open(path).map_err(SessionError::Load)?;
    debug!("decoded {} as {:?}", path.display(), img.color());
    Ok(img.to_rgba8())
}

/// Picks the path and format a save will actually use.
///
/// A path without an extension gets `default`'s. Otherwise an explicit
/// `format` wins, then the extension decides.
pub fn resolve_target(
    path: &Path,
    format: Option<SaveFormat>,
    default: SaveFormat,
) -> Result<(PathBuf, SaveFormat), SessionError> {
    match path.extension() {
        None => {
            let format = format.unwrap_or(default);
            Ok((path.with_extension(format.extension()), format))
        }
        Some(ext) => {
            let format = match format {
                Some(format) => format,
                None => ext.to_string_lossy().parse()?,
            };
            Ok((path.to_path_buf(), format))
        }
    }
}

pub fn save_rgba(
    image: &RgbaImage,
    path: &Path,
    format: Option<SaveFormat>,
    default: SaveFormat,
) -> Result<PathBuf, SessionError> {
    let (path, format) = resolve_target(path, format, default)?;

    let result = if format.supports_alpha() {
        image.save_with_format(&path, format.image_format())
    } else {
        DynamicImage::ImageRgba8(image.clone())
            .to_rgb8()
            .save_with_format(&path, format.image_format())
    };
    result.map_err(SessionError::Save)?;

    debug!("wrote {} as {}", path.display(), format);
    Ok(path)
}
