use std::{
    fs,
    io::Cursor,
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{DateTime, TimeZone};
use image::ImageFormat;
use log::info;
use tokio::task;

use crate::{error::ExportError, image_model::Bitmap};

pub const EXTENSION: &str = "png";

/// `Generated Image - 2023-03-21 at 14.05.09.png`
pub fn default_file_name<Tz: TimeZone>(created_at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "Generated Image - {}.{EXTENSION}",
        created_at.format("%Y-%m-%d at %H.%M.%S")
    )
}

/// Where the save dialog starts when nothing is configured
pub fn default_directory() -> Option<PathBuf> {
    dirs::picture_dir().or_else(dirs::home_dir)
}

/// Appends `.png` unless the path already ends in it
pub fn with_png_extension(path: &Path) -> PathBuf {
    let has_ext = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case(EXTENSION));
    if has_ext {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".");
        name.push(EXTENSION);
        PathBuf::from(name)
    }
}

/// Encodes `bitmap` as PNG and writes it to `path`, returning the path that
/// was actually written.
pub fn write_png(bitmap: &Bitmap, path: &Path) -> Result<PathBuf, ExportError> {
    let path = with_png_extension(path);

    let mut bytes = Vec::new();
    bitmap.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    fs::write(&path, &bytes).map_err(|source| ExportError::Write {
        path: path.clone(),
        source,
    })?;

    info!("Image saved to {}", path.display());
    Ok(path)
}

/// [`write_png`] on the blocking pool
pub async fn save_png(bitmap: Arc<Bitmap>, path: PathBuf) -> Result<PathBuf, ExportError> {
    task::spawn_blocking(move || write_png(&bitmap, &path)).await?
}
