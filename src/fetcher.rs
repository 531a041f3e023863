//! Downloads single images to disk.

use std::path::Path;

use image::{DynamicImage, ImageFormat, ImageReader};
use tokio::fs;

use crate::{Error, Result};

/// Returns the final `/`-delimited segment of `url`.
///
/// Query strings and fragments are kept as part of the name.
pub fn filename_for(url: &str) -> Result<String> {
    match url.rsplit('/').next() {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(Error::NoFilename(url.to_string())),
    }
}

/// Downloads `url` into `dir` and returns the filename it was saved under.
///
/// The response body is written as-is, whatever its status. An existing file
/// with the same name is overwritten. With `grayscale` set, the written file
/// is then decoded and replaced by its single-channel version.
pub async fn download_image(
    client: &reqwest::Client,
    url: &str,
    dir: &Path,
    grayscale: bool,
) -> Result<String> {
    let filename = filename_for(url)?;
    let bytes = client.get(url).send().await?.bytes().await?;

    fs::create_dir_all(dir).await?;
    let path = dir.join(&filename);
    fs::write(&path, &bytes).await?;
    tracing::debug!("  Saved {} bytes to {}", bytes.len(), path.display());

    if grayscale {
        let target = path.clone();
        tokio::task::spawn_blocking(move || convert_to_grayscale(&target)).await??;
        tracing::debug!("  Converted {} to grayscale", path.display());
    }

    Ok(filename)
}

/// Rewrites the image at `path` as 8-bit luma, keeping its container format.
///
/// The format is sniffed from the file contents first and falls back to the
/// extension.
pub fn convert_to_grayscale(path: &Path) -> Result<()> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let format = match reader.format() {
        Some(format) => format,
        None => ImageFormat::from_path(path)?,
    };
    let image = reader.decode()?;

    let luma = DynamicImage::ImageLuma8(image.to_luma8());
    luma.save_with_format(path, format)?;
    Ok(())
}
