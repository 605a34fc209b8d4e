//! Output file naming and writing.

use std::fs;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::info;
use xmap_common::{XMapError, XMapResult};

/// One output path per image.
///
/// Given as many paths as images, they are used in order. A single path
/// for several images is expanded to `{stem}_{n}.{ext}` with `n` counting
/// from 1.
pub fn output_paths(outputs: &[PathBuf], images: usize) -> XMapResult<Vec<PathBuf>> {
    match outputs {
        [] => Err(XMapError::invalid_parameter(
            "output",
            "at least one output path is required",
        )),
        [single] if images > 1 => Ok((1..=images).map(|n| numbered(single, n)).collect()),
        _ if outputs.len() == images => Ok(outputs.to_vec()),
        _ => Err(XMapError::SeriesMismatch {
            what: "outputs",
            expected: images,
            found: outputs.len(),
        }),
    }
}

fn numbered(path: &Path, n: usize) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "x-map".to_string());
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    path.with_file_name(format!("{}_{}.{}", stem, n, ext))
}

/// Encode each image as PNG to its path, creating parent directories.
pub fn save_images(images: &[RgbaImage], paths: &[PathBuf]) -> XMapResult<()> {
    if images.len() != paths.len() {
        return Err(XMapError::SeriesMismatch {
            what: "outputs",
            expected: images.len(),
            found: paths.len(),
        });
    }

    for (img, path) in images.iter().zip(paths) {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        renderer::write_png(img, path)?;
        info!(
            path = %path.display(),
            width = img.width(),
            height = img.height(),
            "Saved plot"
        );
    }
    Ok(())
}
