//! PNG encoding for rendered plots.
//!
//! Supports two encoding modes:
//! - **Indexed PNG (color type 3)**: used when the image has ≤256 unique
//!   colors, which is common for plots over flat-shaded map tiles.
//! - **RGBA PNG (color type 6)**: fallback for images with more colors.
//!
//! Use [`encode_png`] for automatic mode selection.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use image::RgbaImage;
use rayon::prelude::*;
use tracing::debug;
use xmap_common::{XMapError, XMapResult};

/// PNG file signature
const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum colors for indexed PNG
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels to benefit from parallel palette extraction
const PARALLEL_THRESHOLD: usize = 4096;

/// PNG color type chosen by [`create_png_auto`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorType {
    Indexed = 3,
    Rgba = 6,
}

/// Distinct colors of an image and the per-pixel index into them.
#[derive(Debug, Clone)]
pub struct Palette {
    pub colors: Vec<[u8; 4]>,
    pub indices: Vec<u8>,
}

/// Encode an image, choosing indexed or RGBA output.
pub fn encode_png(img: &RgbaImage) -> XMapResult<Vec<u8>> {
    create_png_auto(img.as_raw(), img.width() as usize, img.height() as usize)
}

/// Encode an image and write it to `path`.
pub fn write_png(img: &RgbaImage, path: &Path) -> XMapResult<()> {
    let data = encode_png(img)?;
    fs::write(path, &data)?;
    debug!(path = %path.display(), bytes = data.len(), "Wrote PNG");
    Ok(())
}

/// Color type of an encoded PNG, read from its IHDR chunk.
pub fn color_type_of(png: &[u8]) -> Option<ColorType> {
    if png.len() < 26 || png[..8] != SIGNATURE || &png[12..16] != b"IHDR" {
        return None;
    }
    match png[25] {
        3 => Some(ColorType::Indexed),
        6 => Some(ColorType::Rgba),
        _ => None,
    }
}

/// Create a PNG from raw RGBA bytes with automatic format selection.
pub fn create_png_auto(pixels: &[u8], width: usize, height: usize) -> XMapResult<Vec<u8>> {
    check_dimensions(pixels, width, height)?;

    let palette = if pixels.len() / 4 >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette_sequential(pixels)
    };

    match palette {
        Some(palette) => create_png_indexed(width, height, &palette),
        None => create_png(pixels, width, height),
    }
}

fn check_dimensions(pixels: &[u8], width: usize, height: usize) -> XMapResult<()> {
    if width == 0 || height == 0 {
        return Err(XMapError::Render(format!(
            "cannot encode an empty {}x{} image",
            width, height
        )));
    }
    if pixels.len() != width * height * 4 {
        return Err(XMapError::Render(format!(
            "pixel buffer has {} bytes, expected {} for {}x{} RGBA",
            pixels.len(),
            width * height * 4,
            width,
            height
        )));
    }
    Ok(())
}

#[inline(always)]
fn pack_color(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

/// Single pass palette extraction for small images.
pub fn extract_palette_sequential(pixels: &[u8]) -> Option<Palette> {
    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut colors: Vec<[u8; 4]> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices = Vec::with_capacity(pixels.len() / 4);

    for px in pixels.chunks_exact(4) {
        let key = pack_color(px);
        let index = match lookup.get(&key) {
            Some(&idx) => idx,
            None => {
                if colors.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = colors.len() as u8;
                colors.push([px[0], px[1], px[2], px[3]]);
                lookup.insert(key, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some(Palette { colors, indices })
}

/// Palette extraction split across the rayon pool.
///
/// Unique colors are gathered per chunk, merged, and then every pixel is
/// mapped to its index in a second parallel pass.
pub fn extract_palette_parallel(pixels: &[u8]) -> Option<Palette> {
    let chunk_pixels = (pixels.len() / 4 / rayon::current_num_threads()).max(256);
    let chunk_bytes = chunk_pixels * 4;

    let per_chunk: Vec<Option<Vec<u32>>> = pixels
        .par_chunks(chunk_bytes)
        .map(|chunk| {
            let mut seen: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
            for px in chunk.chunks_exact(4) {
                seen.insert(pack_color(px), ());
                if seen.len() > MAX_PALETTE_SIZE {
                    return None;
                }
            }
            Some(seen.into_keys().collect())
        })
        .collect();

    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut colors: Vec<[u8; 4]> = Vec::with_capacity(MAX_PALETTE_SIZE);
    for keys in per_chunk {
        for key in keys? {
            if lookup.contains_key(&key) {
                continue;
            }
            if colors.len() >= MAX_PALETTE_SIZE {
                return None;
            }
            lookup.insert(key, colors.len() as u8);
            colors.push(key.to_le_bytes());
        }
    }

    let indices: Vec<u8> = pixels
        .par_chunks(4)
        .map(|px| lookup.get(&pack_color(px)).copied().unwrap_or(0))
        .collect();

    Some(Palette { colors, indices })
}

/// Create an indexed PNG (color type 3) from a palette.
pub fn create_png_indexed(width: usize, height: usize, palette: &Palette) -> XMapResult<Vec<u8>> {
    if palette.indices.len() != width * height {
        return Err(XMapError::Render(format!(
            "palette has {} indices for a {}x{} image",
            palette.indices.len(),
            width,
            height
        )));
    }

    let mut png = Vec::new();
    png.extend_from_slice(&SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, ColorType::Indexed));

    let plte: Vec<u8> = palette
        .colors
        .iter()
        .flat_map(|[r, g, b, _]| [*r, *g, *b])
        .collect();
    write_chunk(&mut png, b"PLTE", &plte);

    // tRNS carries one alpha per palette entry
    if palette.colors.iter().any(|c| c[3] < 255) {
        let trns: Vec<u8> = palette.colors.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    let idat = deflate_scanlines(&palette.indices, width, height)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Create a truecolor PNG (color type 6) from raw RGBA bytes.
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> XMapResult<Vec<u8>> {
    check_dimensions(pixels, width, height)?;

    let mut png = Vec::new();
    png.extend_from_slice(&SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, ColorType::Rgba));

    let idat = deflate_scanlines(pixels, width * 4, height)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

fn ihdr(width: usize, height: usize, color_type: ColorType) -> [u8; 13] {
    let mut data = [0u8; 13];
    data[0..4].copy_from_slice(&(width as u32).to_be_bytes());
    data[4..8].copy_from_slice(&(height as u32).to_be_bytes());
    data[8] = 8; // bit depth
    data[9] = color_type as u8;
    // compression, filter and interlace methods stay 0
    data
}

/// Zlib-compress scanlines of `row_bytes` bytes each, with filter type 0.
fn deflate_scanlines(data: &[u8], row_bytes: usize, height: usize) -> XMapResult<Vec<u8>> {
    let mut raw = Vec::with_capacity(height * (1 + row_bytes));
    for row in data.chunks_exact(row_bytes).take(height) {
        raw.push(0);
        raw.extend_from_slice(row);
    }

    let compress_err = |e: std::io::Error| XMapError::Render(format!("IDAT compression failed: {}", e));
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&raw).map_err(compress_err)?;
    encoder.finish().map_err(compress_err)
}

fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}
