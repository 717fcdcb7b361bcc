//! PNG encoding for rendered figures.
//!
//! Figures with at most 256 distinct colors (flat colorbars, coarse meshes)
//! are written as indexed PNG (color type 3); everything else as RGBA
//! (color type 6). Every file carries a `pHYs` chunk recording the dpi.

use image::RgbaImage;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::io::Write;

use crate::error::{RenderError, Result};

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels to benefit from parallel palette extraction
const PARALLEL_THRESHOLD: usize = 4096;

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

const METERS_PER_INCH: f64 = 0.0254;

type Palette = Vec<[u8; 4]>;

/// Encode a rendered figure, choosing indexed or RGBA output.
pub fn encode_image(img: &RgbaImage, dpi: u32) -> Result<Vec<u8>> {
    let (width, height) = img.dimensions();
    let pixels = img.as_raw();
    match extract_palette(pixels) {
        Some((palette, indices)) => encode_indexed(width, height, dpi, &palette, &indices),
        None => encode_rgba(pixels, width, height, dpi),
    }
}

#[inline(always)]
fn pack(pixel: &[u8]) -> u32 {
    u32::from_le_bytes([pixel[0], pixel[1], pixel[2], pixel[3]])
}

/// Palette and per-pixel indices, or `None` above 256 colors.
fn extract_palette(pixels: &[u8]) -> Option<(Palette, Vec<u8>)> {
    let unique = if pixels.len() / 4 >= PARALLEL_THRESHOLD {
        unique_colors_parallel(pixels)?
    } else {
        unique_colors_sequential(pixels)?
    };

    let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(unique.len());
    let mut palette: Palette = Vec::with_capacity(unique.len());
    for packed in unique {
        if !lookup.contains_key(&packed) {
            lookup.insert(packed, palette.len() as u8);
            palette.push(packed.to_le_bytes());
        }
    }
    let indices = pixels
        .par_chunks_exact(4)
        .map(|p| lookup.get(&pack(p)).copied().unwrap_or(0))
        .collect();
    Some((palette, indices))
}

fn unique_colors_sequential(pixels: &[u8]) -> Option<Vec<u32>> {
    let mut seen: Vec<u32> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut set: HashSet<u32> = HashSet::with_capacity(MAX_PALETTE_SIZE);
    for p in pixels.chunks_exact(4) {
        let packed = pack(p);
        if set.insert(packed) {
            if seen.len() >= MAX_PALETTE_SIZE {
                return None;
            }
            seen.push(packed);
        }
    }
    Some(seen)
}

fn unique_colors_parallel(pixels: &[u8]) -> Option<Vec<u32>> {
    let chunk = (pixels.len() / 4 / rayon::current_num_threads()).max(256) * 4;
    let per_chunk: Vec<Option<Vec<u32>>> = pixels
        .par_chunks(chunk)
        .map(unique_colors_sequential)
        .collect();

    let mut merged: Vec<u32> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut set: HashSet<u32> = HashSet::with_capacity(MAX_PALETTE_SIZE);
    for colors in per_chunk {
        for packed in colors? {
            if set.insert(packed) {
                if merged.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                merged.push(packed);
            }
        }
    }
    Some(merged)
}

fn header(width: u32, height: u32, color_type: u8) -> Vec<u8> {
    let mut ihdr = Vec::with_capacity(13);
    ihdr.extend_from_slice(&width.to_be_bytes());
    ihdr.extend_from_slice(&height.to_be_bytes());
    ihdr.push(8); // bit depth
    ihdr.push(color_type);
    ihdr.extend_from_slice(&[0, 0, 0]); // compression, filter, interlace
    ihdr
}

/// `pHYs` payload: pixels per meter on both axes, unit = meter.
fn physical_dimensions(dpi: u32) -> Vec<u8> {
    let ppm = (dpi as f64 / METERS_PER_INCH).round() as u32;
    let mut phys = Vec::with_capacity(9);
    phys.extend_from_slice(&ppm.to_be_bytes());
    phys.extend_from_slice(&ppm.to_be_bytes());
    phys.push(1);
    phys
}

fn encode_indexed(
    width: u32,
    height: u32,
    dpi: u32,
    palette: &[[u8; 4]],
    indices: &[u8],
) -> Result<Vec<u8>> {
    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"IHDR", &header(width, height, 3));
    write_chunk(&mut png, b"pHYs", &physical_dimensions(dpi));

    let plte: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut png, b"PLTE", &plte);
    if palette.iter().any(|c| c[3] < 255) {
        let trns: Vec<u8> = palette.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    write_chunk(&mut png, b"IDAT", &deflate_scanlines(indices, width as usize)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn encode_rgba(pixels: &[u8], width: u32, height: u32, dpi: u32) -> Result<Vec<u8>> {
    let mut png = SIGNATURE.to_vec();
    write_chunk(&mut png, b"IHDR", &header(width, height, 6));
    write_chunk(&mut png, b"pHYs", &physical_dimensions(dpi));
    write_chunk(&mut png, b"IDAT", &deflate_scanlines(pixels, width as usize * 4)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Prefix each scanline with filter byte 0 and zlib-compress.
fn deflate_scanlines(data: &[u8], row_bytes: usize) -> Result<Vec<u8>> {
    let rows = if row_bytes == 0 { 0 } else { data.len() / row_bytes };
    let mut raw = Vec::with_capacity(rows * (row_bytes + 1));
    for row in data.chunks_exact(row_bytes.max(1)).take(rows) {
        raw.push(0);
        raw.extend_from_slice(row);
    }
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder
        .write_all(&raw)
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))?;
    encoder
        .finish()
        .map_err(|e| RenderError::Encode(format!("IDAT compression failed: {}", e)))
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

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn chunk_types(png: &[u8]) -> Vec<String> {
        let mut types = Vec::new();
        let mut pos = 8;
        while pos + 8 <= png.len() {
            let len =
                u32::from_be_bytes([png[pos], png[pos + 1], png[pos + 2], png[pos + 3]]) as usize;
            types.push(String::from_utf8_lossy(&png[pos + 4..pos + 8]).to_string());
            pos += 12 + len;
        }
        types
    }

    #[test]
    fn test_few_colors_use_palette() {
        let img = RgbaImage::from_fn(16, 16, |x, _| {
            if x < 8 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            }
        });
        let png = encode_image(&img, 100).unwrap();
        assert_eq!(&png[..8], &SIGNATURE);
        assert_eq!(png[25], 3, "color type should be indexed");
        assert_eq!(chunk_types(&png), vec!["IHDR", "pHYs", "PLTE", "IDAT", "IEND"]);
    }

    #[test]
    fn test_many_colors_fall_back_to_rgba() {
        let img = RgbaImage::from_fn(128, 128, |x, y| Rgba([x as u8, y as u8, (x ^ y) as u8, 255]));
        let png = encode_image(&img, 100).unwrap();
        assert_eq!(png[25], 6, "color type should be RGBA");
    }

    #[test]
    fn test_transparency_emits_trns() {
        let img = RgbaImage::from_fn(4, 1, |x, _| Rgba([0, 0, 0, if x == 0 { 0 } else { 255 }]));
        let png = encode_image(&img, 72).unwrap();
        assert!(chunk_types(&png).contains(&"tRNS".to_string()));
    }

    #[test]
    fn test_phys_records_dpi() {
        let payload = physical_dimensions(254);
        assert_eq!(u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]), 10000);
        assert_eq!(payload[8], 1);
    }

    #[test]
    fn test_parallel_and_sequential_agree() {
        let img =
            RgbaImage::from_fn(100, 100, |x, y| Rgba([(x / 10) as u8, (y / 10) as u8, 0, 255]));
        let seq = unique_colors_sequential(img.as_raw()).unwrap();
        let par = unique_colors_parallel(img.as_raw()).unwrap();
        assert_eq!(seq.len(), 100);
        assert_eq!(par.len(), 100);
    }

    #[test]
    fn test_unique_colors_keep_first_seen_order() {
        let pixels = [9, 9, 9, 255, 1, 2, 3, 255, 9, 9, 9, 255, 1, 2, 3, 255];
        let unique = unique_colors_sequential(&pixels).unwrap();
        assert_eq!(unique, vec![pack(&[9, 9, 9, 255]), pack(&[1, 2, 3, 255])]);

        let over: Vec<u8> = (0..=MAX_PALETTE_SIZE as u32)
            .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 0, 255])
            .collect();
        assert!(unique_colors_sequential(&over).is_none());
    }

    #[test]
    fn test_decodes_with_image_crate() {
        let img = RgbaImage::from_fn(7, 5, |x, y| Rgba([x as u8 * 30, y as u8 * 40, 7, 255]));
        let png = encode_image(&img, 150).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded, img);
    }
}
