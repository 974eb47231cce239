//! Image file decoding and PNG encoding via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{GrayImage, RgbaImage};
use crate::util::{StereoError, StereoResult};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use std::fs;
use std::path::{Path, PathBuf};

/// Converts a decoded image to an owned RGBA buffer.
pub fn rgba_from_dynamic_image(img: &image::DynamicImage) -> StereoResult<RgbaImage> {
    let rgba = img.to_rgba8();
    let width = rgba.width() as usize;
    let height = rgba.height() as usize;
    RgbaImage::new(rgba.into_raw(), width, height)
}

/// Loads an image from disk as 8-bit RGBA.
pub fn load_rgba_image<P: AsRef<Path>>(path: P) -> StereoResult<RgbaImage> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|err| StereoError::Decode {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    rgba_from_dynamic_image(&img)
}

/// Loads a stereo pair, failing if the two views differ in size.
pub fn load_stereo_pair<P: AsRef<Path>, Q: AsRef<Path>>(
    left: P,
    right: Q,
) -> StereoResult<(RgbaImage, RgbaImage)> {
    let left = load_rgba_image(left)?;
    let right = load_rgba_image(right)?;
    if left.dims() != right.dims() {
        return Err(StereoError::mismatch(left.dims(), right.dims()));
    }
    Ok((left, right))
}

fn encode_error(path: &Path, reason: impl ToString) -> StereoError {
    StereoError::Encode {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

fn encode_png(
    data: &[u8],
    width: usize,
    height: usize,
    color: ExtendedColorType,
    path: &Path,
) -> StereoResult<Vec<u8>> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(data, width as u32, height as u32, color)
        .map_err(|err| encode_error(path, err))?;
    Ok(bytes)
}

/// Encodes a single-channel image as PNG in memory. `path` is the intended
/// destination and only appears in errors.
pub fn encode_png_gray(gray: &GrayImage, path: &Path) -> StereoResult<Vec<u8>> {
    encode_png(gray.data(), gray.width(), gray.height(), ExtendedColorType::L8, path)
}

/// Encodes an RGBA image as PNG in memory. `path` is the intended destination
/// and only appears in errors.
pub fn encode_png_rgba(rgba: &RgbaImage, path: &Path) -> StereoResult<Vec<u8>> {
    encode_png(rgba.data(), rgba.width(), rgba.height(), ExtendedColorType::Rgba8, path)
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".partial");
    PathBuf::from(name)
}

/// Writes every `(path, bytes)` pair or none of them.
///
/// Files are first written under a `.partial` suffix and renamed once all
/// writes succeeded; on failure the staged files are removed.
pub fn write_files<P: AsRef<Path>>(files: &[(P, Vec<u8>)]) -> StereoResult<()> {
    let mut staged: Vec<PathBuf> = Vec::with_capacity(files.len());
    let result = files.iter().try_for_each(|(path, bytes)| -> StereoResult<()> {
        let path = path.as_ref();
        let tmp = staging_path(path);
        fs::write(&tmp, bytes).map_err(|err| encode_error(path, err))?;
        staged.push(tmp);
        Ok(())
    });
    let result = result.and_then(|()| {
        files
            .iter()
            .zip(&staged)
            .try_for_each(|((path, _), tmp)| {
                fs::rename(tmp, path.as_ref()).map_err(|err| encode_error(path.as_ref(), err))
            })
    });
    if result.is_err() {
        for tmp in &staged {
            let _ = fs::remove_file(tmp);
        }
    }
    result
}
