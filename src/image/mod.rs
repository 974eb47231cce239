//! Image views and owned pixel buffers.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. `OwnedImage` is the
//! contiguous buffer handed from one pipeline stage to the next; grayscale
//! images and disparity maps are both instances of it.

use crate::util::{StereoError, StereoResult};

#[cfg(feature = "image-io")]
pub mod io;
pub mod scale;

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> StereoResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> StereoResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(StereoError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns the stride in elements between row starts.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the backing slice including any row padding.
    pub fn as_slice(&self) -> &'a [T] {
        self.data
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> StereoResult<usize> {
    if width == 0 || height == 0 {
        return Err(StereoError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(StereoError::Configuration("stride must be at least the width"));
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(StereoError::InvalidDimensions { width, height })?;
    Ok(needed)
}

fn pixel_count(width: usize, height: usize) -> StereoResult<usize> {
    if width == 0 || height == 0 {
        return Err(StereoError::InvalidDimensions { width, height });
    }
    width
        .checked_mul(height)
        .ok_or(StereoError::InvalidDimensions { width, height })
}

/// Owned contiguous single-channel buffer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedImage<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

/// 8-bit grayscale image.
pub type GrayImage = OwnedImage<u8>;

/// Integer disparity map, one entry per pixel.
///
/// A value of 0 is both a genuine zero disparity and, after cross-checking,
/// the marker for a rejected (hole) pixel.
pub type DisparityMap = OwnedImage<u32>;

impl<T> OwnedImage<T> {
    /// Wraps `data` as a `width x height` image; the length must match exactly.
    pub fn new(data: Vec<T>, width: usize, height: usize) -> StereoResult<Self> {
        let expected = pixel_count(width, height)?;
        if data.len() != expected {
            return Err(StereoError::BufferSizeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns the pixel buffer in row-major order.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Consumes the image and returns its buffer.
    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    /// Returns a borrowed view of the image.
    pub fn view(&self) -> ImageView<'_, T> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }
}

impl<T: Copy> OwnedImage<T> {
    /// Copies a (possibly strided) view into a contiguous owned image.
    pub fn from_view(view: ImageView<'_, T>) -> StereoResult<Self> {
        let (width, height) = view.dims();
        let mut data = Vec::with_capacity(pixel_count(width, height)?);
        for y in 0..height {
            let row = view.row(y).ok_or(StereoError::BufferTooSmall {
                needed: y * view.stride() + width,
                got: view.as_slice().len(),
            })?;
            data.extend_from_slice(row);
        }
        Self::new(data, width, height)
    }

    /// Returns the value at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x).copied()
    }
}

impl DisparityMap {
    /// Number of zero-valued (hole) pixels.
    pub fn hole_count(&self) -> usize {
        self.data.iter().filter(|&&d| d == 0).count()
    }
}

/// Owned 8-bit RGBA image, four interleaved channels per pixel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaImage {
    data: Vec<u8>,
    width: usize,
    height: usize,
}

impl RgbaImage {
    /// Wraps an interleaved RGBA buffer of `width * height * 4` bytes.
    pub fn new(data: Vec<u8>, width: usize, height: usize) -> StereoResult<Self> {
        let expected = pixel_count(width, height)?
            .checked_mul(4)
            .ok_or(StereoError::InvalidDimensions { width, height })?;
        if data.len() != expected {
            return Err(StereoError::BufferSizeMismatch {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Builds an opaque RGBA image with R = G = B = `gray`.
    pub fn from_gray(gray: &GrayImage) -> Self {
        let mut data = Vec::with_capacity(gray.data().len() * 4);
        for &v in gray.data() {
            data.extend_from_slice(&[v, v, v, 255]);
        }
        Self {
            data,
            width: gray.width(),
            height: gray.height(),
        }
    }

    /// Returns the image width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the image height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Returns the interleaved byte buffer.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the image and returns its buffer.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Returns the `[r, g, b, a]` pixel at `(x, y)` if it is within bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y * self.width + x) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}
