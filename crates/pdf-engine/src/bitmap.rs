use image::{DynamicImage, RgbImage, RgbaImage};

use crate::PdfEngineError;

/// Rows are padded so every row starts on this byte boundary.
pub const ROW_ALIGNMENT: usize = 4;

pub const BYTES_PER_PIXEL: usize = 3;

/// Largest pixel buffer a single raster may occupy. A 14400 pt page (the PDF
/// size limit) at one pixel per point stays below it.
pub const MAX_BITMAP_BYTES: usize = 1 << 30;

/// Row-major 8-bit RGB raster with an explicit row stride.
///
/// Consumers must step rows by [`RgbBitmap::stride`]; the padding bytes at
/// the end of each row carry no pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbBitmap {
    width: u32,
    height: u32,
    stride: usize,
    data: Vec<u8>,
}

impl RgbBitmap {
    /// Allocate a bitmap filled with a single color, using the aligned stride.
    ///
    /// Fails instead of allocating when the buffer would exceed
    /// [`MAX_BITMAP_BYTES`] or the allocator refuses it.
    pub fn filled(width: u32, height: u32, color: [u8; 3]) -> Result<Self, PdfEngineError> {
        let stride = aligned_stride(width);
        let len = check_dimensions(width, height)?;

        let mut data = Vec::new();
        data.try_reserve_exact(len).map_err(|err| {
            PdfEngineError::InvalidBitmap(format!("cannot allocate {len} bytes: {err}"))
        })?;
        data.resize(len, 0);

        if stride > 0 {
            let packed = width as usize * BYTES_PER_PIXEL;
            for row in data.chunks_exact_mut(stride) {
                for pixel in row[..packed].chunks_exact_mut(BYTES_PER_PIXEL) {
                    pixel.copy_from_slice(&color);
                }
            }
        }

        Ok(Self { width, height, stride, data })
    }

    /// Repack an `image` buffer into the aligned-stride layout.
    pub fn from_rgb_image(image: &RgbImage) -> Result<Self, PdfEngineError> {
        let (width, height) = image.dimensions();
        let mut bitmap = Self::filled(width, height, [0, 0, 0])?;

        let packed = width as usize * BYTES_PER_PIXEL;
        if packed > 0 {
            for (y, src) in image.as_raw().chunks_exact(packed).enumerate() {
                bitmap.row_mut(y as u32).copy_from_slice(src);
            }
        }

        Ok(bitmap)
    }

    /// Drop the alpha channel of a packed RGBA buffer.
    pub fn from_rgba(width: u32, height: u32, rgba: &[u8]) -> Result<Self, PdfEngineError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(PdfEngineError::InvalidBitmap(format!(
                "expected {expected} RGBA bytes for {width}x{height}, got {}",
                rgba.len()
            )));
        }

        let image = RgbaImage::from_raw(width, height, rgba.to_vec()).ok_or_else(|| {
            PdfEngineError::InvalidBitmap(format!("RGBA buffer does not fit {width}x{height}"))
        })?;

        Self::from_rgb_image(&DynamicImage::ImageRgba8(image).to_rgb8())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes between the starts of consecutive rows.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Pixel bytes of row `y`, without the stride padding.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.data[start..start + self.width as usize * BYTES_PER_PIXEL]
    }

    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        let end = start + self.width as usize * BYTES_PER_PIXEL;
        &mut self.data[start..end]
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }

        let offset = y as usize * self.stride + x as usize * BYTES_PER_PIXEL;
        Some([self.data[offset], self.data[offset + 1], self.data[offset + 2]])
    }

    pub fn put_pixel(&mut self, x: u32, y: u32, color: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }

        let offset = y as usize * self.stride + x as usize * BYTES_PER_PIXEL;
        self.data[offset..offset + BYTES_PER_PIXEL].copy_from_slice(&color);
    }

    /// Copy the pixels into a tightly packed `width * 3` layout.
    pub fn to_packed_rgb(&self) -> Vec<u8> {
        let packed_len = self.width as usize * self.height as usize * BYTES_PER_PIXEL;
        let mut packed = Vec::with_capacity(packed_len);
        for y in 0..self.height {
            packed.extend_from_slice(self.row(y));
        }
        packed
    }
}

pub fn aligned_stride(width: u32) -> usize {
    let packed = width as usize * BYTES_PER_PIXEL;
    packed.div_ceil(ROW_ALIGNMENT) * ROW_ALIGNMENT
}

/// Buffer length for a `width` x `height` raster, or an error when it would
/// exceed [`MAX_BITMAP_BYTES`].
pub fn check_dimensions(width: u32, height: u32) -> Result<usize, PdfEngineError> {
    aligned_stride(width)
        .checked_mul(height as usize)
        .filter(|&len| len <= MAX_BITMAP_BYTES)
        .ok_or_else(|| {
            PdfEngineError::InvalidBitmap(format!(
                "{width}x{height} raster exceeds the {MAX_BITMAP_BYTES} byte limit"
            ))
        })
}
