//! Page rasterization into immutable base bitmaps

use crate::session::OpenDocument;
use pdf_engine::{PdfEngine, PdfEngineError, RenderRequest, RgbBitmap};
use std::sync::Arc;
use std::time::Instant;

/// Raster of one page, shared read-only between the pipeline stages
///
/// There is no way to obtain a mutable reference to the pixels; every
/// overlay is drawn onto a copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseBitmap {
    page_index: u32,
    bitmap: Arc<RgbBitmap>,
}

impl BaseBitmap {
    pub fn new(page_index: u32, bitmap: RgbBitmap) -> Self {
        Self { page_index, bitmap: Arc::new(bitmap) }
    }

    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn bitmap(&self) -> &RgbBitmap {
        &self.bitmap
    }

    pub fn width(&self) -> u32 {
        self.bitmap.width()
    }

    pub fn height(&self) -> u32 {
        self.bitmap.height()
    }
}

/// Renders pages of an open document at a fixed resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageRenderer {
    scale: f32,
}

impl Default for PageRenderer {
    fn default() -> Self {
        Self::page_native()
    }
}

impl PageRenderer {
    /// One pixel per PDF point, the rasterizer's default resolution
    pub fn page_native() -> Self {
        Self { scale: 1.0 }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Rasterize `page_index` of `document` using the engine that opened it.
    ///
    /// The caller is responsible for keeping `page_index` in range; an
    /// out-of-range index is reported as `PageOutOfRange` without touching
    /// the engine.
    pub fn render<E: PdfEngine + ?Sized>(
        &self,
        engine: &E,
        document: &OpenDocument,
        page_index: u32,
    ) -> Result<BaseBitmap, PdfEngineError> {
        if page_index >= document.page_count() {
            return Err(PdfEngineError::PageOutOfRange {
                page: page_index,
                page_count: document.page_count(),
            });
        }

        let started = Instant::now();
        let request = RenderRequest { page_index, scale: self.scale };
        let bitmap = engine.render_page(document.handle(), request)?;

        log::debug!(
            "rendered page {} of {} ({}x{}) in {}ms",
            page_index + 1,
            document.page_count(),
            bitmap.width(),
            bitmap.height(),
            started.elapsed().as_millis()
        );

        Ok(BaseBitmap::new(page_index, bitmap))
    }
}
