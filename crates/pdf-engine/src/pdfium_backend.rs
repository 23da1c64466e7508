//! PDFium-backed engine that rasterizes page content.

use super::*;
use pdfium_render::prelude::*;

pub struct PdfiumEngine {
    pdfium: &'static Pdfium,
    next_handle: u64,
    docs: HashMap<DocumentHandle, pdfium_render::prelude::PdfDocument<'static>>,
}

impl PdfiumEngine {
    /// Bind PDFium, looking next to the executable first, then the working
    /// directory, then the system library path.
    pub fn from_system_library() -> Result<Self, PdfEngineError> {
        let exe_dir = std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()));

        let bindings = exe_dir
            .as_deref()
            .and_then(|dir| {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)).ok()
            })
            .map(Ok)
            .unwrap_or_else(|| {
                Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
                    .or_else(|_| Pdfium::bind_to_system_library())
            })
            .map_err(|err| {
                PdfEngineError::Backend(format!("failed to bind pdfium library: {err}"))
            })?;

        // The bindings live for the rest of the process so documents can
        // borrow them as 'static.
        let pdfium: &'static Pdfium = Box::leak(Box::new(Pdfium::new(bindings)));

        Ok(Self { pdfium, next_handle: 0, docs: HashMap::new() })
    }

    fn document(
        &self,
        handle: DocumentHandle,
    ) -> Result<&pdfium_render::prelude::PdfDocument<'static>, PdfEngineError> {
        self.docs.get(&handle).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
    }

    fn page(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<PdfPage<'_>, PdfEngineError> {
        let document = self.document(handle)?;
        let page_count = document.pages().len() as u32;

        if page_index >= page_count {
            return Err(PdfEngineError::PageOutOfRange { page: page_index, page_count });
        }

        document
            .pages()
            .get(page_index as u16)
            .map_err(|err| PdfEngineError::Backend(err.to_string()))
    }
}

impl PdfEngine for PdfiumEngine {
    fn open(&mut self, source: OpenSource) -> Result<DocumentHandle, PdfEngineError> {
        let bytes = read_source(source)?;

        let document = self
            .pdfium
            .load_pdf_from_byte_vec(bytes, None)
            .map_err(|err| match err {
                PdfiumError::PdfiumLibraryInternalError(PdfiumInternalError::PasswordError) => {
                    PdfEngineError::EncryptedUnsupported
                }
                other => PdfEngineError::Parse(other.to_string()),
            })?;

        if document.pages().len() == 0 {
            return Err(PdfEngineError::Parse("document has no pages".to_owned()));
        }

        self.next_handle += 1;
        let handle = DocumentHandle(self.next_handle);
        self.docs.insert(handle, document);

        Ok(handle)
    }

    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError> {
        Ok(self.document(handle)?.pages().len() as u32)
    }

    fn page_size(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<PageSize, PdfEngineError> {
        let page = self.page(handle, page_index)?;
        Ok(PageSize { width_pt: page.width().value, height_pt: page.height().value })
    }

    fn render_page(
        &self,
        handle: DocumentHandle,
        request: RenderRequest,
    ) -> Result<RgbBitmap, PdfEngineError> {
        let page = self.page(handle, request.page_index)?;
        let size = PageSize { width_pt: page.width().value, height_pt: page.height().value };
        let (width, height) = size.raster_dimensions(request.scale);
        bitmap::check_dimensions(width, height)?;

        let config = PdfRenderConfig::new()
            .set_target_width(width as i32)
            .set_target_height(height as i32);

        let bitmap = page
            .render_with_config(&config)
            .map_err(|err| PdfEngineError::Backend(err.to_string()))?;

        RgbBitmap::from_rgba(width, height, &bitmap.as_rgba_bytes())
    }

    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError> {
        self.docs.remove(&handle).map(|_| ()).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
    }
}
