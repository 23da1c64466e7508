use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub mod bitmap;
#[cfg(feature = "pdfium")]
pub mod pdfium_backend;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use bitmap::RgbBitmap;

/// US Letter, used when a page carries no usable MediaBox.
pub const DEFAULT_PAGE_SIZE: PageSize = PageSize { width_pt: 612.0, height_pt: 792.0 };

const PAPER: [u8; 3] = [255, 255, 255];
const PAPER_EDGE: [u8; 3] = [220, 220, 220];

/// The `%PDF-` marker may be preceded by junk, but only within this window.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Upper bound on `/Parent` hops when resolving inherited page attributes.
const MAX_INHERITANCE_DEPTH: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentHandle(u64);

impl DocumentHandle {
    pub fn raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_pt: f32,
    pub height_pt: f32,
}

impl PageSize {
    /// Raster dimensions at `scale` pixels per point, never smaller than 1x1.
    pub fn raster_dimensions(self, scale: f32) -> (u32, u32) {
        let scale = effective_scale(scale);
        let width = (self.width_pt * scale).round().max(1.0) as u32;
        let height = (self.height_pt * scale).round().max(1.0) as u32;
        (width, height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderRequest {
    pub page_index: u32,
    /// Pixels per PDF point. `1.0` is the page-native 72 DPI raster.
    pub scale: f32,
}

impl RenderRequest {
    pub fn page_native(page_index: u32) -> Self {
        Self { page_index, scale: 1.0 }
    }
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self::page_native(0)
    }
}

#[derive(Debug, Clone)]
pub enum OpenSource {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl From<PathBuf> for OpenSource {
    fn from(value: PathBuf) -> Self {
        Self::Path(value)
    }
}

impl From<&Path> for OpenSource {
    fn from(value: &Path) -> Self {
        Self::Path(value.to_path_buf())
    }
}

impl From<Vec<u8>> for OpenSource {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PdfEngineError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("not a PDF file: {0}")]
    NotAPdf(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF parse error: {0}")]
    Parse(String),
    #[error("invalid handle {0}")]
    InvalidHandle(u64),
    #[error("page {page} out of range (page_count={page_count})")]
    PageOutOfRange { page: u32, page_count: u32 },
    #[error("encrypted PDFs are not supported")]
    EncryptedUnsupported,
    #[error("backend error: {0}")]
    Backend(String),
    #[error("invalid bitmap: {0}")]
    InvalidBitmap(String),
}

impl From<lopdf::Error> for PdfEngineError {
    fn from(value: lopdf::Error) -> Self {
        Self::Parse(value.to_string())
    }
}

pub trait PdfEngine {
    fn open(&mut self, source: OpenSource) -> Result<DocumentHandle, PdfEngineError>;
    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError>;
    fn page_size(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<PageSize, PdfEngineError>;
    fn render_page(
        &self,
        handle: DocumentHandle,
        request: RenderRequest,
    ) -> Result<RgbBitmap, PdfEngineError>;
    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError>;
}

impl<E: PdfEngine + ?Sized> PdfEngine for Box<E> {
    fn open(&mut self, source: OpenSource) -> Result<DocumentHandle, PdfEngineError> {
        (**self).open(source)
    }

    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError> {
        (**self).page_count(handle)
    }

    fn page_size(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<PageSize, PdfEngineError> {
        (**self).page_size(handle, page_index)
    }

    fn render_page(
        &self,
        handle: DocumentHandle,
        request: RenderRequest,
    ) -> Result<RgbBitmap, PdfEngineError> {
        (**self).render_page(handle, request)
    }

    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError> {
        (**self).close(handle)
    }
}

/// Check a path the way a file picker filtered to `*.pdf` would, before
/// any bytes are read.
pub fn validate_pdf_path(path: &Path) -> Result<(), PdfEngineError> {
    if !path.exists() {
        return Err(PdfEngineError::FileNotFound(path.to_path_buf()));
    }

    let has_pdf_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"));
    if !has_pdf_extension {
        return Err(PdfEngineError::NotAPdf(format!(
            "{} does not have a .pdf extension",
            path.display()
        )));
    }

    if !path.is_file() {
        return Err(PdfEngineError::NotAPdf(format!("{} is not a regular file", path.display())));
    }

    Ok(())
}

pub fn check_pdf_header(bytes: &[u8]) -> Result<(), PdfEngineError> {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW)];
    if window.windows(b"%PDF-".len()).any(|candidate| candidate == b"%PDF-") {
        Ok(())
    } else {
        Err(PdfEngineError::NotAPdf("missing %PDF- header".to_owned()))
    }
}

/// Read a source into memory, validating path and header.
pub fn read_source(source: OpenSource) -> Result<Vec<u8>, PdfEngineError> {
    let bytes = match source {
        OpenSource::Path(path) => {
            validate_pdf_path(&path)?;
            fs::read(&path)?
        }
        OpenSource::Bytes(bytes) => bytes,
    };

    check_pdf_header(&bytes)?;
    Ok(bytes)
}

fn effective_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

#[derive(Debug, Clone)]
struct DocumentRecord {
    page_sizes: Vec<PageSize>,
}

/// Default backend. Parses page geometry with `lopdf` once at open time and
/// rasterizes the page paper (fill plus edge) at the requested scale.
#[derive(Debug, Default)]
pub struct LopdfEngine {
    next_handle: u64,
    docs: HashMap<DocumentHandle, DocumentRecord>,
}

impl LopdfEngine {
    pub fn new() -> Self {
        Self::default()
    }

    fn parse_sizes(bytes: &[u8]) -> Result<Vec<PageSize>, PdfEngineError> {
        let doc = Document::load_mem(bytes).map_err(|err| {
            let message = err.to_string().to_ascii_lowercase();
            if message.contains("decrypt") || message.contains("password") {
                PdfEngineError::EncryptedUnsupported
            } else {
                PdfEngineError::from(err)
            }
        })?;

        if doc.is_encrypted() {
            return Err(PdfEngineError::EncryptedUnsupported);
        }
        let pages = doc.get_pages();
        let mut sizes = Vec::with_capacity(pages.len());

        for (_, object_id) in pages {
            let dict = doc.get_dictionary(object_id)?;

            let size = inherited_attribute(&doc, dict, b"MediaBox")
                .and_then(media_box_size)
                .unwrap_or(DEFAULT_PAGE_SIZE);

            let rotation = inherited_attribute(&doc, dict, b"Rotate")
                .and_then(|obj| obj.as_i64().ok())
                .unwrap_or(0);

            sizes.push(if rotation.rem_euclid(180) == 90 {
                PageSize { width_pt: size.height_pt, height_pt: size.width_pt }
            } else {
                size
            });
        }

        if sizes.is_empty() {
            return Err(PdfEngineError::Parse("document has no pages".to_owned()));
        }

        Ok(sizes)
    }

    fn record(&self, handle: DocumentHandle) -> Result<&DocumentRecord, PdfEngineError> {
        self.docs.get(&handle).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
    }
}

fn inherited_attribute<'a>(
    doc: &'a Document,
    page: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    let mut dict = page;

    for _ in 0..MAX_INHERITANCE_DEPTH {
        if let Ok(value) = dict.get(key) {
            return match value {
                Object::Reference(id) => doc.get_object(*id).ok(),
                other => Some(other),
            };
        }

        let parent: ObjectId = dict.get(b"Parent").ok()?.as_reference().ok()?;
        dict = doc.get_dictionary(parent).ok()?;
    }

    None
}

fn media_box_size(obj: &Object) -> Option<PageSize> {
    let array = obj.as_array().ok()?;
    if array.len() != 4 {
        return None;
    }

    let x0 = number(&array[0])?;
    let y0 = number(&array[1])?;
    let x1 = number(&array[2])?;
    let y1 = number(&array[3])?;

    let size = PageSize { width_pt: (x1 - x0).abs(), height_pt: (y1 - y0).abs() };
    (size.width_pt > 0.0 && size.height_pt > 0.0).then_some(size)
}

fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(value) => Some(*value as f32),
        Object::Real(value) => Some(*value),
        _ => None,
    }
}

impl PdfEngine for LopdfEngine {
    fn open(&mut self, source: OpenSource) -> Result<DocumentHandle, PdfEngineError> {
        let bytes = read_source(source)?;
        let page_sizes = Self::parse_sizes(&bytes)?;

        self.next_handle += 1;
        let handle = DocumentHandle(self.next_handle);
        self.docs.insert(handle, DocumentRecord { page_sizes });

        Ok(handle)
    }

    fn page_count(&self, handle: DocumentHandle) -> Result<u32, PdfEngineError> {
        Ok(self.record(handle)?.page_sizes.len() as u32)
    }

    fn page_size(
        &self,
        handle: DocumentHandle,
        page_index: u32,
    ) -> Result<PageSize, PdfEngineError> {
        let record = self.record(handle)?;
        record.page_sizes.get(page_index as usize).copied().ok_or(PdfEngineError::PageOutOfRange {
            page: page_index,
            page_count: record.page_sizes.len() as u32,
        })
    }

    fn render_page(
        &self,
        handle: DocumentHandle,
        request: RenderRequest,
    ) -> Result<RgbBitmap, PdfEngineError> {
        let page_size = self.page_size(handle, request.page_index)?;
        let (width, height) = page_size.raster_dimensions(request.scale);

        let mut bitmap = RgbBitmap::filled(width, height, PAPER)?;

        if width >= 4 && height >= 4 {
            for x in 0..width {
                bitmap.put_pixel(x, 0, PAPER_EDGE);
                bitmap.put_pixel(x, height - 1, PAPER_EDGE);
            }
            for y in 0..height {
                bitmap.put_pixel(0, y, PAPER_EDGE);
                bitmap.put_pixel(width - 1, y, PAPER_EDGE);
            }
        }

        Ok(bitmap)
    }

    fn close(&mut self, handle: DocumentHandle) -> Result<(), PdfEngineError> {
        self.docs.remove(&handle).map(|_| ()).ok_or(PdfEngineError::InvalidHandle(handle.raw()))
    }
}

pub fn default_engine() -> LopdfEngine {
    LopdfEngine::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        letter_pages, pdf_with_content, pdf_with_pages, rotated_page_pdf, write_fixture,
    };
    use lopdf::{dictionary, Stream, StringFormat};

    const PASSWORD_PADDING: [u8; 32] = [
        0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01,
        0x08, 0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53,
        0x69, 0x7A,
    ];

    fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
        let mut state: Vec<u8> = (0..=255).collect();
        let mut j = 0usize;
        for i in 0..256 {
            j = (j + state[i] as usize + key[i % key.len()] as usize) & 0xFF;
            state.swap(i, j);
        }

        let (mut i, mut j) = (0usize, 0usize);
        data.iter()
            .map(|byte| {
                i = (i + 1) & 0xFF;
                j = (j + state[i] as usize) & 0xFF;
                state.swap(i, j);
                byte ^ state[(state[i] as usize + state[j] as usize) & 0xFF]
            })
            .collect()
    }

    /// One page encrypted with the standard 40-bit RC4 handler (V1 R2) under
    /// a non-empty user password.
    fn encrypted_pdf(password: &[u8]) -> Vec<u8> {
        let file_id = b"0123456789abcdef";
        let permissions: i32 = -4;

        let mut padded = password[..password.len().min(32)].to_vec();
        padded.extend_from_slice(&PASSWORD_PADDING[..32 - padded.len()]);

        let owner_digest = md5::compute(&padded);
        let owner_entry = rc4(&owner_digest[..5], &padded);

        let mut key_input = padded.clone();
        key_input.extend_from_slice(&owner_entry);
        key_input.extend_from_slice(&(permissions as u32).to_le_bytes());
        key_input.extend_from_slice(file_id);
        let file_digest = md5::compute(&key_input);
        let file_key = file_digest[..5].to_vec();
        let user_entry = rc4(&file_key, &PASSWORD_PADDING);

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id =
            doc.add_object(Stream::new(dictionary! {}, b"0 0 0 rg 10 10 50 50 re f".to_vec()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 200.into(), 200.into()],
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1_i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
        doc.trailer.set("Root", catalog_id);

        for (&(number, generation), object) in doc.objects.iter_mut() {
            if let Object::Stream(stream) = object {
                let mut object_key = file_key.clone();
                object_key.extend_from_slice(&number.to_le_bytes()[..3]);
                object_key.extend_from_slice(&generation.to_le_bytes()[..2]);
                let digest = md5::compute(&object_key);

                let encrypted = rc4(&digest[..10], &stream.content);
                stream.set_content(encrypted);
            }
        }

        let encrypt_id = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 1_i64,
            "R" => 2_i64,
            "Length" => 40_i64,
            "O" => Object::String(owner_entry, StringFormat::Literal),
            "U" => Object::String(user_entry, StringFormat::Literal),
            "P" => permissions as i64,
        });
        doc.trailer.set("Encrypt", encrypt_id);
        doc.trailer.set(
            "ID",
            Object::Array(vec![Object::String(file_id.to_vec(), StringFormat::Literal); 2]),
        );

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("encrypted fixture should serialize");
        bytes
    }

    #[test]
    fn opens_pdf_and_reads_page_count() {
        let mut engine = LopdfEngine::new();
        let handle = engine
            .open(OpenSource::Bytes(pdf_with_pages(&letter_pages(3))))
            .expect("open should succeed");

        assert_eq!(engine.page_count(handle).expect("count should succeed"), 3);
    }

    #[test]
    fn render_uses_page_native_dimensions() {
        let mut engine = LopdfEngine::new();
        let bytes = pdf_with_pages(&[(200.0, 100.0), (300.5, 150.0)]);
        let handle = engine.open(OpenSource::Bytes(bytes)).expect("open should succeed");

        let first = engine.render_page(handle, RenderRequest::page_native(0)).expect("render");
        assert_eq!((first.width(), first.height()), (200, 100));

        let second = engine.render_page(handle, RenderRequest::page_native(1)).expect("render");
        assert_eq!((second.width(), second.height()), (301, 150));
        assert!(second.stride() >= second.width() as usize * 3);
    }

    #[test]
    fn render_is_deterministic() {
        let mut engine = LopdfEngine::new();
        let handle = engine
            .open(OpenSource::Bytes(pdf_with_pages(&letter_pages(2))))
            .expect("open should succeed");

        let a = engine.render_page(handle, RenderRequest::page_native(1)).expect("render");
        let b = engine.render_page(handle, RenderRequest::page_native(1)).expect("render");

        assert_eq!(a, b);
    }

    #[test]
    fn scale_multiplies_raster_size_and_non_positive_scale_falls_back() {
        let mut engine = LopdfEngine::new();
        let handle = engine
            .open(OpenSource::Bytes(pdf_with_pages(&[(100.0, 50.0)])))
            .expect("open should succeed");

        let doubled = engine
            .render_page(handle, RenderRequest { page_index: 0, scale: 2.0 })
            .expect("render");
        assert_eq!((doubled.width(), doubled.height()), (200, 100));

        let fallback = engine
            .render_page(handle, RenderRequest { page_index: 0, scale: -3.0 })
            .expect("render");
        assert_eq!((fallback.width(), fallback.height()), (100, 50));
    }

    #[test]
    fn rotated_pages_swap_raster_axes() {
        let mut engine = LopdfEngine::new();
        let handle = engine
            .open(OpenSource::Bytes(rotated_page_pdf(200.0, 100.0, 90)))
            .expect("open should succeed");

        let size = engine.page_size(handle, 0).expect("size");
        assert_eq!(size, PageSize { width_pt: 100.0, height_pt: 200.0 });
    }

    #[test]
    fn page_out_of_range_is_reported() {
        let mut engine = LopdfEngine::new();
        let handle = engine
            .open(OpenSource::Bytes(pdf_with_pages(&letter_pages(1))))
            .expect("open should succeed");

        let err = engine
            .render_page(handle, RenderRequest::page_native(1))
            .expect_err("page 1 does not exist");
        assert!(matches!(err, PdfEngineError::PageOutOfRange { page: 1, page_count: 1 }));
    }

    #[test]
    fn missing_path_is_file_not_found() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let mut engine = LopdfEngine::new();

        let err = engine
            .open(OpenSource::from(dir.path().join("missing.pdf")))
            .expect_err("missing file should fail");
        assert!(matches!(err, PdfEngineError::FileNotFound(_)));
    }

    #[test]
    fn wrong_extension_is_not_a_pdf() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = write_fixture(dir.path(), "document.txt", &pdf_with_pages(&letter_pages(1)));
        let mut engine = LopdfEngine::new();

        let err = engine.open(OpenSource::from(path)).expect_err("txt should be rejected");
        assert!(matches!(err, PdfEngineError::NotAPdf(_)));
    }

    #[test]
    fn missing_header_is_not_a_pdf() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = write_fixture(dir.path(), "fake.pdf", b"just some text");
        let mut engine = LopdfEngine::new();

        let err = engine.open(OpenSource::from(path)).expect_err("fake pdf should be rejected");
        assert!(matches!(err, PdfEngineError::NotAPdf(_)));
    }

    #[test]
    fn garbage_after_header_is_parse_error() {
        let bytes = b"%PDF-1.5\nthis is not an object graph\n".to_vec();
        let mut engine = LopdfEngine::new();

        let err = engine.open(OpenSource::Bytes(bytes)).expect_err("broken pdf should fail");
        assert!(matches!(err, PdfEngineError::Parse(_)));
    }

    #[test]
    fn directory_named_like_a_pdf_is_not_a_pdf() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = dir.path().join("x.pdf");
        fs::create_dir(&path).expect("directory should be created");
        let mut engine = LopdfEngine::new();

        let err = engine.open(OpenSource::from(path)).expect_err("directory should be rejected");
        assert!(matches!(err, PdfEngineError::NotAPdf(_)));
    }

    #[test]
    fn encrypted_document_is_unsupported() {
        let mut engine = LopdfEngine::new();

        let err = engine
            .open(OpenSource::Bytes(encrypted_pdf(b"secret123")))
            .expect_err("encrypted pdf should be rejected");
        assert!(matches!(err, PdfEngineError::EncryptedUnsupported));
    }

    #[test]
    fn encrypt_keyword_in_page_content_is_not_encryption() {
        let content = b"BT /F1 12 Tf 10 50 Td (see /Encrypt docs) Tj ET";
        let bytes = pdf_with_content(100.0, 100.0, content);
        let mut engine = LopdfEngine::new();

        let handle = engine.open(OpenSource::Bytes(bytes)).expect("plain pdf should open");
        assert_eq!(engine.page_count(handle).expect("count"), 1);
    }

    #[test]
    fn oversized_page_fails_to_render_instead_of_allocating() {
        let mut engine = LopdfEngine::new();
        let handle = engine
            .open(OpenSource::Bytes(pdf_with_pages(&[(1.0e7, 1.0e7)])))
            .expect("open should succeed");

        let err = engine
            .render_page(handle, RenderRequest::page_native(0))
            .expect_err("raster is too large");
        assert!(matches!(err, PdfEngineError::InvalidBitmap(_)));
    }

    #[test]
    fn uppercase_extension_is_accepted() {
        let dir = tempfile::tempdir().expect("temp dir should be created");
        let path = write_fixture(dir.path(), "REPORT.PDF", &pdf_with_pages(&letter_pages(2)));
        let mut engine = LopdfEngine::new();

        let handle = engine.open(OpenSource::from(path)).expect("open should succeed");
        assert_eq!(engine.page_count(handle).expect("count"), 2);
    }

    #[test]
    fn invalid_handle_returns_error() {
        let engine = LopdfEngine::new();
        let err =
            engine.page_count(DocumentHandle(999)).expect_err("should fail for unknown handle");

        assert!(matches!(err, PdfEngineError::InvalidHandle(999)));
    }

    #[test]
    fn closed_handle_is_invalid() {
        let mut engine = LopdfEngine::new();
        let handle = engine
            .open(OpenSource::Bytes(pdf_with_pages(&letter_pages(1))))
            .expect("open should succeed");

        engine.close(handle).expect("close should succeed");
        assert!(matches!(engine.page_count(handle), Err(PdfEngineError::InvalidHandle(_))));
        assert!(engine.close(handle).is_err());
    }

    #[test]
    fn boxed_engine_delegates() {
        let mut engine: Box<dyn PdfEngine> = Box::new(LopdfEngine::new());
        let handle = engine
            .open(OpenSource::Bytes(pdf_with_pages(&letter_pages(4))))
            .expect("open should succeed");

        assert_eq!(engine.page_count(handle).expect("count"), 4);
    }
}
