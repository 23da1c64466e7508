//! Document session: the open file, its engine handle and the current page
//!
//! The session owns the engine handle for as long as the file is on screen.
//! Navigation reuses that handle; it is closed only when another file
//! replaces it or the session is dropped.

use crate::error::{ViewerError, ViewerResult};
use crate::renderer::{BaseBitmap, PageRenderer};
use pdf_engine::{DocumentHandle, OpenSource, PdfEngine};
use std::path::{Path, PathBuf};

/// A successfully opened file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenDocument {
    handle: DocumentHandle,
    path: PathBuf,
    page_count: u32,
}

impl OpenDocument {
    pub fn new(handle: DocumentHandle, path: PathBuf, page_count: u32) -> Self {
        Self { handle, path, page_count }
    }

    pub fn handle(&self) -> DocumentHandle {
        self.handle
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }
}

/// Shift `current` by `delta` if the result stays inside `[0, page_count)`;
/// otherwise return `current` unchanged.
pub fn navigate(page_count: u32, current: u32, delta: i64) -> u32 {
    let target = i64::from(current).saturating_add(delta);
    if (0..i64::from(page_count)).contains(&target) {
        target as u32
    } else {
        current
    }
}

pub struct DocumentSession<E: PdfEngine> {
    engine: E,
    document: Option<OpenDocument>,
    current_page: u32,
}

impl<E: PdfEngine> DocumentSession<E> {
    pub fn new(engine: E) -> Self {
        Self { engine, document: None, current_page: 0 }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[cfg(test)]
    pub(crate) fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn document(&self) -> Option<&OpenDocument> {
        self.document.as_ref()
    }

    /// Zero when no document is open
    pub fn page_count(&self) -> u32 {
        self.document.as_ref().map_or(0, OpenDocument::page_count)
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    /// The page `delta` steps away, or the current page if that would leave
    /// the document. Does not touch the engine.
    pub fn navigate(&self, delta: i64) -> u32 {
        navigate(self.page_count(), self.current_page, delta)
    }

    /// Open `path` and render its first page.
    ///
    /// The previous document stays open and current unless both steps
    /// succeed; only then is its handle closed and replaced.
    pub fn open(&mut self, path: &Path, renderer: &PageRenderer) -> ViewerResult<BaseBitmap> {
        let open_error = |source| ViewerError::Open { path: path.to_path_buf(), source };

        let handle = self.engine.open(OpenSource::from(path)).map_err(open_error)?;

        let page_count = match self.engine.page_count(handle) {
            Ok(count) => count,
            Err(source) => {
                self.discard(handle);
                return Err(open_error(source));
            }
        };

        let candidate = OpenDocument::new(handle, path.to_path_buf(), page_count);
        let base = match renderer.render(&self.engine, &candidate, 0) {
            Ok(base) => base,
            Err(source) => {
                self.discard(handle);
                return Err(ViewerError::Render { page: 0, source });
            }
        };

        if let Some(previous) = self.document.replace(candidate) {
            self.discard(previous.handle());
        }
        self.current_page = 0;

        log::info!("opened {} ({} pages)", path.display(), page_count);
        Ok(base)
    }

    /// Render `page_index` with the held handle and make it current.
    ///
    /// The current page changes only if rendering succeeds.
    pub fn show_page(
        &mut self,
        page_index: u32,
        renderer: &PageRenderer,
    ) -> ViewerResult<BaseBitmap> {
        let document = self.document.as_ref().ok_or(ViewerError::NoDocument)?;

        let base = renderer
            .render(&self.engine, document, page_index)
            .map_err(|source| ViewerError::Render { page: page_index, source })?;

        self.current_page = page_index;
        Ok(base)
    }

    fn discard(&mut self, handle: DocumentHandle) {
        if let Err(err) = self.engine.close(handle) {
            log::warn!("failed to close document handle {}: {}", handle.raw(), err);
        }
    }
}

impl<E: PdfEngine> Drop for DocumentSession<E> {
    fn drop(&mut self) {
        if let Some(document) = self.document.take() {
            self.discard(document.handle());
        }
    }
}
