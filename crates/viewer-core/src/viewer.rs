//! Event routing between the display surface and the document pipeline
//!
//! `Viewer` is driven by [`ViewerEvent`]s from the shell and answers through
//! a [`DisplaySink`]: every change to the page or the drag state produces a
//! freshly composited frame, every failure is reported and otherwise leaves
//! the displayed state alone.

use crate::compositor::{CompositedBitmap, Compositor};
use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::geometry::{SurfacePoint, SurfaceTransform};
use crate::overlay::{AnnotationOverlay, DragState};
use crate::renderer::{BaseBitmap, PageRenderer};
use crate::session::DocumentSession;
use pdf_engine::PdfEngine;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerEvent {
    OpenFile(PathBuf),
    PreviousPage,
    NextPage,
    PointerDown(SurfacePoint),
    PointerMove(SurfacePoint),
    PointerUp(SurfacePoint),
}

/// Whatever shows frames to the user
pub trait DisplaySink {
    fn present(&mut self, frame: &CompositedBitmap);

    fn report_error(&mut self, error: &ViewerError);
}

pub struct Viewer<E: PdfEngine> {
    session: DocumentSession<E>,
    renderer: PageRenderer,
    overlay: AnnotationOverlay,
    compositor: Compositor,
    base: Option<BaseBitmap>,
    frame: Option<CompositedBitmap>,
}

impl<E: PdfEngine> Viewer<E> {
    pub fn new(engine: E, config: &ViewerConfig) -> Self {
        Self {
            session: DocumentSession::new(engine),
            renderer: PageRenderer::page_native(),
            overlay: AnnotationOverlay::new(),
            compositor: Compositor::new(config.stroke, config.initial_transform()),
            base: None,
            frame: None,
        }
    }

    pub fn session(&self) -> &DocumentSession<E> {
        &self.session
    }

    pub fn drag_state(&self) -> DragState {
        self.overlay.state()
    }

    pub fn base(&self) -> Option<&BaseBitmap> {
        self.base.as_ref()
    }

    /// The last frame handed to the sink
    pub fn frame(&self) -> Option<&CompositedBitmap> {
        self.frame.as_ref()
    }

    pub fn transform(&self) -> SurfaceTransform {
        self.compositor.transform()
    }

    pub fn has_document(&self) -> bool {
        self.session.document().is_some()
    }

    pub fn handle_event(&mut self, event: ViewerEvent, sink: &mut dyn DisplaySink) {
        match event {
            ViewerEvent::OpenFile(path) => self.open_file(&path, sink),
            ViewerEvent::PreviousPage => self.previous_page(sink),
            ViewerEvent::NextPage => self.next_page(sink),
            ViewerEvent::PointerDown(position) => self.pointer_down(position, sink),
            ViewerEvent::PointerMove(position) => self.pointer_move(position, sink),
            ViewerEvent::PointerUp(position) => self.pointer_up(position, sink),
        }
    }

    pub fn open_file(&mut self, path: &Path, sink: &mut dyn DisplaySink) {
        match self.session.open(path, &self.renderer) {
            Ok(base) => self.replace_base(base, sink),
            Err(err) => {
                log::warn!("{}", err);
                sink.report_error(&err);
            }
        }
    }

    pub fn next_page(&mut self, sink: &mut dyn DisplaySink) {
        self.step(1, sink);
    }

    pub fn previous_page(&mut self, sink: &mut dyn DisplaySink) {
        self.step(-1, sink);
    }

    fn step(&mut self, delta: i64, sink: &mut dyn DisplaySink) {
        if !self.has_document() {
            return;
        }

        let current = self.session.current_page();
        let target = self.session.navigate(delta);
        if target == current {
            log::debug!("navigation by {} from page {} ignored", delta, current + 1);
            return;
        }

        match self.session.show_page(target, &self.renderer) {
            Ok(base) => self.replace_base(base, sink),
            Err(err) => {
                log::warn!("{}", err);
                sink.report_error(&err);
            }
        }
    }

    pub fn pointer_down(&mut self, position: SurfacePoint, sink: &mut dyn DisplaySink) {
        if self.base.is_none() {
            return;
        }

        self.overlay.pointer_down(position);
        self.recompose(sink);
    }

    pub fn pointer_move(&mut self, position: SurfacePoint, sink: &mut dyn DisplaySink) {
        if self.base.is_some() && self.overlay.pointer_move(position) {
            self.recompose(sink);
        }
    }

    pub fn pointer_up(&mut self, position: SurfacePoint, sink: &mut dyn DisplaySink) {
        if self.base.is_some() && self.overlay.pointer_up(position) {
            self.recompose(sink);
        }
    }

    /// Update where the page image sits on the display surface.
    ///
    /// Recomposes when the transform moved so the outline keeps tracking the
    /// pointer positions it was drawn from.
    pub fn set_surface_transform(
        &mut self,
        transform: SurfaceTransform,
        sink: &mut dyn DisplaySink,
    ) {
        if self.compositor.set_transform(transform) && !self.overlay.state().is_cleared() {
            self.recompose(sink);
        }
    }

    /// Composite the current base with the current drag state, if a page is shown.
    pub fn compose(&self) -> Option<CompositedBitmap> {
        self.base
            .as_ref()
            .map(|base| self.compositor.compose(base, &self.overlay.state()))
    }

    fn replace_base(&mut self, base: BaseBitmap, sink: &mut dyn DisplaySink) {
        self.overlay.reset();
        self.base = Some(base);
        self.recompose(sink);
    }

    fn recompose(&mut self, sink: &mut dyn DisplaySink) {
        let Some(frame) = self.compose() else {
            return;
        };

        sink.present(&frame);
        self.frame = Some(frame);
    }
}
