//! Core of the single-document PDF viewer
//!
//! Pipeline: [`DocumentSession`] opens a file and tracks the current page,
//! [`PageRenderer`] turns a page into an immutable [`BaseBitmap`], and the
//! [`Compositor`] draws the [`AnnotationOverlay`]'s drag rectangle onto a
//! fresh copy for each frame. [`Viewer`] wires these to a [`DisplaySink`].

pub mod compositor;
pub mod config;
pub mod error;
pub mod geometry;
pub mod overlay;
pub mod renderer;
pub mod session;
pub mod viewer;

pub use compositor::{CompositedBitmap, Compositor, StrokeStyle};
pub use config::ViewerConfig;
pub use error::{ErrorKind, ViewerError, ViewerResult};
pub use geometry::{BitmapPoint, BitmapRect, ChromeLayout, SurfacePoint, SurfaceTransform};
pub use overlay::{AnnotationOverlay, DragPhase, DragState};
pub use renderer::{BaseBitmap, PageRenderer};
pub use session::{navigate, DocumentSession, OpenDocument};
pub use viewer::{DisplaySink, Viewer, ViewerEvent};
pub use pdf_engine;
