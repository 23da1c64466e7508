//! Pdf viewer - egui desktop shell
//!
//! One window, one document. The shell turns egui input into viewer events
//! and shows whatever frame the core presents.

mod app;
mod surface;

use eframe::egui;
use pdf_engine::PdfEngine;
use viewer_core::ViewerConfig;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ViewerConfig::default();
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_resizable(false)
            .with_title(config.title.clone()),
        ..Default::default()
    };

    let title = config.title.clone();
    eframe::run_native(
        &title,
        options,
        Box::new(move |cc| Ok(Box::new(app::ViewerApp::new(cc, select_engine(), config)))),
    )
}

fn select_engine() -> Box<dyn PdfEngine> {
    if let Some(engine) = pdfium_engine() {
        return engine;
    }

    log::warn!("pdfium backend unavailable; pages render as blank paper");
    Box::new(pdf_engine::default_engine())
}

#[cfg(feature = "pdfium")]
fn pdfium_engine() -> Option<Box<dyn PdfEngine>> {
    match pdf_engine::pdfium_backend::PdfiumEngine::from_system_library() {
        Ok(engine) => {
            log::info!("using pdfium backend");
            Some(Box::new(engine))
        }
        Err(err) => {
            log::warn!("failed to bind pdfium: {}", err);
            None
        }
    }
}

#[cfg(not(feature = "pdfium"))]
fn pdfium_engine() -> Option<Box<dyn PdfEngine>> {
    None
}
