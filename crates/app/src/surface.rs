use eframe::egui;
use viewer_core::{CompositedBitmap, DisplaySink, ViewerError};

/// Holds the texture for the most recently presented frame and any error
/// waiting to be shown
pub struct EguiSurface {
    ctx: egui::Context,
    texture: Option<egui::TextureHandle>,
    size: egui::Vec2,
    pending_error: Option<String>,
}

impl EguiSurface {
    pub fn new(ctx: egui::Context) -> Self {
        Self {
            ctx,
            texture: None,
            size: egui::Vec2::ZERO,
            pending_error: None,
        }
    }

    /// Texture id and size in points, one point per bitmap pixel
    pub fn page(&self) -> Option<(egui::TextureId, egui::Vec2)> {
        self.texture.as_ref().map(|texture| (texture.id(), self.size))
    }

    pub fn error(&self) -> Option<&str> {
        self.pending_error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.pending_error = None;
    }
}

impl DisplaySink for EguiSurface {
    fn present(&mut self, frame: &CompositedBitmap) {
        let bitmap = frame.bitmap();
        let image = egui::ColorImage::from_rgb(
            [bitmap.width() as usize, bitmap.height() as usize],
            &bitmap.to_packed_rgb(),
        );

        match &mut self.texture {
            Some(texture) => texture.set(image, egui::TextureOptions::NEAREST),
            None => {
                let texture = self.ctx.load_texture("page", image, egui::TextureOptions::NEAREST);
                self.texture = Some(texture);
            }
        }

        self.size = egui::vec2(bitmap.width() as f32, bitmap.height() as f32);
        self.ctx.request_repaint();
    }

    fn report_error(&mut self, error: &ViewerError) {
        self.pending_error = Some(error.user_message());
        self.ctx.request_repaint();
    }
}
