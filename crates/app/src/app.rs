use crate::surface::EguiSurface;
use eframe::egui;
use pdf_engine::PdfEngine;
use std::path::PathBuf;
use viewer_core::{SurfacePoint, SurfaceTransform, Viewer, ViewerConfig, ViewerEvent};

const PAGE_BACKGROUND: egui::Color32 = egui::Color32::from_rgb(0xe8, 0xe8, 0xe8);

pub struct ViewerApp {
    viewer: Viewer<Box<dyn PdfEngine>>,
    surface: EguiSurface,
    config: ViewerConfig,
}

impl ViewerApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        engine: Box<dyn PdfEngine>,
        config: ViewerConfig,
    ) -> Self {
        Self {
            viewer: Viewer::new(engine, &config),
            surface: EguiSurface::new(cc.egui_ctx.clone()),
            config,
        }
    }

    fn dispatch(&mut self, events: Vec<ViewerEvent>) {
        for event in events {
            self.viewer.handle_event(event, &mut self.surface);
        }
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut events = Vec::new();

        self.handle_keyboard(ctx, &mut events);
        self.draw_toolbar(ctx, &mut events);
        self.draw_page(ctx, &mut events);
        self.dispatch(events);
        self.draw_error_dialog(ctx);
    }
}

impl ViewerApp {
    fn handle_keyboard(&self, ctx: &egui::Context, events: &mut Vec<ViewerEvent>) {
        if self.surface.error().is_some() {
            return;
        }

        ctx.input(|i| {
            if i.key_pressed(egui::Key::ArrowLeft) {
                events.push(ViewerEvent::PreviousPage);
            }
            if i.key_pressed(egui::Key::ArrowRight) {
                events.push(ViewerEvent::NextPage);
            }
        });
    }

    fn draw_toolbar(&self, ctx: &egui::Context, events: &mut Vec<ViewerEvent>) {
        let session = self.viewer.session();
        let page_count = session.page_count();
        let current = session.current_page();

        egui::TopBottomPanel::top("toolbar")
            .exact_height(self.config.chrome.toolbar_height)
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    if ui.button("Open file").clicked() {
                        if let Some(path) = pick_pdf() {
                            events.push(ViewerEvent::OpenFile(path));
                        }
                    }

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let label = if page_count > 0 {
                            format!("{} / {}", current + 1, page_count)
                        } else {
                            "- / -".to_string()
                        };
                        ui.label(label);

                        if ui
                            .add_enabled(current + 1 < page_count, egui::Button::new(">"))
                            .clicked()
                        {
                            events.push(ViewerEvent::NextPage);
                        }
                        if ui.add_enabled(current > 0, egui::Button::new("<")).clicked() {
                            events.push(ViewerEvent::PreviousPage);
                        }
                    });
                });
            });
    }

    fn draw_page(&mut self, ctx: &egui::Context, events: &mut Vec<ViewerEvent>) {
        let frame = egui::Frame::NONE
            .fill(PAGE_BACKGROUND)
            .inner_margin(self.config.chrome.content_margin);

        egui::CentralPanel::default().frame(frame).show(ctx, |ui| {
            let Some((texture, size)) = self.surface.page() else {
                ui.centered_and_justified(|ui| {
                    ui.label("Open a PDF to get started");
                });
                return;
            };

            egui::ScrollArea::both().auto_shrink([false, false]).show(ui, |ui| {
                let (rect, response) = ui.allocate_exact_size(size, egui::Sense::drag());

                ui.painter().image(
                    texture,
                    rect,
                    egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    egui::Color32::WHITE,
                );
                ui.painter().rect_stroke(
                    rect,
                    0.0,
                    egui::Stroke::new(1.0, egui::Color32::BLACK),
                    egui::StrokeKind::Outside,
                );

                // The page moves with scrolling; keep pointer mapping in step.
                self.viewer.set_surface_transform(
                    SurfaceTransform::from_origin(rect.min.x, rect.min.y),
                    &mut self.surface,
                );

                collect_pointer_events(ctx, &response, events);
            });
        });
    }

    fn draw_error_dialog(&mut self, ctx: &egui::Context) {
        let Some(message) = self.surface.error().map(str::to_owned) else {
            return;
        };

        let mut should_close = false;
        egui::Window::new("Error")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&message);
                ui.add_space(12.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Min), |ui| {
                    if ui.button("OK").clicked() {
                        should_close = true;
                    }
                });
            });

        if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            self.surface.dismiss_error();
        }
    }
}

fn pick_pdf() -> Option<PathBuf> {
    rfd::FileDialog::new().add_filter("PDF", &["pdf"]).pick_file()
}

fn collect_pointer_events(
    ctx: &egui::Context,
    response: &egui::Response,
    events: &mut Vec<ViewerEvent>,
) {
    let primary = egui::PointerButton::Primary;

    if response.drag_started_by(primary) {
        let origin = ctx.input(|i| i.pointer.press_origin());
        if let Some(pos) = origin.or_else(|| response.interact_pointer_pos()) {
            events.push(ViewerEvent::PointerDown(surface_point(pos)));
        }
    }

    if response.dragged_by(primary) {
        if let Some(pos) = response.interact_pointer_pos() {
            events.push(ViewerEvent::PointerMove(surface_point(pos)));
        }
    }

    if response.drag_stopped_by(primary) {
        let pos = response
            .interact_pointer_pos()
            .or_else(|| ctx.input(|i| i.pointer.latest_pos()));
        if let Some(pos) = pos {
            events.push(ViewerEvent::PointerUp(surface_point(pos)));
        }
    }
}

fn surface_point(pos: egui::Pos2) -> SurfacePoint {
    SurfacePoint::new(pos.x.round() as i32, pos.y.round() as i32)
}
