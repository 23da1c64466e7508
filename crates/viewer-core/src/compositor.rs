//! Overlay compositor
//!
//! Combines a [`BaseBitmap`] with the current [`DragState`] into a fresh
//! [`CompositedBitmap`]. Every call starts from a copy of the base pixels;
//! no output is ever fed back in as input, so a rectangle drawn for one drag
//! state can never survive into the frame for another.

use crate::geometry::{BitmapRect, SurfaceTransform};
use crate::overlay::DragState;
use crate::renderer::BaseBitmap;
use pdf_engine::RgbBitmap;

/// Outline style of the selection rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrokeStyle {
    /// Stroke width in bitmap pixels, centered on the rectangle's edges
    pub width: u32,
    pub color: [u8; 3],
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self { width: 2, color: [255, 0, 0] }
    }
}

/// Frame handed to the display sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositedBitmap {
    page_index: u32,
    bitmap: RgbBitmap,
    rectangle: Option<BitmapRect>,
}

impl CompositedBitmap {
    pub fn page_index(&self) -> u32 {
        self.page_index
    }

    pub fn bitmap(&self) -> &RgbBitmap {
        &self.bitmap
    }

    /// The rectangle drawn into this frame, in bitmap space, before clipping
    pub fn rectangle(&self) -> Option<BitmapRect> {
        self.rectangle
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Compositor {
    style: StrokeStyle,
    transform: SurfaceTransform,
}

impl Compositor {
    pub fn new(style: StrokeStyle, transform: SurfaceTransform) -> Self {
        Self { style, transform }
    }

    pub fn style(&self) -> StrokeStyle {
        self.style
    }

    pub fn transform(&self) -> SurfaceTransform {
        self.transform
    }

    /// Returns true if the transform actually changed.
    pub fn set_transform(&mut self, transform: SurfaceTransform) -> bool {
        if self.transform == transform {
            return false;
        }
        self.transform = transform;
        true
    }

    /// The rectangle `drag` describes in bitmap space, if it draws anything.
    pub fn rectangle_for(&self, drag: &DragState) -> Option<BitmapRect> {
        if drag.is_cleared() {
            return None;
        }

        let rect = BitmapRect::from_corners(
            self.transform.to_bitmap(drag.start),
            self.transform.to_bitmap(drag.end),
        );

        // A press without movement leaves nothing to outline.
        (!rect.is_point()).then_some(rect)
    }

    pub fn compose(&self, base: &BaseBitmap, drag: &DragState) -> CompositedBitmap {
        let mut bitmap = base.bitmap().clone();
        let rectangle = self.rectangle_for(drag);

        if let Some(rect) = rectangle {
            stroke_rect(&mut bitmap, rect, self.style);
        }

        CompositedBitmap { page_index: base.page_index(), bitmap, rectangle }
    }
}

fn stroke_rect(bitmap: &mut RgbBitmap, rect: BitmapRect, style: StrokeStyle) {
    let width = i64::from(style.width.max(1));
    let inset = width / 2;

    let outer_left = rect.left - inset;
    let outer_top = rect.top - inset;
    let outer_right = rect.right - inset + width;
    let outer_bottom = rect.bottom - inset + width;

    // top, bottom
    fill_clipped(bitmap, outer_left, outer_top, outer_right, outer_top + width, style.color);
    fill_clipped(
        bitmap,
        outer_left,
        rect.bottom - inset,
        outer_right,
        outer_bottom,
        style.color,
    );
    // left, right
    fill_clipped(bitmap, outer_left, outer_top, outer_left + width, outer_bottom, style.color);
    fill_clipped(
        bitmap,
        rect.right - inset,
        outer_top,
        outer_right,
        outer_bottom,
        style.color,
    );
}

/// Fill the half-open span `[x0, x1) x [y0, y1)`, clipped to the bitmap.
fn fill_clipped(bitmap: &mut RgbBitmap, x0: i64, y0: i64, x1: i64, y1: i64, color: [u8; 3]) {
    let width = i64::from(bitmap.width());
    let height = i64::from(bitmap.height());

    let x0 = x0.clamp(0, width);
    let x1 = x1.clamp(0, width);
    let y0 = y0.clamp(0, height);
    let y1 = y1.clamp(0, height);

    if x0 >= x1 || y0 >= y1 {
        return;
    }

    for y in y0..y1 {
        let row = bitmap.row_mut(y as u32);
        for pixel in row[x0 as usize * 3..x1 as usize * 3].chunks_exact_mut(3) {
            pixel.copy_from_slice(&color);
        }
    }
}
