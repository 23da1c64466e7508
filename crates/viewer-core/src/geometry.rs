//! Display-surface and bitmap coordinate spaces
//!
//! Pointer events arrive in display-surface coordinates: the space of the
//! window content, where the toolbar and margins sit above and beside the
//! page image. The compositor draws in bitmap pixel coordinates. The
//! [`SurfaceTransform`] is the only place the two spaces meet.

/// Integer position on the display surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SurfacePoint {
    pub x: i32,
    pub y: i32,
}

impl SurfacePoint {
    /// The unset sentinel used by a cleared drag state
    pub const ZERO: SurfacePoint = SurfacePoint { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Pixel position in bitmap space
///
/// Signed and wide: a drag that leaves the page image maps to coordinates
/// outside the bitmap, which the compositor clips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitmapPoint {
    pub x: i64,
    pub y: i64,
}

impl BitmapPoint {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in bitmap space with normalized corners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitmapRect {
    pub left: i64,
    pub top: i64,
    pub right: i64,
    pub bottom: i64,
}

impl BitmapRect {
    /// Build from two opposite corners given in any order
    pub fn from_corners(a: BitmapPoint, b: BitmapPoint) -> Self {
        Self { left: a.x.min(b.x), top: a.y.min(b.y), right: a.x.max(b.x), bottom: a.y.max(b.y) }
    }

    /// A single point: both corners coincide
    pub fn is_point(&self) -> bool {
        self.left == self.right && self.top == self.bottom
    }
}

/// Geometry of the window chrome that sits between the display surface's
/// origin and the page image's top-left pixel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChromeLayout {
    /// Height of the toolbar strip along the top edge
    pub toolbar_height: f32,

    /// Vertical gap between the toolbar and the page area
    pub toolbar_spacing: f32,

    /// Inner margin of the page area on its left and top sides
    pub content_margin: f32,
}

impl Default for ChromeLayout {
    fn default() -> Self {
        Self { toolbar_height: 30.0, toolbar_spacing: 4.0, content_margin: 8.0 }
    }
}

impl ChromeLayout {
    /// Where the page image's top-left pixel lands on the display surface
    pub fn page_origin(&self) -> (f32, f32) {
        (
            self.content_margin,
            self.toolbar_height + self.toolbar_spacing + self.content_margin,
        )
    }
}

/// Maps display-surface coordinates onto bitmap pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceTransform {
    origin_x: f32,
    origin_y: f32,
    scale: f32,
}

impl Default for SurfaceTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl SurfaceTransform {
    pub const IDENTITY: SurfaceTransform = SurfaceTransform {
        origin_x: 0.0,
        origin_y: 0.0,
        scale: 1.0,
    };

    /// The page image's top-left pixel sits at `(x, y)` on the surface,
    /// one bitmap pixel per display unit
    pub fn from_origin(x: f32, y: f32) -> Self {
        Self { origin_x: x, origin_y: y, scale: 1.0 }
    }

    pub fn from_layout(layout: &ChromeLayout) -> Self {
        let (x, y) = layout.page_origin();
        Self::from_origin(x, y)
    }

    /// Bitmap pixels per display unit. Non-positive or non-finite values
    /// fall back to 1.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        self
    }

    pub fn origin(&self) -> (f32, f32) {
        (self.origin_x, self.origin_y)
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn to_bitmap(&self, point: SurfacePoint) -> BitmapPoint {
        let x = ((point.x as f32 - self.origin_x) * self.scale).round() as i64;
        let y = ((point.y as f32 - self.origin_y) * self.scale).round() as i64;
        BitmapPoint::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_maps_points_unchanged() {
        let point = SurfacePoint::new(50, 90);
        assert_eq!(SurfaceTransform::IDENTITY.to_bitmap(point), BitmapPoint::new(50, 90));
    }

    #[test]
    fn layout_origin_accounts_for_toolbar_and_margin() {
        let layout = ChromeLayout {
            toolbar_height: 30.0,
            toolbar_spacing: 4.0,
            content_margin: 8.0,
        };
        let transform = SurfaceTransform::from_layout(&layout);

        assert_eq!(transform.origin(), (8.0, 42.0));
        assert_eq!(
            transform.to_bitmap(SurfacePoint::new(58, 92)),
            BitmapPoint::new(50, 50)
        );
    }

    #[test]
    fn points_above_the_page_map_to_negative_coordinates() {
        let transform = SurfaceTransform::from_origin(10.0, 40.0);
        assert_eq!(
            transform.to_bitmap(SurfacePoint::new(5, 12)),
            BitmapPoint::new(-5, -28)
        );
    }

    #[test]
    fn scale_converts_display_units_to_pixels() {
        let transform = SurfaceTransform::from_origin(10.0, 20.0).with_scale(2.0);
        assert_eq!(
            transform.to_bitmap(SurfacePoint::new(15, 30)),
            BitmapPoint::new(10, 20)
        );

        let fallback = SurfaceTransform::IDENTITY.with_scale(0.0);
        assert_eq!(fallback.scale(), 1.0);
    }

    #[test]
    fn rect_normalizes_corner_order() {
        let rect = BitmapRect::from_corners(BitmapPoint::new(120, 90), BitmapPoint::new(50, 50));
        assert_eq!(
            rect,
            BitmapRect {
                left: 50,
                top: 50,
                right: 120,
                bottom: 90
            }
        );
        assert!(!rect.is_point());
        let dot = BitmapPoint::new(3, 3);
        assert!(BitmapRect::from_corners(dot, dot).is_point());
    }
}
