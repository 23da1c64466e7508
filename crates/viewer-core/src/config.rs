use crate::compositor::StrokeStyle;
use crate::geometry::{ChromeLayout, SurfaceTransform};

pub const DEFAULT_WINDOW_SIZE: [f32; 2] = [600.0, 850.0];
pub const WINDOW_TITLE: &str = "Pdf viewer";

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub title: String,
    pub window_size: [f32; 2],
    pub chrome: ChromeLayout,
    pub stroke: StrokeStyle,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            title: WINDOW_TITLE.to_string(),
            window_size: DEFAULT_WINDOW_SIZE,
            chrome: ChromeLayout::default(),
            stroke: StrokeStyle::default(),
        }
    }
}

impl ViewerConfig {
    /// Transform implied by the chrome layout, before the shell reports the
    /// page image's real position
    pub fn initial_transform(&self) -> SurfaceTransform {
        SurfaceTransform::from_layout(&self.chrome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_desktop_window() {
        let config = ViewerConfig::default();

        assert_eq!(config.title, "Pdf viewer");
        assert_eq!(config.window_size, [600.0, 850.0]);
        assert_eq!(config.stroke.width, 2);
        assert_eq!(config.stroke.color, [255, 0, 0]);
        assert_eq!(config.initial_transform().origin(), (8.0, 42.0));
    }
}
