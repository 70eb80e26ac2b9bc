use crate::config::LayoutConfig;

use super::{EmptyLayout, Rect, Size};

/// Placeholder layout for a selection with nothing to draw. Fills the
/// container so the host never shows a blank canvas.
pub(super) fn compute_empty_layout(container: Size, config: &LayoutConfig) -> EmptyLayout {
    let width = container.width.max(1.0);
    let height = container.height.max(1.0);
    EmptyLayout {
        container,
        viewport: Rect::new(0.0, 0.0, width, height),
        message: config.empty_message.clone(),
        text_x: width / 2.0,
        text_y: height / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_covers_container() {
        let config = LayoutConfig::default();
        let empty = compute_empty_layout(Size::new(640.0, 320.0), &config);
        assert_eq!(empty.viewport, Rect::new(0.0, 0.0, 640.0, 320.0));
        assert_eq!((empty.text_x, empty.text_y), (320.0, 160.0));
        assert_eq!(empty.message, config.empty_message);
    }

    #[test]
    fn zero_container_still_has_a_viewport() {
        let empty = compute_empty_layout(Size::new(0.0, 0.0), &LayoutConfig::default());
        assert!(empty.viewport.width() > 0.0 && empty.viewport.height() > 0.0);
    }
}
