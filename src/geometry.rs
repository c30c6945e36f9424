use iced::{Rectangle, Size};

use crate::config::TooltipConfig;

/// Content size assumed before the first measurement pass reports back.
pub const PLACEHOLDER_CONTENT: Size = Size {
    width: 10.0,
    height: 10.0,
};

/// Distances from each viewport edge that content should stay clear of.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Insets {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Insets {
    pub const ZERO: Insets = Insets {
        top: 0.0,
        right: 0.0,
        bottom: 0.0,
        left: 0.0,
    };
}

/// The geometry of one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measured {
    /// Anchor frame in window coordinates. Its size is the anchor's own
    /// local size.
    pub anchor: Rectangle,
    pub viewport: Size,
    pub safe_area: Insets,
    /// Resolved size of the padded tooltip content.
    pub content: Size,
}

/// Resolves the content size for layout: explicit dimensions win, then the
/// measured natural size, then [`PLACEHOLDER_CONTENT`].
pub fn content_size(config: &TooltipConfig, natural: Option<Size>) -> Size {
    let natural = natural.unwrap_or(PLACEHOLDER_CONTENT);
    Size::new(
        config.width.unwrap_or(natural.width),
        config.height.unwrap_or(natural.height),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmeasured_content_uses_the_placeholder() {
        let config = TooltipConfig::default();
        assert_eq!(content_size(&config, None), PLACEHOLDER_CONTENT);
    }

    #[test]
    fn explicit_dimensions_override_each_axis_independently() {
        let config = TooltipConfig::default().width(120.0);
        let size = content_size(&config, Some(Size::new(64.0, 30.0)));
        assert_eq!(size, Size::new(120.0, 30.0));

        let config = TooltipConfig::default().height(50.0);
        assert_eq!(content_size(&config, None), Size::new(10.0, 50.0));
    }
}
