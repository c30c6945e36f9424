use std::time::Duration;

use iced::{Color, Padding};

use crate::side::Side;

/// Everything that shapes a tooltip, independent of where its anchor is.
///
/// Values are taken as given: negative margins or arrow sizes are not
/// rejected, they simply produce odd geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipConfig {
    pub side: Side,
    /// Gap between the anchor (or the viewport edge) and the tooltip.
    pub margin: f32,
    pub arrow_width: f32,
    pub arrow_height: f32,
    pub show_arrow: bool,
    pub border_width: f32,
    /// Corner radius of the body, also used to tuck corner arrows in.
    pub border_radius: f32,
    /// Fixed content width. `None` measures the natural width.
    pub width: Option<f32>,
    /// Fixed content height. `None` measures the natural height.
    pub height: Option<f32>,
    pub padding: Padding,
    pub background: Color,
    pub border_color: Color,
    /// Text color handed to the content. `None` inherits the theme's.
    pub text_color: Option<Color>,
    pub animation: NudgeConfig,
    pub z_index: f32,
    pub transition: Transition,
    pub tracking: ArrowTracking,
    pub border_join: BorderJoin,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            side: Side::Bottom,
            margin: 8.0,
            arrow_width: 12.0,
            arrow_height: 6.0,
            show_arrow: true,
            border_width: 2.0,
            border_radius: 8.0,
            width: None,
            height: None,
            padding: Padding {
                top: 4.0,
                right: 8.0,
                bottom: 4.0,
                left: 8.0,
            },
            background: Color::TRANSPARENT,
            border_color: Color::WHITE,
            text_color: None,
            animation: NudgeConfig::default(),
            z_index: 10000.0,
            transition: Transition::Opacity,
            tracking: ArrowTracking::default(),
            border_join: BorderJoin::Cutout,
        }
    }
}

impl TooltipConfig {
    /// Whether an arrow is drawn at all on `side`.
    pub fn arrow_visible(&self, side: Side) -> bool {
        self.show_arrow && side.has_arrow()
    }

    /// Arrow height that actually separates body and anchor on `side`.
    pub fn effective_arrow_height(&self, side: Side) -> f32 {
        if self.arrow_visible(side) {
            self.arrow_height
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    #[must_use]
    pub fn margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    #[must_use]
    pub fn arrow(mut self, width: f32, height: f32) -> Self {
        self.arrow_width = width;
        self.arrow_height = height;
        self
    }

    #[must_use]
    pub fn show_arrow(mut self, show: bool) -> Self {
        self.show_arrow = show;
        self
    }

    #[must_use]
    pub fn border(mut self, width: f32, radius: f32) -> Self {
        self.border_width = width;
        self.border_radius = radius;
        self
    }

    #[must_use]
    pub fn width(mut self, width: impl Into<Option<f32>>) -> Self {
        self.width = width.into();
        self
    }

    #[must_use]
    pub fn height(mut self, height: impl Into<Option<f32>>) -> Self {
        self.height = height.into();
        self
    }

    #[must_use]
    pub fn padding(mut self, padding: impl Into<Padding>) -> Self {
        self.padding = padding.into();
        self
    }

    #[must_use]
    pub fn colors(mut self, background: Color, border: Color) -> Self {
        self.background = background;
        self.border_color = border;
        self
    }

    #[must_use]
    pub fn text_color(mut self, color: impl Into<Option<Color>>) -> Self {
        self.text_color = color.into();
        self
    }

    #[must_use]
    pub fn animation(mut self, animation: NudgeConfig) -> Self {
        self.animation = animation;
        self
    }

    #[must_use]
    pub fn z_index(mut self, z_index: f32) -> Self {
        self.z_index = z_index;
        self
    }

    #[must_use]
    pub fn transition(mut self, transition: Transition) -> Self {
        self.transition = transition;
        self
    }

    #[must_use]
    pub fn tracking(mut self, tracking: ArrowTracking) -> Self {
        self.tracking = tracking;
        self
    }

    #[must_use]
    pub fn border_join(mut self, join: BorderJoin) -> Self {
        self.border_join = join;
        self
    }
}

/// The periodic nudge that pushes a visible tooltip away from its anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NudgeConfig {
    pub enabled: bool,
    /// How far the body travels at the peak of a nudge.
    pub offset: f32,
    /// Rest time between nudges. A nudge itself lasts a tenth of this.
    pub period: Duration,
    pub easing: Easing,
}

impl Default for NudgeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            offset: 10.0,
            period: Duration::from_secs(1),
            easing: Easing::EaseInOut,
        }
    }
}

#[derive(knuffel::DecodeScalar, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    EaseIn,
    EaseOut,
    #[default]
    EaseInOut,
}

impl From<Easing> for lilt::Easing {
    fn from(easing: Easing) -> Self {
        match easing {
            Easing::Linear => lilt::Easing::Linear,
            Easing::EaseIn => lilt::Easing::EaseIn,
            Easing::EaseOut => lilt::Easing::EaseOut,
            Easing::EaseInOut => lilt::Easing::EaseInOut,
        }
    }
}

/// How a tooltip enters and leaves the screen.
#[derive(knuffel::DecodeScalar, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transition {
    /// Appears and disappears at once.
    Identity,
    #[default]
    Opacity,
}

/// How far the arrow follows the anchor once the body has been slid to stay
/// on screen, as a fraction of the content size subtracted from a full
/// correction. These are tuned by eye.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowTracking {
    pub horizontal: f32,
    pub vertical: f32,
}

impl Default for ArrowTracking {
    fn default() -> Self {
        Self {
            horizontal: 0.25,
            vertical: 0.0,
        }
    }
}

/// How the body border meets the arrow.
///
/// The iced canvas cannot mask shapes, so `Cutout` leaves a gap in the
/// border path where the arrow's base sits and strokes only the arrow's
/// slanted sides. `Seam` strokes the whole body outline and draws the arrow
/// over it.
#[derive(knuffel::DecodeScalar, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderJoin {
    #[default]
    Cutout,
    Seam,
}
