//! Tooltip placement.
//!
//! Everything here is a pure function of the config and one pass of measured
//! geometry. The body is pushed clear of the anchor along its primary axis
//! and centered along the other one. On a centered axis the body is slid
//! back on screen when it would cross a viewport edge, with the far edge
//! checked first. The arrow then gets a counter-shift so it keeps pointing
//! at the anchor rather than at the middle of the slid body.

use iced::{Point, Radians, Rectangle, Size, Vector};

use crate::{
    config::TooltipConfig,
    geometry::Measured,
    side::{Side, Span},
};

/// Result of one placement pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    /// Offset of the body's top-left corner from the anchor's top-left corner.
    pub body: Vector,
    pub arrow: Option<Arrow>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    pub angle: Radians,
    /// Offset of the arrow's center from the body's center.
    pub offset: Vector,
}

impl Layout {
    pub fn body_bounds(&self, measured: &Measured) -> Rectangle {
        Rectangle::new(
            measured.anchor.position() + self.body,
            measured.content,
        )
    }

    pub fn arrow_center(&self, measured: &Measured) -> Option<Point> {
        let arrow = self.arrow?;
        Some(self.body_bounds(measured).center() + arrow.offset)
    }

    /// Slides the body so it starts at or after the window origin. The arrow
    /// moves with it. Only content larger than the viewport needs this.
    #[must_use]
    pub fn pinned_to_origin(self, measured: &Measured) -> Self {
        let bounds = self.body_bounds(measured);
        let pin = Vector::new((-bounds.x).max(0.0), (-bounds.y).max(0.0));
        Self {
            body: self.body + pin,
            ..self
        }
    }
}

/// Computes body and arrow placement. `nudge` is the current animation
/// offset, which pushes the body further out along its primary axis.
pub fn layout(config: &TooltipConfig, measured: &Measured, nudge: f32) -> Layout {
    let side = config.side;
    let body = body_offset(side, config, measured, nudge);

    let arrow = side
        .arrow_angle()
        .filter(|_| config.arrow_visible(side))
        .map(|angle| {
            let base = arrow_base_offset(
                side,
                measured.content,
                config.arrow_height,
                config.border_radius,
                config.border_width,
            );
            let offset = base + arrow_offset(side, config, measured);
            Arrow { angle, offset }
        });

    Layout { body, arrow }
}

/// Offset of the body's top-left corner from the anchor's top-left corner.
pub fn body_offset(
    side: Side,
    config: &TooltipConfig,
    measured: &Measured,
    nudge: f32,
) -> Vector {
    let push = config.margin + config.effective_arrow_height(side) + nudge;
    let anchor = measured.anchor;
    let content = measured.content;

    let x = match side.horizontal() {
        Span::Before => -(content.width + push),
        Span::After => anchor.width + push,
        Span::Centered => {
            let axis = Axis::horizontal(measured);
            let base = axis.centered();
            base + match axis.fit(base) {
                Fit::Inside => 0.0,
                Fit::Overflow(overflow) => overflow - config.margin,
                Fit::Underflow(start) => -start + config.margin,
            }
        }
    };

    let y = match side.vertical() {
        Span::Before => -(content.height + push),
        Span::After => anchor.height + push,
        Span::Centered => {
            let axis = Axis::vertical(measured);
            let base = axis.centered();
            let insets = measured.safe_area;
            base + match axis.fit(base) {
                Fit::Inside => 0.0,
                Fit::Overflow(overflow) => {
                    overflow - config.margin - insets.bottom
                }
                Fit::Underflow(start) => -start + config.margin + insets.top,
            }
        }
    };

    Vector::new(x, y)
}

/// Extra arrow shift that makes up for the body having been slid back on
/// screen. Zero on any axis the body was pushed along, and for sides
/// without an arrow.
pub fn arrow_offset(
    side: Side,
    config: &TooltipConfig,
    measured: &Measured,
) -> Vector {
    if !side.has_arrow() {
        return Vector::new(0.0, 0.0);
    }

    let margin = config.margin;
    let content = measured.content;

    let x = if side.horizontal().is_centered() {
        let axis = Axis::horizontal(measured);
        let track = content.width * config.tracking.horizontal;
        match axis.fit(axis.centered()) {
            Fit::Inside => 0.0,
            Fit::Overflow(overflow) => -(overflow - margin) - track,
            Fit::Underflow(start) => start - margin + track,
        }
    } else {
        0.0
    };

    let y = if side.vertical().is_centered() {
        let axis = Axis::vertical(measured);
        let track = content.height * config.tracking.vertical;
        match axis.fit(axis.centered()) {
            Fit::Inside => 0.0,
            Fit::Overflow(overflow) => margin - overflow - track,
            Fit::Underflow(start) => start - margin + track,
        }
    } else {
        0.0
    };

    Vector::new(x, y)
}

/// Puts the arrow against the body edge or corner that faces the anchor,
/// before any overflow correction. Corner arrows are pulled in so they sit
/// inside the rounded corner.
pub fn arrow_base_offset(
    side: Side,
    content: Size,
    arrow_height: f32,
    border_radius: f32,
    border_width: f32,
) -> Vector {
    if !side.has_arrow() {
        return Vector::new(0.0, 0.0);
    }

    let tuck = if side.is_corner() {
        border_radius / 2.0 + border_width / 2.0
    } else {
        0.0
    };

    let along = |span: Span, length: f32| {
        let reach = length / 2.0 + arrow_height / 2.0 - tuck;
        match span {
            Span::Before => reach,
            Span::After => -reach,
            Span::Centered => 0.0,
        }
    };

    Vector::new(
        along(side.horizontal(), content.width),
        along(side.vertical(), content.height),
    )
}

/// One axis of the anchor, content and viewport.
struct Axis {
    origin: f32,
    anchor: f32,
    content: f32,
    viewport: f32,
}

enum Fit {
    Inside,
    /// Signed distance past the far viewport edge, always negative.
    Overflow(f32),
    /// Start coordinate before the near viewport edge, always negative.
    Underflow(f32),
}

impl Axis {
    fn horizontal(measured: &Measured) -> Self {
        Self {
            origin: measured.anchor.x,
            anchor: measured.anchor.width,
            content: measured.content.width,
            viewport: measured.viewport.width,
        }
    }

    fn vertical(measured: &Measured) -> Self {
        Self {
            origin: measured.anchor.y,
            anchor: measured.anchor.height,
            content: measured.content.height,
            viewport: measured.viewport.height,
        }
    }

    fn centered(&self) -> f32 {
        (self.anchor - self.content) / 2.0
    }

    fn fit(&self, offset: f32) -> Fit {
        let overflow = self.viewport - (self.origin + offset + self.content);
        if overflow < 0.0 {
            return Fit::Overflow(overflow);
        }
        let start = self.origin + offset;
        if start < 0.0 {
            Fit::Underflow(start)
        } else {
            Fit::Inside
        }
    }
}
