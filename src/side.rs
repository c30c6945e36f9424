use std::f32::consts::FRAC_PI_4;

use iced::Radians;

/// The anchor edge or corner a tooltip attaches to.
#[derive(
    knuffel::DecodeScalar, Debug, Clone, Copy, PartialEq, Eq, Hash, Default,
)]
pub enum Side {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Where the tooltip body sits relative to the anchor along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Span {
    /// Pushed out past the anchor's near edge (left or top).
    Before,
    /// Pushed out past the anchor's far edge (right or bottom).
    After,
    /// Centered on the anchor, then corrected for overflow.
    Centered,
}

impl Span {
    pub fn is_centered(self) -> bool {
        matches!(self, Span::Centered)
    }
}

impl Side {
    pub const ALL: [Side; 9] = [
        Side::TopLeft,
        Side::Top,
        Side::TopRight,
        Side::Left,
        Side::Center,
        Side::Right,
        Side::BottomLeft,
        Side::Bottom,
        Side::BottomRight,
    ];

    pub fn horizontal(self) -> Span {
        match self {
            Side::Left | Side::TopLeft | Side::BottomLeft => Span::Before,
            Side::Right | Side::TopRight | Side::BottomRight => Span::After,
            Side::Top | Side::Bottom | Side::Center => Span::Centered,
        }
    }

    pub fn vertical(self) -> Span {
        match self {
            Side::Top | Side::TopLeft | Side::TopRight => Span::Before,
            Side::Bottom | Side::BottomLeft | Side::BottomRight => Span::After,
            Side::Left | Side::Right | Side::Center => Span::Centered,
        }
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Side::TopLeft | Side::TopRight | Side::BottomLeft | Side::BottomRight
        )
    }

    /// Rotation of the arrow shape, which points up at zero and turns
    /// clockwise on screen. `None` means the side draws no arrow.
    pub fn arrow_angle(self) -> Option<Radians> {
        let eighths = match self {
            Side::Center => return None,
            Side::Bottom => 0.0,
            Side::BottomLeft => 1.0,
            Side::Left => 2.0,
            Side::TopLeft => 3.0,
            Side::Top => 4.0,
            Side::TopRight => 5.0,
            Side::Right => 6.0,
            Side::BottomRight => 7.0,
        };
        Some(Radians(eighths * FRAC_PI_4))
    }

    pub fn has_arrow(self) -> bool {
        self.arrow_angle().is_some()
    }

    pub fn name(self) -> &'static str {
        match self {
            Side::Top => "top",
            Side::Bottom => "bottom",
            Side::Left => "left",
            Side::Right => "right",
            Side::Center => "center",
            Side::TopLeft => "top-left",
            Side::TopRight => "top-right",
            Side::BottomLeft => "bottom-left",
            Side::BottomRight => "bottom-right",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
