//! Body, border and arrow of a tooltip, drawn on a canvas that covers the
//! whole window.

use iced::{
    Color, Point, Radians, Rectangle, Renderer, Theme, Vector, mouse,
    widget::canvas::{self, LineJoin, Path, Stroke, path::Builder},
};

use crate::{
    config::{BorderJoin, TooltipConfig},
    geometry::Measured,
    placement::Layout,
    side::{Side, Span},
};

/// The arrow triangle. Unrotated it points up, with its base centered
/// below the tip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowShape {
    pub center: Point,
    pub angle: Radians,
    pub width: f32,
    pub height: f32,
}

impl ArrowShape {
    /// Tip, then the two base corners, in window coordinates.
    pub fn points(&self) -> [Point; 3] {
        let (sin, cos) = self.angle.0.sin_cos();
        let rotate = |x: f32, y: f32| {
            self.center + Vector::new(x * cos - y * sin, x * sin + y * cos)
        };
        let (half_w, half_h) = (self.width / 2.0, self.height / 2.0);
        [
            rotate(0.0, -half_h),
            rotate(-half_w, half_h),
            rotate(half_w, half_h),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopRight,
    BottomRight,
    BottomLeft,
    TopLeft,
}

/// The part of the body outline left unstroked where the arrow joins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gap {
    /// `from..to` along the edge, in window coordinates.
    Edge { edge: Edge, from: f32, to: f32 },
    Corner(Corner),
}

/// Where the arrow base meets `body`. `None` for sides without an arrow, or
/// when no straight part of the edge is left to cut.
pub fn border_gap(
    side: Side,
    body: Rectangle,
    arrow_center: Point,
    arrow_width: f32,
    radius: f32,
) -> Option<Gap> {
    let corner = match (side.horizontal(), side.vertical()) {
        (Span::Centered, Span::Centered) => return None,
        (Span::Before, Span::Before) => Some(Corner::BottomRight),
        (Span::After, Span::Before) => Some(Corner::BottomLeft),
        (Span::Before, Span::After) => Some(Corner::TopRight),
        (Span::After, Span::After) => Some(Corner::TopLeft),
        _ => None,
    };
    if let Some(corner) = corner {
        return Some(Gap::Corner(corner));
    }

    let (edge, center, start, length) = match side {
        Side::Top => (Edge::Bottom, arrow_center.x, body.x, body.width),
        Side::Bottom => (Edge::Top, arrow_center.x, body.x, body.width),
        Side::Left => (Edge::Right, arrow_center.y, body.y, body.height),
        _ => (Edge::Left, arrow_center.y, body.y, body.height),
    };

    let from = (center - arrow_width / 2.0).max(start + radius);
    let to = (center + arrow_width / 2.0).min(start + length - radius);
    (from < to).then_some(Gap::Edge { edge, from, to })
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Piece {
    Line(Point, Point),
    Arc { from: Point, corner: Point, to: Point },
}

impl Piece {
    fn start(self) -> Point {
        match self {
            Piece::Line(from, _) | Piece::Arc { from, .. } => from,
        }
    }

    fn trace(self, builder: &mut Builder, radius: f32) {
        match self {
            Piece::Line(_, to) => builder.line_to(to),
            Piece::Arc { corner, to, .. } if radius > 0.0 => {
                builder.arc_to(corner, to, radius);
            }
            Piece::Arc { to, .. } => builder.line_to(to),
        }
    }
}

/// Corner radius that fits `body`.
fn corner_radius(body: Rectangle, radius: f32) -> f32 {
    radius.min(body.width / 2.0).min(body.height / 2.0).max(0.0)
}

/// The rounded outline going clockwise from the top edge. Edges and corners
/// alternate, so the edge for `Edge` sits at twice its index.
fn outline(body: Rectangle, radius: f32) -> [Piece; 8] {
    let r = corner_radius(body, radius);
    let (l, t) = (body.x, body.y);
    let (rt, b) = (body.x + body.width, body.y + body.height);
    [
        Piece::Line(Point::new(l + r, t), Point::new(rt - r, t)),
        Piece::Arc {
            from: Point::new(rt - r, t),
            corner: Point::new(rt, t),
            to: Point::new(rt, t + r),
        },
        Piece::Line(Point::new(rt, t + r), Point::new(rt, b - r)),
        Piece::Arc {
            from: Point::new(rt, b - r),
            corner: Point::new(rt, b),
            to: Point::new(rt - r, b),
        },
        Piece::Line(Point::new(rt - r, b), Point::new(l + r, b)),
        Piece::Arc {
            from: Point::new(l + r, b),
            corner: Point::new(l, b),
            to: Point::new(l, b - r),
        },
        Piece::Line(Point::new(l, b - r), Point::new(l, t + r)),
        Piece::Arc {
            from: Point::new(l, t + r),
            corner: Point::new(l, t),
            to: Point::new(l + r, t),
        },
    ]
}

fn edge_index(edge: Edge) -> usize {
    match edge {
        Edge::Top => 0,
        Edge::Right => 2,
        Edge::Bottom => 4,
        Edge::Left => 6,
    }
}

fn corner_index(corner: Corner) -> usize {
    match corner {
        Corner::TopRight => 1,
        Corner::BottomRight => 3,
        Corner::BottomLeft => 5,
        Corner::TopLeft => 7,
    }
}

/// The outline as one open run of pieces starting right after `gap` and
/// ending right before it.
fn open_outline(body: Rectangle, radius: f32, gap: Gap) -> Vec<Piece> {
    let pieces = outline(body, radius);
    match gap {
        Gap::Corner(corner) => {
            let at = corner_index(corner);
            (1..8).map(|i| pieces[(at + i) % 8]).collect()
        }
        Gap::Edge { edge, from, to } => {
            let at = edge_index(edge);
            let (start, end) = match pieces[at] {
                Piece::Line(start, end) | Piece::Arc { from: start, to: end, .. } => {
                    (start, end)
                }
            };
            let point = |v: f32| match edge {
                Edge::Top | Edge::Bottom => Point::new(v, start.y),
                Edge::Left | Edge::Right => Point::new(start.x, v),
            };
            let (near, far) = match edge {
                Edge::Top | Edge::Right => (from, to),
                Edge::Bottom | Edge::Left => (to, from),
            };

            let mut run = vec![Piece::Line(point(far), end)];
            run.extend((1..8).map(|i| pieces[(at + i) % 8]));
            run.push(Piece::Line(start, point(near)));
            run
        }
    }
}

fn trace(builder: &mut Builder, pieces: &[Piece], radius: f32) {
    let Some(first) = pieces.first() else {
        return;
    };
    builder.move_to(first.start());
    for piece in pieces {
        piece.trace(builder, radius);
    }
}

/// One tooltip's chrome, ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Chrome {
    side: Side,
    body: Rectangle,
    arrow: Option<ArrowShape>,
    radius: f32,
    border_width: f32,
    background: Color,
    border_color: Color,
    join: BorderJoin,
}

impl Chrome {
    pub fn new(
        config: &TooltipConfig,
        measured: &Measured,
        layout: &Layout,
        opacity: f32,
    ) -> Self {
        let body = layout.body_bounds(measured);
        let arrow = layout.arrow.map(|arrow| ArrowShape {
            center: body.center() + arrow.offset,
            angle: arrow.angle,
            width: config.arrow_width,
            height: config.arrow_height,
        });

        Self {
            side: config.side,
            body,
            arrow,
            radius: corner_radius(body, config.border_radius),
            border_width: config.border_width,
            background: config.background.scale_alpha(opacity),
            border_color: config.border_color.scale_alpha(opacity),
            join: config.border_join,
        }
    }

    pub fn body(&self) -> Rectangle {
        self.body
    }

    pub fn arrow(&self) -> Option<ArrowShape> {
        self.arrow
    }

    /// The body outline, open at the arrow join when one is cut.
    fn border(&self) -> Path {
        let gap = match (self.join, self.arrow) {
            (BorderJoin::Cutout, Some(arrow)) => border_gap(
                self.side,
                self.body,
                arrow.center,
                arrow.width,
                self.radius,
            ),
            _ => None,
        };
        let radius = self.radius;
        let body = self.body;

        Path::new(|builder| match gap {
            Some(gap) => trace(builder, &open_outline(body, radius, gap), radius),
            None => {
                trace(builder, &outline(body, radius), radius);
                builder.close();
            }
        })
    }

    fn stroke(&self) -> Stroke<'static> {
        Stroke::default()
            .with_color(self.border_color)
            .with_width(self.border_width)
            .with_line_join(LineJoin::Round)
    }
}

#[profiling::all_functions]
impl<Message> canvas::Program<Message> for Chrome {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry<Renderer>> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let radius = self.radius;
        let body = self.body;

        let fill = Path::new(|builder| {
            trace(builder, &outline(body, radius), radius);
            builder.close();
        });
        frame.fill(&fill, self.background);

        if let Some(arrow) = self.arrow {
            let [tip, left, right] = arrow.points();
            frame.fill(
                &Path::new(|builder| {
                    builder.move_to(tip);
                    builder.line_to(left);
                    builder.line_to(right);
                    builder.close();
                }),
                self.background,
            );
        }

        if self.border_width > 0.0 {
            frame.stroke(&self.border(), self.stroke());

            if let Some(arrow) = self.arrow {
                let [tip, left, right] = arrow.points();
                let sides = Path::new(|builder| {
                    builder.move_to(left);
                    builder.line_to(tip);
                    builder.line_to(right);
                    if self.join == BorderJoin::Seam {
                        builder.close();
                    }
                });
                frame.stroke(&sides, self.stroke());
            }
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use iced::Size;

    use super::*;

    fn close(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    fn body() -> Rectangle {
        Rectangle::new(Point::new(65.0, 446.0), Size::new(120.0, 40.0))
    }

    #[test]
    fn unrotated_arrow_points_up() {
        let arrow = ArrowShape {
            center: Point::new(10.0, 10.0),
            angle: Radians(0.0),
            width: 12.0,
            height: 6.0,
        };
        let [tip, left, right] = arrow.points();
        assert!(close(tip, Point::new(10.0, 7.0)));
        assert!(close(left, Point::new(4.0, 13.0)));
        assert!(close(right, Point::new(16.0, 13.0)));
    }

    #[test]
    fn arrow_under_a_top_tooltip_points_down_from_the_body_edge() {
        let arrow = ArrowShape {
            center: Point::new(125.0, 489.0),
            angle: Radians(PI),
            width: 12.0,
            height: 6.0,
        };
        let [tip, left, right] = arrow.points();
        assert!(close(tip, Point::new(125.0, 492.0)));
        assert!((left.y - 486.0).abs() < 1e-4);
        assert!((right.y - 486.0).abs() < 1e-4);
    }

    #[test]
    fn arrow_of_a_left_tooltip_points_right() {
        let arrow = ArrowShape {
            center: Point::new(0.0, 0.0),
            angle: Radians(PI / 2.0),
            width: 12.0,
            height: 6.0,
        };
        assert!(close(arrow.points()[0], Point::new(3.0, 0.0)));
    }

    #[test]
    fn edge_gap_is_the_arrow_base() {
        let gap = border_gap(Side::Top, body(), Point::new(125.0, 489.0), 12.0, 8.0);
        assert_eq!(
            gap,
            Some(Gap::Edge {
                edge: Edge::Bottom,
                from: 119.0,
                to: 131.0
            })
        );

        let gap = border_gap(Side::Right, body(), Point::new(60.0, 466.0), 12.0, 8.0);
        assert_eq!(
            gap,
            Some(Gap::Edge {
                edge: Edge::Left,
                from: 460.0,
                to: 472.0
            })
        );
    }

    #[test]
    fn edge_gap_stays_off_the_rounded_corners() {
        let gap = border_gap(Side::Bottom, body(), Point::new(75.0, 443.0), 12.0, 8.0);
        assert_eq!(
            gap,
            Some(Gap::Edge {
                edge: Edge::Top,
                from: 73.0,
                to: 81.0
            })
        );

        let gap = border_gap(Side::Bottom, body(), Point::new(66.0, 443.0), 12.0, 8.0);
        assert_eq!(gap, None);
    }

    #[test]
    fn corner_sides_open_the_facing_corner() {
        let center = Point::new(0.0, 0.0);
        let cases = [
            (Side::TopLeft, Corner::BottomRight),
            (Side::TopRight, Corner::BottomLeft),
            (Side::BottomLeft, Corner::TopRight),
            (Side::BottomRight, Corner::TopLeft),
        ];
        for (side, corner) in cases {
            assert_eq!(
                border_gap(side, body(), center, 12.0, 8.0),
                Some(Gap::Corner(corner)),
                "{side}"
            );
        }
        assert_eq!(border_gap(Side::Center, body(), center, 12.0, 8.0), None);
    }

    #[test]
    fn open_outline_is_continuous_and_skips_the_gap() {
        let gap = Gap::Edge {
            edge: Edge::Bottom,
            from: 119.0,
            to: 131.0,
        };
        let run = open_outline(body(), 8.0, gap);
        assert_eq!(run.len(), 9);
        assert_eq!(run[0].start(), Point::new(119.0, 486.0));
        assert_eq!(run[8], Piece::Line(Point::new(177.0, 486.0), Point::new(131.0, 486.0)));

        let ends = |piece: Piece| match piece {
            Piece::Line(_, to) | Piece::Arc { to, .. } => to,
        };
        for pair in run.windows(2) {
            assert_eq!(ends(pair[0]), pair[1].start());
        }
    }

    #[test]
    fn open_outline_drops_the_corner() {
        let run = open_outline(body(), 8.0, Gap::Corner(Corner::TopLeft));
        assert_eq!(run.len(), 7);
        assert_eq!(run[0].start(), Point::new(73.0, 446.0));
        assert!(run.iter().all(|piece| !matches!(
            piece,
            Piece::Arc { corner, .. } if *corner == Point::new(65.0, 446.0)
        )));
    }

    #[test]
    fn opacity_scales_both_colors() {
        let config = TooltipConfig::default()
            .side(Side::Top)
            .colors(Color::BLACK, Color::WHITE);
        let measured = Measured {
            anchor: Rectangle::new(Point::new(100.0, 500.0), Size::new(50.0, 20.0)),
            viewport: Size::new(390.0, 844.0),
            safe_area: crate::geometry::Insets::ZERO,
            content: Size::new(120.0, 40.0),
        };
        let layout = crate::placement::layout(&config, &measured, 0.0);
        let chrome = Chrome::new(&config, &measured, &layout, 0.5);
        assert_eq!(chrome.background.a, 0.5);
        assert_eq!(chrome.border_color.a, 0.5);
        assert_eq!(chrome.body(), body());
        let arrow = chrome.arrow().unwrap();
        assert_eq!(arrow.center, Point::new(125.0, 489.0));
    }
}
