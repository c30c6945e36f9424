//! Tooltips anchored to a view: placement on one of nine sides, screen edge
//! correction, an arrow that keeps pointing at the anchor, and a periodic
//! nudge animation, with a small iced rendering adapter.

pub mod chrome;
pub mod config;
pub mod geometry;
pub mod measured;
pub mod nudge;
pub mod placement;
pub mod side;
pub mod tooltip;

pub use chrome::Chrome;
pub use config::{
    ArrowTracking, BorderJoin, Easing, NudgeConfig, TooltipConfig, Transition,
};
pub use geometry::{Insets, Measured};
pub use measured::MeasuredContainer;
pub use placement::{Arrow, Layout, layout};
pub use side::Side;
pub use tooltip::{Tooltip, TooltipState};
