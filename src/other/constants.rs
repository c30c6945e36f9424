use std::time::Duration;

pub const APP_NAMESPACE: &str = "AnchorTip";

/// Frame timer period while any tooltip is animating.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);
