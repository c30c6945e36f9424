use std::time::Instant;

use iced::{Rectangle, Size};
use lilt::{Animated, Easing};
use tracing::debug;

use crate::{
    config::{Transition, TooltipConfig},
    geometry::{Insets, Measured, content_size},
    nudge::Nudge,
    placement::{self, Layout},
};

/// How many times an unavailable anchor frame is queried again before the
/// tooltip gives up and stays hidden.
pub const TOOLTIP_RETRIES: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipState {
    Hidden,
    Measuring {
        content_measured: bool,
        anchor_measured: bool,
        retries: u8,
    },
    AnimatingIn,
    AnimatingOut,
}

/// One tooltip attached to one anchor.
#[derive(Debug, Clone)]
pub struct Tooltip {
    config: TooltipConfig,
    state: TooltipState,
    anchor: Option<Rectangle>,
    content: Option<Size>,
    fade: Animated<bool, Instant>,
    nudge: Nudge,
}

fn fade() -> Animated<bool, Instant> {
    Animated::new(false)
        .duration(175.0)
        .easing(Easing::EaseInOut)
        .delay(30.0)
}

impl Default for Tooltip {
    fn default() -> Self {
        Self::new(TooltipConfig::default())
    }
}

impl Tooltip {
    pub fn new(config: TooltipConfig) -> Self {
        Self {
            nudge: Nudge::new(config.animation),
            config,
            state: TooltipState::Hidden,
            anchor: None,
            content: None,
            fade: fade(),
        }
    }

    pub fn config(&self) -> &TooltipConfig {
        &self.config
    }

    pub fn state(&self) -> TooltipState {
        self.state
    }

    pub fn anchor(&self) -> Option<Rectangle> {
        self.anchor
    }

    /// Last natural content size reported by the measuring pass.
    pub fn content(&self) -> Option<Size> {
        self.content
    }

    pub fn nudge(&self) -> &Nudge {
        &self.nudge
    }

    /// Returns true when the caller has to query the anchor frame.
    pub fn show(&mut self, now: Instant) -> bool {
        match self.state {
            TooltipState::Hidden => {
                self.state = TooltipState::Measuring {
                    content_measured: self.content.is_some(),
                    anchor_measured: false,
                    retries: 0,
                };
                debug!("tooltip measuring");
                true
            }
            TooltipState::AnimatingOut => {
                self.enter(now);
                false
            }
            TooltipState::Measuring { .. } | TooltipState::AnimatingIn => false,
        }
    }

    fn enter(&mut self, now: Instant) {
        self.state = TooltipState::AnimatingIn;
        self.fade.transition(true, now);
        self.nudge.start(now);
        debug!("tooltip animating in");
    }

    /// Stores the anchor frame. While measuring, a missing frame asks for
    /// another query until the retries run out. Returns true when the
    /// caller has to query again.
    pub fn anchor_measured(
        &mut self,
        bounds: Option<Rectangle>,
        now: Instant,
    ) -> bool {
        let TooltipState::Measuring {
            content_measured,
            anchor_measured,
            retries,
        } = self.state
        else {
            if bounds.is_some() {
                self.anchor = bounds;
            }
            return false;
        };

        match bounds {
            Some(bounds) => {
                self.anchor = Some(bounds);
                if content_measured {
                    self.enter(now);
                } else {
                    self.state = TooltipState::Measuring {
                        content_measured,
                        anchor_measured: true,
                        retries,
                    };
                }
                false
            }
            None if anchor_measured => false,
            None if retries < TOOLTIP_RETRIES => {
                self.state = TooltipState::Measuring {
                    content_measured,
                    anchor_measured,
                    retries: retries + 1,
                };
                true
            }
            None => {
                debug!(retries, "anchor bounds unavailable, giving up");
                self.state = TooltipState::Hidden;
                false
            }
        }
    }

    /// Stores the natural content size. Repeats of the known size are
    /// ignored.
    pub fn content_measured(&mut self, size: Size, now: Instant) {
        let changed = self.content != Some(size);
        if changed {
            self.content = Some(size);
        }

        if let TooltipState::Measuring {
            content_measured: false,
            anchor_measured,
            retries,
        } = self.state
        {
            if anchor_measured {
                self.enter(now);
            } else {
                self.state = TooltipState::Measuring {
                    content_measured: true,
                    anchor_measured,
                    retries,
                };
            }
        } else if changed {
            debug!(?size, "tooltip content resized");
        }
    }

    pub fn hide(&mut self, now: Instant) {
        if matches!(
            self.state,
            TooltipState::Hidden | TooltipState::AnimatingOut
        ) {
            return;
        }
        self.nudge.stop();
        match self.config.transition {
            Transition::Identity => {
                self.state = TooltipState::Hidden;
                self.fade = fade();
                debug!("tooltip hidden");
            }
            Transition::Opacity => {
                self.state = TooltipState::AnimatingOut;
                self.fade.transition(false, now);
                debug!("tooltip animating out");
            }
        }
    }

    /// Drops the tooltip at once, as when its anchor leaves the view tree.
    pub fn detach(&mut self) {
        self.state = TooltipState::Hidden;
        self.nudge.stop();
        self.fade = fade();
        self.anchor = None;
    }

    pub fn tick(&mut self, now: Instant) {
        self.nudge.tick(now);
        if self.state == TooltipState::AnimatingOut
            && !self.fade.in_progress(now)
        {
            self.state = TooltipState::Hidden;
            debug!("tooltip hidden");
        }
    }

    pub fn reconfigure(&mut self, config: TooltipConfig, now: Instant) {
        self.nudge.reconfigure(config.animation);
        if self.state == TooltipState::AnimatingIn {
            self.nudge.start(now);
        }
        if config.transition == Transition::Identity
            && self.state == TooltipState::AnimatingOut
        {
            self.state = TooltipState::Hidden;
            self.fade = fade();
        }
        self.config = config;
    }

    pub fn opacity(&self, now: Instant) -> f32 {
        match (self.state, self.config.transition) {
            (TooltipState::Hidden | TooltipState::Measuring { .. }, _) => 0.0,
            (_, Transition::Identity) => 1.0,
            (_, Transition::Opacity) => self.fade.animate_bool(0.0, 1.0, now),
        }
    }

    pub fn nudge_offset(&self, now: Instant) -> f32 {
        self.nudge.offset(now)
    }

    /// Whether frame ticks are needed to keep this tooltip moving.
    pub fn is_animating(&self, now: Instant) -> bool {
        match self.state {
            TooltipState::Hidden | TooltipState::Measuring { .. } => false,
            TooltipState::AnimatingOut => true,
            TooltipState::AnimatingIn => {
                self.nudge.is_cycling() || self.fade.in_progress(now)
            }
        }
    }

    /// Whether the content is in the view tree, visibly or for measuring.
    pub fn is_rendered(&self) -> bool {
        self.state != TooltipState::Hidden
    }

    pub fn shows_chrome(&self) -> bool {
        matches!(
            self.state,
            TooltipState::AnimatingIn | TooltipState::AnimatingOut
        )
    }

    pub fn measured(&self, viewport: Size, safe_area: Insets) -> Option<Measured> {
        Some(Measured {
            anchor: self.anchor?,
            viewport,
            safe_area,
            content: content_size(&self.config, self.content),
        })
    }

    pub fn layout(
        &self,
        viewport: Size,
        safe_area: Insets,
        now: Instant,
    ) -> Option<(Measured, Layout)> {
        let measured = self.measured(viewport, safe_area)?;
        let layout =
            placement::layout(&self.config, &measured, self.nudge_offset(now));
        Some((measured, layout))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use iced::Point;

    use super::*;
    use crate::config::NudgeConfig;

    fn ms(t0: Instant, ms: u64) -> Instant {
        t0 + Duration::from_millis(ms)
    }

    fn bounds() -> Rectangle {
        Rectangle::new(Point::new(100.0, 500.0), Size::new(50.0, 20.0))
    }

    fn shown(config: TooltipConfig, t0: Instant) -> Tooltip {
        let mut tooltip = Tooltip::new(config);
        assert!(tooltip.show(t0));
        tooltip.content_measured(Size::new(120.0, 40.0), t0);
        tooltip.anchor_measured(Some(bounds()), t0);
        tooltip
    }

    fn nudging() -> TooltipConfig {
        TooltipConfig::default().animation(NudgeConfig {
            enabled: true,
            ..NudgeConfig::default()
        })
    }

    #[test]
    fn both_measurements_are_needed_in_either_order() {
        let t0 = Instant::now();
        let mut tooltip = Tooltip::default();
        tooltip.show(t0);
        tooltip.anchor_measured(Some(bounds()), t0);
        assert!(matches!(tooltip.state(), TooltipState::Measuring { .. }));
        tooltip.content_measured(Size::new(80.0, 20.0), t0);
        assert_eq!(tooltip.state(), TooltipState::AnimatingIn);

        let mut tooltip = Tooltip::default();
        tooltip.show(t0);
        tooltip.content_measured(Size::new(80.0, 20.0), t0);
        assert!(tooltip.is_rendered());
        assert!(!tooltip.shows_chrome());
        tooltip.anchor_measured(Some(bounds()), t0);
        assert_eq!(tooltip.state(), TooltipState::AnimatingIn);
    }

    #[test]
    fn missing_anchor_is_retried_then_abandoned() {
        let t0 = Instant::now();
        let mut tooltip = Tooltip::default();
        tooltip.show(t0);
        for _ in 0..TOOLTIP_RETRIES {
            assert!(tooltip.anchor_measured(None, t0));
        }
        assert!(!tooltip.anchor_measured(None, t0));
        assert_eq!(tooltip.state(), TooltipState::Hidden);
    }

    #[test]
    fn fade_runs_in_and_out() {
        let t0 = Instant::now();
        let mut tooltip = shown(TooltipConfig::default(), t0);
        assert_eq!(tooltip.opacity(t0), 0.0);
        assert!(tooltip.is_animating(ms(t0, 100)));
        assert!((tooltip.opacity(ms(t0, 400)) - 1.0).abs() < 1e-6);
        assert!(!tooltip.is_animating(ms(t0, 400)));

        tooltip.hide(ms(t0, 400));
        assert_eq!(tooltip.state(), TooltipState::AnimatingOut);
        tooltip.tick(ms(t0, 450));
        assert_eq!(tooltip.state(), TooltipState::AnimatingOut);
        tooltip.tick(ms(t0, 900));
        assert_eq!(tooltip.state(), TooltipState::Hidden);
        assert_eq!(tooltip.opacity(ms(t0, 900)), 0.0);
    }

    #[test]
    fn showing_while_fading_out_turns_back_in() {
        let t0 = Instant::now();
        let mut tooltip = shown(TooltipConfig::default(), t0);
        tooltip.hide(ms(t0, 400));
        assert!(!tooltip.show(ms(t0, 450)));
        assert_eq!(tooltip.state(), TooltipState::AnimatingIn);
    }

    #[test]
    fn identity_transition_skips_the_fade() {
        let t0 = Instant::now();
        let config =
            TooltipConfig::default().transition(Transition::Identity);
        let mut tooltip = shown(config, t0);
        assert_eq!(tooltip.opacity(t0), 1.0);
        tooltip.hide(t0);
        assert_eq!(tooltip.state(), TooltipState::Hidden);
    }

    #[test]
    fn cached_content_size_skips_remeasuring() {
        let t0 = Instant::now();
        let mut tooltip = shown(TooltipConfig::default(), t0);
        tooltip.detach();
        tooltip.show(t0);
        tooltip.anchor_measured(Some(bounds()), t0);
        assert_eq!(tooltip.state(), TooltipState::AnimatingIn);
    }

    #[test]
    fn hiding_stops_the_nudge() {
        let t0 = Instant::now();
        let mut tooltip = shown(nudging(), t0);
        assert!(tooltip.nudge().is_cycling());
        for t in (0..1050).step_by(16) {
            tooltip.tick(ms(t0, t));
        }
        tooltip.hide(ms(t0, 1050));
        assert!(!tooltip.nudge().is_cycling());
        for t in (1050..4000).step_by(16) {
            tooltip.tick(ms(t0, t));
            assert_eq!(tooltip.nudge_offset(ms(t0, t)), 0.0);
        }
    }

    #[test]
    fn detach_stops_everything_at_once() {
        let t0 = Instant::now();
        let mut tooltip = shown(nudging(), t0);
        tooltip.detach();
        assert_eq!(tooltip.state(), TooltipState::Hidden);
        assert!(!tooltip.nudge().is_cycling());
        assert!(tooltip.anchor().is_none());
        assert!(!tooltip.is_animating(t0));
    }

    #[test]
    fn reconfigure_toggles_the_nudge_while_visible() {
        let t0 = Instant::now();
        let mut tooltip = shown(TooltipConfig::default(), t0);
        assert!(!tooltip.nudge().is_cycling());

        tooltip.reconfigure(nudging(), ms(t0, 10));
        assert!(tooltip.nudge().is_cycling());

        tooltip.reconfigure(TooltipConfig::default(), ms(t0, 20));
        assert!(!tooltip.nudge().is_cycling());
    }

    #[test]
    fn layout_uses_the_measured_geometry() {
        let t0 = Instant::now();
        let config = TooltipConfig::default().side(crate::side::Side::Top);
        let tooltip = shown(config, t0);
        let (measured, layout) = tooltip
            .layout(Size::new(390.0, 844.0), Insets::ZERO, t0)
            .unwrap();
        assert_eq!(measured.content, Size::new(120.0, 40.0));
        assert_eq!(layout.body, iced::Vector::new(-35.0, -54.0));
    }

    #[test]
    fn unmeasured_anchor_has_no_layout() {
        let tooltip = Tooltip::default();
        assert!(
            tooltip
                .layout(Size::new(390.0, 844.0), Insets::ZERO, Instant::now())
                .is_none()
        );
    }
}
