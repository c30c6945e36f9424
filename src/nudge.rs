use std::time::{Duration, Instant};

use lilt::Animated;

use crate::config::NudgeConfig;

/// Share of the period spent travelling out on each nudge.
const NUDGE_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NudgeState {
    Idle,
    Cycling { since: Instant, nudged: bool },
}

/// Periodic push away from the anchor. The offset rests at zero for one
/// period, eases out to the configured magnitude over a tenth of a period,
/// and eases back as the next cycle begins.
#[derive(Debug, Clone)]
pub struct Nudge {
    config: NudgeConfig,
    state: NudgeState,
    offset: Animated<bool, Instant>,
}

impl Nudge {
    pub fn new(config: NudgeConfig) -> Self {
        Self {
            offset: Self::fresh(&config),
            config,
            state: NudgeState::Idle,
        }
    }

    fn fresh(config: &NudgeConfig) -> Animated<bool, Instant> {
        let window = config.period.as_secs_f64() * NUDGE_FRACTION * 1000.0;
        Animated::new(false)
            .duration(window as f32)
            .easing(config.easing.into())
    }

    fn cycle(&self) -> Duration {
        self.config.period.mul_f64(1.0 + NUDGE_FRACTION)
    }

    pub fn state(&self) -> NudgeState {
        self.state
    }

    pub fn is_cycling(&self) -> bool {
        matches!(self.state, NudgeState::Cycling { .. })
    }

    /// Starts cycling from `now`. Does nothing when the animation is
    /// disabled, has no period, or is already running.
    pub fn start(&mut self, now: Instant) {
        if !self.config.enabled || self.config.period.is_zero() {
            return;
        }
        if self.is_cycling() {
            return;
        }
        self.state = NudgeState::Cycling {
            since: now,
            nudged: false,
        };
    }

    pub fn stop(&mut self) {
        self.state = NudgeState::Idle;
        self.offset = Self::fresh(&self.config);
    }

    pub fn reconfigure(&mut self, config: NudgeConfig) {
        if config == self.config {
            return;
        }
        self.config = config;
        self.stop();
    }

    /// Advances the cycle to `now`. Transitions are stamped with the instant
    /// their phase actually began, so late ticks do not stretch the cycle.
    pub fn tick(&mut self, now: Instant) {
        let NudgeState::Cycling { since, nudged } = self.state else {
            return;
        };

        let cycle = self.cycle().as_nanos();
        if cycle == 0 {
            return;
        }
        let elapsed = now.saturating_duration_since(since).as_nanos();
        let phase = (elapsed % cycle) as u64;
        let rest = self.config.period.as_nanos() as u64;

        let should = phase >= rest;
        if should == nudged {
            return;
        }

        let boundary = if should { rest } else { 0 };
        let began = now
            .checked_sub(Duration::from_nanos(phase - boundary))
            .unwrap_or(now);
        self.offset.transition(should, began);
        self.state = NudgeState::Cycling {
            since,
            nudged: should,
        };
    }

    pub fn offset(&self, now: Instant) -> f32 {
        if !self.is_cycling() {
            return 0.0;
        }
        self.offset.animate_bool(0.0, self.config.offset, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Easing;

    fn enabled() -> NudgeConfig {
        NudgeConfig {
            enabled: true,
            offset: 10.0,
            period: Duration::from_secs(1),
            easing: Easing::Linear,
        }
    }

    fn ms(t0: Instant, ms: u64) -> Instant {
        t0 + Duration::from_millis(ms)
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.05
    }

    /// Ticks every 10ms up to `until`, the way the host's frame timer would.
    fn run(nudge: &mut Nudge, t0: Instant, from: u64, until: u64) {
        for t in (from..=until).step_by(10) {
            nudge.tick(ms(t0, t));
        }
    }

    #[test]
    fn disabled_animation_never_starts() {
        let t0 = Instant::now();
        let mut nudge = Nudge::new(NudgeConfig::default());
        nudge.start(t0);
        assert_eq!(nudge.state(), NudgeState::Idle);
        run(&mut nudge, t0, 0, 3000);
        assert_eq!(nudge.offset(ms(t0, 1050)), 0.0);
    }

    #[test]
    fn zero_period_never_starts() {
        let t0 = Instant::now();
        let mut nudge = Nudge::new(NudgeConfig {
            period: Duration::ZERO,
            ..enabled()
        });
        nudge.start(t0);
        assert!(!nudge.is_cycling());
    }

    #[test]
    fn offset_rests_for_a_period_then_reaches_the_magnitude() {
        let t0 = Instant::now();
        let mut nudge = Nudge::new(enabled());
        nudge.start(t0);

        run(&mut nudge, t0, 0, 990);
        assert_eq!(nudge.offset(ms(t0, 990)), 0.0);

        run(&mut nudge, t0, 1000, 1050);
        assert!(approx(nudge.offset(ms(t0, 1050)), 5.0));
        assert!(approx(nudge.offset(ms(t0, 1100)), 10.0));
    }

    #[test]
    fn offset_returns_to_rest_and_repeats() {
        let t0 = Instant::now();
        let mut nudge = Nudge::new(enabled());
        nudge.start(t0);

        run(&mut nudge, t0, 0, 1300);
        assert!(approx(nudge.offset(ms(t0, 1300)), 0.0));

        run(&mut nudge, t0, 1310, 2190);
        assert!(approx(nudge.offset(ms(t0, 2200)), 10.0));
    }

    #[test]
    fn late_tick_is_stamped_at_the_phase_boundary() {
        let t0 = Instant::now();
        let mut nudge = Nudge::new(enabled());
        nudge.start(t0);

        nudge.tick(ms(t0, 1080));
        assert!(approx(nudge.offset(ms(t0, 1080)), 8.0));
    }

    #[test]
    fn stopping_freezes_the_offset_at_zero() {
        let t0 = Instant::now();
        let mut nudge = Nudge::new(enabled());
        nudge.start(t0);
        run(&mut nudge, t0, 0, 1050);
        assert!(nudge.offset(ms(t0, 1050)) > 0.0);

        nudge.stop();
        for t in (1050..5000).step_by(37) {
            nudge.tick(ms(t0, t));
            assert_eq!(nudge.offset(ms(t0, t)), 0.0);
        }
        assert_eq!(nudge.state(), NudgeState::Idle);
    }

    #[test]
    fn reconfiguring_to_disabled_stops_the_cycle() {
        let t0 = Instant::now();
        let mut nudge = Nudge::new(enabled());
        nudge.start(t0);
        nudge.reconfigure(NudgeConfig {
            enabled: false,
            ..enabled()
        });
        assert!(!nudge.is_cycling());

        nudge.start(t0);
        assert!(!nudge.is_cycling());
    }

    #[test]
    fn restarting_while_cycling_keeps_the_phase() {
        let t0 = Instant::now();
        let mut nudge = Nudge::new(enabled());
        nudge.start(t0);
        nudge.start(ms(t0, 500));
        assert_eq!(
            nudge.state(),
            NudgeState::Cycling {
                since: t0,
                nudged: false
            }
        );
    }
}
