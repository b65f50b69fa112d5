use std::time::{Duration, Instant};

pub const COUNT_UP_DURATION: Duration = Duration::from_millis(1500);
pub const COUNT_UP_STEPS: u32 = 60;
pub const PAGE_FADE_DURATION: Duration = Duration::from_millis(300);
/// Vertical slide of a page while it fades in, in logical pixels.
pub const PAGE_FADE_OFFSET: f32 = 10.0;

/// Stepped count-up from zero to `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    target: f64,
    started: Instant,
}

impl Tween {
    pub fn new(target: f64, started: Instant) -> Self {
        Self { target, started }
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    fn step(&self, now: Instant) -> u32 {
        let interval = COUNT_UP_DURATION / COUNT_UP_STEPS;
        let elapsed = now.saturating_duration_since(self.started);
        (elapsed.as_nanos() / interval.as_nanos()).min(COUNT_UP_STEPS as u128) as u32
    }

    pub fn value_at(&self, now: Instant, disable_motion: bool) -> f64 {
        if disable_motion {
            return self.target;
        }
        let step = self.step(now);
        if step >= COUNT_UP_STEPS {
            return self.target;
        }
        let per_step = self.target / COUNT_UP_STEPS as f64;
        (per_step * step as f64).min(self.target)
    }

    pub fn is_finished(&self, now: Instant, disable_motion: bool) -> bool {
        disable_motion || self.step(now) >= COUNT_UP_STEPS
    }
}

/// Fade-and-slide applied to a page when the route changes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFade {
    started: Instant,
}

impl PageFade {
    pub fn new(started: Instant) -> Self {
        Self { started }
    }

    fn progress(&self, now: Instant) -> f32 {
        let t = now.saturating_duration_since(self.started).as_secs_f32() / PAGE_FADE_DURATION.as_secs_f32();
        let t = t.clamp(0.0, 1.0);
        // smoothstep
        t * t * (3.0 - 2.0 * t)
    }

    pub fn opacity_at(&self, now: Instant, disable_motion: bool) -> f32 {
        if disable_motion {
            1.0
        } else {
            self.progress(now)
        }
    }

    pub fn offset_at(&self, now: Instant, disable_motion: bool) -> f32 {
        if disable_motion {
            0.0
        } else {
            PAGE_FADE_OFFSET * (1.0 - self.progress(now))
        }
    }

    pub fn is_finished(&self, now: Instant, disable_motion: bool) -> bool {
        disable_motion || now.saturating_duration_since(self.started) >= PAGE_FADE_DURATION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tween_counts_up_in_steps() {
        let t0 = Instant::now();
        let tween = Tween::new(12.0, t0);
        assert_eq!(tween.value_at(t0, false), 0.0);
        // One step is 25 ms.
        let one = tween.value_at(t0 + Duration::from_millis(26), false);
        assert!((one - 0.2).abs() < 1e-9);
        let half = tween.value_at(t0 + Duration::from_millis(750), false);
        assert!((half - 6.0).abs() < 1e-9);
        assert_eq!(tween.value_at(t0 + COUNT_UP_DURATION, false), 12.0);
        assert!(tween.is_finished(t0 + Duration::from_secs(2), false));
        assert!(!tween.is_finished(t0, false));
    }

    #[test]
    fn test_tween_snaps_without_motion() {
        let t0 = Instant::now();
        let tween = Tween::new(7.5, t0);
        assert_eq!(tween.value_at(t0, true), 7.5);
        assert!(tween.is_finished(t0, true));
    }

    #[test]
    fn test_page_fade() {
        let t0 = Instant::now();
        let fade = PageFade::new(t0);
        assert_eq!(fade.opacity_at(t0, false), 0.0);
        assert_eq!(fade.offset_at(t0, false), PAGE_FADE_OFFSET);
        assert_eq!(fade.opacity_at(t0 + PAGE_FADE_DURATION, false), 1.0);
        assert_eq!(fade.offset_at(t0 + PAGE_FADE_DURATION, false), 0.0);
        assert_eq!(fade.opacity_at(t0, true), 1.0);
        assert!(fade.is_finished(t0, true));
    }
}
