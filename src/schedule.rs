//! Which periodic timers exist for a given screen and mode, and the
//! battery-rise heuristic the dashboard's charging indicator runs on.

use std::time::{Duration, Instant};

use crate::navigation::Route;

pub const ENVIRONMENT_REFRESH: Duration = Duration::from_secs(5);
pub const CHARGING_PROBE: Duration = Duration::from_secs(5);
pub const ANIMATION_FRAME: Duration = Duration::from_millis(33);
/// How long the charging indicator stays on after a rise.
pub const CHARGING_WINDOW: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    EnvironmentRefresh,
    ChargingProbe,
    ThemeRefresh,
    Animation,
}

/// `theme_refresh` is [`ThemeStore::refresh_interval`](crate::theme_store::ThemeStore::refresh_interval).
pub fn active_timers(route: Route, theme_refresh: Option<Duration>, animating: bool) -> Vec<(TimerKind, Duration)> {
    let mut timers = Vec::with_capacity(4);
    if matches!(route, Route::Dashboard | Route::Recommendations | Route::Habits) {
        timers.push((TimerKind::EnvironmentRefresh, ENVIRONMENT_REFRESH));
    }
    if route == Route::Dashboard {
        timers.push((TimerKind::ChargingProbe, CHARGING_PROBE));
    }
    if let Some(period) = theme_refresh {
        timers.push((TimerKind::ThemeRefresh, period));
    }
    if animating {
        timers.push((TimerKind::Animation, ANIMATION_FRAME));
    }
    timers
}

/// Infers "charging" from successive battery readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChargingProbe {
    last_level: Option<u8>,
    charging_until: Option<Instant>,
}

impl ChargingProbe {
    /// Feed a reading. A rise, or a full battery, (re)opens the window;
    /// any other reading closes it.
    pub fn observe(&mut self, battery: u8, at: Instant) {
        let rose = self.last_level.is_some_and(|prev| battery > prev);
        self.charging_until = (rose || battery == 100).then(|| at + CHARGING_WINDOW);
        self.last_level = Some(battery);
    }

    pub fn is_charging(&self, at: Instant) -> bool {
        self.charging_until.is_some_and(|until| at < until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::ThemeName;
    use crate::theme_store::{ThemeMode, ThemeStore};
    use chrono::{Local, TimeZone};

    fn refresh(mode: ThemeMode) -> Option<Duration> {
        let now = Local.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).earliest().unwrap();
        let mut store = ThemeStore::new(now);
        store.set_mode(mode, now);
        store.refresh_interval()
    }

    fn kinds(timers: &[(TimerKind, Duration)]) -> Vec<TimerKind> {
        timers.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn test_dashboard_auto() {
        let timers = active_timers(Route::Dashboard, refresh(ThemeMode::Auto), false);
        assert_eq!(
            kinds(&timers),
            vec![TimerKind::EnvironmentRefresh, TimerKind::ChargingProbe, TimerKind::ThemeRefresh]
        );
        assert_eq!(timers[2].1, Duration::from_secs(60));
    }

    #[test]
    fn test_recommendations_fixed() {
        let fixed = refresh(ThemeMode::Fixed(ThemeName::Day));
        for route in [Route::Recommendations, Route::Habits] {
            assert_eq!(kinds(&active_timers(route, fixed, false)), vec![TimerKind::EnvironmentRefresh]);
        }
    }

    #[test]
    fn test_other_routes_have_no_polling() {
        let fixed = refresh(ThemeMode::Fixed(ThemeName::Night));
        for route in [Route::Goals, Route::Settings, Route::Carbon] {
            assert!(active_timers(route, fixed, false).is_empty());
        }
        let timers = active_timers(Route::Carbon, fixed, true);
        assert_eq!(timers, vec![(TimerKind::Animation, ANIMATION_FRAME)]);
    }

    #[test]
    fn test_probe_window_resets_rather_than_stacks() {
        let t0 = Instant::now();
        let mut probe = ChargingProbe::default();
        probe.observe(50, t0);
        assert!(!probe.is_charging(t0));

        probe.observe(55, t0 + Duration::from_secs(5));
        assert!(probe.is_charging(t0 + Duration::from_secs(14)));
        assert!(!probe.is_charging(t0 + Duration::from_secs(15)));

        probe.observe(60, t0 + Duration::from_secs(10));
        // Window now ends at 20 s, not 25 s.
        assert!(probe.is_charging(t0 + Duration::from_secs(19)));
        assert!(!probe.is_charging(t0 + Duration::from_secs(20)));
    }

    #[test]
    fn test_probe_full_battery_counts_as_charging() {
        let t0 = Instant::now();
        let mut probe = ChargingProbe::default();
        probe.observe(100, t0);
        assert!(probe.is_charging(t0));
        probe.observe(100, t0 + Duration::from_secs(5));
        assert!(probe.is_charging(t0 + Duration::from_secs(14)));
    }

    #[test]
    fn test_probe_flat_or_falling_reading_closes_window() {
        let t0 = Instant::now();
        let mut probe = ChargingProbe::default();
        probe.observe(40, t0);
        probe.observe(45, t0 + Duration::from_secs(5));
        assert!(probe.is_charging(t0 + Duration::from_secs(6)));

        probe.observe(30, t0 + Duration::from_secs(10));
        assert!(!probe.is_charging(t0 + Duration::from_secs(11)));

        probe.observe(35, t0 + Duration::from_secs(15));
        probe.observe(35, t0 + Duration::from_secs(20));
        assert!(!probe.is_charging(t0 + Duration::from_secs(21)));
    }
}
