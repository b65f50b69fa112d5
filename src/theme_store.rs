use std::time::Duration;

use chrono::{DateTime, Local, Timelike};

use crate::theme::{theme_for_hour, ThemeName};

pub const AUTO_REFRESH: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeMode {
    /// Follow the clock.
    Auto,
    Fixed(ThemeName),
}

impl ThemeMode {
    pub fn is_auto(&self) -> bool {
        matches!(self, ThemeMode::Auto)
    }
}

/// Current theme plus the mode that produced it. Lives for the session only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeStore {
    mode: ThemeMode,
    theme: ThemeName,
}

impl ThemeStore {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            mode: ThemeMode::Auto,
            theme: theme_for_hour(now.hour()),
        }
    }

    pub fn mode(&self) -> ThemeMode {
        self.mode
    }

    pub fn theme(&self) -> ThemeName {
        self.theme
    }

    pub fn set_mode(&mut self, mode: ThemeMode, now: DateTime<Local>) {
        self.mode = mode;
        self.theme = match mode {
            ThemeMode::Auto => theme_for_hour(now.hour()),
            ThemeMode::Fixed(theme) => theme,
        };
        tracing::debug!(?mode, theme = self.theme.name(), "theme mode changed");
    }

    /// Re-resolve from the clock. Returns true when the theme changed.
    pub fn refresh(&mut self, now: DateTime<Local>) -> bool {
        if !self.mode.is_auto() {
            return false;
        }
        let next = theme_for_hour(now.hour());
        let changed = next != self.theme;
        self.theme = next;
        changed
    }

    /// Period of the clock re-check, present only in auto mode.
    pub fn refresh_interval(&self) -> Option<Duration> {
        self.mode.is_auto().then_some(AUTO_REFRESH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 3, 12, hour, 15, 0)
            .earliest()
            .unwrap()
    }

    #[test]
    fn test_auto_follows_clock() {
        let mut store = ThemeStore::new(at(7));
        assert_eq!(store.theme(), ThemeName::Morning);
        assert!(store.refresh(at(12)));
        assert_eq!(store.theme(), ThemeName::Day);
        assert!(!store.refresh(at(13)));
    }

    #[test]
    fn test_fixed_mode_ignores_clock() {
        let mut store = ThemeStore::new(at(12));
        store.set_mode(ThemeMode::Fixed(ThemeName::Night), at(12));
        assert_eq!(store.theme(), ThemeName::Night);
        assert!(!store.refresh(at(19)));
        assert_eq!(store.theme(), ThemeName::Night);
        assert_eq!(store.refresh_interval(), None);
    }

    #[test]
    fn test_back_to_auto_resolves_immediately() {
        let mut store = ThemeStore::new(at(12));
        store.set_mode(ThemeMode::Fixed(ThemeName::Night), at(12));
        store.set_mode(ThemeMode::Auto, at(19));
        assert_eq!(store.theme(), ThemeName::Evening);
        assert_eq!(store.refresh_interval(), Some(Duration::from_secs(60)));
    }
}
