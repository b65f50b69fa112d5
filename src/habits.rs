//! Digital habits: how the day splits across apps, motion and networks.

use crate::chart::Datum;
use crate::mock_data::{AppUsage, EnvironmentState, NetworkType};
use crate::recommendations::is_in_motion;
use crate::theme::Palette;

/// App names longer than this are cut on the chart axis.
pub const APP_LABEL_CHARS: usize = 10;
/// Rows in the compact list shown while moving.
pub const TOP_APPS_IN_MOTION: usize = 3;

pub const MOBILE_DATA_WARNING: &str = "⚠️ Mobile data increases energy consumption.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Blue,
    Green,
    Red,
    Yellow,
}

impl Tone {
    fn color(self, p: &Palette) -> iced::Color {
        match self {
            Tone::Blue => p.blue,
            Tone::Green => p.green,
            Tone::Red => p.red,
            Tone::Yellow => p.yellow,
        }
    }
}

/// Percent of the day in each motion state.
const MOTION_PATTERN: [(&str, f32, Tone); 3] = [
    ("Stationary", 60.0, Tone::Blue),
    ("Walking", 30.0, Tone::Green),
    ("Running", 10.0, Tone::Red),
];

/// Percent of traffic per network.
const NETWORK_PATTERN: [(&str, f32, Tone); 2] = [("WiFi", 70.0, Tone::Green), ("Mobile Data", 30.0, Tone::Yellow)];

fn pattern_data(pattern: &[(&str, f32, Tone)], p: &Palette) -> Vec<Datum> {
    pattern
        .iter()
        .map(|(name, pct, tone)| Datum::new(*name, *pct, tone.color(p)))
        .collect()
}

pub fn motion_pattern(p: &Palette) -> Vec<Datum> {
    pattern_data(&MOTION_PATTERN, p)
}

pub fn network_pattern(p: &Palette) -> Vec<Datum> {
    pattern_data(&NETWORK_PATTERN, p)
}

/// "Stationary 60%, Walking 30%, ..." for the screen-reader caption.
pub fn pattern_summary(data: &[Datum]) -> String {
    data.iter()
        .map(|d| format!("{} {:.0}%", d.label, d.value))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Axis label: the first ten characters, then "...".
pub fn short_app_name(name: &str) -> String {
    if name.chars().count() > APP_LABEL_CHARS {
        let head: String = name.chars().take(APP_LABEL_CHARS).collect();
        format!("{head}...")
    } else {
        name.to_string()
    }
}

pub fn app_usage_data(usage: &[AppUsage], p: &Palette) -> Vec<Datum> {
    usage
        .iter()
        .map(|u| Datum::new(short_app_name(&u.app_name), u.duration as f32, p.green))
        .collect()
}

/// Longest sessions first, capped for the in-motion list.
pub fn top_apps(usage: &[AppUsage]) -> Vec<&AppUsage> {
    let mut sorted: Vec<&AppUsage> = usage.iter().collect();
    sorted.sort_by(|a, b| b.duration.cmp(&a.duration));
    sorted.truncate(TOP_APPS_IN_MOTION);
    sorted
}

pub fn shows_mobile_data_warning(env: &EnvironmentState) -> bool {
    env.network_type == NetworkType::MobileData
}

/// The per-app detail list is hidden while the user is moving.
pub fn shows_usage_details(env: &EnvironmentState) -> bool {
    !is_in_motion(env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_data::{get_app_usage, LightLevel, MotionState};
    use crate::theme::{build_palette, ThemeName};

    fn env(network_type: NetworkType, motion_state: MotionState) -> EnvironmentState {
        EnvironmentState {
            network_type,
            motion_state,
            light_level: LightLevel::Bright,
            battery_level: 60,
        }
    }

    #[test]
    fn test_short_app_name() {
        assert_eq!(short_app_name("Video Streaming"), "Video Stre...");
        assert_eq!(short_app_name("Browser"), "Browser");
        assert_eq!(short_app_name("Messaging!"), "Messaging!");
    }

    #[test]
    fn test_patterns_sum_to_whole() {
        let p = build_palette(ThemeName::Day, false);
        let motion = motion_pattern(&p);
        assert_eq!(motion.iter().map(|d| d.value).sum::<f32>(), 100.0);
        assert_eq!(motion[2].color, p.red);
        let network = network_pattern(&p);
        assert_eq!(network.iter().map(|d| d.value).sum::<f32>(), 100.0);
        assert_eq!(pattern_summary(&network), "WiFi 70%, Mobile Data 30%");
    }

    #[test]
    fn test_usage_chart_and_top_apps() {
        let p = build_palette(ThemeName::Night, false);
        let usage = get_app_usage();
        let data = app_usage_data(&usage, &p);
        assert_eq!(data.len(), usage.len());
        assert!(data.iter().all(|d| d.label.chars().count() <= APP_LABEL_CHARS + 3));

        let top = top_apps(&usage);
        assert_eq!(top.len(), TOP_APPS_IN_MOTION);
        assert!(top.windows(2).all(|w| w[0].duration >= w[1].duration));
        assert_eq!(top[0].app_name, "Social Media");
    }

    #[test]
    fn test_environment_gates() {
        let walking_mobile = env(NetworkType::MobileData, MotionState::Walking);
        assert!(shows_mobile_data_warning(&walking_mobile));
        assert!(!shows_usage_details(&walking_mobile));

        let still_wifi = env(NetworkType::WiFi, MotionState::Stationary);
        assert!(!shows_mobile_data_warning(&still_wifi));
        assert!(shows_usage_details(&still_wifi));
    }
}
