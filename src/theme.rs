use iced::Color;
use serde::{Deserialize, Serialize};

// ─── THEME NAMES ────────────────────────────────────────────────

/// Time-of-day theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    Night,
    Morning,
    Day,
    Evening,
}

impl ThemeName {
    pub const ALL: &[ThemeName] = &[
        ThemeName::Night,
        ThemeName::Morning,
        ThemeName::Day,
        ThemeName::Evening,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ThemeName::Night => "night",
            ThemeName::Morning => "morning",
            ThemeName::Day => "day",
            ThemeName::Evening => "evening",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ThemeName::Night => "Night Mode",
            ThemeName::Morning => "Morning Mode",
            ThemeName::Day => "Day Mode",
            ThemeName::Evening => "Evening Mode",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            ThemeName::Night => "🌙",
            ThemeName::Morning => "🌅",
            ThemeName::Day => "☀️",
            ThemeName::Evening => "🌆",
        }
    }

    pub fn parse(name: &str) -> Option<ThemeName> {
        ThemeName::ALL.iter().copied().find(|t| t.name() == name)
    }

    /// Light themes get iced's light base theme for native widgets.
    pub fn is_light(&self) -> bool {
        matches!(self, ThemeName::Morning | ThemeName::Day)
    }
}

/// Resolve the theme for an hour of the day.
/// `[22,6)` night, `[6,10)` morning, `[10,18)` day, `[18,22)` evening.
pub fn theme_for_hour(hour: u32) -> ThemeName {
    match hour % 24 {
        6..=9 => ThemeName::Morning,
        10..=17 => ThemeName::Day,
        18..=21 => ThemeName::Evening,
        _ => ThemeName::Night,
    }
}

// ─── COLOR TOKENS ───────────────────────────────────────────────

pub const GREEN: Color = hex(0x37, 0xc6, 0x6d);
pub const YELLOW: Color = hex(0xff, 0xcf, 0x4a);
pub const RED: Color = hex(0xe8, 0x47, 0x47);
pub const BLUE: Color = hex(0x4a, 0x90, 0xe2);

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThemeBackground {
    Solid(Color),
    /// Linear gradient at `angle_deg` from `from` to `to`.
    Gradient { from: Color, to: Color, angle_deg: f32 },
}

impl ThemeBackground {
    /// Flat approximation used where a gradient cannot be drawn.
    pub fn base(&self) -> Color {
        match *self {
            ThemeBackground::Solid(c) => c,
            ThemeBackground::Gradient { from, to, .. } => Color::from_rgb(
                (from.r + to.r) / 2.0,
                (from.g + to.g) / 2.0,
                (from.b + to.b) / 2.0,
            ),
        }
    }
}

/// Fixed color record for one theme.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThemeColors {
    pub background: ThemeBackground,
    pub card_background: Color,
    pub text: Color,
    pub text_secondary: Color,
    pub border: Color,
    pub accent: Color,
}

pub fn theme_colors(theme: ThemeName) -> ThemeColors {
    match theme {
        ThemeName::Night => ThemeColors {
            background:      ThemeBackground::Solid(hex(0x0a, 0x0f, 0x1c)),
            card_background: hex(0x0b, 0x1b, 0x2b),
            text:            hex(0xf4, 0xf4, 0xf4),
            text_secondary:  hex(0xa0, 0xa0, 0xa0),
            border:          hex(0x1a, 0x1c, 0x1f),
            accent:          GREEN,
        },
        ThemeName::Morning => ThemeColors {
            background: ThemeBackground::Gradient {
                from: hex(0xff, 0xe5, 0xb4),
                to: hex(0xff, 0xd8, 0x9b),
                angle_deg: 135.0,
            },
            card_background: hex(0xff, 0xff, 0xff),
            text:            hex(0x2c, 0x2c, 0x2c),
            text_secondary:  hex(0x66, 0x66, 0x66),
            border:          hex(0xe0, 0xe0, 0xe0),
            accent:          GREEN,
        },
        ThemeName::Day => ThemeColors {
            background:      ThemeBackground::Solid(hex(0xf4, 0xf4, 0xf4)),
            card_background: hex(0xff, 0xff, 0xff),
            text:            hex(0x1a, 0x1c, 0x1f),
            text_secondary:  hex(0x66, 0x66, 0x66),
            border:          hex(0xe0, 0xe0, 0xe0),
            accent:          GREEN,
        },
        ThemeName::Evening => ThemeColors {
            background: ThemeBackground::Gradient {
                from: hex(0x6b, 0x5b, 0x95),
                to: hex(0x4a, 0x4a, 0x6a),
                angle_deg: 135.0,
            },
            card_background: hex(0xff, 0xff, 0xff),
            text:            hex(0xf4, 0xf4, 0xf4),
            text_secondary:  hex(0xb0, 0xb0, 0xb0),
            border:          hex(0x4a, 0x4a, 0x6a),
            accent:          GREEN,
        },
    }
}

// ─── THRESHOLD LADDERS ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmissionLevel {
    Low,
    Moderate,
    High,
}

impl EmissionLevel {
    pub fn label(&self) -> &'static str {
        match self {
            EmissionLevel::Low => "Low",
            EmissionLevel::Moderate => "Moderate",
            EmissionLevel::High => "High",
        }
    }
}

pub fn emission_level(grams: f64) -> EmissionLevel {
    if grams < 10.0 {
        EmissionLevel::Low
    } else if grams < 20.0 {
        EmissionLevel::Moderate
    } else {
        EmissionLevel::High
    }
}

pub fn emission_color(grams: f64) -> Color {
    match emission_level(grams) {
        EmissionLevel::Low => GREEN,
        EmissionLevel::Moderate => YELLOW,
        EmissionLevel::High => RED,
    }
}

pub fn battery_color(percent: u8) -> Color {
    if percent < 10 {
        RED
    } else if percent < 20 {
        YELLOW
    } else {
        GREEN
    }
}

pub fn charging_start_color(start_percent: u8) -> Color {
    if start_percent < 15 {
        RED
    } else if start_percent < 30 {
        YELLOW
    } else if start_percent < 80 {
        GREEN
    } else {
        BLUE
    }
}

// ─── PALETTE ────────────────────────────────────────────────────

/// All semantic colors the shell uses, derived from the theme tokens.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub background: ThemeBackground,
    pub bg: Color,
    pub card_bg: Color,
    /// Text drawn on top of cards. Evening keeps white cards with light
    /// page text, so card text is picked separately.
    pub card_text: Color,
    pub text: Color,
    pub label: Color,
    pub border: Color,
    pub accent: Color,
    pub bar_bg: Color,
    pub green: Color,
    pub yellow: Color,
    pub red: Color,
    pub blue: Color,
    pub purple: Color,
}

pub fn build_palette(theme: ThemeName, high_contrast: bool) -> Palette {
    if high_contrast {
        return high_contrast_palette();
    }
    let c = theme_colors(theme);
    let card_text = if luminance(c.card_background) > 0.5 {
        hex(0x1a, 0x1c, 0x1f)
    } else {
        c.text
    };
    Palette {
        background: c.background,
        bg: c.background.base(),
        card_bg: c.card_background,
        card_text,
        text: c.text,
        label: c.text_secondary,
        border: c.border,
        accent: c.accent,
        bar_bg: Color::from_rgba(0.5, 0.5, 0.5, 0.2),
        green: GREEN,
        yellow: YELLOW,
        red: RED,
        blue: BLUE,
        purple: hex(0x8b, 0x5c, 0xf6),
    }
}

fn high_contrast_palette() -> Palette {
    let black = hex(0x00, 0x00, 0x00);
    let white = hex(0xff, 0xff, 0xff);
    let yellow = hex(0xff, 0xff, 0x00);
    Palette {
        background: ThemeBackground::Solid(black),
        bg: black,
        card_bg: black,
        card_text: white,
        text: white,
        label: white,
        border: white,
        accent: yellow,
        bar_bg: hex(0x40, 0x40, 0x40),
        green: hex(0x00, 0xff, 0x00),
        yellow,
        red: hex(0xff, 0x40, 0x40),
        blue: hex(0x00, 0xff, 0xff),
        purple: hex(0xff, 0x80, 0xff),
    }
}

fn luminance(c: Color) -> f32 {
    0.2126 * c.r + 0.7152 * c.g + 0.0722 * c.b
}

const fn hex(r: u8, g: u8, b: u8) -> Color {
    Color::from_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hours_partition_the_day() {
        let mut counts = std::collections::HashMap::new();
        for hour in 0..24 {
            *counts.entry(theme_for_hour(hour)).or_insert(0) += 1;
        }
        assert_eq!(counts[&ThemeName::Night], 8);
        assert_eq!(counts[&ThemeName::Morning], 4);
        assert_eq!(counts[&ThemeName::Day], 8);
        assert_eq!(counts[&ThemeName::Evening], 4);
    }

    #[test]
    fn test_theme_boundaries() {
        assert_eq!(theme_for_hour(5), ThemeName::Night);
        assert_eq!(theme_for_hour(6), ThemeName::Morning);
        assert_eq!(theme_for_hour(9), ThemeName::Morning);
        assert_eq!(theme_for_hour(10), ThemeName::Day);
        assert_eq!(theme_for_hour(17), ThemeName::Day);
        assert_eq!(theme_for_hour(18), ThemeName::Evening);
        assert_eq!(theme_for_hour(21), ThemeName::Evening);
        assert_eq!(theme_for_hour(22), ThemeName::Night);
        assert_eq!(theme_for_hour(0), ThemeName::Night);
    }

    #[test]
    fn test_emission_ladder() {
        assert_eq!(emission_color(9.99), GREEN);
        assert_eq!(emission_color(10.0), YELLOW);
        assert_eq!(emission_color(19.99), YELLOW);
        assert_eq!(emission_color(20.0), RED);
        assert_eq!(emission_level(0.0), EmissionLevel::Low);
        assert_eq!(emission_level(10.0), EmissionLevel::Moderate);
        assert_eq!(emission_level(25.0).label(), "High");
    }

    #[test]
    fn test_battery_and_start_ladders() {
        assert_eq!(battery_color(9), RED);
        assert_eq!(battery_color(10), YELLOW);
        assert_eq!(battery_color(20), GREEN);
        assert_eq!(charging_start_color(14), RED);
        assert_eq!(charging_start_color(15), YELLOW);
        assert_eq!(charging_start_color(30), GREEN);
        assert_eq!(charging_start_color(79), GREEN);
        assert_eq!(charging_start_color(80), BLUE);
    }

    #[test]
    fn test_gradient_themes() {
        assert!(matches!(theme_colors(ThemeName::Morning).background, ThemeBackground::Gradient { .. }));
        assert!(matches!(theme_colors(ThemeName::Day).background, ThemeBackground::Solid(_)));
        for t in ThemeName::ALL {
            assert_eq!(theme_colors(*t).accent, GREEN);
            assert_eq!(ThemeName::parse(t.name()), Some(*t));
        }
    }

    #[test]
    fn test_evening_card_text_is_readable() {
        let p = build_palette(ThemeName::Evening, false);
        assert!(luminance(p.card_text) < 0.5);
        let hc = build_palette(ThemeName::Day, true);
        assert_eq!(hc.bg, hex(0, 0, 0));
    }
}
