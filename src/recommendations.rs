use iced::Color;

use crate::mock_data::{ChargerType, ChargingSession, EnvironmentState, MotionState, NetworkType};
use crate::theme::{ThemeName, GREEN, RED, YELLOW};

const MOTION_PREVIEW_CHARS: usize = 80;

pub const QUICK_TIPS: [&str; 4] = [
    "Charge between 20-80% for optimal emissions",
    "Switch to WiFi at home when possible",
    "Avoid fast-charging late at night",
    "Charge during sunlight hours for greener grid energy",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Priority::High => RED,
            Priority::Medium => YELLOW,
            Priority::Low => GREEN,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub priority: Priority,
    pub icon: &'static str,
}

impl Recommendation {
    pub fn observation_label(&self) -> String {
        format!("recommendation-{}", self.priority.label())
    }

    /// Shortened while the user is on the move.
    pub fn display_description(&self, in_motion: bool) -> String {
        if in_motion {
            let head: String = self.description.chars().take(MOTION_PREVIEW_CHARS).collect();
            format!("{head}...")
        } else {
            self.description.to_string()
        }
    }
}

pub fn is_in_motion(env: &EnvironmentState) -> bool {
    env.motion_state != MotionState::Stationary
}

/// Header line under the theme name.
pub fn theme_summary(theme: ThemeName) -> &'static str {
    match theme {
        ThemeName::Night => "Overnight charging creates higher peak-load emissions.",
        ThemeName::Morning => "Plan your charging for the day.",
        ThemeName::Day => "Your highest carbon emissions happen around lunch.",
        ThemeName::Evening => "You tend to fast-charge at night. Here's how to reduce emissions.",
    }
}

pub fn build_recommendations(
    theme: ThemeName,
    sessions: &[ChargingSession],
    env: &EnvironmentState,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    match theme {
        ThemeName::Night => recs.push(Recommendation {
            id: "night-1",
            title: "Avoid Overnight Charging",
            description: "Overnight charging creates higher peak-load emissions. Try charging during daylight hours when the grid uses more renewable energy.",
            priority: Priority::High,
            icon: "🌙",
        }),
        ThemeName::Morning => recs.push(Recommendation {
            id: "morning-1",
            title: "Plan Your Charging",
            description: "Plan your charging for the day. Aim to charge between 20-80% for optimal emissions and battery health.",
            priority: Priority::Medium,
            icon: "☀️",
        }),
        _ => {}
    }

    if !sessions.is_empty() {
        let avg = sessions.iter().map(|s| s.start_percent as f64).sum::<f64>() / sessions.len() as f64;
        if avg < 15.0 {
            recs.push(Recommendation {
                id: "behavior-1",
                title: "Charge Earlier",
                description: "Your typical charging level is below 15%, which causes battery strain and increases carbon emissions. Try charging when battery is between 20-80%.",
                priority: Priority::High,
                icon: "⚠️",
            });
        }

        let fast = sessions.iter().filter(|s| s.charger_type == ChargerType::Fast).count();
        if fast as f64 > sessions.len() as f64 * 0.5 {
            recs.push(Recommendation {
                id: "behavior-2",
                title: "Reduce Fast-Charging",
                description: "You use fast-charging frequently. While convenient, it increases CO₂ emissions. Use slow charging when time permits.",
                priority: Priority::Medium,
                icon: "🌀",
            });
        }
    }

    if env.network_type == NetworkType::MobileData {
        recs.push(Recommendation {
            id: "network-1",
            title: "Switch to WiFi",
            description: "Mobile data increases energy consumption. Switch to WiFi at home to reduce your carbon footprint.",
            priority: Priority::High,
            icon: "📶",
        });
    }

    recs.push(Recommendation {
        id: "general-1",
        title: "Optimal Charging Range",
        description: "Charge between 20-80% for optimal emissions. This range is most efficient and better for battery health.",
        priority: Priority::Low,
        icon: "🌿",
    });

    if theme == ThemeName::Day {
        recs.push(Recommendation {
            id: "general-2",
            title: "Charge During Sunlight Hours",
            description: "Charging during sunlight hours (10 AM - 6 PM) often uses greener grid energy with more renewable sources.",
            priority: Priority::Medium,
            icon: "☀️",
        });
    }

    recs
}
