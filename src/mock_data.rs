//! Synthetic charging, environment and app-usage data.
//!
//! Every generator takes its random source and the current time explicitly,
//! so a seeded `StdRng` plus a fixed `now` reproduces a dataset exactly.

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Timelike};
use rand::Rng;

use crate::theme::{theme_for_hour, ThemeName};

pub const SESSION_COUNT: usize = 20;
/// Insights look at no more than this many of the most recent sessions.
pub const INSIGHT_WINDOW: usize = 30;

// ─── TYPES ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChargerType {
    Fast,
    Slow,
    Wireless,
}

impl ChargerType {
    pub const ALL: [ChargerType; 3] = [ChargerType::Fast, ChargerType::Slow, ChargerType::Wireless];

    /// Grams of CO₂ per hour of charging.
    pub fn emission_rate(&self) -> f64 {
        match self {
            ChargerType::Fast => 2.5,
            ChargerType::Slow => 1.5,
            ChargerType::Wireless => 2.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChargerType::Fast => "Fast",
            ChargerType::Slow => "Slow",
            ChargerType::Wireless => "Wireless",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChargingSession {
    pub id: String,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub start_percent: u8,
    pub end_percent: u8,
    /// Minutes.
    pub duration: u32,
    pub charger_type: ChargerType,
    /// Grams, one decimal.
    pub co2_emitted: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkType {
    WiFi,
    MobileData,
}

impl NetworkType {
    pub fn label(&self) -> &'static str {
        match self {
            NetworkType::WiFi => "WiFi",
            NetworkType::MobileData => "Mobile Data",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionState {
    Stationary,
    Walking,
    // Part of the domain; the generator never produces it.
    Running,
}

impl MotionState {
    pub fn label(&self) -> &'static str {
        match self {
            MotionState::Stationary => "Stationary",
            MotionState::Walking => "Walking",
            MotionState::Running => "Running",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightLevel {
    Dim,
    Bright,
}

impl LightLevel {
    pub fn label(&self) -> &'static str {
        match self {
            LightLevel::Dim => "Dim",
            LightLevel::Bright => "Bright",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentState {
    pub network_type: NetworkType,
    pub motion_state: MotionState,
    pub light_level: LightLevel,
    pub battery_level: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppUsage {
    pub app_name: String,
    /// Minutes.
    pub duration: u32,
    pub category: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Breakdown {
    pub charging: f64,
    pub fast_charging: f64,
    pub network_type: f64,
    pub screen_brightness: f64,
}

impl Breakdown {
    pub fn entries(&self) -> [(&'static str, f64); 4] {
        [
            ("Charging", self.charging),
            ("Fast Charging", self.fast_charging),
            ("Network Type", self.network_type),
            ("Screen Brightness", self.screen_brightness),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CarbonData {
    /// Grams today, one decimal.
    pub today: f64,
    /// Seven daily sums, oldest first, ending today.
    pub weekly: [f64; 7],
    pub breakdown: Breakdown,
}

// ─── GENERATORS ─────────────────────────────────────────────────

pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Integer rounding with halves going up.
fn round_half_up(x: f64) -> i64 {
    (x + 0.5).floor() as i64
}

/// Local wall-clock time on `date`, falling back to `fallback` when the
/// time does not exist (DST gap).
fn local_at(date: NaiveDate, hour: u32, minute: u32, second: u32, fallback: DateTime<Local>) -> DateTime<Local> {
    date.and_hms_opt(hour, minute, second)
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .unwrap_or(fallback)
}

/// Twenty sessions, one per day going back from today, newest first.
pub fn generate_charging_sessions<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Local>) -> Vec<ChargingSession> {
    let mut sessions = Vec::with_capacity(SESSION_COUNT);

    for i in 0..SESSION_COUNT {
        let day = now.date_naive() - Duration::days(i as i64);
        let hour = rng.gen_range(0..24);
        let minute = rng.gen_range(0..60);
        let start_time = local_at(day, hour, minute, now.second(), now - Duration::days(i as i64));

        let duration: u32 = rng.gen_range(15..75);
        let end_time = start_time + Duration::minutes(duration as i64);

        let start_percent: u8 = rng.gen_range(5..55);
        let end_percent = (start_percent + rng.gen_range(20..80)).min(100);

        let charger_type = ChargerType::ALL[rng.gen_range(0..ChargerType::ALL.len())];
        let co2 = duration as f64 / 60.0 * charger_type.emission_rate();

        sessions.push(ChargingSession {
            id: format!("session-{i}"),
            start_time,
            end_time,
            start_percent,
            end_percent,
            duration,
            charger_type,
            co2_emitted: round1(co2),
        });
    }

    sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    sessions
}

fn sessions_on(sessions: &[ChargingSession], date: NaiveDate) -> impl Iterator<Item = &ChargingSession> {
    sessions.iter().filter(move |s| s.start_time.date_naive() == date)
}

/// Sessions that started on `now`'s local calendar date.
pub fn get_today_sessions(sessions: &[ChargingSession], now: DateTime<Local>) -> Vec<ChargingSession> {
    sessions_on(sessions, now.date_naive()).cloned().collect()
}

pub fn calculate_carbon_impact(sessions: &[ChargingSession], now: DateTime<Local>) -> CarbonData {
    let today_date = now.date_naive();
    let today: f64 = sessions_on(sessions, today_date).map(|s| s.co2_emitted).sum();
    let fast: f64 = sessions_on(sessions, today_date)
        .filter(|s| s.charger_type == ChargerType::Fast)
        .map(|s| s.co2_emitted)
        .sum();

    let mut weekly = [0.0; 7];
    for (k, slot) in weekly.iter_mut().enumerate() {
        let date = today_date - Duration::days(6 - k as i64);
        *slot = sessions_on(sessions, date).map(|s| s.co2_emitted).sum();
    }

    CarbonData {
        today: round1(today),
        weekly,
        breakdown: Breakdown {
            charging: today * 0.4,
            fast_charging: fast * 0.3,
            network_type: today * 0.2,
            screen_brightness: today * 0.1,
        },
    }
}

fn average_start(sessions: &[ChargingSession]) -> Option<f64> {
    if sessions.is_empty() {
        return None;
    }
    let sum: f64 = sessions.iter().map(|s| s.start_percent as f64).sum();
    Some(sum / sessions.len() as f64)
}

pub fn get_behavior_insights(sessions: &[ChargingSession], now: DateTime<Local>) -> Vec<String> {
    let today_count = sessions_on(sessions, now.date_naive()).count();
    let mut insights = vec![format!(
        "You charged {today_count} time{} today.",
        if today_count != 1 { "s" } else { "" }
    )];

    let recent = &sessions[..sessions.len().min(INSIGHT_WINDOW)];
    let Some(avg) = average_start(recent) else {
        return insights;
    };
    let rounded = round_half_up(avg);
    insights.push(if avg < 15.0 {
        format!("Your typical charging level is {rounded}% — this causes battery strain.")
    } else if avg > 80.0 {
        format!("You typically charge when above {rounded}% — consider waiting longer.")
    } else {
        format!("Your typical charging level is {rounded}% — good range!")
    });

    let fast = recent.iter().filter(|s| s.charger_type == ChargerType::Fast).count();
    let fast_percent = round_half_up(fast as f64 / recent.len() as f64 * 100.0);
    insights.push(format!("You use fast-charging {fast_percent}% of the time."));

    insights
}

pub fn get_current_environment<R: Rng + ?Sized>(rng: &mut R, now: DateTime<Local>) -> EnvironmentState {
    let battery_level: u8 = rng.gen_range(40..80);
    let network_type = if rng.gen::<f64>() > 0.3 {
        NetworkType::WiFi
    } else {
        NetworkType::MobileData
    };
    let motion_state = if rng.gen::<f64>() > 0.5 {
        MotionState::Stationary
    } else {
        MotionState::Walking
    };
    let light_level = if (6..20).contains(&now.hour()) {
        LightLevel::Bright
    } else {
        LightLevel::Dim
    };

    EnvironmentState {
        network_type,
        motion_state,
        light_level,
        battery_level,
    }
}

pub fn get_app_usage() -> Vec<AppUsage> {
    [
        ("Social Media", "Social", 120),
        ("Messaging", "Communication", 90),
        ("Browser", "Productivity", 60),
        ("Video Streaming", "Entertainment", 45),
        ("Music", "Entertainment", 30),
    ]
    .into_iter()
    .map(|(name, category, duration)| AppUsage {
        app_name: name.to_string(),
        duration,
        category: category.to_string(),
    })
    .collect()
}

pub fn get_time_based_theme(now: DateTime<Local>) -> ThemeName {
    theme_for_hour(now.hour())
}

pub fn get_time_based_insight(theme: ThemeName) -> &'static str {
    match theme {
        ThemeName::Night => "Night-time charging emits more CO₂ on peak grids in your region.",
        ThemeName::Morning => "You usually start your day at 45% battery.",
        ThemeName::Day => "Your highest carbon emissions happen around lunch.",
        ThemeName::Evening => "You tend to fast-charge at night. Here's how to reduce emissions.",
    }
}

/// Insight lookup by theme name. Unknown names yield an empty string.
pub fn insight_for_name(name: &str) -> &'static str {
    ThemeName::parse(name).map(get_time_based_insight).unwrap_or("")
}

// ─── CHARGING BEHAVIOUR ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartBucket {
    Critical,
    Low,
    Healthy,
    High,
}

impl StartBucket {
    pub const ALL: [StartBucket; 4] = [
        StartBucket::Critical,
        StartBucket::Low,
        StartBucket::Healthy,
        StartBucket::High,
    ];

    pub fn of(start_percent: u8) -> StartBucket {
        if start_percent < 15 {
            StartBucket::Critical
        } else if start_percent < 30 {
            StartBucket::Low
        } else if start_percent < 80 {
            StartBucket::Healthy
        } else {
            StartBucket::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StartBucket::Critical => "<15%",
            StartBucket::Low => "15-30%",
            StartBucket::Healthy => "30-80%",
            StartBucket::High => ">80%",
        }
    }
}

/// Session counts per start bucket, in [`StartBucket::ALL`] order.
pub fn start_percent_distribution(sessions: &[ChargingSession]) -> [(StartBucket, usize); 4] {
    StartBucket::ALL.map(|bucket| {
        let count = sessions
            .iter()
            .filter(|s| StartBucket::of(s.start_percent) == bucket)
            .count();
        (bucket, count)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BehaviourFlags {
    pub battery_anxiety: bool,
    pub fast_charge_heavy: bool,
    pub eco_charging: bool,
    pub partial_charging: bool,
}

pub fn behaviour_flags(sessions: &[ChargingSession]) -> BehaviourFlags {
    let Some(avg) = average_start(sessions) else {
        return BehaviourFlags::default();
    };
    let n = sessions.len() as f64;
    let count = |pred: &dyn Fn(&ChargingSession) -> bool| sessions.iter().filter(|s| pred(s)).count() as f64;

    BehaviourFlags {
        battery_anxiety: count(&|s| s.start_percent < 15) > n * 0.3,
        fast_charge_heavy: count(&|s| s.charger_type == ChargerType::Fast) > n * 0.5,
        eco_charging: (20.0..=80.0).contains(&avg),
        partial_charging: count(&|s| s.end_percent < 80) > n * 0.5,
    }
}
