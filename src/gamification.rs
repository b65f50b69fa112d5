//! Achievements, goals, challenges, the leaderboard and XP levelling.
//!
//! The catalogs are fixed demo content. Only dates depend on `now`.

use chrono::{DateTime, Days, Duration, Local, Months};
use iced::Color;

// ─── ACHIEVEMENTS ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AchievementCategory {
    Charging,
    Network,
    Streak,
    Carbon,
    Challenge,
}

impl AchievementCategory {
    pub const ALL: [AchievementCategory; 5] = [
        AchievementCategory::Charging,
        AchievementCategory::Network,
        AchievementCategory::Streak,
        AchievementCategory::Carbon,
        AchievementCategory::Challenge,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AchievementCategory::Charging => "Charging",
            AchievementCategory::Network => "Network",
            AchievementCategory::Streak => "Streak",
            AchievementCategory::Carbon => "Carbon",
            AchievementCategory::Challenge => "Challenge",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

impl Rarity {
    pub fn label(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
        }
    }

    /// Badge border colour.
    pub fn color(&self) -> Color {
        match self {
            Rarity::Common => Color::from_rgb8(0xd1, 0xd5, 0xdb),
            Rarity::Rare => Color::from_rgb8(0x60, 0xa5, 0xfa),
            Rarity::Epic => Color::from_rgb8(0xc0, 0x84, 0xfc),
            Rarity::Legendary => Color::from_rgb8(0xfa, 0xcc, 0x15),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub category: AchievementCategory,
    pub rarity: Rarity,
    pub points: u32,
    pub unlocked: bool,
    pub unlocked_date: Option<DateTime<Local>>,
    /// 0-100.
    pub progress: u8,
    pub target: u32,
}

pub fn generate_achievements(now: DateTime<Local>) -> Vec<Achievement> {
    use AchievementCategory as C;
    use Rarity as R;

    let locked = |id, name, description, icon, category, rarity, points, progress, target| Achievement {
        id,
        name,
        description,
        icon,
        category,
        rarity,
        points,
        unlocked: false,
        unlocked_date: None,
        progress,
        target,
    };
    let unlocked = |id, name, description, icon, category, rarity, points, days_ago: i64, target| Achievement {
        id,
        name,
        description,
        icon,
        category,
        rarity,
        points,
        unlocked: true,
        unlocked_date: Some(now - Duration::days(days_ago)),
        progress: 100,
        target,
    };

    vec![
        locked("eco-warrior", "Eco Warrior", "Reduce CO₂ emissions by 50g in a week", "🌿", C::Carbon, R::Rare, 100, 65, 50),
        locked("night-charger", "Night Charger", "Avoid charging during peak hours (22:00-06:00) for 7 days", "🌙", C::Charging, R::Epic, 150, 42, 7),
        unlocked("wifi-master", "WiFi Master", "Use WiFi for 80% of your usage time", "📶", C::Network, R::Common, 50, 2, 80),
        locked("streak-master", "Streak Master", "Maintain a 10-day low-emission streak", "🔥", C::Streak, R::Epic, 200, 70, 10),
        locked("early-bird", "Early Bird", "Charge only during daylight hours for 5 days", "☀️", C::Charging, R::Rare, 120, 60, 5),
        unlocked("slow-charger", "Slow Charger", "Use slow charging for 20 sessions", "🐌", C::Charging, R::Common, 75, 5, 20),
        locked("carbon-zero", "Carbon Zero", "Achieve zero CO₂ emissions in a day", "✨", C::Carbon, R::Legendary, 500, 0, 1),
        locked("week-warrior", "Week Warrior", "Complete 5 weekly challenges", "🏆", C::Challenge, R::Epic, 300, 40, 5),
        locked("battery-optimizer", "Battery Optimizer", "Keep battery between 20-80% for 30 days", "🔋", C::Charging, R::Rare, 150, 23, 30),
        locked("green-grid", "Green Grid", "Charge only during renewable energy hours for a week", "⚡", C::Carbon, R::Legendary, 400, 28, 7),
    ]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Unlocked,
    Locked,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 3] = [StatusFilter::All, StatusFilter::Unlocked, StatusFilter::Locked];

    pub fn label(&self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Unlocked => "Unlocked",
            StatusFilter::Locked => "Locked",
        }
    }
}

/// Status filter combined with an optional category (`None` is "all").
pub fn filter_achievements<'a>(
    achievements: &'a [Achievement],
    status: StatusFilter,
    category: Option<AchievementCategory>,
) -> Vec<&'a Achievement> {
    achievements
        .iter()
        .filter(|a| match status {
            StatusFilter::All => true,
            StatusFilter::Unlocked => a.unlocked,
            StatusFilter::Locked => !a.unlocked,
        })
        .filter(|a| category.map_or(true, |c| a.category == c))
        .collect()
}

// ─── USER PROGRESS ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserProgress {
    pub points: u32,
    pub level: u32,
    pub xp: u32,
    pub xp_to_next_level: u32,
    /// Grams.
    pub total_carbon_reduced: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub achievements_unlocked: u32,
    pub total_achievements: u32,
}

impl UserProgress {
    /// Fill of the level bar, 0-100.
    pub fn level_progress_percent(&self) -> f32 {
        if self.xp_to_next_level == 0 {
            return 100.0;
        }
        (self.xp as f32 / self.xp_to_next_level as f32 * 100.0).clamp(0.0, 100.0)
    }

    pub fn xp_remaining_text(&self) -> String {
        format!(
            "{} XP to Level {}",
            self.xp_to_next_level.saturating_sub(self.xp),
            self.level + 1
        )
    }
}

pub fn generate_user_progress() -> UserProgress {
    UserProgress {
        points: 1250,
        level: 5,
        xp: 750,
        xp_to_next_level: 1000,
        total_carbon_reduced: 450,
        current_streak: 7,
        longest_streak: 12,
        achievements_unlocked: 2,
        total_achievements: 10,
    }
}

/// Three consecutive days or more.
pub fn is_on_fire(current_streak: u32) -> bool {
    current_streak >= 3
}

// ─── GOALS & CHALLENGES ─────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl GoalPeriod {
    pub fn label(&self) -> &'static str {
        match self {
            GoalPeriod::Daily => "daily",
            GoalPeriod::Weekly => "weekly",
            GoalPeriod::Monthly => "monthly",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reward {
    pub points: u32,
    pub badge: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub id: &'static str,
    pub period: GoalPeriod,
    pub title: &'static str,
    pub description: &'static str,
    /// Grams of CO₂ reduction.
    pub target: f64,
    pub current: f64,
    pub progress: u8,
    pub deadline: DateTime<Local>,
    pub completed: bool,
    pub reward: Reward,
}

impl Goal {
    pub fn is_active(&self, now: DateTime<Local>) -> bool {
        !self.completed && self.deadline > now
    }
}

pub fn generate_goals(now: DateTime<Local>) -> Vec<Goal> {
    let tomorrow = now.checked_add_days(Days::new(1)).unwrap_or(now + Duration::days(1));
    let next_week = now.checked_add_days(Days::new(7)).unwrap_or(now + Duration::days(7));
    let next_month = now.checked_add_months(Months::new(1)).unwrap_or(now + Duration::days(30));

    vec![
        Goal {
            id: "daily-1",
            period: GoalPeriod::Daily,
            title: "Daily Low Emission",
            description: "Keep today's CO₂ emissions below 15g",
            target: 15.0,
            current: 12.5,
            progress: 83,
            deadline: tomorrow,
            completed: false,
            reward: Reward { points: 50, badge: None },
        },
        Goal {
            id: "weekly-1",
            period: GoalPeriod::Weekly,
            title: "Weekly Carbon Reduction",
            description: "Reduce weekly CO₂ emissions by 30g",
            target: 30.0,
            current: 18.0,
            progress: 60,
            deadline: next_week,
            completed: false,
            reward: Reward { points: 150, badge: Some("weekly-warrior") },
        },
        Goal {
            id: "monthly-1",
            period: GoalPeriod::Monthly,
            title: "Monthly Eco Champion",
            description: "Reduce monthly CO₂ emissions by 100g",
            target: 100.0,
            current: 45.0,
            progress: 45,
            deadline: next_month,
            completed: false,
            reward: Reward { points: 500, badge: Some("eco-champion") },
        },
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct Challenge {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// Days.
    pub duration: u32,
    pub start_date: DateTime<Local>,
    pub end_date: DateTime<Local>,
    pub target: &'static str,
    pub progress: u8,
    pub completed: bool,
    pub reward: Reward,
}

impl Challenge {
    pub fn is_active(&self, now: DateTime<Local>) -> bool {
        !self.completed && self.end_date > now
    }

    pub fn days_left(&self, now: DateTime<Local>) -> i64 {
        (self.end_date - now).num_days().max(0)
    }
}

pub fn generate_challenges(now: DateTime<Local>) -> Vec<Challenge> {
    let next_week = now.checked_add_days(Days::new(7)).unwrap_or(now + Duration::days(7));

    vec![
        Challenge {
            id: "challenge-1",
            title: "Daylight Charging",
            description: "Charge only during daylight hours (6 AM - 8 PM) this week",
            duration: 7,
            start_date: now,
            end_date: next_week,
            target: "Charge only during daylight hours",
            progress: 57,
            completed: false,
            reward: Reward { points: 200, badge: Some("daylight-charger") },
        },
        Challenge {
            id: "challenge-2",
            title: "WiFi Only Week",
            description: "Use WiFi exclusively for 7 days",
            duration: 7,
            start_date: now - Duration::days(2),
            end_date: now + Duration::days(5),
            target: "Use WiFi only",
            progress: 28,
            completed: false,
            reward: Reward { points: 150, badge: Some("wifi-warrior") },
        },
        Challenge {
            id: "challenge-3",
            title: "Slow Charge Challenge",
            description: "Use only slow charging for 10 sessions",
            duration: 14,
            start_date: now - Duration::days(5),
            end_date: now + Duration::days(9),
            target: "10 slow charge sessions",
            progress: 70,
            completed: false,
            reward: Reward { points: 180, badge: Some("slow-charger") },
        },
    ]
}

/// `(active, completed)` as of `now`.
pub fn partition_goals(goals: &[Goal], now: DateTime<Local>) -> (Vec<&Goal>, Vec<&Goal>) {
    goals.iter().partition(|g| g.is_active(now))
}

/// `(active, completed)` as of `now`.
pub fn partition_challenges(challenges: &[Challenge], now: DateTime<Local>) -> (Vec<&Challenge>, Vec<&Challenge>) {
    challenges.iter().partition(|c| c.is_active(now))
}

// ─── LEADERBOARD ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub username: &'static str,
    pub avatar: &'static str,
    pub points: u32,
    pub level: u32,
    pub carbon_reduced: u32,
    pub streak: u32,
    pub is_current_user: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeFilter {
    #[default]
    All,
    Week,
    Month,
}

impl TimeFilter {
    pub const ALL: [TimeFilter; 3] = [TimeFilter::All, TimeFilter::Week, TimeFilter::Month];

    pub fn label(&self) -> &'static str {
        match self {
            TimeFilter::All => "all",
            TimeFilter::Week => "week",
            TimeFilter::Month => "month",
        }
    }
}

const CURRENT_USER_INDEX: usize = 9;

pub fn generate_leaderboard() -> Vec<LeaderboardEntry> {
    const USERS: [(&str, &str, u32, u32, u32, u32); 15] = [
        ("EcoChampion", "🌿", 3500, 12, 1200, 25),
        ("GreenWarrior", "🌳", 3200, 11, 1100, 20),
        ("CarbonZero", "✨", 2800, 10, 950, 18),
        ("EcoMaster", "🌱", 2500, 9, 850, 15),
        ("GreenHero", "🍃", 2200, 8, 750, 12),
        ("EcoUser", "🌲", 2000, 8, 700, 10),
        ("GreenUser", "🌿", 1800, 7, 650, 9),
        ("EcoFan", "🌳", 1600, 7, 600, 8),
        ("GreenFan", "🌱", 1400, 6, 550, 7),
        ("EcoNewbie", "🍃", 1250, 5, 450, 7),
        ("GreenNewbie", "🌲", 1100, 5, 400, 6),
        ("EcoBeginner", "🌿", 950, 4, 350, 5),
        ("GreenBeginner", "🌳", 800, 4, 300, 4),
        ("EcoStarter", "🌱", 650, 3, 250, 3),
        ("GreenStarter", "🍃", 500, 3, 200, 2),
    ];

    USERS
        .iter()
        .enumerate()
        .map(|(i, &(username, avatar, points, level, carbon_reduced, streak))| LeaderboardEntry {
            rank: i as u32 + 1,
            username,
            avatar,
            points,
            level,
            carbon_reduced,
            streak,
            is_current_user: i == CURRENT_USER_INDEX,
        })
        .collect()
}

// ─── LEVELS & POINTS ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub level: u32,
    pub xp_in_current_level: u64,
    pub xp_to_next_level: u64,
}

/// Level for a total XP. Each level costs `floor(100 * 1.2^(level-1))`
/// more than the previous one; level 1 needs 100.
pub fn calculate_level(xp: u64) -> LevelInfo {
    let mut level: u32 = 1;
    let mut required: u64 = 0;
    let mut next: u64 = 100;

    while let Some(threshold) = required.checked_add(next) {
        if xp < threshold {
            break;
        }
        required = threshold;
        level += 1;
        next = (100.0 * 1.2f64.powi(level as i32 - 1)).floor() as u64;
    }

    LevelInfo {
        level,
        xp_in_current_level: xp - required,
        xp_to_next_level: next,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointAction {
    LowEmission,
    WifiUsage,
    SlowCharge,
    DaylightCharge,
    Streak,
    GoalComplete,
    ChallengeComplete,
}

impl PointAction {
    pub fn parse(name: &str) -> Option<PointAction> {
        Some(match name {
            "low_emission" => PointAction::LowEmission,
            "wifi_usage" => PointAction::WifiUsage,
            "slow_charge" => PointAction::SlowCharge,
            "daylight_charge" => PointAction::DaylightCharge,
            "streak" => PointAction::Streak,
            "goal_complete" => PointAction::GoalComplete,
            "challenge_complete" => PointAction::ChallengeComplete,
            _ => return None,
        })
    }
}

pub fn calculate_points(action: PointAction) -> u32 {
    match action {
        PointAction::LowEmission => 10,
        PointAction::WifiUsage => 5,
        PointAction::SlowCharge => 15,
        PointAction::DaylightCharge => 20,
        PointAction::Streak => 25,
        PointAction::GoalComplete => 50,
        PointAction::ChallengeComplete => 100,
    }
}

/// Points for a raw action name; unknown names score 0.
pub fn points_for_action_name(name: &str) -> u32 {
    PointAction::parse(name).map(calculate_points).unwrap_or(0)
}

/// Scoring action names with their display labels, in display order.
pub const POINT_ACTIONS: [(&str, &str); 7] = [
    ("low_emission", "Low-emission charge"),
    ("wifi_usage", "Charge on Wi-Fi"),
    ("slow_charge", "Slow charge"),
    ("daylight_charge", "Daylight charge"),
    ("streak", "Daily streak"),
    ("goal_complete", "Goal completed"),
    ("challenge_complete", "Challenge completed"),
];

pub fn points_table() -> Vec<(&'static str, u32)> {
    POINT_ACTIONS
        .iter()
        .map(|(name, label)| (*label, points_for_action_name(name)))
        .collect()
}

/// The next `count` levels above `xp`, each with the total XP that reaches it.
pub fn level_roadmap(xp: u64, count: usize) -> Vec<(u32, u64)> {
    let mut steps = Vec::with_capacity(count);
    let mut at = xp;
    while steps.len() < count {
        let info = calculate_level(at);
        let Some(threshold) = (at - info.xp_in_current_level).checked_add(info.xp_to_next_level) else {
            break;
        };
        steps.push((info.level + 1, threshold));
        at = threshold;
    }
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn now() -> DateTime<Local> {
        Local
            .with_ymd_and_hms(2024, 1, 31, 12, 0, 0)
            .earliest()
            .unwrap()
    }

    #[test]
    fn test_calculate_level_thresholds() {
        assert_eq!(
            calculate_level(0),
            LevelInfo { level: 1, xp_in_current_level: 0, xp_to_next_level: 100 }
        );
        assert_eq!(
            calculate_level(99),
            LevelInfo { level: 1, xp_in_current_level: 99, xp_to_next_level: 100 }
        );
        assert_eq!(
            calculate_level(100),
            LevelInfo { level: 2, xp_in_current_level: 0, xp_to_next_level: 120 }
        );
        let third = calculate_level(220);
        assert_eq!(third.level, 3);
        assert_eq!(third.xp_in_current_level, 0);
    }

    #[test]
    fn test_calculate_level_terminates_at_max() {
        let info = calculate_level(u64::MAX);
        assert!(info.level > 100);
    }

    #[test]
    fn test_points() {
        assert_eq!(calculate_points(PointAction::ChallengeComplete), 100);
        assert_eq!(points_for_action_name("daylight_charge"), 20);
        assert_eq!(points_for_action_name("teleport"), 0);
    }

    #[test]
    fn test_points_table_scores_every_action() {
        let table = points_table();
        assert_eq!(table.len(), 7);
        assert!(table.iter().all(|(_, pts)| *pts > 0));
        assert_eq!(table[0], ("Low-emission charge", 10));
        assert_eq!(table[6], ("Challenge completed", 100));
    }

    #[test]
    fn test_level_roadmap() {
        assert_eq!(level_roadmap(0, 3), vec![(2, 100), (3, 220), (4, 364)]);
        // Mid-level XP starts from the current level's threshold.
        assert_eq!(level_roadmap(150, 2), vec![(3, 220), (4, 364)]);
        assert!(level_roadmap(u64::MAX, 3).is_empty());
    }

    #[test]
    fn test_achievement_catalog() {
        let achievements = generate_achievements(now());
        assert_eq!(achievements.len(), 10);
        let unlocked: Vec<_> = achievements.iter().filter(|a| a.unlocked).map(|a| a.id).collect();
        assert_eq!(unlocked, vec!["wifi-master", "slow-charger"]);
        assert_eq!(achievements[2].unlocked_date, Some(now() - Duration::days(2)));
        assert!(achievements.iter().filter(|a| !a.unlocked).all(|a| a.unlocked_date.is_none()));
    }

    #[test]
    fn test_achievement_filters() {
        let achievements = generate_achievements(now());
        assert_eq!(filter_achievements(&achievements, StatusFilter::All, None).len(), 10);
        assert_eq!(filter_achievements(&achievements, StatusFilter::Unlocked, None).len(), 2);
        assert_eq!(
            filter_achievements(&achievements, StatusFilter::Locked, Some(AchievementCategory::Carbon)).len(),
            3
        );
        assert_eq!(
            filter_achievements(&achievements, StatusFilter::Unlocked, Some(AchievementCategory::Charging))[0].id,
            "slow-charger"
        );
    }

    #[test]
    fn test_goal_deadlines() {
        let goals = generate_goals(now());
        assert_eq!(goals[0].deadline, now() + Duration::days(1));
        // Jan 31 plus one month clamps to the end of February.
        assert_eq!(goals[2].deadline.date_naive(), chrono::NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let (active, done) = partition_goals(&goals, now());
        assert_eq!(active.len(), 3);
        assert!(done.is_empty());
        let later = now() + Duration::days(8);
        let (active, done) = partition_goals(&goals, later);
        assert_eq!(active.len(), 1);
        assert_eq!(done.len(), 2);
    }

    #[test]
    fn test_challenge_partition() {
        let challenges = generate_challenges(now());
        let (active, _) = partition_challenges(&challenges, now());
        assert_eq!(active.len(), 3);
        let (active, done) = partition_challenges(&challenges, now() + Duration::days(6));
        assert_eq!(active.iter().map(|c| c.id).collect::<Vec<_>>(), vec!["challenge-1", "challenge-3"]);
        assert_eq!(done.len(), 1);
        assert_eq!(challenges[2].days_left(now()), 9);
    }

    #[test]
    fn test_leaderboard() {
        let board = generate_leaderboard();
        assert_eq!(board.len(), 15);
        for (i, entry) in board.iter().enumerate() {
            assert_eq!(entry.rank, i as u32 + 1);
        }
        let current: Vec<_> = board.iter().filter(|e| e.is_current_user).collect();
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].username, "EcoNewbie");
        assert_eq!(current[0].rank, 10);
    }

    #[test]
    fn test_progress_helpers() {
        let progress = generate_user_progress();
        assert_eq!(progress.level_progress_percent(), 75.0);
        assert_eq!(progress.xp_remaining_text(), "250 XP to Level 6");
        assert!(is_on_fire(progress.current_streak));
        assert!(!is_on_fire(2));
        assert!(Rarity::Legendary > Rarity::Common);
    }

    proptest! {
        #[test]
        fn prop_level_is_monotonic(a in 0u64..10_000_000, b in 0u64..10_000_000) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(calculate_level(lo).level <= calculate_level(hi).level);
            let info = calculate_level(hi);
            prop_assert!(info.xp_in_current_level < info.xp_to_next_level);
        }
    }
}
