#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    #[default]
    Dashboard,
    Achievements,
    Goals,
    Leaderboard,
    Carbon,
    Settings,
    Charging,
    Recommendations,
    Habits,
}

/// Bottom bar destinations, in display order.
pub const NAV_ITEMS: [Route; 6] = [
    Route::Dashboard,
    Route::Achievements,
    Route::Goals,
    Route::Leaderboard,
    Route::Carbon,
    Route::Settings,
];

impl Route {
    #[cfg(test)]
    pub const ALL: [Route; 9] = [
        Route::Dashboard,
        Route::Achievements,
        Route::Goals,
        Route::Leaderboard,
        Route::Carbon,
        Route::Settings,
        Route::Charging,
        Route::Recommendations,
        Route::Habits,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Route::Dashboard => "/",
            Route::Achievements => "/achievements",
            Route::Goals => "/goals",
            Route::Leaderboard => "/leaderboard",
            Route::Carbon => "/carbon",
            Route::Settings => "/settings",
            Route::Charging => "/charging",
            Route::Recommendations => "/recommendations",
            Route::Habits => "/habits",
        }
    }

    #[cfg(test)]
    pub fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|r| r.path() == path)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Route::Dashboard => "Dashboard",
            Route::Achievements => "Achievements",
            Route::Goals => "Goals",
            Route::Leaderboard => "Leaderboard",
            Route::Carbon => "Carbon",
            Route::Settings => "Settings",
            Route::Charging => "Charging",
            Route::Recommendations => "Recommendations",
            Route::Habits => "Digital Habits",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Route::Dashboard => "🏠",
            Route::Achievements => "🏆",
            Route::Goals => "🎯",
            Route::Leaderboard => "🏅",
            Route::Carbon => "🌍",
            Route::Settings => "⚙",
            Route::Charging => "🔋",
            Route::Recommendations => "💡",
            Route::Habits => "📱",
        }
    }

    /// Exact path match, so "/" is not active on "/goals".
    pub fn is_active(&self, current_path: &str) -> bool {
        self.path() == current_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_roundtrip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/habits"), Some(Route::Habits));
        assert_eq!(Route::from_path("/history"), None);
    }

    #[test]
    fn test_exact_active_match() {
        assert!(Route::Dashboard.is_active("/"));
        assert!(!Route::Dashboard.is_active("/goals"));
        assert!(!Route::Goals.is_active("/goals/"));
    }

    #[test]
    fn test_nav_bar_has_six_destinations() {
        assert_eq!(NAV_ITEMS.len(), 6);
        assert!(!NAV_ITEMS.contains(&Route::Charging));
        assert!(!NAV_ITEMS.contains(&Route::Habits));
        assert_eq!(NAV_ITEMS[0], Route::default());
    }
}
