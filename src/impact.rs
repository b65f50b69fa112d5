use std::time::{Duration, Instant};

/// Grams of CO₂ a tree absorbs in about a day.
pub const GRAMS_PER_TREE: f64 = 60.0;
pub const FOREST_SIZE: u32 = 20;
/// Delay between successive trees being marked in the animation.
pub const TREE_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scenario {
    pub label: &'static str,
    pub co2: f64,
}

pub const SCENARIOS: [Scenario; 3] = [
    Scenario { label: "Forest Safe", co2: 0.0 },
    Scenario { label: "Mild Impact", co2: 120.0 },
    Scenario { label: "Severe Impact", co2: 300.0 },
];

/// Index picked when the preview is first opened.
pub const DEFAULT_PREVIEW: usize = 1;

pub fn trees_affected(co2: f64) -> u32 {
    if co2.is_nan() || co2 <= 0.0 {
        return 0;
    }
    (co2 / GRAMS_PER_TREE).floor() as u32
}

/// Trees to mark for `co2`, never more than the forest holds.
pub fn trees_to_cut(co2: f64) -> u32 {
    trees_affected(co2).min(FOREST_SIZE)
}

/// Forest card state: live emissions or one of the preview scenarios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestView {
    pub preview: Option<usize>,
    pub started: Instant,
}

impl ForestView {
    pub fn new(started: Instant) -> Self {
        Self { preview: None, started }
    }

    pub fn toggle_preview(&mut self, now: Instant) {
        self.preview = match self.preview {
            Some(_) => None,
            None => Some(DEFAULT_PREVIEW),
        };
        self.started = now;
    }

    pub fn select_scenario(&mut self, index: usize, now: Instant) {
        if index < SCENARIOS.len() {
            self.preview = Some(index);
            self.started = now;
        }
    }

    pub fn active(&self, live_co2: f64) -> Scenario {
        match self.preview.and_then(|i| SCENARIOS.get(i)) {
            Some(s) => *s,
            None => Scenario { label: "Live Impact", co2: live_co2 },
        }
    }

    /// Trees marked so far, one more every [`TREE_INTERVAL`].
    pub fn trees_cut_at(&self, live_co2: f64, now: Instant, disable_motion: bool) -> u32 {
        let target = trees_to_cut(self.active(live_co2).co2);
        if disable_motion {
            return target;
        }
        let elapsed = now.saturating_duration_since(self.started);
        let ticks = (elapsed.as_millis() / TREE_INTERVAL.as_millis()) as u32;
        ticks.min(target)
    }

    pub fn is_settled(&self, live_co2: f64, now: Instant, disable_motion: bool) -> bool {
        self.trees_cut_at(live_co2, now, disable_motion) >= trees_to_cut(self.active(live_co2).co2)
    }

    pub fn caption(&self, live_co2: f64, cut: u32) -> String {
        let scenario = self.active(live_co2);
        let total = trees_to_cut(scenario.co2);
        match self.preview {
            Some(_) => format!("{cut} of {total} trees affected ({} demo)", scenario.label),
            None => format!("{cut} of {total} trees affected by today's emissions"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trees_affected() {
        assert_eq!(trees_affected(-5.0), 0);
        assert_eq!(trees_affected(59.9), 0);
        assert_eq!(trees_affected(60.0), 1);
        assert_eq!(trees_affected(300.0), 5);
        assert_eq!(trees_to_cut(5000.0), FOREST_SIZE);
    }

    #[test]
    fn test_preview_scenarios() {
        let t0 = Instant::now();
        let mut forest = ForestView::new(t0);
        assert_eq!(forest.active(12.0).label, "Live Impact");
        forest.toggle_preview(t0);
        assert_eq!(forest.active(12.0).co2, 120.0);
        forest.select_scenario(2, t0);
        assert_eq!(forest.caption(12.0, 3), "3 of 5 trees affected (Severe Impact demo)");
        forest.select_scenario(9, t0);
        assert_eq!(forest.preview, Some(2));
        forest.toggle_preview(t0);
        assert_eq!(forest.preview, None);
    }

    #[test]
    fn test_trees_animate_one_by_one() {
        let t0 = Instant::now();
        let mut forest = ForestView::new(t0);
        forest.select_scenario(2, t0);
        assert_eq!(forest.trees_cut_at(0.0, t0, false), 0);
        assert_eq!(forest.trees_cut_at(0.0, t0 + Duration::from_millis(450), false), 2);
        assert_eq!(forest.trees_cut_at(0.0, t0 + Duration::from_secs(5), false), 5);
        assert_eq!(forest.trees_cut_at(0.0, t0, true), 5);
        assert!(forest.is_settled(0.0, t0 + Duration::from_secs(1), false));
    }
}
