use serde::{Deserialize, Serialize};

/// One completed focus session, as written to the session log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Option<i64>,
    pub date: String,
    pub minutes: u32,
    pub task: Option<String>,
    pub xp_earned: u64,
    pub coins_earned: u64,
    pub distractions: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyFocus {
    pub date: String,
    pub minutes: u32,
    pub sessions: u32,
}

impl DailyFocus {
    pub fn empty(date: String) -> Self {
        Self {
            date,
            minutes: 0,
            sessions: 0,
        }
    }

    /// Ratio of focused minutes to the daily goal, capped at 1.0.
    pub fn goal_ratio(&self, goal_minutes: u32) -> f64 {
        if goal_minutes == 0 {
            0.0
        } else {
            (self.minutes as f64 / goal_minutes as f64).min(1.0)
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeeklyGrid {
    pub days: Vec<DailyFocus>,
}

impl WeeklyGrid {
    pub fn new(days: Vec<DailyFocus>) -> Self {
        Self { days }
    }

    pub fn total_minutes(&self) -> u32 {
        self.days.iter().map(|d| d.minutes).sum()
    }

    pub fn active_days(&self) -> u32 {
        self.days.iter().filter(|d| d.sessions > 0).count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(date: &str, minutes: u32, sessions: u32) -> DailyFocus {
        DailyFocus {
            date: date.to_string(),
            minutes,
            sessions,
        }
    }

    #[test]
    fn weekly_totals() {
        let grid = WeeklyGrid::new(vec![
            day("2026-03-01", 25, 1),
            day("2026-03-02", 0, 0),
            day("2026-03-03", 70, 2),
        ]);
        assert_eq!(grid.total_minutes(), 95);
        assert_eq!(grid.active_days(), 2);
    }

    #[test]
    fn goal_ratio_is_capped() {
        assert_eq!(day("d", 90, 2).goal_ratio(60), 1.0);
        assert_eq!(day("d", 30, 1).goal_ratio(60), 0.5);
        assert_eq!(day("d", 30, 1).goal_ratio(0), 0.0);
    }
}
