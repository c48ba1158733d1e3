use chrono::{DateTime, Utc};

use super::UserProfile;

/// Срез накопленных значений для графиков
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressSnapshot {
    pub timestamp: DateTime<Utc>,
    pub logged_water: i64,
    pub logged_calories: f64,
    pub burned_calories: f64,
}

impl ProgressSnapshot {
    pub fn capture(profile: &UserProfile) -> Self {
        Self {
            timestamp: Utc::now(),
            logged_water: profile.logged_water,
            logged_calories: profile.logged_calories,
            burned_calories: profile.burned_calories,
        }
    }

    pub fn net_calories(&self) -> f64 {
        self.logged_calories - self.burned_calories
    }
}
