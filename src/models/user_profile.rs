use crate::formulas;

/// Ответы пользователя из диалога /set_profile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyMetrics {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub age_years: i64,
    pub activity_minutes: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub metrics: BodyMetrics,
    pub city: String,
    pub water_goal: i64,
    pub calorie_goal: i64,
    pub logged_water: i64,
    pub logged_calories: f64,
    pub burned_calories: f64,
}

impl UserProfile {
    /// Новый профиль с пересчитанными нормами и обнулёнными счётчиками.
    /// Температура берётся один раз, в момент заполнения профиля.
    pub fn new(metrics: BodyMetrics, city: String, temperature: Option<f64>) -> Self {
        Self {
            water_goal: formulas::water_goal(metrics.weight_kg, metrics.activity_minutes, temperature),
            calorie_goal: formulas::calorie_goal(
                metrics.weight_kg,
                metrics.height_cm,
                metrics.age_years,
                metrics.activity_minutes,
            ),
            metrics,
            city,
            logged_water: 0,
            logged_calories: 0.0,
            burned_calories: 0.0,
        }
    }

    pub fn remaining_water(&self) -> i64 {
        self.water_goal.saturating_sub(self.logged_water).max(0)
    }

    pub fn calorie_balance(&self) -> f64 {
        self.logged_calories - self.burned_calories
    }
}
