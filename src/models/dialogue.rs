use super::{BodyMetrics, FoodItem};

/// Текущий шаг диалога пользователя вместе с уже собранными ответами
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DialogueState {
    #[default]
    Idle,
    AwaitingWeight,
    AwaitingHeight { weight_kg: f64 },
    AwaitingAge { weight_kg: f64, height_cm: f64 },
    AwaitingActivity { weight_kg: f64, height_cm: f64, age_years: i64 },
    AwaitingCity(BodyMetrics),
    AwaitingFoodGrams { food: FoodItem },
}

impl DialogueState {
    pub fn is_idle(&self) -> bool {
        matches!(self, DialogueState::Idle)
    }
}
