use crate::models::WorkoutKind;

const MAX_WEATHER_BONUS: i64 = 1000;

/// Дополнительная вода (мл) в жару
pub fn weather_bonus(temperature: f64) -> i64 {
    if temperature > 30.0 {
        MAX_WEATHER_BONUS
    } else if temperature > 25.0 {
        500
    } else {
        0
    }
}

/// Прибавка к норме воды за активность, мл.
/// `None`, если норма с такой активностью не помещается в i64 даже без учёта веса.
pub fn activity_water_bonus(activity_minutes: i64) -> Option<i64> {
    let bonus = activity_minutes.div_euclid(30).checked_mul(500)?;
    bonus.checked_add(MAX_WEATHER_BONUS)?;
    Some(bonus)
}

/// Дневная норма воды, мл. Без данных о погоде бонус не начисляется.
pub fn water_goal(weight_kg: f64, activity_minutes: i64, temperature: Option<f64>) -> i64 {
    let activity_bonus = activity_minutes.div_euclid(30).saturating_mul(500);
    let bonus = temperature.map_or(0, weather_bonus);
    (weight_kg * 30.0 + activity_bonus.saturating_add(bonus) as f64) as i64
}

pub fn activity_calorie_bonus(activity_minutes: i64) -> i64 {
    if activity_minutes < 30 {
        200
    } else if activity_minutes <= 60 {
        300
    } else {
        400
    }
}

/// Дневная норма калорий, ккал
pub fn calorie_goal(weight_kg: f64, height_cm: f64, age_years: i64, activity_minutes: i64) -> i64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age_years as f64;
    (base + activity_calorie_bonus(activity_minutes) as f64) as i64
}

/// Сожжённые ккал; `None` при переполнении
pub fn workout_burn(kind: WorkoutKind, minutes: i64) -> Option<i64> {
    minutes.checked_mul(kind.coefficient())
}

/// Сколько воды (мл) выпить дополнительно после тренировки
pub fn workout_extra_water(minutes: i64) -> Option<i64> {
    minutes.div_euclid(30).checked_mul(200)
}
