use teloxide::prelude::*;
use std::error::Error;

use crate::bot_state::BotState;
use crate::formulas;
use crate::handlers::utils::{parse_amount, parse_int, parse_number, send_replies, HELP_HINT, NO_PROFILE};
use crate::models::{BodyMetrics, DialogueState, FoodItem, Reply, UserProfile};

const ASK_HEIGHT: &str = "Введите Ваш рост (в см):";
const ASK_AGE: &str = "Введите Ваш возраст:";
const ASK_ACTIVITY: &str = "Введите уровень Вашей активности (минуты в день):";
const ASK_CITY: &str = "Введите Ваш город (для получения температуры):";
const ASK_GRAMS_NUMBER: &str = "Пожалуйста, введите число, обозначающее количество граммов.";

const WEATHER_MISSING: &str =
    "Не удалось получить данные о погоде. Дополнительная вода не будет добавлена.";
const WEATHER_FAILED: &str =
    "Ошибка при получении данных о погоде. Дополнительная вода не будет добавлена.";

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let replies = match msg.text() {
        // Команды уже обработаны в command_handler
        Some(text) if text.starts_with('/') => return Ok(()),
        Some(text) => handle_dialogue_text(&state, msg.chat.id, text).await,
        None => vec![Reply::text(HELP_HINT)],
    };

    send_replies(&bot, msg.chat.id, replies).await
}

/// Очередной ответ пользователя в диалоге. Неверный ввод повторяет вопрос и не меняет шаг.
pub async fn handle_dialogue_text(state: &BotState, chat_id: ChatId, text: &str) -> Vec<Reply> {
    let dialogue = state.dialogue(chat_id).await;

    let (next, reply) = match dialogue {
        DialogueState::Idle => return vec![Reply::text(HELP_HINT)],
        DialogueState::AwaitingWeight => match parse_number(text) {
            Some(weight_kg) => (DialogueState::AwaitingHeight { weight_kg }, ASK_HEIGHT),
            None => return vec![Reply::text("Пожалуйста, введите число для веса.")],
        },
        DialogueState::AwaitingHeight { weight_kg } => match parse_number(text) {
            Some(height_cm) => (DialogueState::AwaitingAge { weight_kg, height_cm }, ASK_AGE),
            None => return vec![Reply::text("Пожалуйста, введите число для роста.")],
        },
        DialogueState::AwaitingAge { weight_kg, height_cm } => match parse_int(text) {
            Some(age_years) => (
                DialogueState::AwaitingActivity { weight_kg, height_cm, age_years },
                ASK_ACTIVITY,
            ),
            None => return vec![Reply::text("Пожалуйста, введите число для возраста.")],
        },
        DialogueState::AwaitingActivity { weight_kg, height_cm, age_years } => match parse_int(text)
            .filter(|m| formulas::activity_water_bonus(*m).is_some())
        {
            Some(activity_minutes) => (
                DialogueState::AwaitingCity(BodyMetrics {
                    weight_kg,
                    height_cm,
                    age_years,
                    activity_minutes,
                }),
                ASK_CITY,
            ),
            None => return vec![Reply::text("Пожалуйста, введите число для уровня активности.")],
        },
        DialogueState::AwaitingCity(metrics) => {
            return complete_profile(state, chat_id, metrics, text.trim()).await;
        }
        DialogueState::AwaitingFoodGrams { food } => {
            return log_food_grams(state, chat_id, &food, text).await;
        }
    };

    state.set_dialogue(chat_id, next).await;
    vec![Reply::text(reply)]
}

async fn complete_profile(
    state: &BotState,
    chat_id: ChatId,
    metrics: BodyMetrics,
    city: &str,
) -> Vec<Reply> {
    let mut replies = Vec::new();

    let temperature = match state.weather.current_temperature(city).await {
        Ok(temp) => Some(temp),
        Err(e) => {
            log::warn!("Weather lookup for {:?} failed: {}", city, e);
            replies.push(Reply::text(if e.is_request_failure() { WEATHER_FAILED } else { WEATHER_MISSING }));
            None
        }
    };

    let profile = UserProfile::new(metrics, city.to_string(), temperature);

    let mut summary = format!(
        "Ваши параметры:\n\
        Вес: {} кг\n\
        Рост: {} см\n\
        Возраст: {} лет\n\
        Активность: {} минут в день\n\
        Город: {}\n\n\
        Рассчитанная дневная норма:\n\
        Воды: {} мл\n\
        Калорий: {} ккал",
        metrics.weight_kg,
        metrics.height_cm,
        metrics.age_years,
        metrics.activity_minutes,
        city,
        profile.water_goal,
        profile.calorie_goal
    );
    if let Some(temp) = temperature {
        summary.push_str(&format!("\nПогода в {}: {}°C", city, temp));
    }
    replies.push(Reply::Text(summary));

    log::info!(
        "✅ Profile completed for user {}: water goal {} ml, calorie goal {} kcal",
        chat_id,
        profile.water_goal,
        profile.calorie_goal
    );

    state.save_profile(chat_id, profile).await;
    state.clear_dialogue(chat_id).await;

    replies
}

async fn log_food_grams(state: &BotState, chat_id: ChatId, food: &FoodItem, text: &str) -> Vec<Reply> {
    let Some(grams) = parse_amount(text) else {
        return vec![Reply::text(ASK_GRAMS_NUMBER)];
    };

    let total_cal = food.calories_for(grams);
    let updated = state
        .try_update_profile(chat_id, |p| {
            let total = p.logged_calories + total_cal;
            if !total.is_finite() {
                return Err(());
            }
            p.logged_calories = total;
            Ok(())
        })
        .await;

    match updated {
        Some(Ok(_)) => state.clear_dialogue(chat_id).await,
        Some(Err(())) => return vec![Reply::text(ASK_GRAMS_NUMBER)],
        None => {
            state.clear_dialogue(chat_id).await;
            return vec![Reply::text(NO_PROFILE)];
        }
    }
    log::debug!("🍽 User {} logged {:.1} kcal of {}", chat_id, total_cal, food.name);

    vec![Reply::text(format!("Записано: {:.1} ккал.", total_cal))]
}
