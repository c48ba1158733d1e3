use teloxide::prelude::*;
use std::error::Error;

use crate::bot_state::BotState;
use crate::charts::{self, ChartError};
use crate::formulas;
use crate::handlers::utils::{
    capitalize, parse_amount, parse_amount_int, send_replies, NO_PROFILE,
};
use crate::models::{DialogueState, Reply, UserProfile, WorkoutKind};

use crate::Command;

const START_TEXT: &str = "Добро пожаловать! Я помогу следить за нормой воды и калорий.\n\
    Введите /help для списка команд.";

const HELP_TEXT: &str = "Доступные команды:\n\
    /start - Начало работы\n\
    /help - Список команд\n\
    /set_profile - Заполнение профиля пользователя\n\
    /log_water <количество> - Логирование воды\n\
    /log_food <название продукта> - Логирование съеденной еды\n\
    /log_burned <количество> - Логирование сожжённых ккал\n\
    /log_workout <тип тренировки> <время (мин)> - Логирование тренировки\n\
    /check_progress - Показать прогресс по воде и калориям\n\
    /graph_progress - Показать графики прогресса";

pub const ASK_WEIGHT: &str = "Введите Ваш вес (в кг):";
const CHART_CAPTION: &str = "Графики прогресса по воде и калориям";
const NOT_ENOUGH_DATA: &str = "Недостаточно данных для построения графиков. Попробуйте позже.";
const WATER_NUMBER: &str = "Пожалуйста, укажите число после команды /log_water";
const BURNED_NUMBER: &str = "Пожалуйста, введите число после команды /log_burned";
const WORKOUT_NUMBER: &str = "Пожалуйста, введите число для времени тренировки.";

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    state: BotState,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let replies = run_command(&state, msg.chat.id, cmd).await;
    send_replies(&bot, msg.chat.id, replies).await
}

pub async fn run_command(state: &BotState, chat_id: ChatId, cmd: Command) -> Vec<Reply> {
    match cmd {
        Command::Start => vec![Reply::text(START_TEXT)],
        Command::Help => vec![Reply::text(HELP_TEXT)],
        Command::SetProfile => handle_set_profile(state, chat_id).await,
        Command::LogWater(args) => handle_log_water(state, chat_id, &args).await,
        Command::LogFood(args) => handle_log_food(state, chat_id, &args).await,
        Command::LogBurned(args) => handle_log_burned(state, chat_id, &args).await,
        Command::LogWorkout(args) => handle_log_workout(state, chat_id, &args).await,
        Command::CheckProgress => handle_check_progress(state, chat_id).await,
        Command::GraphProgress => handle_graph_progress(state, chat_id).await,
    }
}

async fn handle_set_profile(state: &BotState, chat_id: ChatId) -> Vec<Reply> {
    // Повторный /set_profile начинает диалог заново
    if !state.dialogue(chat_id).await.is_idle() {
        log::debug!("Dialogue of user {} restarted by /set_profile", chat_id);
    }
    state.set_dialogue(chat_id, DialogueState::AwaitingWeight).await;
    vec![Reply::text(ASK_WEIGHT)]
}

async fn handle_log_water(state: &BotState, chat_id: ChatId, args: &str) -> Vec<Reply> {
    let Some(raw) = args.split_whitespace().next() else {
        return vec![Reply::text("Использование: /log_water <количество>")];
    };
    let Some(amount) = parse_amount_int(raw) else {
        return vec![Reply::text(WATER_NUMBER)];
    };

    let update = state
        .try_update_profile(chat_id, |p| {
            p.logged_water = p.logged_water.checked_add(amount).ok_or(())?;
            Ok(())
        })
        .await;
    let profile = match update {
        Some(Ok(profile)) => profile,
        Some(Err(())) => return vec![Reply::text(WATER_NUMBER)],
        None => return vec![Reply::text(NO_PROFILE)],
    };
    log::debug!("💧 User {} logged {} ml of water", chat_id, amount);

    vec![Reply::text(format!(
        "Вода:\n- Выпито: {} мл из {} мл.\n- Осталось: {} мл.",
        profile.logged_water,
        profile.water_goal,
        profile.remaining_water()
    ))]
}

async fn handle_log_food(state: &BotState, chat_id: ChatId, args: &str) -> Vec<Reply> {
    let query = args.trim();
    if query.is_empty() {
        return vec![Reply::text("Использование: /log_food <название продукта>")];
    }

    let found = match state.food.find_food(query).await {
        Ok(found) => found,
        Err(e) => {
            log::warn!("Food lookup for {:?} failed: {}", query, e);
            None
        }
    };

    let Some(food) = found else {
        // Незавершённый диалог сбрасывается и при неудачном поиске
        state.clear_dialogue(chat_id).await;
        return vec![Reply::text("Не удалось найти информацию о данном продукте.")];
    };

    let reply = format!(
        "🍽 {} — {} ккал на 100 г. Сколько грамм вы съели?",
        food.name, food.kcal_per_100g
    );
    state.set_dialogue(chat_id, DialogueState::AwaitingFoodGrams { food }).await;

    vec![Reply::text(reply)]
}

async fn handle_log_burned(state: &BotState, chat_id: ChatId, args: &str) -> Vec<Reply> {
    let Some(raw) = args.split_whitespace().next() else {
        return vec![Reply::text("Использование: /log_burned <количество>")];
    };
    let Some(amount) = parse_amount(raw) else {
        return vec![Reply::text(BURNED_NUMBER)];
    };

    let update = state
        .try_update_profile(chat_id, |p| add_burned(p, amount))
        .await;
    let profile = match update {
        Some(Ok(profile)) => profile,
        Some(Err(())) => return vec![Reply::text(BURNED_NUMBER)],
        None => return vec![Reply::text(NO_PROFILE)],
    };
    log::debug!("🔥 User {} logged {} kcal burned", chat_id, amount);

    vec![Reply::text(format!(
        "Записано: сожжено {:.1} ккал.",
        profile.burned_calories
    ))]
}

async fn handle_log_workout(state: &BotState, chat_id: ChatId, args: &str) -> Vec<Reply> {
    let mut parts = args.split_whitespace();
    let (Some(workout), Some(raw_minutes)) = (parts.next(), parts.next()) else {
        return vec![Reply::text("Использование: /log_workout <тип тренировки> <время (мин)>")];
    };
    let Some(minutes) = parse_amount_int(raw_minutes) else {
        return vec![Reply::text(WORKOUT_NUMBER)];
    };
    // Слишком длинная тренировка не помещается в счётчики
    let kind = WorkoutKind::from_name(workout);
    let (Some(burned), Some(extra_water)) = (
        formulas::workout_burn(kind, minutes),
        formulas::workout_extra_water(minutes),
    ) else {
        return vec![Reply::text(WORKOUT_NUMBER)];
    };

    let update = state
        .try_update_profile(chat_id, |p| add_burned(p, burned as f64))
        .await;
    match update {
        Some(Ok(_)) => {}
        Some(Err(())) => return vec![Reply::text(WORKOUT_NUMBER)],
        None => return vec![Reply::text(NO_PROFILE)],
    }
    log::debug!("🏃 User {} logged workout {} for {} min", chat_id, workout, minutes);

    let mut reply = format!("🏃‍♂️ {} {} минут — {} ккал.", capitalize(workout), minutes, burned);
    if extra_water > 0 {
        reply.push_str(&format!(" Дополнительно: выпейте {} мл воды.", extra_water));
    }

    vec![Reply::text(reply)]
}

/// Сумма сожжённого должна остаться конечным числом
fn add_burned(profile: &mut UserProfile, amount: f64) -> Result<(), ()> {
    let total = profile.burned_calories + amount;
    if !total.is_finite() {
        return Err(());
    }
    profile.burned_calories = total;
    Ok(())
}

async fn handle_check_progress(state: &BotState, chat_id: ChatId) -> Vec<Reply> {
    let Some(profile) = state.profile(chat_id).await else {
        return vec![Reply::text(NO_PROFILE)];
    };

    vec![Reply::text(format!(
        "📊 Прогресс:\n\n\
        Вода:\n\
        - Выпито: {} мл из {} мл.\n\
        - Осталось: {} мл.\n\n\
        Калории:\n\
        - Потреблено: {:.1} ккал из {} ккал.\n\
        - Сожжено: {:.1} ккал.\n\
        - Баланс: {:.1} ккал.",
        profile.logged_water,
        profile.water_goal,
        profile.remaining_water(),
        profile.logged_calories,
        profile.calorie_goal,
        profile.burned_calories,
        profile.calorie_balance()
    ))]
}

async fn handle_graph_progress(state: &BotState, chat_id: ChatId) -> Vec<Reply> {
    let history = state.history(chat_id).await;

    match charts::render_progress_chart(&history) {
        Ok(png) => vec![Reply::Photo { png, caption: CHART_CAPTION.to_string() }],
        Err(ChartError::NotEnoughData(_)) => vec![Reply::text(NOT_ENOUGH_DATA)],
        Err(e) => {
            log::error!("❌ Chart rendering failed for user {}: {}", chat_id, e);
            vec![Reply::text("Не удалось построить графики. Попробуйте позже.")]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot_state::testing::{state_with, BrokenFood, FixedWeather};
    use crate::models::{BodyMetrics, FoodItem};
    use std::sync::Arc;

    const CHAT: ChatId = ChatId(42);

    async fn state_with_profile() -> BotState {
        let state = state_with(None, None);
        let metrics = BodyMetrics { weight_kg: 60.0, height_cm: 170.0, age_years: 25, activity_minutes: 20 };
        state.save_profile(CHAT, UserProfile::new(metrics, "Казань".to_string(), None)).await;
        state
    }

    fn text(replies: &[Reply]) -> &str {
        assert_eq!(replies.len(), 1, "expected a single reply: {replies:?}");
        replies[0].as_text().expect("text reply")
    }

    #[tokio::test]
    async fn water_logging_is_additive() {
        let state = state_with_profile().await;

        run_command(&state, CHAT, Command::LogWater("100".to_string())).await;
        let replies = run_command(&state, CHAT, Command::LogWater("100".to_string())).await;

        assert_eq!(state.profile(CHAT).await.unwrap().logged_water, 200);
        assert!(text(&replies).contains("Выпито: 200 мл из 1800 мл"));
        assert!(text(&replies).contains("Осталось: 1600 мл"));
    }

    #[tokio::test]
    async fn water_usage_and_validation() {
        let state = state_with_profile().await;

        let replies = run_command(&state, CHAT, Command::LogWater(String::new())).await;
        assert!(text(&replies).starts_with("Использование"));

        let replies = run_command(&state, CHAT, Command::LogWater("много".to_string())).await;
        assert!(text(&replies).contains("укажите число"));

        let replies = run_command(&state, CHAT, Command::LogWater("-50".to_string())).await;
        assert!(text(&replies).contains("укажите число"));

        assert_eq!(state.profile(CHAT).await.unwrap().logged_water, 0);
        assert_eq!(state.history(CHAT).await.len(), 1);
    }

    #[tokio::test]
    async fn logging_without_profile_mutates_nothing() {
        let state = state_with(None, None);

        for cmd in [
            Command::LogWater("250".to_string()),
            Command::LogBurned("100".to_string()),
            Command::LogWorkout("бег 30".to_string()),
            Command::CheckProgress,
        ] {
            let replies = run_command(&state, CHAT, cmd).await;
            assert_eq!(text(&replies), NO_PROFILE);
        }

        assert!(state.profile(CHAT).await.is_none());
        assert!(state.history(CHAT).await.is_empty());
    }

    #[tokio::test]
    async fn remaining_water_is_clamped() {
        let state = state_with_profile().await;
        state
            .try_update_profile(CHAT, |p| {
                p.water_goal = 2000;
                Ok::<_, ()>(())
            })
            .await;

        run_command(&state, CHAT, Command::LogWater("2500".to_string())).await;
        let replies = run_command(&state, CHAT, Command::CheckProgress).await;

        assert!(text(&replies).contains("Осталось: 0 мл."));
    }

    #[tokio::test]
    async fn running_workout_burns_and_suggests_water() {
        let state = state_with_profile().await;

        let replies = run_command(&state, CHAT, Command::LogWorkout("бег 30".to_string())).await;

        assert_eq!(state.profile(CHAT).await.unwrap().burned_calories, 300.0);
        assert_eq!(
            text(&replies),
            "🏃‍♂️ Бег 30 минут — 300 ккал. Дополнительно: выпейте 200 мл воды."
        );
    }

    #[tokio::test]
    async fn short_workout_has_no_water_note() {
        let state = state_with_profile().await;

        let replies = run_command(&state, CHAT, Command::LogWorkout("йога 20".to_string())).await;

        assert_eq!(text(&replies), "🏃‍♂️ Йога 20 минут — 80 ккал.");
    }

    #[tokio::test]
    async fn workout_usage_and_validation() {
        let state = state_with_profile().await;

        let replies = run_command(&state, CHAT, Command::LogWorkout("бег".to_string())).await;
        assert!(text(&replies).starts_with("Использование"));

        let replies = run_command(&state, CHAT, Command::LogWorkout("бег полчаса".to_string())).await;
        assert_eq!(text(&replies), "Пожалуйста, введите число для времени тренировки.");
    }

    #[tokio::test]
    async fn overflowing_workout_is_rejected() {
        let state = state_with_profile().await;

        let replies = run_command(&state, CHAT, Command::LogWorkout("бег 9223372036854775807".to_string())).await;

        assert_eq!(text(&replies), WORKOUT_NUMBER);
        assert_eq!(state.profile(CHAT).await.unwrap().burned_calories, 0.0);
        assert_eq!(state.history(CHAT).await.len(), 1);
    }

    #[tokio::test]
    async fn overflowing_water_total_is_rejected() {
        let state = state_with_profile().await;
        let huge = i64::MAX.to_string();

        run_command(&state, CHAT, Command::LogWater(huge.clone())).await;
        let replies = run_command(&state, CHAT, Command::LogWater(huge)).await;

        assert_eq!(text(&replies), WATER_NUMBER);
        assert_eq!(state.profile(CHAT).await.unwrap().logged_water, i64::MAX);
        assert_eq!(state.history(CHAT).await.len(), 2);
    }

    #[tokio::test]
    async fn burned_calories_accumulate() {
        let state = state_with_profile().await;

        run_command(&state, CHAT, Command::LogBurned("150.5".to_string())).await;
        let replies = run_command(&state, CHAT, Command::LogBurned("49.5".to_string())).await;

        assert_eq!(text(&replies), "Записано: сожжено 200.0 ккал.");
        assert_eq!(state.history(CHAT).await.len(), 3);
    }

    #[tokio::test]
    async fn check_progress_reports_balance() {
        let state = state_with_profile().await;
        state
            .try_update_profile(CHAT, |p| {
                p.logged_calories = 1000.0;
                p.burned_calories = 250.0;
                Ok::<_, ()>(())
            })
            .await;

        let replies = run_command(&state, CHAT, Command::CheckProgress).await;

        assert!(text(&replies).contains("Баланс: 750.0 ккал."));
    }

    #[tokio::test]
    async fn food_lookup_enters_gram_entry() {
        let apple = FoodItem { name: "Apple".to_string(), kcal_per_100g: 52.0 };
        let state = state_with(None, Some(apple.clone()));

        let replies = run_command(&state, CHAT, Command::LogFood("яблоко".to_string())).await;

        assert!(text(&replies).contains("Apple — 52 ккал на 100 г"));
        assert_eq!(state.dialogue(CHAT).await, DialogueState::AwaitingFoodGrams { food: apple });
    }

    #[tokio::test]
    async fn food_not_found_leaves_dialogue_cleared() {
        let state = state_with(None, None);
        state.set_dialogue(CHAT, DialogueState::AwaitingWeight).await;

        let replies = run_command(&state, CHAT, Command::LogFood("несуществующее".to_string())).await;

        assert_eq!(text(&replies), "Не удалось найти информацию о данном продукте.");
        assert!(state.dialogue(CHAT).await.is_idle());
    }

    #[tokio::test]
    async fn food_lookup_error_reads_as_not_found() {
        let state = BotState::new(Arc::new(FixedWeather(None)), Arc::new(BrokenFood));
        state.set_dialogue(CHAT, DialogueState::AwaitingWeight).await;

        let replies = run_command(&state, CHAT, Command::LogFood("яблоко".to_string())).await;

        assert_eq!(text(&replies), "Не удалось найти информацию о данном продукте.");
        assert!(state.dialogue(CHAT).await.is_idle());
    }

    #[tokio::test]
    async fn food_requires_a_name() {
        let state = state_with(None, None);

        let replies = run_command(&state, CHAT, Command::LogFood("   ".to_string())).await;

        assert!(text(&replies).starts_with("Использование"));
    }

    #[tokio::test]
    async fn set_profile_starts_dialogue() {
        let state = state_with(None, None);

        let replies = run_command(&state, CHAT, Command::SetProfile).await;

        assert_eq!(text(&replies), ASK_WEIGHT);
        assert_eq!(state.dialogue(CHAT).await, DialogueState::AwaitingWeight);
    }

    #[tokio::test]
    async fn graph_needs_two_snapshots() {
        let state = state_with(None, None);
        let replies = run_command(&state, CHAT, Command::GraphProgress).await;
        assert_eq!(text(&replies), NOT_ENOUGH_DATA);

        let state = state_with_profile().await;
        let replies = run_command(&state, CHAT, Command::GraphProgress).await;
        assert_eq!(text(&replies), NOT_ENOUGH_DATA);
    }

    #[tokio::test]
    async fn graph_sends_one_photo() {
        let state = state_with_profile().await;
        run_command(&state, CHAT, Command::LogWater("300".to_string())).await;

        let replies = run_command(&state, CHAT, Command::GraphProgress).await;

        assert_eq!(replies.len(), 1);
        match &replies[0] {
            Reply::Photo { png, caption } => {
                assert!(!png.is_empty());
                assert_eq!(caption, CHART_CAPTION);
            }
            other => panic!("expected photo, got {other:?}"),
        }
    }
}
