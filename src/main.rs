use teloxide::{prelude::*, utils::command::BotCommands};
use std::sync::Arc;

mod bot_state;
mod charts;
mod config;
mod formulas;
mod handlers;
mod lookup;
mod models;

use crate::bot_state::BotState;
use crate::config::Config;
use crate::handlers::{command_handler, message_handler};
use crate::lookup::{http_client, OpenFoodFactsClient, OpenWeatherClient};

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "snake_case", description = "Доступные команды:")]
pub enum Command {
    #[command(description = "начало работы")]
    Start,
    #[command(description = "список команд")]
    Help,
    #[command(description = "заполнение профиля")]
    SetProfile,
    #[command(description = "логирование воды: /log_water <мл>")]
    LogWater(String),
    #[command(description = "логирование еды: /log_food <название продукта>")]
    LogFood(String),
    #[command(description = "логирование сожжённых ккал: /log_burned <ккал>")]
    LogBurned(String),
    #[command(description = "логирование тренировки: /log_workout <тип> <мин>")]
    LogWorkout(String),
    #[command(description = "прогресс по воде и калориям")]
    CheckProgress,
    #[command(description = "графики прогресса")]
    GraphProgress,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Загружаем .env и инициализируем логирование
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting hydration bot...");

    let config = Config::from_env()?;

    if let Some(path) = &config.chart_font_path {
        charts::register_chart_font(path)?;
        log::info!("✅ Chart font loaded from {}", path.display());
    } else {
        log::warn!("CHART_FONT_PATH is not set, charts will be drawn without labels");
    }

    let client = http_client(config.lookup_retries);
    let weather = OpenWeatherClient::new(client.clone(), &config.weather_api_url, &config.weather_api_key);
    let food = OpenFoodFactsClient::new(client, &config.food_api_url);

    let state = BotState::new(Arc::new(weather), Arc::new(food));

    let bot = Bot::new(&config.bot_token);

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        log::warn!("Failed to register command list: {}", e);
    }

    let handler = dptree::entry()
        .branch(
            Update::filter_message()
                .filter_command::<Command>()
                .endpoint(command_handler)
        )
        .branch(Update::filter_message().endpoint(message_handler));

    log::info!("🚀 Starting dispatcher...");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
