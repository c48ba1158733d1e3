use teloxide::prelude::*;
use teloxide::types::InputFile;

use crate::models::Reply;

pub const NO_PROFILE: &str = "Сначала заполните профиль командой /set_profile.";
pub const HELP_HINT: &str = "Введите /help для списка команд.";

/// Отправка подготовленных ответов в чат
pub async fn send_replies(
    bot: &Bot,
    chat_id: ChatId,
    replies: Vec<Reply>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    for reply in replies {
        match reply {
            Reply::Text(text) => {
                bot.send_message(chat_id, text).await?;
            }
            Reply::Photo { png, caption } => {
                bot.send_photo(chat_id, InputFile::memory(png).file_name("progress.png"))
                    .caption(caption)
                    .await?;
            }
        }
    }
    Ok(())
}

/// Целое число из ответа пользователя
pub fn parse_int(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

/// Конечное число из ответа пользователя; запятая как десятичный разделитель не поддерживается
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Количества для логирования не могут быть отрицательными, иначе счётчики пойдут назад
pub fn parse_amount_int(text: &str) -> Option<i64> {
    parse_int(text).filter(|n| *n >= 0)
}

pub fn parse_amount(text: &str) -> Option<f64> {
    parse_number(text).filter(|n| *n >= 0.0)
}

/// "бЕг" -> "Бег"
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
