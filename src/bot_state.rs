use std::collections::HashMap;
use std::sync::Arc;
use teloxide::types::ChatId;
use tokio::sync::RwLock;

use crate::lookup::{FoodLookup, WeatherLookup};
use crate::models::{DialogueState, ProgressSnapshot, UserProfile, UserState};

type UserStates = Arc<RwLock<HashMap<ChatId, UserState>>>;

/// Состояние бота на весь процесс: профили, история и диалоги пользователей.
/// Живёт только в памяти и теряется при перезапуске.
#[derive(Clone)]
pub struct BotState {
    users: UserStates,
    pub weather: Arc<dyn WeatherLookup>,
    pub food: Arc<dyn FoodLookup>,
}

impl BotState {
    pub fn new(weather: Arc<dyn WeatherLookup>, food: Arc<dyn FoodLookup>) -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            weather,
            food,
        }
    }

    pub async fn dialogue(&self, chat_id: ChatId) -> DialogueState {
        let users = self.users.read().await;
        users
            .get(&chat_id)
            .map(|user| user.dialogue.clone())
            .unwrap_or_default()
    }

    pub async fn set_dialogue(&self, chat_id: ChatId, dialogue: DialogueState) {
        let mut users = self.users.write().await;
        users.entry(chat_id).or_default().dialogue = dialogue;
    }

    pub async fn clear_dialogue(&self, chat_id: ChatId) {
        let mut users = self.users.write().await;
        if let Some(user) = users.get_mut(&chat_id) {
            user.dialogue = DialogueState::Idle;
        }
    }

    pub async fn profile(&self, chat_id: ChatId) -> Option<UserProfile> {
        let users = self.users.read().await;
        users.get(&chat_id).and_then(|user| user.profile.clone())
    }

    /// Записывает профиль целиком (старый затирается) и добавляет точку в историю
    pub async fn save_profile(&self, chat_id: ChatId, profile: UserProfile) {
        let mut users = self.users.write().await;
        let user = users.entry(chat_id).or_default();
        user.history.push(ProgressSnapshot::capture(&profile));
        user.profile = Some(profile);

        log::debug!("💾 Profile saved for user {}", chat_id);
    }

    /// Изменяет существующий профиль и фиксирует точку истории под одной блокировкой.
    /// Без профиля возвращает `None`. Если `update` вернул `Err`, профиль и история остаются как были.
    pub async fn try_update_profile<F, E>(
        &self,
        chat_id: ChatId,
        update: F,
    ) -> Option<Result<UserProfile, E>>
    where
        F: FnOnce(&mut UserProfile) -> Result<(), E>,
    {
        let mut users = self.users.write().await;
        let user = users.get_mut(&chat_id)?;
        let profile = user.profile.as_mut()?;

        let mut updated = profile.clone();
        if let Err(e) = update(&mut updated) {
            return Some(Err(e));
        }
        user.history.push(ProgressSnapshot::capture(&updated));
        *profile = updated.clone();

        Some(Ok(updated))
    }

    pub async fn history(&self, chat_id: ChatId) -> Vec<ProgressSnapshot> {
        let users = self.users.read().await;
        users
            .get(&chat_id)
            .map(|user| user.history.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
pub mod testing {
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::Arc;

    use super::BotState;
    use crate::lookup::{FoodLookup, LookupError, WeatherLookup};
    use crate::models::FoodItem;

    /// Погода для тестов: `None` означает ответ без температуры
    pub struct FixedWeather(pub Option<f64>);

    #[async_trait]
    impl WeatherLookup for FixedWeather {
        async fn current_temperature(&self, _city: &str) -> Result<f64, LookupError> {
            self.0.ok_or(LookupError::MissingData)
        }
    }

    /// Сервис погоды не отвечает
    pub struct UnreachableWeather;

    #[async_trait]
    impl WeatherLookup for UnreachableWeather {
        async fn current_temperature(&self, _city: &str) -> Result<f64, LookupError> {
            Err(LookupError::Transport(reqwest_middleware::Error::Middleware(
                anyhow::anyhow!("connection refused"),
            )))
        }
    }

    pub struct FixedFood(pub Option<FoodItem>);

    #[async_trait]
    impl FoodLookup for FixedFood {
        async fn find_food(&self, _query: &str) -> Result<Option<FoodItem>, LookupError> {
            Ok(self.0.clone())
        }
    }

    /// Поиск продуктов отвечает ошибкой сервера
    pub struct BrokenFood;

    #[async_trait]
    impl FoodLookup for BrokenFood {
        async fn find_food(&self, _query: &str) -> Result<Option<FoodItem>, LookupError> {
            Err(LookupError::Status(StatusCode::SERVICE_UNAVAILABLE))
        }
    }

    pub fn state_with(temperature: Option<f64>, food: Option<FoodItem>) -> BotState {
        BotState::new(Arc::new(FixedWeather(temperature)), Arc::new(FixedFood(food)))
    }
}
