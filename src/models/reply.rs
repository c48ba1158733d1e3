/// Ответ бота, который транспортный слой отправляет в чат
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Photo { png: Vec<u8>, caption: String },
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    #[cfg(test)]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(text) => Some(text),
            Reply::Photo { .. } => None,
        }
    }
}
