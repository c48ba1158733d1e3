use super::{DialogueState, ProgressSnapshot, UserProfile};

#[derive(Debug, Clone, Default)]
pub struct UserState {
    pub profile: Option<UserProfile>,
    pub history: Vec<ProgressSnapshot>,
    pub dialogue: DialogueState,
}
