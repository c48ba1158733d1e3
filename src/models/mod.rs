pub mod dialogue;
pub mod food;
pub mod progress;
pub mod reply;
pub mod user_profile;
pub mod user_state;
pub mod workout;

pub use dialogue::DialogueState;
pub use food::FoodItem;
pub use progress::ProgressSnapshot;
pub use reply::Reply;
pub use user_profile::{BodyMetrics, UserProfile};
pub use user_state::UserState;
pub use workout::WorkoutKind;
