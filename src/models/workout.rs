#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutKind {
    Running,
    Strength,
    Swimming,
    Yoga,
    Other,
}

impl WorkoutKind {
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "бег" | "running" => WorkoutKind::Running,
            "силовая" | "strength" => WorkoutKind::Strength,
            "плавание" | "swimming" => WorkoutKind::Swimming,
            "йога" | "yoga" => WorkoutKind::Yoga,
            _ => WorkoutKind::Other,
        }
    }

    /// ккал в минуту
    pub fn coefficient(self) -> i64 {
        match self {
            WorkoutKind::Running => 10,
            WorkoutKind::Strength => 8,
            WorkoutKind::Swimming => 11,
            WorkoutKind::Yoga => 4,
            WorkoutKind::Other => 10,
        }
    }
}
