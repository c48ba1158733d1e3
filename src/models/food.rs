#[derive(Debug, Clone, PartialEq)]
pub struct FoodItem {
    pub name: String,
    pub kcal_per_100g: f64,
}

impl FoodItem {
    pub fn calories_for(&self, grams: f64) -> f64 {
        grams * self.kcal_per_100g / 100.0
    }
}
