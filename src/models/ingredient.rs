use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub quantity: i32,
}

impl From<crate::entities::ingredients::Model> for Ingredient {
    fn from(model: crate::entities::ingredients::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            quantity: model.quantity,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewIngredient {
    pub name: String,
    pub quantity: i32,
}
