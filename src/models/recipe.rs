use serde::Serialize;

use super::ingredient::Ingredient;

/// A recipe with its photo list and ingredient set resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: Option<String>,
    /// Owning user. Assigned server-side, never taken from the client.
    pub user_id: i64,
    pub created_at: String,
    pub photos: Vec<String>,
    pub ingredients: Vec<Ingredient>,
}

#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub name: String,
    pub description: String,
    pub category: Option<String>,
}
