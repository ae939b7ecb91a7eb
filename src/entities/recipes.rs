use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "recipes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub name: String,

    pub description: String,

    pub category: Option<String>,

    /// Owning user. Always assigned server-side.
    pub user_id: i64,

    pub created_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "Cascade",
        on_delete = "Cascade"
    )]
    Users,
    #[sea_orm(has_many = "super::recipe_photos::Entity")]
    RecipePhotos,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::recipe_photos::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipePhotos.def()
    }
}

impl Related<super::ingredients::Entity> for Entity {
    fn to() -> RelationDef {
        super::recipe_ingredients::Relation::Ingredients.def()
    }
    fn via() -> Option<RelationDef> {
        Some(super::recipe_ingredients::Relation::Recipes.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
