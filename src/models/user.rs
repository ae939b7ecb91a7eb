use serde::Serialize;

/// Account provider for locally registered users.
pub const DEFAULT_PROVIDER: &str = "DEFAULT";

/// Account provider for users provisioned through Google OIDC.
pub const GOOGLE_PROVIDER: &str = "google";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub birthday: Option<String>,
    pub provider: String,
    pub picture: Option<String>,
    pub created_at: String,
}

impl From<crate::entities::users::Model> for User {
    fn from(model: crate::entities::users::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            surname: model.surname,
            email: model.email,
            birthday: model.birthday,
            provider: model.provider,
            picture: model.picture,
            created_at: model.created_at,
        }
    }
}

/// Fields accepted when creating a user row.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub birthday: Option<String>,
    pub provider: String,
}
