use crate::orm::usuarios;
use sea_orm::{entity::*, query::*, ConnectionTrait, DbErr};
use serde::Serialize;

/// A user as the chat sees it: id, display name and role.
#[derive(Clone, Debug, Serialize)]
pub struct Profile {
    pub id: i32,
    pub name: String,
    pub role: String,
}

impl From<usuarios::Model> for Profile {
    fn from(model: usuarios::Model) -> Self {
        Self {
            id: model.id,
            name: model.nome,
            role: model.role,
        }
    }
}

impl Profile {
    /// Returns the user with `id`, if it exists.
    pub async fn get_by_id<C>(db: &C, id: i32) -> Result<Option<Self>, DbErr>
    where
        C: ConnectionTrait,
    {
        Ok(usuarios::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(Self::from))
    }

    /// Returns the administrator with the lowest id, if any user has `admin_role`.
    pub async fn first_admin<C>(db: &C, admin_role: &str) -> Result<Option<Self>, DbErr>
    where
        C: ConnectionTrait,
    {
        Ok(usuarios::Entity::find()
            .filter(usuarios::Column::Role.eq(admin_role))
            .order_by_asc(usuarios::Column::Id)
            .one(db)
            .await?
            .map(Self::from))
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role == role
    }
}
