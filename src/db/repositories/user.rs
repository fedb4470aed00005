use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::db::StoreError;
use crate::entities::users;

/// User row as handed out by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub status: bool,
    pub role: bool,
    pub created_at: String,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            status: model.status,
            role: model.role,
            created_at: model.created_at,
        }
    }
}

/// Fields for a create request, already validated by the forms layer.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub status: bool,
    pub role: bool,
}

/// Fields for an edit request. All fields are replaced in place; the id is
/// immutable and uniqueness is not re-checked against other rows.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub username: String,
    pub email: String,
    pub status: bool,
    pub role: bool,
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn list(&self) -> Result<Vec<User>, StoreError> {
        let rows = users::Entity::find()
            .order_by_asc(users::Column::Id)
            .all(&self.conn)
            .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    pub async fn get_by_id(&self, id: i32) -> Result<User, StoreError> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        Ok(User::from(user))
    }

    /// Insert a new user. Uniqueness of `username` and `email` is checked
    /// ahead of the insert so collisions surface as [`StoreError::Duplicate`]
    /// instead of a driver error.
    pub async fn create(&self, new_user: NewUser) -> Result<User, StoreError> {
        if self.username_taken(&new_user.username).await? {
            return Err(StoreError::Duplicate {
                field: "username",
                value: new_user.username,
            });
        }

        if self.email_taken(&new_user.email).await? {
            return Err(StoreError::Duplicate {
                field: "email",
                value: new_user.email,
            });
        }

        let now = chrono::Utc::now().to_rfc3339();

        let active = users::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            status: Set(new_user.status),
            role: Set(new_user.role),
            created_at: Set(now),
            ..Default::default()
        };

        let model = active.insert(&self.conn).await?;
        Ok(User::from(model))
    }

    pub async fn update(&self, id: i32, changes: UserChanges) -> Result<User, StoreError> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await?
            .ok_or(StoreError::NotFound(id))?;

        let mut active: users::ActiveModel = user.into();
        active.username = Set(changes.username);
        active.email = Set(changes.email);
        active.status = Set(changes.status);
        active.role = Set(changes.role);

        let model = active.update(&self.conn).await?;
        Ok(User::from(model))
    }

    pub async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let result = users::Entity::delete_by_id(id).exec(&self.conn).await?;

        if result.rows_affected == 0 {
            return Err(StoreError::NotFound(id));
        }

        Ok(())
    }

    async fn username_taken(&self, username: &str) -> Result<bool, StoreError> {
        let existing = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?;

        Ok(existing.is_some())
    }

    async fn email_taken(&self, email: &str) -> Result<bool, StoreError> {
        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await?;

        Ok(existing.is_some())
    }
}
