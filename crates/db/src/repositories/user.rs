//! User repository for database operations.

use glimpse_core::auth::{AuthError, NewUser, User, UserChanges, UserStore};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set, SqlErr,
};
use uuid::Uuid;

use crate::entities::user;

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn store_error(err: DbErr) -> AuthError {
    AuthError::store(err.to_string())
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn to_domain(model: user::Model) -> User {
    User {
        id: model.id,
        email: model.email,
        hashed_password: model.hashed_password,
        is_active: model.is_active,
        is_superuser: model.is_superuser,
        is_verified: model.is_verified,
    }
}

impl UserStore for UserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(store_error)?;

        Ok(model.map(to_domain))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(store_error)?;

        Ok(model.map(to_domain))
    }

    async fn create(&self, input: NewUser) -> Result<User, AuthError> {
        let active_model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(input.email),
            hashed_password: Set(input.hashed_password),
            is_active: Set(input.is_active),
            is_superuser: Set(input.is_superuser),
            is_verified: Set(input.is_verified),
        };

        let model = active_model.insert(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::UserAlreadyExists
            } else {
                store_error(e)
            }
        })?;

        Ok(to_domain(model))
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<User, AuthError> {
        let model = user::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(store_error)?
            .ok_or(AuthError::UserNotFound)?;

        let mut active_model = model.into_active_model();
        if let Some(email) = changes.email {
            active_model.email = Set(email);
        }
        if let Some(hashed_password) = changes.hashed_password {
            active_model.hashed_password = Set(hashed_password);
        }
        if let Some(is_active) = changes.is_active {
            active_model.is_active = Set(is_active);
        }
        if let Some(is_superuser) = changes.is_superuser {
            active_model.is_superuser = Set(is_superuser);
        }
        if let Some(is_verified) = changes.is_verified {
            active_model.is_verified = Set(is_verified);
        }

        let model = active_model.update(&self.db).await.map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::EmailTaken
            } else {
                store_error(e)
            }
        })?;

        Ok(to_domain(model))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AuthError> {
        let result = user::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(store_error)?;

        Ok(result.rows_affected > 0)
    }
}
