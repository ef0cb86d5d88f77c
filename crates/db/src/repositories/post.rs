//! Post repository for database operations.
//!
//! Implements post persistence using SeaORM.

use std::collections::HashMap;

use chrono::Utc;
use glimpse_core::post::{NewPost, Post, PostError, PostRepository as PostRepoTrait};
use glimpse_shared::types::PageRequest;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::{post, user};

/// Post repository implementation.
#[derive(Debug, Clone)]
pub struct PostRepository {
    db: DatabaseConnection,
}

impl PostRepository {
    /// Create a new post repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl PostRepoTrait for PostRepository {
    async fn create(&self, input: NewPost) -> Result<Post, PostError> {
        let active_model = post::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(input.user_id),
            caption: Set(input.caption),
            url: Set(input.url),
            file_type: Set(input.file_type.into()),
            file_name: Set(input.file_name),
            created_at: Set(Utc::now().into()),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(|e| PostError::repository(e.to_string()))?;

        Ok(to_domain(model))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, PostError> {
        let model = post::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| PostError::repository(e.to_string()))?;

        Ok(model.map(to_domain))
    }

    async fn list_newest_first(&self, page: Option<PageRequest>) -> Result<Vec<Post>, PostError> {
        let mut query = post::Entity::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id);
        if let Some(page) = page {
            query = query.offset(page.offset()).limit(page.limit());
        }

        let models = query
            .all(&self.db)
            .await
            .map_err(|e| PostError::repository(e.to_string()))?;

        Ok(models.into_iter().map(to_domain).collect())
    }

    async fn count(&self) -> Result<u64, PostError> {
        post::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| PostError::repository(e.to_string()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, PostError> {
        let result = post::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| PostError::repository(e.to_string()))?;

        Ok(result.rows_affected > 0)
    }

    async fn author_emails(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, String>, PostError> {
        if user_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = user::Entity::find()
            .filter(user::Column::Id.is_in(user_ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(|e| PostError::repository(e.to_string()))?;

        Ok(users.into_iter().map(|u| (u.id, u.email)).collect())
    }
}

/// Convert database model to domain post.
fn to_domain(model: post::Model) -> Post {
    Post {
        id: model.id,
        user_id: model.user_id,
        caption: model.caption,
        url: model.url,
        file_type: model.file_type.into(),
        file_name: model.file_name,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
