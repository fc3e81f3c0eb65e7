//! PostgreSQL repository implementations.

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

use inkpost_core::domain::{AuthoredPost, NewPost, Post, User};
use inkpost_core::error::RepoError;
use inkpost_core::ports::{PostRepository, UserRepository};

use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<PostEntity>;

/// Pair a post row with its joined author row.
fn authored((post, author): (post::Model, Option<user::Model>)) -> AuthoredPost {
    let author = match author {
        Some(user) => user.username,
        None => {
            tracing::warn!(post_id = post.id, "Post has no matching author row");
            String::new()
        }
    };

    AuthoredPost {
        post: post.into(),
        author,
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&*self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let active_model: post::ActiveModel = post.into();
        let model = active_model.insert(&*self.db).await.map_err(query_error)?;

        tracing::debug!(post_id = model.id, "Inserted post");
        Ok(model.into())
    }

    async fn list_newest_first(&self) -> Result<Vec<AuthoredPost>, RepoError> {
        let rows = PostEntity::find()
            .find_also_related(UserEntity)
            .order_by_desc(post::Column::Id)
            .all(&*self.db)
            .await
            .map_err(query_error)?;

        Ok(rows.into_iter().map(authored).collect())
    }

    async fn find_authored(&self, id: i64) -> Result<Option<AuthoredPost>, RepoError> {
        let row = PostEntity::find_by_id(id)
            .find_also_related(UserEntity)
            .one(&*self.db)
            .await
            .map_err(query_error)?;

        Ok(row.map(authored))
    }
}
