use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AuthoredPost, NewPost, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Insert a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Overwrite an existing entity. `None` when no row has its id;
    /// nothing is written in that case.
    async fn update(&self, entity: T) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID. Returns whether a row was removed;
    /// deleting a missing entity is not an error.
    async fn delete(&self, id: ID) -> Result<bool, RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository. Post ids are assigned by the store and only grow.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    /// Insert a new post, returning it with its id and creation date.
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// All posts, highest id first.
    async fn list_newest_first(&self) -> Result<Vec<AuthoredPost>, RepoError>;

    async fn find_authored(&self, id: i64) -> Result<Option<AuthoredPost>, RepoError>;
}
