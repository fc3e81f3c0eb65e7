//! In-memory repositories - used when no database is configured, and by tests.
//!
//! Data is lost on process restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use inkpost_core::domain::{AuthoredPost, NewPost, Post, User};
use inkpost_core::error::RepoError;
use inkpost_core::ports::{BaseRepository, PostRepository, UserRepository};

/// Users keyed by id.
#[derive(Default)]
pub struct InMemoryUserRepository {
    store: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        Ok(self.store.read().await.get(&id).cloned())
    }

    async fn insert(&self, user: User) -> Result<User, RepoError> {
        let mut store = self.store.write().await;

        if store.values().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint(format!(
                "username '{}' already exists",
                user.username
            )));
        }
        if store.contains_key(&user.id) {
            return Err(RepoError::Constraint(format!("user {} already exists", user.id)));
        }

        store.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: User) -> Result<Option<User>, RepoError> {
        let mut store = self.store.write().await;

        let taken = store
            .values()
            .any(|u| u.username == user.username && u.id != user.id);
        if taken {
            return Err(RepoError::Constraint(format!(
                "username '{}' already exists",
                user.username
            )));
        }

        match store.get_mut(&user.id) {
            Some(row) => {
                *row = user.clone();
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepoError> {
        Ok(self.store.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let store = self.store.read().await;
        Ok(store.values().find(|u| u.username == username).cloned())
    }
}

struct PostTable {
    // BTreeMap keeps rows in id order; ids only grow, like a sequence.
    rows: BTreeMap<i64, Post>,
    next_id: i64,
}

/// Posts keyed by id, with authors resolved through a user repository.
pub struct InMemoryPostRepository {
    users: Arc<dyn UserRepository>,
    table: RwLock<PostTable>,
}

impl InMemoryPostRepository {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            users,
            table: RwLock::new(PostTable {
                rows: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    async fn with_author(&self, post: Post) -> Result<AuthoredPost, RepoError> {
        let author = match self.users.find_by_id(post.author_id).await? {
            Some(user) => user.username,
            None => {
                tracing::warn!(post_id = post.id, "Post has no matching author");
                String::new()
            }
        };

        Ok(AuthoredPost { post, author })
    }
}

#[async_trait]
impl BaseRepository<Post, i64> for InMemoryPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;
        if table.rows.contains_key(&post.id) {
            return Err(RepoError::Constraint(format!("post {} already exists", post.id)));
        }

        table.next_id = table.next_id.max(post.id + 1);
        table.rows.insert(post.id, post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Option<Post>, RepoError> {
        let mut table = self.table.write().await;

        match table.rows.get_mut(&post.id) {
            Some(row) => {
                *row = post.clone();
                Ok(Some(post))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, RepoError> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        let mut table = self.table.write().await;
        let id = table.next_id;
        table.next_id += 1;

        let post = new_post.into_post(id, Utc::now());
        table.rows.insert(id, post.clone());

        tracing::debug!(post_id = id, "Inserted post");
        Ok(post)
    }

    async fn list_newest_first(&self) -> Result<Vec<AuthoredPost>, RepoError> {
        let posts: Vec<Post> = self.table.read().await.rows.values().rev().cloned().collect();

        let mut authored = Vec::with_capacity(posts.len());
        for post in posts {
            authored.push(self.with_author(post).await?);
        }
        Ok(authored)
    }

    async fn find_authored(&self, id: i64) -> Result<Option<AuthoredPost>, RepoError> {
        match self.find_by_id(id).await? {
            Some(post) => Ok(Some(self.with_author(post).await?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> (Arc<InMemoryUserRepository>, InMemoryPostRepository, User) {
        let users = Arc::new(InMemoryUserRepository::new());
        let author = users
            .insert(User::new("alice".to_string(), "hash".to_string()))
            .await
            .unwrap();
        let posts = InMemoryPostRepository::new(users.clone());
        (users, posts, author)
    }

    fn draft(author: &User, title: &str) -> NewPost {
        NewPost::new(author.id, title.to_string(), "body".to_string())
    }

    #[tokio::test]
    async fn test_create_assigns_increasing_ids() {
        let (_, posts, author) = setup().await;

        let first = posts.create(draft(&author, "one")).await.unwrap();
        let second = posts.create(draft(&author, "two")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(second.published_date.is_none());
    }

    #[tokio::test]
    async fn test_list_is_newest_first_with_author() {
        let (_, posts, author) = setup().await;
        for title in ["one", "two", "three"] {
            posts.create(draft(&author, title)).await.unwrap();
        }

        let listed = posts.list_newest_first().await.unwrap();

        let ids: Vec<i64> = listed.iter().map(|p| p.post.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
        assert!(listed.iter().all(|p| p.author == "alice"));
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let (_, posts, author) = setup().await;
        let first = posts.create(draft(&author, "one")).await.unwrap();

        assert!(posts.delete(first.id).await.unwrap());
        let next = posts.create(draft(&author, "two")).await.unwrap();

        assert_eq!(next.id, 2);
    }

    #[tokio::test]
    async fn test_delete_missing_post_is_not_an_error() {
        let (_, posts, _) = setup().await;

        assert!(!posts.delete(42).await.unwrap());
    }

    #[tokio::test]
    async fn test_update_overwrites_existing_row() {
        let (_, posts, author) = setup().await;
        let mut post = posts.create(draft(&author, "one")).await.unwrap();

        post.edit("edited".to_string(), "new body".to_string());
        let updated = posts.update(post.clone()).await.unwrap();

        assert_eq!(updated, Some(post.clone()));
        let stored = posts.find_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(stored, post);
    }

    #[tokio::test]
    async fn test_update_after_delete_does_not_resurrect_row() {
        let (_, posts, author) = setup().await;
        let mut post = posts.create(draft(&author, "one")).await.unwrap();
        assert!(posts.delete(post.id).await.unwrap());

        post.edit("edited".to_string(), "new body".to_string());
        let updated = posts.update(post.clone()).await.unwrap();

        assert!(updated.is_none());
        assert!(posts.find_by_id(post.id).await.unwrap().is_none());
        assert!(posts.list_newest_first().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_user_is_none() {
        let (users, _, _) = setup().await;

        let stranger = User::new("bob".to_string(), "hash".to_string());
        let updated = users.update(stranger.clone()).await.unwrap();

        assert!(updated.is_none());
        assert!(users.find_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_is_rejected() {
        let (users, _, _) = setup().await;

        let result = users
            .insert(User::new("alice".to_string(), "other".to_string()))
            .await;

        assert!(matches!(result, Err(RepoError::Constraint(_))));
    }

    #[tokio::test]
    async fn test_find_by_username() {
        let (users, _, author) = setup().await;

        let found = users.find_by_username("alice").await.unwrap().unwrap();

        assert_eq!(found.id, author.id);
        assert!(users.find_by_username("mallory").await.unwrap().is_none());
    }
}
