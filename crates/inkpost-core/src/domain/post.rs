use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Post entity - a single blog entry.
///
/// `published_date` stays `None` until the post is explicitly published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub author_id: Uuid,
    pub title: String,
    pub text: String,
    pub created_date: DateTime<Utc>,
    pub published_date: Option<DateTime<Utc>>,
}

impl Post {
    /// Replace the editable content, leaving authorship and dates alone.
    pub fn edit(&mut self, title: String, text: String) {
        self.title = title;
        self.text = text;
    }

    /// Mark the post as published at `at`.
    pub fn publish(&mut self, at: DateTime<Utc>) {
        self.published_date = Some(at);
    }

    pub fn unpublish(&mut self) {
        self.published_date = None;
    }

    pub fn is_published(&self) -> bool {
        self.published_date.is_some()
    }
}

/// Insert payload for a post. The store assigns the id and creation date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub author_id: Uuid,
    pub title: String,
    pub text: String,
}

impl NewPost {
    pub fn new(author_id: Uuid, title: String, text: String) -> Self {
        Self {
            author_id,
            title,
            text,
        }
    }

    /// Materialize the post once the store has picked its id and timestamp.
    pub fn into_post(self, id: i64, created_date: DateTime<Utc>) -> Post {
        Post {
            id,
            author_id: self.author_id,
            title: self.title,
            text: self.text,
            created_date,
            published_date: None,
        }
    }
}

/// A post together with its author's username, as shown on pages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthoredPost {
    pub post: Post,
    pub author: String,
}
