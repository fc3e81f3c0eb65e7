//! Form payloads submitted by the HTML pages.

use serde::{Deserialize, Serialize};

/// Fields of the add and edit post forms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub text: String,
}

/// Fields of the login form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}
