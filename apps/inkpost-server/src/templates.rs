//! Page templates, compiled from `templates/` by askama.

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use askama::Template;
use inkpost_core::domain::{AuthoredPost, Post};
use inkpost_shared::ErrorResponse;

use crate::middleware::error::AppResult;

pub const HTML: &str = "text/html; charset=utf-8";

#[derive(Template)]
#[template(path = "post_list.html")]
pub struct PostListTemplate<'a> {
    pub viewer: Option<&'a str>,
    pub posts: &'a [AuthoredPost],
}

#[derive(Template)]
#[template(path = "post_detail.html")]
pub struct PostDetailTemplate<'a> {
    pub viewer: Option<&'a str>,
    pub entry: &'a AuthoredPost,
}

#[derive(Template)]
#[template(path = "post_add.html")]
pub struct PostAddTemplate<'a> {
    pub viewer: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "post_edit.html")]
pub struct PostEditTemplate<'a> {
    pub viewer: Option<&'a str>,
    pub post: &'a Post,
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate<'a> {
    pub viewer: Option<&'a str>,
    pub username: &'a str,
    pub error: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate<'a> {
    pub viewer: Option<&'a str>,
    pub error: &'a ErrorResponse,
}

pub fn render_html<T: Template>(template: &T) -> Result<String, askama::Error> {
    template.render()
}

/// Render a page with `200 OK`.
pub fn page<T: Template>(template: &T) -> AppResult<HttpResponse> {
    page_with_status(StatusCode::OK, template)
}

pub fn page_with_status<T: Template>(status: StatusCode, template: &T) -> AppResult<HttpResponse> {
    let html = render_html(template)?;
    Ok(HttpResponse::build(status).content_type(HTML).body(html))
}
