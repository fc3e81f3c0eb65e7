//! Post pages: list, detail, add, edit, delete, publish.

use actix_web::{HttpResponse, http::header::ContentType, web};
use chrono::Utc;

use inkpost_core::DomainError;
use inkpost_core::domain::{NewPost, Post};
use inkpost_core::ports::{BaseRepository, PostRepository};
use inkpost_shared::PostForm;

use super::{POST_LIST_URL, post_detail_url, redirect};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::templates::{
    self, PostAddTemplate, PostDetailTemplate, PostEditTemplate, PostListTemplate,
};

/// Body returned by the detail page for an unknown post.
pub const POST_NOT_FOUND_BODY: &str = "없음";

async fn load_post(state: &AppState, pk: i64) -> AppResult<Post> {
    let post = state
        .posts
        .find_by_id(pk)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", pk))?;
    Ok(post)
}

/// Write back a post read by `load_post`. A post deleted in between stays deleted.
async fn store_post(state: &AppState, post: Post) -> AppResult<Post> {
    let pk = post.id;
    let post = state
        .posts
        .update(post)
        .await?
        .ok_or_else(|| DomainError::not_found("Post", pk))?;
    Ok(post)
}

/// GET /posts/
pub async fn post_list(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let posts = state.posts.list_newest_first().await?;

    templates::page(&PostListTemplate {
        viewer: viewer.username(),
        posts: &posts,
    })
}

/// GET /post-detail/{pk}/
pub async fn post_detail(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let pk = path.into_inner();

    match state.posts.find_authored(pk).await? {
        Some(entry) => templates::page(&PostDetailTemplate {
            viewer: viewer.username(),
            entry: &entry,
        }),
        None => {
            tracing::debug!(pk, "Post not found");
            Ok(HttpResponse::Ok()
                .content_type(ContentType::plaintext())
                .body(POST_NOT_FOUND_BODY))
        }
    }
}

/// GET /posts/add/
pub async fn post_add_form(identity: Identity) -> AppResult<HttpResponse> {
    templates::page(&PostAddTemplate {
        viewer: Some(identity.username.as_str()),
    })
}

/// POST /posts/add/
pub async fn post_add(
    state: web::Data<AppState>,
    identity: Identity,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let PostForm { title, text } = form.into_inner();

    let post = state
        .posts
        .create(NewPost::new(identity.user_id, title, text))
        .await?;

    tracing::info!(post_id = post.id, author = %identity.username, "Post created");
    Ok(redirect(POST_LIST_URL))
}

/// GET /post-detail/{pk}/edit/
pub async fn post_edit_form(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post = load_post(&state, path.into_inner()).await?;

    templates::page(&PostEditTemplate {
        viewer: viewer.username(),
        post: &post,
    })
}

/// POST /post-detail/{pk}/edit/
pub async fn post_edit(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    form: web::Form<PostForm>,
) -> AppResult<HttpResponse> {
    let mut post = load_post(&state, path.into_inner()).await?;
    let PostForm { title, text } = form.into_inner();

    post.edit(title, text);
    let post = store_post(&state, post).await?;

    tracing::info!(post_id = post.id, "Post edited");
    Ok(redirect(post_detail_url(post.id)))
}

/// GET /post-detail/{pk}/delete/
pub async fn post_delete(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let pk = path.into_inner();

    let removed = state.posts.delete(pk).await?;
    tracing::info!(pk, removed, "Post delete requested");

    Ok(redirect(POST_LIST_URL))
}

/// GET /post-detail/{pk}/publish/
pub async fn post_publish(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let mut post = load_post(&state, path.into_inner()).await?;

    post.publish(Utc::now());
    let post = store_post(&state, post).await?;

    tracing::info!(post_id = post.id, "Post published");
    Ok(redirect(post_detail_url(post.id)))
}

/// GET /post-detail/{pk}/unpublish/
pub async fn post_unpublish(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let mut post = load_post(&state, path.into_inner()).await?;

    post.unpublish();
    let post = store_post(&state, post).await?;

    tracing::info!(post_id = post.id, "Post unpublished");
    Ok(redirect(post_detail_url(post.id)))
}

#[cfg(test)]
mod tests {
    use actix_web::cookie::Cookie;
    use actix_web::dev::ServiceResponse;
    use actix_web::http::{StatusCode, header};
    use actix_web::{App, test};
    use inkpost_core::domain::User;

    use super::*;
    use crate::middleware::auth::SESSION_COOKIE;
    use crate::middleware::error::AppError;
    use crate::state::testing::state_with_author;

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .configure(crate::handlers::configure_routes),
            )
            .await
        };
    }

    async fn seed(state: &AppState, author: &User, titles: &[&str]) -> Vec<Post> {
        let mut posts = Vec::new();
        for title in titles {
            let draft = NewPost::new(author.id, title.to_string(), format!("{} body", title));
            posts.push(state.posts.create(draft).await.unwrap());
        }
        posts
    }

    fn location(resp: &ServiceResponse) -> &str {
        resp.headers().get(header::LOCATION).unwrap().to_str().unwrap()
    }

    fn form(title: &str, text: &str) -> PostForm {
        PostForm {
            title: title.to_string(),
            text: text.to_string(),
        }
    }

    #[actix_web::test]
    async fn test_list_shows_newest_first() {
        let (state, author, _) = state_with_author().await;
        seed(&state, &author, &["First post", "Second post"]).await;
        let app = app!(state);

        let req = test::TestRequest::get().uri("/posts/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let html = std::str::from_utf8(&body).unwrap();

        let second = html.find("Second post").unwrap();
        let first = html.find("First post").unwrap();
        assert!(second < first);
        assert!(html.contains("alice"));
    }

    #[actix_web::test]
    async fn test_detail_renders_post() {
        let (state, author, _) = state_with_author().await;
        let posts = seed(&state, &author, &["Hello <world>"]).await;
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri(&post_detail_url(posts[0].id))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        let html = std::str::from_utf8(&body).unwrap();
        assert!(html.contains("Hello &lt;world&gt;"));
        assert!(html.contains("Not published"));
    }

    #[actix_web::test]
    async fn test_detail_unknown_post_returns_fallback_text() {
        let (state, _, _) = state_with_author().await;
        let app = app!(state);

        let req = test::TestRequest::get().uri("/post-detail/404/").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body = test::read_body(resp).await;
        assert_eq!(body, POST_NOT_FOUND_BODY.as_bytes());
    }

    #[actix_web::test]
    async fn test_add_creates_one_post_and_redirects() {
        let (state, author, token) = state_with_author().await;
        let app = app!(state.clone());

        let req = test::TestRequest::post()
            .uri("/posts/add/")
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .set_form(form("New", "Fresh text"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), POST_LIST_URL);

        let posts = state.posts.list_newest_first().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].post.title, "New");
        assert_eq!(posts[0].post.text, "Fresh text");
        assert_eq!(posts[0].post.author_id, author.id);
        assert!(posts[0].post.published_date.is_none());
    }

    #[actix_web::test]
    async fn test_add_accepts_bearer_token() {
        let (state, _, token) = state_with_author().await;
        let app = app!(state.clone());

        let req = test::TestRequest::post()
            .uri("/posts/add/")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .set_form(form("Via header", "text"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(state.posts.list_newest_first().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_add_without_login_redirects_to_login() {
        let (state, _, _) = state_with_author().await;
        let app = app!(state.clone());

        let req = test::TestRequest::post()
            .uri("/posts/add/")
            .set_form(form("Anonymous", "text"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&resp), crate::handlers::LOGIN_URL);
        assert!(state.posts.list_newest_first().await.unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_add_form_renders_for_logged_in_user() {
        let (state, _, token) = state_with_author().await;
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri("/posts/add/")
            .cookie(Cookie::new(SESSION_COOKIE, token))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_edit_changes_only_title_and_text() {
        let (state, author, _) = state_with_author().await;
        let mut original = seed(&state, &author, &["Before"]).await.remove(0);
        original.publish(Utc::now());
        let original = state.posts.update(original).await.unwrap().unwrap();
        let app = app!(state.clone());

        let req = test::TestRequest::post()
            .uri(&format!("/post-detail/{}/edit/", original.id))
            .set_form(form("After", "Rewritten"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), post_detail_url(original.id));

        let stored = state.posts.find_by_id(original.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "After");
        assert_eq!(stored.text, "Rewritten");
        assert_eq!(stored.author_id, original.author_id);
        assert_eq!(stored.created_date, original.created_date);
        assert_eq!(stored.published_date, original.published_date);
    }

    #[actix_web::test]
    async fn test_edit_form_is_prefilled() {
        let (state, author, _) = state_with_author().await;
        let post = seed(&state, &author, &["Draft"]).await.remove(0);
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri(&format!("/post-detail/{}/edit/", post.id))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        let html = std::str::from_utf8(&body).unwrap();

        assert!(html.contains(r#"value="Draft""#));
        assert!(html.contains("Draft body"));
    }

    #[actix_web::test]
    async fn test_edit_unknown_post_is_404() {
        let (state, _, _) = state_with_author().await;
        let app = app!(state);

        let req = test::TestRequest::post()
            .uri("/post-detail/9/edit/")
            .set_form(form("x", "y"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_delete_removes_row_and_redirects() {
        let (state, author, _) = state_with_author().await;
        let posts = seed(&state, &author, &["Doomed", "Survivor"]).await;
        let app = app!(state.clone());

        let req = test::TestRequest::get()
            .uri(&format!("/post-detail/{}/delete/", posts[0].id))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), POST_LIST_URL);

        let remaining = state.posts.list_newest_first().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].post.title, "Survivor");
    }

    #[actix_web::test]
    async fn test_delete_missing_post_still_redirects() {
        let (state, _, _) = state_with_author().await;
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri("/post-detail/77/delete/")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), POST_LIST_URL);
    }

    #[actix_web::test]
    async fn test_publish_then_unpublish() {
        let (state, author, _) = state_with_author().await;
        let post = seed(&state, &author, &["Toggle"]).await.remove(0);
        let app = app!(state.clone());

        let req = test::TestRequest::get()
            .uri(&format!("/post-detail/{}/publish/", post.id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        assert_eq!(location(&resp), post_detail_url(post.id));

        let published = state.posts.find_by_id(post.id).await.unwrap().unwrap();
        assert!(published.published_date.is_some());
        assert_eq!(published.title, post.title);

        let req = test::TestRequest::get()
            .uri(&format!("/post-detail/{}/unpublish/", post.id))
            .to_request();
        test::call_service(&app, req).await;

        let unpublished = state.posts.find_by_id(post.id).await.unwrap().unwrap();
        assert!(unpublished.published_date.is_none());
    }

    #[actix_web::test]
    async fn test_publish_unknown_post_is_404() {
        let (state, _, _) = state_with_author().await;
        let app = app!(state);

        let req = test::TestRequest::get()
            .uri("/post-detail/5/publish/")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_store_after_concurrent_delete_is_404() {
        let (state, author, _) = state_with_author().await;
        let post = seed(&state, &author, &["Short-lived"]).await.remove(0);

        let mut loaded = load_post(&state, post.id).await.unwrap();
        assert!(state.posts.delete(post.id).await.unwrap());
        loaded.publish(Utc::now());

        let result = store_post(&state, loaded).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(state.posts.find_by_id(post.id).await.unwrap().is_none());
    }

    #[actix_web::test]
    async fn test_list_marks_drafts() {
        let (state, author, _) = state_with_author().await;
        let mut posts = seed(&state, &author, &["Draft", "Live"]).await;
        let mut live = posts.remove(1);
        live.publish(Utc::now());
        state.posts.update(live).await.unwrap().unwrap();
        let app = app!(state);

        let req = test::TestRequest::get().uri("/posts/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let html = std::str::from_utf8(&body).unwrap();

        assert_eq!(html.matches(r#"class="draft""#).count(), 1);
        assert_eq!(html.matches(r#"class="published""#).count(), 1);
    }
}
