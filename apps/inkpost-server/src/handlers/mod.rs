//! HTTP handlers and route configuration.

mod accounts;
mod health;
mod posts;

use actix_web::{HttpResponse, http::header, web};

pub const POST_LIST_URL: &str = "/posts/";
pub const LOGIN_URL: &str = "/accounts/login/";

pub fn post_detail_url(pk: i64) -> String {
    format!("/post-detail/{}/", pk)
}

/// `302 Found` to `location`.
pub fn redirect(location: impl AsRef<str>) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location.as_ref()))
        .finish()
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(|| async { redirect(POST_LIST_URL) }))
        .route("/health", web::get().to(health::health_check))
        .route("/posts/", web::get().to(posts::post_list))
        .service(
            web::resource("/posts/add/")
                .route(web::get().to(posts::post_add_form))
                .route(web::post().to(posts::post_add)),
        )
        .route("/post-detail/{pk}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/post-detail/{pk}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .route("/post-detail/{pk}/delete/", web::get().to(posts::post_delete))
        .route("/post-detail/{pk}/publish/", web::get().to(posts::post_publish))
        .route("/post-detail/{pk}/unpublish/", web::get().to(posts::post_unpublish))
        .service(
            web::scope("/accounts")
                .service(
                    web::resource("/login/")
                        .route(web::get().to(accounts::login_form))
                        .route(web::post().to(accounts::login)),
                )
                .route("/logout/", web::get().to(accounts::logout)),
        );
}
