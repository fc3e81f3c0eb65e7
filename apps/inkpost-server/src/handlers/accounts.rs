//! Login and logout pages.

use actix_web::cookie::{Cookie, SameSite, time::Duration};
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};

use inkpost_core::DomainError;
use inkpost_core::ports::{PasswordService, TokenService, UserRepository};
use inkpost_shared::LoginForm;

use super::{POST_LIST_URL, redirect};
use crate::middleware::auth::{OptionalIdentity, SESSION_COOKIE};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::templates::{self, LoginTemplate};

/// GET /accounts/login/
pub async fn login_form(viewer: OptionalIdentity) -> AppResult<HttpResponse> {
    templates::page(&LoginTemplate {
        viewer: viewer.username(),
        username: "",
        error: None,
    })
}

/// POST /accounts/login/
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> AppResult<HttpResponse> {
    let LoginForm { username, password } = form.into_inner();

    match authenticate(&state, &username, &password).await {
        Ok(token) => {
            tracing::info!(%username, "User logged in");

            let cookie = Cookie::build(SESSION_COOKIE, token)
                .path("/")
                .http_only(true)
                .secure(state.cookie_secure)
                .same_site(SameSite::Lax)
                .max_age(Duration::seconds(state.tokens.expiration_seconds()))
                .finish();

            let mut response = redirect(POST_LIST_URL);
            response
                .add_cookie(&cookie)
                .map_err(|e| AppError::Internal(e.to_string()))?;
            Ok(response)
        }
        Err(AppError::Unauthorized) => {
            tracing::info!(%username, "Rejected login");

            templates::page_with_status(
                StatusCode::UNAUTHORIZED,
                &LoginTemplate {
                    viewer: None,
                    username: &username,
                    error: Some("Invalid username or password."),
                },
            )
        }
        Err(e) => Err(e),
    }
}

/// Check the credentials and issue an access token.
async fn authenticate(state: &AppState, username: &str, password: &str) -> AppResult<String> {
    let user = state
        .users
        .find_by_username(username)
        .await?
        .ok_or(DomainError::InvalidCredentials)?;

    if !state.passwords.verify(password, &user.password_hash)? {
        return Err(DomainError::InvalidCredentials.into());
    }

    Ok(state.tokens.generate_token(user.id, &user.username)?)
}

/// GET /accounts/logout/
pub async fn logout() -> HttpResponse {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();

    HttpResponse::Found()
        .insert_header((actix_web::http::header::LOCATION, POST_LIST_URL))
        .cookie(cookie)
        .finish()
}
