use std::sync::Arc;

use axum::{
    body::Body,
    extract::Query,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{error::AppError, services::auth, state::AppState, views};

pub const SESSION_COOKIE: &str = "session";
const SESSION_HOURS: i64 = 24;

pub const EMPTY_CREDENTIALS_MSG: &str = "Username and password must not be empty.";
pub const DUPLICATE_USERNAME_MSG: &str = "That username is already taken.";
pub const INVALID_CREDENTIALS_MSG: &str = "Invalid username or password.";

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

#[derive(Deserialize)]
pub struct CredentialsForm {
    username: String,
    password: String,
}

#[derive(Deserialize)]
pub struct NextParam {
    next: Option<String>,
}

/// Session gate. Routes layered with this middleware require a valid
/// session cookie; anything else is bounced to the login page carrying
/// the originally requested path as a return hint.
pub async fn require_session(
    Extension(state): Extension<Arc<AppState>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let claims = session_token(req.headers()).and_then(|token| {
        decode::<Claims>(
            &token,
            &DecodingKey::from_secret(state.config.session_secret.as_bytes()),
            &Validation::default(),
        )
        .ok()
    });

    match claims {
        Some(data) => {
            req.extensions_mut().insert(data.claims);
            next.run(req).await
        }
        None => Redirect::to(&format!("/login?next={}", req.uri().path())).into_response(),
    }
}

fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix("session="))
        .map(str::to_string)
}

fn issue_session(state: &AppState, username: &str) -> Result<String, AppError> {
    let claims = Claims {
        sub: username.to_string(),
        exp: (Utc::now() + chrono::Duration::hours(SESSION_HOURS)).timestamp() as usize,
    };
    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(state.config.session_secret.as_bytes()),
    )?;
    Ok(format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax"
    ))
}

/// Post-login redirect targets must stay on this site: anything that is
/// not a relative path falls back to the landing page.
pub fn validate_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') => path,
        _ => "/",
    }
}

pub async fn register_form() -> Html<String> {
    views::register_page(None)
}

pub async fn register(
    Extension(state): Extension<Arc<AppState>>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let username = form.username.trim();
    let password = form.password.trim();
    if username.is_empty() || password.is_empty() {
        return Ok(views::register_page(Some(EMPTY_CREDENTIALS_MSG)).into_response());
    }

    match auth::create_user(&state.pool, username, password).await {
        Ok(user) => {
            info!("registered new user {}", user.username);
            let cookie = issue_session(&state, &user.username)?;
            Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/")).into_response())
        }
        Err(auth::RegisterError::DuplicateUsername) => {
            Ok(views::register_page(Some(DUPLICATE_USERNAME_MSG)).into_response())
        }
        Err(auth::RegisterError::App(e)) => Err(e),
    }
}

pub async fn login_form(Query(query): Query<NextParam>) -> Html<String> {
    views::login_page(None, query.next.as_deref())
}

pub async fn login(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<NextParam>,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    let username = form.username.trim();
    let password = form.password.trim();
    if username.is_empty() || password.is_empty() {
        return Ok(
            views::login_page(Some(EMPTY_CREDENTIALS_MSG), query.next.as_deref()).into_response(),
        );
    }

    match auth::authenticate(&state.pool, username, password).await {
        Ok(user) => {
            let cookie = issue_session(&state, &user.username)?;
            let target = validate_next(query.next.as_deref());
            Ok(([(header::SET_COOKIE, cookie)], Redirect::to(target)).into_response())
        }
        Err(auth::AuthError::InvalidCredentials) => Ok(views::login_page(
            Some(INVALID_CREDENTIALS_MSG),
            query.next.as_deref(),
        )
        .into_response()),
        Err(auth::AuthError::App(e)) => Err(e),
    }
}

pub async fn logout() -> impl IntoResponse {
    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0");
    ([(header::SET_COOKIE, cookie)], Redirect::to("/login"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_must_be_a_relative_path() {
        assert_eq!(validate_next(Some("/library")), "/library");
        assert_eq!(validate_next(Some("/")), "/");
        assert_eq!(validate_next(Some("https://evil.example/")), "/");
        assert_eq!(validate_next(Some("library")), "/");
        assert_eq!(validate_next(Some("")), "/");
        assert_eq!(validate_next(None), "/");
    }

    #[test]
    fn session_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            "theme=dark; session=abc.def.ghi; lang=en".parse().unwrap(),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc.def.ghi"));

        headers.insert(header::COOKIE, "theme=dark".parse().unwrap());
        assert_eq!(session_token(&headers), None);
    }
}
