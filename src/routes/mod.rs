pub mod auth;
pub mod pages;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

pub fn create_router() -> Router {
    // Everything behind the session gate. The routes merged in below are
    // the allow-list: login, register, static assets.
    let gated = Router::new()
        .route("/", get(pages::home))
        .route("/about", get(pages::about))
        .route("/search", get(pages::search_form).post(pages::search))
        .route("/ask", get(pages::ask_form).post(pages::ask))
        .route("/save", post(pages::save))
        .route("/library", get(pages::library))
        .route("/delete/:entry_id", post(pages::delete))
        .route("/logout", get(auth::logout))
        .route("/_debug_users", get(pages::debug_users))
        .layer(middleware::from_fn(auth::require_session));

    Router::new()
        .route("/register", get(auth::register_form).post(auth::register))
        .route("/login", get(auth::login_form).post(auth::login))
        .nest_service("/static", ServeDir::new("static"))
        .merge(gated)
}
