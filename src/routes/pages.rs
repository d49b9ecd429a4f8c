use std::sync::Arc;

use axum::{
    extract::Path,
    response::{Html, IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;

use crate::{
    error::AppError,
    routes::auth::Claims,
    services::{
        answers::{self, Answer},
        library,
    },
    state::AppState,
    views,
};

#[derive(Deserialize)]
pub struct SearchForm {
    query: String,
}

#[derive(Deserialize)]
pub struct AskForm {
    question: String,
}

#[derive(Deserialize)]
pub struct SaveForm {
    title: String,
    content: String,
    link: Option<String>,
}

pub async fn home(Extension(claims): Extension<Claims>) -> Html<String> {
    views::home_page(&claims.sub)
}

pub async fn about(Extension(claims): Extension<Claims>) -> Html<String> {
    views::about_page(&claims.sub)
}

pub async fn search_form(Extension(claims): Extension<Claims>) -> Html<String> {
    views::search_page(&claims.sub, &[])
}

pub async fn search(
    Extension(claims): Extension<Claims>,
    Form(form): Form<SearchForm>,
) -> Html<String> {
    let query = form.query.trim();
    let results = if query.is_empty() {
        Vec::new()
    } else {
        mock_results(query)
    };
    views::search_page(&claims.sub, &results)
}

// Placeholder results; there is no search backend behind this page.
fn mock_results(query: &str) -> Vec<Answer> {
    (1..=3)
        .map(|n| Answer {
            title: format!("About {query} ({n})"),
            snippet: format!("Summary {n} for {query} will appear here."),
            link: "#".to_string(),
        })
        .collect()
}

pub async fn ask_form(Extension(claims): Extension<Claims>) -> Html<String> {
    views::ask_page(&claims.sub, &[])
}

pub async fn ask(
    Extension(state): Extension<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Form(form): Form<AskForm>,
) -> Html<String> {
    let question = form.question.trim();
    let answers = if question.is_empty() {
        Vec::new()
    } else {
        answers::ask(&state.http, &state.config.serpapi_key, question).await
    };
    views::ask_page(&claims.sub, &answers)
}

pub async fn save(
    Extension(state): Extension<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Form(form): Form<SaveForm>,
) -> Result<Response, AppError> {
    let link = form.link.as_deref().filter(|l| !l.trim().is_empty());
    match library::save_entry(&state.pool, &claims.sub, &form.title, &form.content, link).await {
        // A session naming a vanished user saves nothing; the redirect
        // stands either way.
        Ok(_) | Err(library::SaveError::UserNotFound) => {
            Ok(Redirect::to("/library").into_response())
        }
        Err(library::SaveError::App(e)) => Err(e),
    }
}

pub async fn library(
    Extension(state): Extension<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
) -> Result<Html<String>, AppError> {
    let entries = library::list_entries(&state.pool, &claims.sub).await?;
    Ok(views::library_page(&claims.sub, &entries))
}

pub async fn delete(
    Extension(state): Extension<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    Path(entry_id): Path<i64>,
) -> Result<Redirect, AppError> {
    library::delete_entry(&state.pool, &claims.sub, entry_id).await?;
    Ok(Redirect::to("/library"))
}

pub async fn debug_users(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Html<String>, AppError> {
    let usernames = crate::services::auth::list_usernames(&state.pool)
        .await
        .map_err(AppError::from)?;
    Ok(views::debug_users_page(&usernames))
}
