use axum::response::Html;

use crate::models::entry::LibraryEntry;
use crate::services::answers::Answer;

/// Minimal HTML escaping for user-supplied text placed into element bodies
/// or attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, user: Option<&str>, body: &str) -> Html<String> {
    let nav = match user {
        Some(name) => format!(
            r#"<nav><a href="/">Home</a> <a href="/search">Search</a> <a href="/ask">Ask</a> <a href="/library">Library</a> <a href="/about">About</a> <span class="user">{} &middot; <a href="/logout">Log out</a></span></nav>"#,
            escape(name)
        ),
        None => {
            r#"<nav><a href="/login">Log in</a> <a href="/register">Register</a></nav>"#.to_string()
        }
    };
    Html(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>{title}</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
{nav}
<main>
{body}
</main>
</body>
</html>"#
    ))
}

fn flash(message: Option<&str>) -> String {
    match message {
        Some(text) => format!(r#"<p class="flash">{}</p>"#, escape(text)),
        None => String::new(),
    }
}

pub fn register_page(message: Option<&str>) -> Html<String> {
    let body = format!(
        r#"<h1>Create an account</h1>
{}
<form method="post" action="/register">
<label>Username <input name="username"></label>
<label>Password <input name="password" type="password"></label>
<button type="submit">Register</button>
</form>
<p>Already have an account? <a href="/login">Log in</a></p>"#,
        flash(message)
    );
    page("Register", None, &body)
}

pub fn login_page(message: Option<&str>, next: Option<&str>) -> Html<String> {
    let action = match next {
        Some(path) => format!("/login?next={}", escape(path)),
        None => "/login".to_string(),
    };
    let body = format!(
        r#"<h1>Log in</h1>
{}
<form method="post" action="{action}">
<label>Username <input name="username"></label>
<label>Password <input name="password" type="password"></label>
<button type="submit">Log in</button>
</form>
<p>New here? <a href="/register">Register</a></p>"#,
        flash(message)
    );
    page("Log in", None, &body)
}

pub fn home_page(user: &str) -> Html<String> {
    let body = format!(
        "<h1>Welcome, {}</h1>\n<p>Search the web, ask questions, and keep what you find in your library.</p>",
        escape(user)
    );
    page("Home", Some(user), &body)
}

pub fn about_page(user: &str) -> Html<String> {
    let body = "<h1>About</h1>\n<p>A small personal research tool: search, ask, save.</p>";
    page("About", Some(user), body)
}

pub fn search_page(user: &str, results: &[Answer]) -> Html<String> {
    let rendered: String = results
        .iter()
        .map(|r| {
            format!(
                r#"<article><h2><a href="{}">{}</a></h2><p>{}</p></article>"#,
                escape(&r.link),
                escape(&r.title),
                escape(&r.snippet)
            )
        })
        .collect();
    let body = format!(
        r#"<h1>Search</h1>
<form method="post" action="/search">
<input name="query" placeholder="Search...">
<button type="submit">Search</button>
</form>
{rendered}"#
    );
    page("Search", Some(user), &body)
}

pub fn ask_page(user: &str, answers: &[Answer]) -> Html<String> {
    let rendered: String = answers
        .iter()
        .map(|a| {
            format!(
                r#"<article>
<h2><a href="{link}">{title}</a></h2>
<p>{snippet}</p>
<form method="post" action="/save">
<input type="hidden" name="title" value="{title}">
<input type="hidden" name="content" value="{snippet}">
<input type="hidden" name="link" value="{link}">
<button type="submit">Save to library</button>
</form>
</article>"#,
                link = escape(&a.link),
                title = escape(&a.title),
                snippet = escape(&a.snippet)
            )
        })
        .collect();
    let body = format!(
        r#"<h1>Ask</h1>
<form method="post" action="/ask">
<input name="question" placeholder="Ask a question...">
<button type="submit">Ask</button>
</form>
{rendered}"#
    );
    page("Ask", Some(user), &body)
}

pub fn library_page(user: &str, entries: &[LibraryEntry]) -> Html<String> {
    let rendered: String = if entries.is_empty() {
        "<p>No saved entries yet.</p>".to_string()
    } else {
        entries
            .iter()
            .map(|e| {
                format!(
                    r#"<article>
<h2>{}</h2>
<p>{}</p>
<p><a href="{}">Source</a></p>
<form method="post" action="/delete/{}">
<button type="submit">Delete</button>
</form>
</article>"#,
                    escape(&e.title),
                    escape(&e.content),
                    escape(&e.link),
                    e.id
                )
            })
            .collect()
    };
    let body = format!("<h1>Library</h1>\n{rendered}");
    page("Library", Some(user), &body)
}

pub fn debug_users_page(usernames: &[String]) -> Html<String> {
    if usernames.is_empty() {
        return Html("No registered users.".to_string());
    }
    Html(
        usernames
            .iter()
            .map(|u| escape(u))
            .collect::<Vec<_>>()
            .join("<br>"),
    )
}
