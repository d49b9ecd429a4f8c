mod config;
mod database;
mod error;
mod models;
mod routes;
mod services;
mod state;
mod views;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{serve, Extension, Router};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;
use crate::routes::create_router;
use crate::services::answers::REQUEST_TIMEOUT;
use crate::state::AppState;

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::from_env().expect("Failed to load config");

    let pool = database::connect(&config.database_url)
        .await
        .expect("Failed to connect to DB");
    database::init_schema(&pool)
        .await
        .expect("Failed to initialize schema");

    let http = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .expect("Failed to build HTTP client");

    let addr: SocketAddr = config.bind_addr.parse().expect("Invalid BIND_ADDR");

    let app_state = Arc::new(AppState { pool, http, config });

    let app = Router::new()
        .merge(create_router())
        .layer(Extension(app_state));

    info!("Server running on {addr}");
    let listener = TcpListener::bind(addr).await.unwrap();
    serve(listener, app.into_make_service()).await.unwrap();
}
