pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod repositories;
pub mod routes;
pub mod services;

use config::Config;
use repositories::PgStore;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
}

impl AppState {
    /// Store handle for the HR guard services.
    pub fn store(&self) -> PgStore {
        PgStore::new(self.pool.clone())
    }
}
