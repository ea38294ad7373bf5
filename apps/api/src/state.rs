//! Shared application state.

use std::sync::Arc;

use crate::auth::JwtManager;
use crate::config::ApiConfig;
use caja_db::Database;

/// State handed to every handler. Cloning is cheap: the database pool is
/// reference-counted and the JWT manager sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub jwt: Arc<JwtManager>,
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(db: Database, config: ApiConfig) -> Self {
        let jwt = Arc::new(JwtManager::new(
            config.jwt_secret.clone(),
            config.jwt_lifetime_secs,
        ));
        AppState { db, jwt, config }
    }
}
