//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::{BookingRepository, PgBookingRepository};
use crate::services::notification::{LogNotifier, NotificationEmitter};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
    pub repository: Arc<dyn BookingRepository>,
    pub notifier: Arc<dyn NotificationEmitter>,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        Self {
            repository: Arc::new(PgBookingRepository::new(pool.clone())),
            notifier: Arc::new(LogNotifier),
            pool,
            config,
        }
    }

}
