//! tests/mod.rs
//! Pruebas de servicios contra una base sqlite en memoria y un gateway
//! de mentira levantado en un puerto local cuando hace falta.

mod delivery_tests;
mod gateway_tests;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};

use crate::config::sms_config::SmsConfig;

/// Pool sqlite en memoria con una sola conexión (cada conexión :memory:
/// sería una base distinta) y migraciones aplicadas.
pub async fn setup_pool() -> Pool<Sqlite> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("No se pudo crear el pool de test");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Fallo en migraciones de test");

    pool
}

/// Config con un gateway inalcanzable: los tests que la usan no deben
/// llegar a llamar al proveedor.
pub fn test_config() -> SmsConfig {
    gateway_config("http://127.0.0.1:9")
}

pub fn gateway_config(gateway_url: &str) -> SmsConfig {
    SmsConfig {
        database_url: "sqlite::memory:".to_string(),
        gateway_url: gateway_url.to_string(),
        gateway_account: "test-account".to_string(),
        gateway_password: "test-password".to_string(),
        status_poll_secs: 300,
        bind_addr: "127.0.0.1:0".to_string(),
    }
}
