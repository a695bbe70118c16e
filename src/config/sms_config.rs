//! config/sms_config.rs
//! Configuración global del servicio, leída del entorno una sola vez
//! al arrancar. Si falta una variable requerida, el arranque falla.

use anyhow::{anyhow, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct SmsConfig {
    /// URL de la base de datos (sqlite)
    pub database_url: String,
    /// URL base del gateway de SMS
    pub gateway_url: String,
    pub gateway_account: String,
    pub gateway_password: String,
    /// Intervalo del poller de estados (segundos)
    pub status_poll_secs: u64,
    pub bind_addr: String,
}

impl SmsConfig {
    pub fn from_env() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| anyhow!("No se definió DATABASE_URL"))?;
        let gateway_url =
            env::var("SMS_GATEWAY_URL").map_err(|_| anyhow!("No se definió SMS_GATEWAY_URL"))?;
        let gateway_account = env::var("SMS_GATEWAY_ACCOUNT")
            .map_err(|_| anyhow!("No se definió SMS_GATEWAY_ACCOUNT"))?;
        let gateway_password = env::var("SMS_GATEWAY_PASSWORD")
            .map_err(|_| anyhow!("No se definió SMS_GATEWAY_PASSWORD"))?;

        // Opcionales, con defaults
        let status_poll_secs = env::var("SMS_STATUS_POLL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5023".to_string());

        Ok(SmsConfig {
            database_url,
            gateway_url,
            gateway_account,
            gateway_password,
            status_poll_secs,
            bind_addr,
        })
    }
}
