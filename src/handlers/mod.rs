//! handlers/mod.rs
//! Módulo que agrupa los distintos handlers HTTP (SMS, estados, wallet).

pub mod callback_handler;
pub mod sms_handler;
pub mod status_handler;
pub mod wallet_handler;

use actix_web::HttpRequest;

/// Tenant del header X-Tenant-Id. Los endpoints de consumo lo exigen;
/// las rutas que habla el gateway no lo traen (el proveedor no conoce
/// tenants, el join es por mid).
pub fn tenant_id_from(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get("x-tenant-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
