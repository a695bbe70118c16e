use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::models::sms_model::CallbackRequest;
use crate::services::delivery_service::DeliveryService;

/// POST /api/sms/callback
///
/// Notificación push del gateway con el resultado de entrega. Un mid
/// desconocido o repetido responde 200 igual: al proveedor no le sirve
/// un 4xx/5xx sobre el que no puede actuar, solo dispararía reintentos.
pub async fn sms_callback_endpoint(
    delivery_service: web::Data<DeliveryService>,
    body: web::Json<CallbackRequest>,
) -> HttpResponse {
    let req_data = body.into_inner();

    let mid = match req_data
        .mid
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        Some(m) => m.to_string(),
        None => {
            return HttpResponse::BadRequest().json(json!({
                "success": false,
                "error": "Missing mid in callback"
            }))
        }
    };

    if let Some(receive_time) = &req_data.receive_time {
        log::debug!(
            "(sms_callback) mid='{}' receive_time reportado: {}",
            mid,
            receive_time
        );
    }

    match delivery_service
        .handle_callback(&mid, &req_data.status, req_data.message)
        .await
    {
        Ok(_) => HttpResponse::Ok().json(json!({ "success": true })),
        Err(e) => {
            log::error!("Callback error para mid='{}': {}", mid, e);
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": e.to_string()
            }))
        }
    }
}
