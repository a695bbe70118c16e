use actix_web::{web, HttpResponse};
use serde_json::json;

use crate::services::delivery_service::DeliveryService;

/// POST /api/sms/check-status
pub async fn check_sms_status_endpoint(
    delivery_service: web::Data<DeliveryService>,
) -> HttpResponse {
    run_status_check(&delivery_service).await
}

/// POST /api/sms/schedule-check
///
/// El timer interno ya dispara la misma corrida cada intervalo; esta ruta
/// existe para dispararla a demanda y relayar el resumen al que llama.
pub async fn schedule_status_check_endpoint(
    delivery_service: web::Data<DeliveryService>,
) -> HttpResponse {
    log::info!("(schedule_status_check) Disparo manual del poller de estados");
    run_status_check(&delivery_service).await
}

async fn run_status_check(delivery_service: &DeliveryService) -> HttpResponse {
    match delivery_service.poll_pending().await {
        Ok(result) if result.total_processed == 0 => {
            HttpResponse::Ok().json(json!({ "message": "No pending records" }))
        }
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            log::error!("Status check error: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": e.to_string()
            }))
        }
    }
}
