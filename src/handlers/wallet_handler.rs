use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;

use crate::handlers::tenant_id_from;
use crate::models::wallet_model::TopupRequest;
use crate::services::wallet_service::WalletService;

/// GET /api/wallet
pub async fn get_wallet_endpoint(
    req: HttpRequest,
    wallet_service: web::Data<WalletService>,
) -> HttpResponse {
    let tenant_id = match tenant_id_from(&req) {
        Some(t) => t,
        None => {
            return HttpResponse::BadRequest().json(json!({
                "success": false,
                "error": "Missing X-Tenant-Id header"
            }))
        }
    };

    match wallet_service.get_balance(&tenant_id).await {
        Ok(wallet) => HttpResponse::Ok().json(wallet),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "success": false,
            "error": e.to_string()
        })),
    }
}

/// POST /api/wallet/topup
pub async fn topup_wallet_endpoint(
    req: HttpRequest,
    wallet_service: web::Data<WalletService>,
    body: web::Json<TopupRequest>,
) -> HttpResponse {
    let tenant_id = match tenant_id_from(&req) {
        Some(t) => t,
        None => {
            return HttpResponse::BadRequest().json(json!({
                "success": false,
                "error": "Missing X-Tenant-Id header"
            }))
        }
    };

    if body.amount <= 0 {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": "amount must be positive"
        }));
    }

    match wallet_service.topup(&tenant_id, body.amount).await {
        Ok(wallet) => HttpResponse::Ok().json(wallet),
        Err(e) => {
            log::error!("Topup error para tenant='{}': {}", tenant_id, e);
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": e.to_string()
            }))
        }
    }
}
