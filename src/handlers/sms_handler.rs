use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::handlers::tenant_id_from;
use crate::models::sms_model::SendSmsRequest;
use crate::services::{sms_record_service::SmsRecordService, sms_service::SmsService};

#[derive(Deserialize)]
pub struct PaginationQuery {
    page: Option<u64>,
    page_size: Option<u64>,
}

/// POST /api/sms/send
pub async fn send_sms_endpoint(
    req: HttpRequest,
    sms_service: web::Data<SmsService>,
    body: web::Json<SendSmsRequest>,
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

    let req_data = body.into_inner();

    // Validación: sin destinatarios o sin contenido no se toca el gateway
    let recipients: Vec<String> = req_data
        .phone_numbers
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if recipients.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": "phone_numbers is required"
        }));
    }
    if req_data.content.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "error": "content is required"
        }));
    }

    // Quién dispara el envío, si el front lo manda
    let created_by = req
        .headers()
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    match sms_service
        .send_sms(
            &tenant_id,
            created_by,
            recipients,
            req_data.content,
            req_data.sms_type,
            req_data.template_name,
        )
        .await
    {
        Ok(resp) => HttpResponse::Ok().json(resp),
        Err(e) => {
            if e.to_string().contains("Saldo insuficiente") {
                return HttpResponse::PaymentRequired().json(json!({
                    "success": false,
                    "error": e.to_string()
                }));
            }
            log::error!("SMS send error: {}", e);
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "error": e.to_string()
            }))
        }
    }
}

/// GET /api/sms
pub async fn list_sms_endpoint(
    req: HttpRequest,
    record_service: web::Data<SmsRecordService>,
    query: web::Query<PaginationQuery>,
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

    let page = query.page.unwrap_or(1).max(1);
    let page_size = query.page_size.unwrap_or(10);

    match record_service.list_records(&tenant_id, page, page_size).await {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => HttpResponse::InternalServerError().json(json!({
            "error": "Internal server error",
            "details": format!("{:?}", e)
        })),
    }
}

/// GET /api/sms/{id}
pub async fn get_sms_endpoint(
    req: HttpRequest,
    record_service: web::Data<SmsRecordService>,
    path: web::Path<String>,
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

    let record_id = path.into_inner();

    match record_service.get_record(&tenant_id, &record_id).await {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(e) => {
            let status_code = if e.to_string().contains("not found") {
                actix_web::http::StatusCode::NOT_FOUND
            } else {
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
            };

            HttpResponse::build(status_code).json(json!({
                "success": false,
                "error": e.to_string()
            }))
        }
    }
}
