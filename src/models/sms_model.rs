use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Un registro por lote de envío (puede cubrir varios destinatarios).
#[derive(Debug, Clone, Serialize)]
pub struct SmsRecord {
    pub id: String,
    pub tenant_id: String,
    /// Id de mensaje asignado por el proveedor; NULL hasta que acepta el envío.
    /// Es la clave de join para callbacks y polling.
    pub mid: Option<String>,
    pub recipients: Vec<String>,
    pub content: String,
    pub sms_type: String,
    pub template_name: String,
    pub status: String, // "pending", "success", "failed" (nivel envío)
    pub delivery_status: Option<String>, // "pending", "delivered", "failed" (nivel entrega)
    pub delivery_time: Option<String>,
    pub delivery_code: Option<String>,
    pub delivery_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
}

/// Datos para insertar un registro nuevo (el id y created_at los pone el servicio)
#[derive(Debug, Clone)]
pub struct NewSmsRecord {
    pub tenant_id: String,
    pub mid: Option<String>,
    pub recipients: Vec<String>,
    pub content: String,
    pub sms_type: String,
    pub template_name: String,
    pub status: String,
    pub delivery_status: Option<String>,
    pub delivery_message: Option<String>,
    pub created_by: Option<String>,
}

/// Request para enviar un lote de SMS
#[derive(Debug, Clone, Deserialize)]
pub struct SendSmsRequest {
    /// Números separados por coma: "+8613800000000,+8613800000001"
    pub phone_numbers: String,
    pub content: String,
    pub sms_type: String,
    pub template_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendSmsSummary {
    pub success: u32,
    pub failed: u32,
}

/// Detalle por destinatario, tal como lo reporta el gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipientDetail {
    pub phone: String,
    pub status: String,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendSmsResponse {
    pub success: bool,
    pub summary: SendSmsSummary,
    pub details: Vec<RecipientDetail>,
}

/// Notificación push del gateway con el resultado de entrega.
/// `mid` llega opcional para poder rechazarlo con un 400 explícito.
#[derive(Debug, Clone, Deserialize)]
pub struct CallbackRequest {
    pub mid: Option<String>,
    pub status: String,
    pub message: Option<String>,
    pub receive_time: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeliveryUpdate {
    pub mid: String,
    pub delivery_status: String,
    pub code: String,
}

/// Resumen de una corrida del poller de estados
#[derive(Debug, Clone, Serialize)]
pub struct StatusCheckResponse {
    pub success: bool,
    pub total_processed: usize,
    pub total_updated: usize,
    pub updates: Vec<DeliveryUpdate>,
}

/// Para listar registros con paginación
#[derive(Debug, Clone, Serialize)]
pub struct ListSmsResponse {
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub items: Vec<SmsRecord>,
}

/// Respuesta inmediata del gateway a un envío, ya validada
#[derive(Debug, Clone)]
pub struct GatewaySendOutcome {
    pub mid: Option<String>,
    pub success_count: u32,
    pub fail_count: u32,
    pub details: Vec<RecipientDetail>,
}

/// Respuesta del gateway a una consulta de estado por mid
#[derive(Debug, Clone)]
pub struct GatewayStatusOutcome {
    /// Código crudo de entrega ("0" = entregado)
    pub code: String,
    pub message: Option<String>,
    pub receive_time: Option<String>,
}
