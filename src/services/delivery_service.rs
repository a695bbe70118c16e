use anyhow::Result;
use futures_util::stream::{self, StreamExt};

use crate::models::sms_model::{DeliveryUpdate, SmsRecord, StatusCheckResponse};
use crate::services::{gateway_service::GatewayService, sms_record_service::SmsRecordService};

/// El poller procesa a lo sumo este número de registros por corrida.
pub const POLL_BATCH_SIZE: u32 = 100;
/// Consultas al gateway en vuelo a la vez dentro de una corrida.
const POLL_FANOUT: usize = 8;

/// Clasificación compartida entre callback y poller: el código "0" del
/// proveedor es entrega confirmada, cualquier otro es fallo. Devuelve
/// (delivery_status, status).
pub fn classify_delivery_code(code: &str) -> (&'static str, &'static str) {
    if code == "0" {
        ("delivered", "success")
    } else {
        ("failed", "failed")
    }
}

/// Reconciliación de estados de entrega: aplica los callbacks push del
/// gateway y corre el polling de registros que quedaron pendientes.
/// Ambos caminos derivan el mismo estado de la misma verdad del proveedor
/// y escriben con la actualización condicional del record service.
#[derive(Clone)]
pub struct DeliveryService {
    record_service: SmsRecordService,
    gateway: GatewayService,
}

impl DeliveryService {
    pub fn new(record_service: SmsRecordService, gateway: GatewayService) -> Self {
        Self {
            record_service,
            gateway,
        }
    }

    /// Aplica un callback del gateway. Devuelve `true` si algún registro
    /// transicionó; un mid desconocido o un callback repetido devuelven
    /// `false` sin error, para que el proveedor no reintente.
    pub async fn handle_callback(
        &self,
        mid: &str,
        code: &str,
        message: Option<String>,
    ) -> Result<bool> {
        let (delivery_status, status) = classify_delivery_code(code);
        let delivery_message = message.unwrap_or_else(|| format!("Delivery code {}", code));

        let updated = self
            .record_service
            .apply_delivery_update(mid, status, delivery_status, code, &delivery_message)
            .await?;

        if updated {
            log::info!(
                "(sms_callback) mid='{}' actualizado a delivery_status='{}'",
                mid,
                delivery_status
            );
            return Ok(true);
        }

        // Distinguimos en el log por qué no pegó la transición
        match self.record_service.find_by_mid(mid).await? {
            None => log::warn!(
                "(sms_callback) Callback para mid='{}' sin registro asociado, se ignora.",
                mid
            ),
            Some(record) => log::info!(
                "(sms_callback) mid='{}' ya estaba en '{}', callback repetido no pisa.",
                mid,
                record.delivery_status.as_deref().unwrap_or("-")
            ),
        }
        Ok(false)
    }

    /// Una corrida del poller: toma hasta POLL_BATCH_SIZE registros con
    /// entrega pendiente y mid asignado, consulta al gateway con fan-out
    /// acotado y aplica las transiciones. El fallo de un registro no
    /// afecta al resto del lote.
    pub async fn poll_pending(&self) -> Result<StatusCheckResponse> {
        let records = self
            .record_service
            .find_pending_with_mid(POLL_BATCH_SIZE)
            .await?;
        let total_processed = records.len();

        if records.is_empty() {
            log::info!("(check_sms_status) No hay registros pendientes de entrega.");
            return Ok(StatusCheckResponse {
                success: true,
                total_processed: 0,
                total_updated: 0,
                updates: vec![],
            });
        }

        log::info!(
            "(check_sms_status) Consultando estado de {} registros...",
            total_processed
        );

        let results: Vec<Option<DeliveryUpdate>> = stream::iter(records)
            .map(|record| self.check_one(record))
            .buffer_unordered(POLL_FANOUT)
            .collect()
            .await;

        let updates: Vec<DeliveryUpdate> = results.into_iter().flatten().collect();
        let total_updated = updates.len();

        log::info!(
            "(check_sms_status) Corrida terminada: {} procesados, {} actualizados.",
            total_processed,
            total_updated
        );

        Ok(StatusCheckResponse {
            success: true,
            total_processed,
            total_updated,
            updates,
        })
    }

    /// Consulta y resuelve un solo registro. Cualquier fallo (red, shape
    /// inválido, carrera perdida contra un callback) deja el registro como
    /// estaba y devuelve None; el próximo ciclo lo vuelve a tomar si sigue
    /// pendiente.
    async fn check_one(&self, record: SmsRecord) -> Option<DeliveryUpdate> {
        // El predicado de selección garantiza mid presente
        let mid = record.mid?;

        let outcome = match self.gateway.query_status(&mid).await {
            Ok(outcome) => outcome,
            Err(e) => {
                log::warn!(
                    "(check_sms_status) Fallo consultando mid='{}', queda para el próximo ciclo: {:?}",
                    mid,
                    e
                );
                return None;
            }
        };

        let (delivery_status, status) = classify_delivery_code(&outcome.code);
        let delivery_message = outcome
            .message
            .clone()
            .unwrap_or_else(|| format!("Delivery code {}", outcome.code));

        match self
            .record_service
            .apply_delivery_update(&mid, status, delivery_status, &outcome.code, &delivery_message)
            .await
        {
            Ok(true) => Some(DeliveryUpdate {
                mid,
                delivery_status: delivery_status.to_string(),
                code: outcome.code,
            }),
            Ok(false) => {
                log::info!(
                    "(check_sms_status) mid='{}' ya fue resuelto por un callback, no se pisa.",
                    mid
                );
                None
            }
            Err(e) => {
                log::error!(
                    "(check_sms_status) Error actualizando mid='{}': {:?}",
                    mid,
                    e
                );
                None
            }
        }
    }
}
