use anyhow::{anyhow, Result};

use crate::models::sms_model::{NewSmsRecord, SendSmsResponse, SendSmsSummary};
use crate::services::{
    gateway_service::GatewayService, sms_record_service::SmsRecordService,
    wallet_service::WalletService,
};

/// Lógica de envío: valida saldo, llama al gateway una vez por lote y
/// persiste exactamente un registro con el resultado inmediato.
#[derive(Clone)]
pub struct SmsService {
    record_service: SmsRecordService,
    wallet_service: WalletService,
    gateway: GatewayService,
}

impl SmsService {
    pub fn new(
        record_service: SmsRecordService,
        wallet_service: WalletService,
        gateway: GatewayService,
    ) -> Self {
        Self {
            record_service,
            wallet_service,
            gateway,
        }
    }

    /// Procesa un lote de envío para un tenant. El fallo parcial es dato
    /// (va en summary/details), no una excepción; solo los errores de
    /// transporte (gateway o store inalcanzables) cortan el request.
    pub async fn send_sms(
        &self,
        tenant_id: &str,
        created_by: Option<String>,
        recipients: Vec<String>,
        content: String,
        sms_type: String,
        template_name: String,
    ) -> Result<SendSmsResponse> {
        let requested = recipients.len() as i64;

        // 1) Saldo: se verifica antes de tocar el gateway
        let wallet = self.wallet_service.get_balance(tenant_id).await?;
        if wallet.sms_balance < requested {
            return Err(anyhow!(
                "Saldo insuficiente de SMS: {} disponibles, {} requeridos",
                wallet.sms_balance,
                requested
            ));
        }

        // 2) Una llamada al gateway por lote
        let outcome = self
            .gateway
            .send_batch(&recipients, &content, &sms_type)
            .await?;

        log::info!(
            "(send_sms) Gateway respondió para tenant={}: success={}, failed={}, mid={:?}",
            tenant_id,
            outcome.success_count,
            outcome.fail_count,
            outcome.mid
        );

        // 3) Un registro por lote. status=success solo si no falló ninguno;
        //    delivery_status arranca en pending recién cuando hay mid.
        let status = if outcome.fail_count == 0 {
            "success"
        } else {
            "failed"
        };
        let delivery_status = outcome.mid.as_ref().map(|_| "pending".to_string());
        let delivery_message = if outcome.fail_count > 0 {
            serde_json::to_string(&outcome.details).ok()
        } else {
            None
        };

        self.record_service
            .create_record(NewSmsRecord {
                tenant_id: tenant_id.to_string(),
                mid: outcome.mid.clone(),
                recipients,
                content,
                sms_type,
                template_name,
                status: status.to_string(),
                delivery_status,
                delivery_message,
                created_by,
            })
            .await?;

        // 4) Débito por los mensajes que el gateway aceptó. El envío ya
        //    ocurrió: un problema acá se registra pero no falla el request.
        if outcome.success_count > 0 {
            match self
                .wallet_service
                .debit(tenant_id, outcome.success_count as i64)
                .await
            {
                Ok(true) => {}
                Ok(false) => log::warn!(
                    "(send_sms) No se aplicó el débito de {} SMS para tenant={}",
                    outcome.success_count,
                    tenant_id
                ),
                Err(e) => log::error!(
                    "(send_sms) Error debitando saldo para tenant={}: {:?}",
                    tenant_id,
                    e
                ),
            }
        }

        Ok(SendSmsResponse {
            success: outcome.fail_count == 0,
            summary: SendSmsSummary {
                success: outcome.success_count,
                failed: outcome.fail_count,
            },
            details: outcome.details,
        })
    }
}
