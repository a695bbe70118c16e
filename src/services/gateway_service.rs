use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::config::sms_config::SmsConfig;
use crate::models::sms_model::{GatewaySendOutcome, GatewayStatusOutcome, RecipientDetail};

/// Cliente del proveedor de SMS: envío de lotes y consulta de estado
/// de entrega por mid. Las credenciales van en cada request.
#[derive(Clone)]
pub struct GatewayService {
    base_url: String,
    account: String,
    password: String,
    http_client: Client,
}

impl GatewayService {
    pub fn new(config: &SmsConfig) -> Result<Self> {
        // Timeout acotado para toda llamada al proveedor; una consulta que
        // expira cuenta como fallo de ese registro, no de toda la corrida.
        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("No se pudo construir el cliente HTTP del gateway")?;

        Ok(GatewayService {
            base_url: config.gateway_url.trim_end_matches('/').to_string(),
            account: config.gateway_account.clone(),
            password: config.gateway_password.clone(),
            http_client,
        })
    }

    /// Envía un lote completo y devuelve el resultado inmediato del gateway.
    /// Un rechazo del lote (code != 0) es dato, no error; los errores de
    /// transporte sí se propagan.
    pub async fn send_batch(
        &self,
        phones: &[String],
        content: &str,
        sms_type: &str,
    ) -> Result<GatewaySendOutcome> {
        let send_url = format!("{}/send", self.base_url);
        let payload = serde_json::json!({
            "account": self.account,
            "password": self.password,
            "phones": phones.join(","),
            "content": content,
            "sms_type": sms_type
        });

        log::info!(
            "(send_batch) Enviando lote de {} números al gateway...",
            phones.len()
        );
        let resp = self
            .http_client
            .post(&send_url)
            .json(&payload)
            .send()
            .await
            .context("Fallo al hacer POST /send al gateway")?;

        if !resp.status().is_success() {
            let body_txt = resp.text().await.unwrap_or_default();
            log::error!(
                "(send_batch) El gateway respondió con error. body_txt='{}'",
                body_txt
            );
            return Err(anyhow!("Error del gateway en el envío: {}", body_txt));
        }

        let json_val = resp.json::<Value>().await?;
        Self::parse_send_response(&json_val, phones)
    }

    /// Consulta el estado de entrega de un mid.
    pub async fn query_status(&self, mid: &str) -> Result<GatewayStatusOutcome> {
        let query_url = format!("{}/query", self.base_url);
        let payload = serde_json::json!({
            "account": self.account,
            "password": self.password,
            "mid": mid
        });

        let resp = self
            .http_client
            .post(&query_url)
            .json(&payload)
            .send()
            .await
            .context("Fallo al hacer POST /query al gateway")?;

        if !resp.status().is_success() {
            let body_txt = resp.text().await.unwrap_or_default();
            return Err(anyhow!("Error del gateway consultando estado: {}", body_txt));
        }

        let json_val = resp.json::<Value>().await?;
        Self::parse_status_response(&json_val)
    }

    /// Valida la respuesta de envío campo por campo. El JSON del gateway
    /// no trae esquema; cualquier campo requerido ausente es un error.
    pub(crate) fn parse_send_response(
        json_val: &Value,
        phones: &[String],
    ) -> Result<GatewaySendOutcome> {
        let code = json_val
            .get("code")
            .and_then(|v| v.as_i64())
            .ok_or_else(|| anyhow!("Respuesta del gateway sin 'code'"))?;

        // code != 0: el lote entero fue rechazado
        if code != 0 {
            let message = json_val
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("batch rejected")
                .to_string();
            let details = phones
                .iter()
                .map(|phone| RecipientDetail {
                    phone: phone.clone(),
                    status: "failed".to_string(),
                    message: Some(message.clone()),
                })
                .collect();
            return Ok(GatewaySendOutcome {
                mid: None,
                success_count: 0,
                fail_count: phones.len() as u32,
                details,
            });
        }

        let success_count = json_val
            .get("success_count")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| anyhow!("Respuesta del gateway sin 'success_count'"))?
            as u32;
        let fail_count = json_val
            .get("fail_count")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| anyhow!("Respuesta del gateway sin 'fail_count'"))?
            as u32;

        let mid = json_val
            .get("mid")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string());
        if mid.is_none() && success_count > 0 {
            return Err(anyhow!("El gateway aceptó el envío pero no devolvió 'mid'"));
        }

        let mut details = Vec::new();
        if let Some(raw_details) = json_val.get("details").and_then(|v| v.as_array()) {
            for item in raw_details {
                let phone = item
                    .get("phone")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| anyhow!("Detalle del gateway sin 'phone'"))?;
                let status = item
                    .get("status")
                    .and_then(|v| v.as_str())
                    .ok_or_else(|| anyhow!("Detalle del gateway sin 'status'"))?;
                details.push(RecipientDetail {
                    phone: phone.to_string(),
                    status: status.to_string(),
                    message: item
                        .get("message")
                        .and_then(|v| v.as_str())
                        .map(|s| s.to_string()),
                });
            }
        }

        Ok(GatewaySendOutcome {
            mid,
            success_count,
            fail_count,
            details,
        })
    }

    /// Valida la respuesta de consulta de estado.
    pub(crate) fn parse_status_response(json_val: &Value) -> Result<GatewayStatusOutcome> {
        let code = json_val
            .get("status")
            .and_then(|v| v.as_str())
            .ok_or_else(|| anyhow!("Respuesta de estado sin 'status'"))?;

        Ok(GatewayStatusOutcome {
            code: code.to_string(),
            message: json_val
                .get("message")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            receive_time: json_val
                .get("receive_time")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
        })
    }
}
