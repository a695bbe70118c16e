use anyhow::{Context, Result};
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};

use crate::models::wallet_model::WalletRecord;

/// Saldo de SMS por tenant. Decremento simple sobre una fila,
/// no es un motor de ledger.
#[derive(Clone)]
pub struct WalletService {
    db_pool: Pool<Sqlite>,
}

impl WalletService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        WalletService { db_pool }
    }

    /// Saldo actual del tenant; un tenant sin fila tiene saldo 0.
    pub async fn get_balance(&self, tenant_id: &str) -> Result<WalletRecord> {
        let row = sqlx::query(
            r#"SELECT tenant_id, sms_balance, updated_at FROM tenant_wallets WHERE tenant_id = ?1"#,
        )
        .bind(tenant_id)
        .fetch_optional(&self.db_pool)
        .await
        .context("Fallo al consultar tenant_wallet")?;

        match row {
            Some(r) => Ok(WalletRecord {
                tenant_id: r.try_get("tenant_id")?,
                sms_balance: r.try_get("sms_balance")?,
                updated_at: r.try_get("updated_at")?,
            }),
            None => Ok(WalletRecord {
                tenant_id: tenant_id.to_string(),
                sms_balance: 0,
                updated_at: Utc::now().to_rfc3339(),
            }),
        }
    }

    /// Acredita saldo (upsert)
    pub async fn topup(&self, tenant_id: &str, amount: i64) -> Result<WalletRecord> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO tenant_wallets (tenant_id, sms_balance, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(tenant_id) DO UPDATE SET
                sms_balance = sms_balance + excluded.sms_balance,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(tenant_id)
        .bind(amount)
        .bind(&now)
        .execute(&self.db_pool)
        .await
        .context("Fallo al acreditar saldo")?;

        self.get_balance(tenant_id).await
    }

    /// Debita `amount` mensajes. El WHERE exige saldo suficiente, así el
    /// decremento nunca deja el saldo en negativo aunque haya envíos
    /// concurrentes del mismo tenant.
    ///
    /// Devuelve `false` si el saldo no alcanzaba (y no se tocó la fila).
    pub async fn debit(&self, tenant_id: &str, amount: i64) -> Result<bool> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            UPDATE tenant_wallets
            SET sms_balance = sms_balance - ?1,
                updated_at = ?2
            WHERE tenant_id = ?3 AND sms_balance >= ?1
            "#,
        )
        .bind(amount)
        .bind(&now)
        .bind(tenant_id)
        .execute(&self.db_pool)
        .await
        .context("Fallo al debitar saldo")?;

        Ok(result.rows_affected() > 0)
    }
}
