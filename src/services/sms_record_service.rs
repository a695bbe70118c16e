use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use uuid::Uuid;

use crate::models::sms_model::{ListSmsResponse, NewSmsRecord, SmsRecord};

#[derive(Clone)]
pub struct SmsRecordService {
    db_pool: Pool<Sqlite>,
}

impl SmsRecordService {
    pub fn new(db_pool: Pool<Sqlite>) -> Self {
        SmsRecordService { db_pool }
    }

    /// Corre migraciones con sqlx
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.db_pool).await?;
        Ok(())
    }

    /// Inserta el registro del lote con el resultado inmediato del gateway.
    /// Devuelve el id generado.
    pub async fn create_record(&self, new: NewSmsRecord) -> Result<String> {
        let record_id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        // Unificamos los recipients en un string:
        let joined_recipients = new.recipients.join(";");

        sqlx::query(
            r#"
            INSERT INTO sms_records (
                id, tenant_id, mid, recipients, content, sms_type,
                template_name, status, delivery_status, delivery_message,
                created_at, created_by
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&record_id)
        .bind(&new.tenant_id)
        .bind(&new.mid)
        .bind(&joined_recipients)
        .bind(&new.content)
        .bind(&new.sms_type)
        .bind(&new.template_name)
        .bind(&new.status)
        .bind(&new.delivery_status)
        .bind(&new.delivery_message)
        .bind(&now)
        .bind(&new.created_by)
        .execute(&self.db_pool)
        .await
        .context("Fallo al insertar sms_record")?;

        Ok(record_id)
    }

    /// Obtiene un registro, siempre acotado al tenant que consulta
    pub async fn get_record(&self, tenant_id: &str, record_id: &str) -> Result<SmsRecord> {
        let row = sqlx::query(
            r#"
            SELECT id, tenant_id, mid, recipients, content, sms_type,
                   template_name, status, delivery_status, delivery_time,
                   delivery_code, delivery_message, created_at, created_by
            FROM sms_records
            WHERE tenant_id = ?1 AND id = ?2
            "#,
        )
        .bind(tenant_id)
        .bind(record_id)
        .fetch_one(&self.db_pool)
        .await
        .context("SMS record not found")?;

        map_record_row(&row)
    }

    /// Lista registros del tenant con paginación, más recientes primero
    pub async fn list_records(
        &self,
        tenant_id: &str,
        page: u64,
        page_size: u64,
    ) -> Result<ListSmsResponse> {
        let offset = (page - 1) * page_size;
        let page_size_i64 = page_size as i64;
        let offset_i64 = offset as i64;

        // total
        let total_row = sqlx::query("SELECT COUNT(*) as cnt FROM sms_records WHERE tenant_id = ?1")
            .bind(tenant_id)
            .fetch_one(&self.db_pool)
            .await?;
        let total: i64 = total_row.try_get("cnt")?;

        // items
        let rows = sqlx::query(
            r#"
            SELECT id, tenant_id, mid, recipients, content, sms_type,
                   template_name, status, delivery_status, delivery_time,
                   delivery_code, delivery_message, created_at, created_by
            FROM sms_records
            WHERE tenant_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(tenant_id)
        .bind(page_size_i64)
        .bind(offset_i64)
        .fetch_all(&self.db_pool)
        .await?;

        let mut items = Vec::new();
        for r in rows {
            items.push(map_record_row(&r)?);
        }

        Ok(ListSmsResponse {
            total: total as u64,
            page,
            page_size,
            items,
        })
    }

    /// Busca un registro por mid (contexto de servicio: el gateway no conoce
    /// tenants, el mid es único por proveedor).
    pub async fn find_by_mid(&self, mid: &str) -> Result<Option<SmsRecord>> {
        let row = sqlx::query(
            r#"
            SELECT id, tenant_id, mid, recipients, content, sms_type,
                   template_name, status, delivery_status, delivery_time,
                   delivery_code, delivery_message, created_at, created_by
            FROM sms_records
            WHERE mid = ?1
            "#,
        )
        .bind(mid)
        .fetch_optional(&self.db_pool)
        .await
        .context("Fallo al buscar sms_record por mid")?;

        match row {
            Some(r) => Ok(Some(map_record_row(&r)?)),
            None => Ok(None),
        }
    }

    /// Registros que el poller debe reconciliar: entrega pendiente y mid
    /// asignado. El límite acota la corrida (y la carga sobre el proveedor).
    pub async fn find_pending_with_mid(&self, limit: u32) -> Result<Vec<SmsRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, tenant_id, mid, recipients, content, sms_type,
                   template_name, status, delivery_status, delivery_time,
                   delivery_code, delivery_message, created_at, created_by
            FROM sms_records
            WHERE delivery_status = 'pending' AND mid IS NOT NULL
            ORDER BY created_at ASC
            LIMIT ?1
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.db_pool)
        .await
        .context("Fallo al listar registros pendientes")?;

        let mut records = Vec::new();
        for r in rows {
            records.push(map_record_row(&r)?);
        }
        Ok(records)
    }

    /// Aplica la transición terminal de entrega. Es condicional: solo pega
    /// si el registro sigue en 'pending', así el primero que observa el
    /// estado terminal (callback o poller) gana y un duplicado no revive
    /// ni pisa un registro ya resuelto.
    ///
    /// Devuelve `true` si la transición se aplicó.
    pub async fn apply_delivery_update(
        &self,
        mid: &str,
        status: &str,
        delivery_status: &str,
        delivery_code: &str,
        delivery_message: &str,
    ) -> Result<bool> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            UPDATE sms_records
            SET status = ?1,
                delivery_status = ?2,
                delivery_time = ?3,
                delivery_code = ?4,
                delivery_message = ?5
            WHERE mid = ?6 AND delivery_status = 'pending'
            "#,
        )
        .bind(status)
        .bind(delivery_status)
        .bind(&now)
        .bind(delivery_code)
        .bind(delivery_message)
        .bind(mid)
        .execute(&self.db_pool)
        .await
        .context("Fallo al actualizar estado de entrega")?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_record_row(row: &SqliteRow) -> Result<SmsRecord> {
    let recipients_joined: String = row.try_get("recipients")?;
    let created_at_raw: String = row.try_get("created_at")?;
    let created_at: DateTime<Utc> = created_at_raw.parse()?;

    Ok(SmsRecord {
        id: row.try_get("id")?,
        tenant_id: row.try_get("tenant_id")?,
        mid: row.try_get("mid")?,
        recipients: recipients_joined
            .split(';')
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect(),
        content: row.try_get("content")?,
        sms_type: row.try_get("sms_type")?,
        template_name: row.try_get("template_name")?,
        status: row.try_get("status")?,
        delivery_status: row.try_get("delivery_status")?,
        delivery_time: row.try_get("delivery_time")?,
        delivery_code: row.try_get("delivery_code")?,
        delivery_message: row.try_get("delivery_message")?,
        created_at,
        created_by: row.try_get("created_by")?,
    })
}
