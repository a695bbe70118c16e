use serde::{Deserialize, Serialize};

/// Saldo de SMS de un tenant
#[derive(Debug, Clone, Serialize)]
pub struct WalletRecord {
    pub tenant_id: String,
    pub sms_balance: i64,
    pub updated_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TopupRequest {
    pub amount: i64,
}
