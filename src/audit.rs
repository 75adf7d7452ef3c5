use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, Set};
use serde_json::Value;
use uuid::Uuid;

use crate::{db::OrmConn, entity::audit_logs::ActiveModel as AuditActive, error::AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditAction {
    UserRegister,
    UserLogin,
    Checkout,
    SupportTicket,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::UserRegister => "user_register",
            AuditAction::UserLogin => "user_login",
            AuditAction::Checkout => "checkout",
            AuditAction::SupportTicket => "support_ticket",
        }
    }

    fn resource(&self) -> &'static str {
        match self {
            AuditAction::UserRegister | AuditAction::UserLogin => "users",
            AuditAction::Checkout => "orders",
            AuditAction::SupportTicket => "support_tickets",
        }
    }
}

pub async fn log_audit(
    orm: &OrmConn,
    user_id: Option<i64>,
    action: AuditAction,
    metadata: Option<Value>,
) -> AppResult<()> {
    AuditActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        action: Set(action.as_str().to_string()),
        resource: Set(Some(action.resource().to_string())),
        metadata: Set(metadata),
        created_at: NotSet,
    }
    .insert(orm)
    .await?;

    Ok(())
}

/// Audit writes never fail the request that triggered them.
pub async fn record(orm: &OrmConn, user_id: Option<i64>, action: AuditAction, metadata: Value) {
    if let Err(err) = log_audit(orm, user_id, action, Some(metadata)).await {
        tracing::warn!(error = %err, action = action.as_str(), "audit log failed");
    }
}
