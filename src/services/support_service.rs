use sea_orm::{ActiveModelTrait, ActiveValue::NotSet, Set};

use crate::{
    audit::{AuditAction, record},
    dto::support::{TicketRequest, TicketResponse},
    entity::support_tickets::ActiveModel as TicketActive,
    error::AppResult,
    response::{ApiResponse, Meta},
    state::AppState,
    validation,
};

#[derive(Debug, PartialEq)]
pub struct NewTicket {
    pub name: String,
    pub email: String,
    pub subject: Option<String>,
    pub message: String,
}

pub fn validate_ticket(payload: TicketRequest) -> AppResult<NewTicket> {
    Ok(NewTicket {
        name: validation::required("name", payload.name)?,
        email: validation::email("email", payload.email)?,
        subject: validation::optional(payload.subject),
        message: validation::required("message", payload.message)?,
    })
}

pub fn ticket_protocol(ticket_id: i64) -> String {
    format!("#2{ticket_id:04}")
}

pub async fn open_ticket(
    state: &AppState,
    payload: TicketRequest,
) -> AppResult<ApiResponse<TicketResponse>> {
    let ticket = validate_ticket(payload)?;

    let saved = TicketActive {
        id: NotSet,
        name: Set(ticket.name),
        email: Set(ticket.email),
        subject: Set(ticket.subject),
        message: Set(ticket.message),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    let protocol = ticket_protocol(saved.id);
    tracing::info!(ticket_id = %saved.id, protocol = %protocol, "support ticket opened");
    record(
        &state.orm,
        None,
        AuditAction::SupportTicket,
        serde_json::json!({ "ticket_id": saved.id, "protocol": protocol }),
    )
    .await;

    Ok(ApiResponse::success(
        "Ticket received",
        TicketResponse {
            protocol,
            ticket_id: saved.id,
        },
        Some(Meta::empty()),
    ))
}
