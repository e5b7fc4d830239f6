use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::actor::Actor;
use super::booking::BookingStatus;
use crate::services::cancellation::ReviewAction;

/// Eventos de dominio entregados al colaborador de notificaciones
///
/// El núcleo los emite después de persistir; la entrega en tiempo real
/// (sockets, push) es responsabilidad del colaborador externo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookingEvent {
    StatusChanged {
        booking_id: Uuid,
        from: BookingStatus,
        to: BookingStatus,
        actor: Actor,
    },
    CancellationRequested {
        booking_id: Uuid,
        requested_by: String,
        reason: String,
        prior_status: BookingStatus,
    },
    CancellationResolved {
        booking_id: Uuid,
        action: ReviewAction,
        reviewed_by: String,
        resumed_status: BookingStatus,
    },
}

impl BookingEvent {
    pub fn booking_id(&self) -> Uuid {
        match self {
            BookingEvent::StatusChanged { booking_id, .. } => *booking_id,
            BookingEvent::CancellationRequested { booking_id, .. } => *booking_id,
            BookingEvent::CancellationResolved { booking_id, .. } => *booking_id,
        }
    }
}
