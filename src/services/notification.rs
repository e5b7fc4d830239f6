//! Emisión de eventos de dominio
//!
//! El núcleo entrega eventos a este colaborador después de persistir
//! (fire-and-forget). La entrega real a clientes conectados (sockets,
//! push) es responsabilidad del colaborador, nunca bloquea una transición.

use async_trait::async_trait;

use crate::models::BookingEvent;

#[async_trait]
pub trait NotificationEmitter: Send + Sync {
    async fn emit(&self, event: BookingEvent);
}

/// Emisor por defecto: registra los eventos en el log estructurado
pub struct LogNotifier;

#[async_trait]
impl NotificationEmitter for LogNotifier {
    async fn emit(&self, event: BookingEvent) {
        match &event {
            BookingEvent::StatusChanged { booking_id, from, to, actor } => {
                tracing::info!(
                    "📦 Evento StatusChanged: reserva {} {} -> {} (actor {} {})",
                    booking_id,
                    from,
                    to,
                    actor.role,
                    actor.id
                );
            }
            BookingEvent::CancellationRequested { booking_id, requested_by, .. } => {
                tracing::info!(
                    "🚫 Evento CancellationRequested: reserva {} solicitada por {}",
                    booking_id,
                    requested_by
                );
            }
            BookingEvent::CancellationResolved { booking_id, reviewed_by, resumed_status, .. } => {
                tracing::info!(
                    "✅ Evento CancellationResolved: reserva {} revisada por {} -> {}",
                    booking_id,
                    reviewed_by,
                    resumed_status
                );
            }
        }
    }
}
