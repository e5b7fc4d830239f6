//! Máquina de estados de la reserva
//!
//! Aplica transiciones validadas: carga el snapshot, consulta la tabla,
//! evalúa el guard, muta el estado, agrega el tracking step y persiste
//! con compare-and-set. El evento de dominio se emite solo después de
//! que la persistencia confirma la escritura.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::models::{Actor, Booking, BookingEvent, BookingStatus};
use crate::repositories::BookingRepository;
use crate::services::guard_evaluator;
use crate::services::notification::NotificationEmitter;
use crate::services::transition_table::{self, Target, Transition};
use crate::utils::errors::{not_found_error, AppError};

/// Datos opcionales que acompañan una transición
#[derive(Debug, Clone, Default)]
pub struct TransitionPayload {
    pub location: Option<String>,
    pub notes: Option<String>,
}

impl TransitionPayload {
    pub fn with_notes(notes: impl Into<String>) -> Self {
        Self {
            location: None,
            notes: Some(notes.into()),
        }
    }
}

#[derive(Clone)]
pub struct BookingStateMachine {
    repository: Arc<dyn BookingRepository>,
    notifier: Arc<dyn NotificationEmitter>,
}

impl BookingStateMachine {
    pub fn new(
        repository: Arc<dyn BookingRepository>,
        notifier: Arc<dyn NotificationEmitter>,
    ) -> Self {
        Self { repository, notifier }
    }

    pub async fn load(&self, booking_id: Uuid) -> Result<Booking, AppError> {
        self.repository
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| not_found_error("Booking", &booking_id.to_string()))
    }

    /// Aplicar una transición de estado y emitir `StatusChanged`
    ///
    /// En caso de rechazo no se muta nada ni se llama a la persistencia.
    /// Un `ConcurrentModification` exige que el llamador relea y vuelva a
    /// validar: el guard puede ya no cumplirse sobre el snapshot fresco.
    pub async fn apply(
        &self,
        booking_id: Uuid,
        actor: &Actor,
        transition: Transition,
        payload: TransitionPayload,
    ) -> Result<Booking, AppError> {
        let (booking, from) = self
            .apply_with(booking_id, actor, transition, payload, |_| Ok(()))
            .await?;

        self.notifier
            .emit(BookingEvent::StatusChanged {
                booking_id,
                from,
                to: booking.status,
                actor: actor.clone(),
            })
            .await;

        Ok(booking)
    }

    /// Camino compartido de validación + persistencia
    ///
    /// `mutate` corre después de validar y antes de fijar el estado
    /// destino; lo usan la asignación de conductor y la negociación de
    /// cancelación para sus efectos adicionales. No emite eventos: cada
    /// llamador emite los suyos tras el retorno exitoso.
    pub(crate) async fn apply_with<F>(
        &self,
        booking_id: Uuid,
        actor: &Actor,
        transition: Transition,
        payload: TransitionPayload,
        mutate: F,
    ) -> Result<(Booking, BookingStatus), AppError>
    where
        F: FnOnce(&mut Booking) -> Result<(), AppError>,
    {
        let mut booking = self.load(booking_id).await?;
        let from = booking.status;

        let rule = transition_table::lookup(from, actor.role, transition).ok_or_else(|| {
            AppError::InvalidTransition {
                from,
                to: transition.nominal_target(&booking),
                actor_role: actor.role,
            }
        })?;

        guard_evaluator::evaluate(rule.guard, &booking, actor)?;

        let to = match rule.target {
            Target::Fixed(status) => status,
            Target::PriorStatus => booking
                .cancellation_request
                .as_ref()
                .map(|req| req.prior_status)
                .ok_or_else(|| {
                    AppError::Internal(
                        "Transición a estado previo sin solicitud de cancelación".to_string(),
                    )
                })?,
        };

        let expected_version = booking.version;

        mutate(&mut booking)?;
        booking.status = to;
        booking.push_tracking_step(transition.step_name(), payload.location, payload.notes);
        booking.version = expected_version + 1;
        booking.updated_at = Utc::now();

        // Todo o nada: si la versión ya no coincide, nada se persiste
        self.repository.compare_and_save(&booking, expected_version).await?;

        tracing::info!(
            "🔄 Reserva {}: {} -> {} por {} '{}'",
            booking_id,
            from,
            booking.status,
            actor.role,
            actor.id
        );

        Ok((booking, from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryBookingRepository;
    use crate::services::notification::LogNotifier;

    fn machine() -> (BookingStateMachine, Arc<InMemoryBookingRepository>) {
        let repo = Arc::new(InMemoryBookingRepository::new());
        let machine = BookingStateMachine::new(repo.clone(), Arc::new(LogNotifier));
        (machine, repo)
    }

    async fn seeded_booking(repo: &InMemoryBookingRepository) -> Booking {
        let booking = Booking::new(
            "C1".to_string(),
            "Cliente Test".to_string(),
            "Origen".to_string(),
            "Destino".to_string(),
            10.0,
            50.0,
        );
        repo.insert(&booking).await.unwrap();
        booking
    }

    #[tokio::test]
    async fn test_confirm_appends_step_and_bumps_version() {
        let (machine, repo) = machine();
        let booking = seeded_booking(&repo).await;

        let updated = machine
            .apply(
                booking.id,
                &Actor::admin("A1"),
                Transition::Confirm,
                TransitionPayload::default(),
            )
            .await
            .unwrap();

        assert_eq!(updated.status, BookingStatus::Confirmed);
        assert_eq!(updated.version, booking.version + 1);
        assert_eq!(updated.tracking_steps.len(), 1);
        assert_eq!(updated.tracking_steps[0].step, "confirmed");
    }

    #[tokio::test]
    async fn test_rejected_transition_has_no_side_effects() {
        let (machine, repo) = machine();
        let booking = seeded_booking(&repo).await;

        // pickup_started desde pending siempre es InvalidTransition
        let err = machine
            .apply(
                booking.id,
                &Actor::driver("D1"),
                Transition::StartPickup,
                TransitionPayload::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));

        // Repetir el rechazo produce la misma clase de error, sin efectos
        let err = machine
            .apply(
                booking.id,
                &Actor::driver("D1"),
                Transition::StartPickup,
                TransitionPayload::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));

        let stored = repo.find_by_id(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.version, booking.version);
        assert!(stored.tracking_steps.is_empty());
        assert_eq!(stored.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_unknown_booking_is_not_found() {
        let (machine, _repo) = machine();
        let err = machine
            .apply(
                Uuid::new_v4(),
                &Actor::admin("A1"),
                Transition::Confirm,
                TransitionPayload::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_guard_failure_reaches_caller_without_persisting() {
        let (machine, repo) = machine();
        let mut booking = seeded_booking(&repo).await;

        // Llevar la reserva a confirmed sin conductor
        booking = machine
            .apply(
                booking.id,
                &Actor::admin("A1"),
                Transition::Confirm,
                TransitionPayload::default(),
            )
            .await
            .unwrap();

        // AcceptOrder exige conductor asignado
        let err = machine
            .apply(
                booking.id,
                &Actor::admin("A1"),
                Transition::AcceptOrder,
                TransitionPayload::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::GuardFailed { .. }));

        let stored = repo.find_by_id(booking.id).await.unwrap().unwrap();
        assert_eq!(stored.status, BookingStatus::Confirmed);
        assert_eq!(stored.version, booking.version);
    }
}
