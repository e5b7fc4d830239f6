//! Asignación de conductor
//!
//! Compare-and-set sobre el campo `driver_id` combinado con el chequeo de
//! versión del repositorio: de dos asignaciones concurrentes exactamente
//! una gana. El perdedor recibe `DriverAlreadyAssigned` y el conflicto se
//! presenta al admin, nunca se reintenta en silencio con otro conductor.

use std::sync::Arc;

use uuid::Uuid;

use crate::models::{Actor, Booking};
use crate::repositories::BookingRepository;
use crate::services::booking_state_machine::{BookingStateMachine, TransitionPayload};
use crate::services::notification::NotificationEmitter;
use crate::services::transition_table::Transition;
use crate::utils::errors::AppError;

#[derive(Clone)]
pub struct DriverAssignmentResolver {
    machine: BookingStateMachine,
    repository: Arc<dyn BookingRepository>,
}

impl DriverAssignmentResolver {
    pub fn new(
        repository: Arc<dyn BookingRepository>,
        notifier: Arc<dyn NotificationEmitter>,
    ) -> Self {
        Self {
            machine: BookingStateMachine::new(repository.clone(), notifier),
            repository,
        }
    }

    /// Asignar un conductor a una reserva confirmada y sin conductor
    ///
    /// No cambia el estado ni emite `StatusChanged`; deja un tracking
    /// step `driver_assigned` para la línea de tiempo del portal.
    pub async fn assign(
        &self,
        booking_id: Uuid,
        driver_id: &str,
        actor: &Actor,
    ) -> Result<Booking, AppError> {
        let driver = driver_id.to_string();
        let payload = TransitionPayload::with_notes(format!("Conductor '{}' asignado", driver));

        let result = self
            .machine
            .apply_with(booking_id, actor, Transition::AssignDriver, payload, |booking| {
                booking.driver_id = Some(driver.clone());
                Ok(())
            })
            .await;

        match result {
            Ok((booking, _)) => {
                tracing::info!("🚗 Conductor '{}' asignado a la reserva {}", driver_id, booking_id);
                Ok(booking)
            }
            // Perdimos la carrera: si el ganador asignó un conductor,
            // reportarlo como conflicto de asignación y no como conflicto
            // de versión genérico
            Err(AppError::ConcurrentModification { expected, actual }) => {
                let fresh = self.repository.find_by_id(booking_id).await?;
                match fresh.and_then(|b| b.driver_id) {
                    Some(winner) => {
                        tracing::warn!(
                            "⚠️ Asignación perdió la carrera en la reserva {}: '{}' ya asignado",
                            booking_id,
                            winner
                        );
                        Err(AppError::DriverAlreadyAssigned { driver_id: winner })
                    }
                    None => Err(AppError::ConcurrentModification { expected, actual }),
                }
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Booking, BookingStatus};
    use crate::repositories::InMemoryBookingRepository;
    use crate::services::notification::LogNotifier;

    async fn confirmed_booking(repo: &InMemoryBookingRepository) -> Booking {
        let mut booking = Booking::new(
            "C1".to_string(),
            "Cliente Test".to_string(),
            "Origen".to_string(),
            "Destino".to_string(),
            10.0,
            50.0,
        );
        booking.status = BookingStatus::Confirmed;
        repo.insert(&booking).await.unwrap();
        booking
    }

    #[tokio::test]
    async fn test_assign_sets_driver_without_status_change() {
        let repo = Arc::new(InMemoryBookingRepository::new());
        let resolver = DriverAssignmentResolver::new(repo.clone(), Arc::new(LogNotifier));
        let booking = confirmed_booking(&repo).await;

        let updated = resolver
            .assign(booking.id, "D7", &Actor::admin("A1"))
            .await
            .unwrap();

        assert_eq!(updated.driver_id.as_deref(), Some("D7"));
        assert_eq!(updated.status, BookingStatus::Confirmed);
        assert_eq!(updated.tracking_steps.last().unwrap().step, "driver_assigned");
    }

    #[tokio::test]
    async fn test_second_assign_is_conflict() {
        let repo = Arc::new(InMemoryBookingRepository::new());
        let resolver = DriverAssignmentResolver::new(repo.clone(), Arc::new(LogNotifier));
        let booking = confirmed_booking(&repo).await;

        resolver.assign(booking.id, "D1", &Actor::admin("A1")).await.unwrap();

        let err = resolver
            .assign(booking.id, "D2", &Actor::admin("A2"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DriverAlreadyAssigned { driver_id } if driver_id == "D1"));
    }

    #[tokio::test]
    async fn test_assign_requires_confirmed_status() {
        let repo = Arc::new(InMemoryBookingRepository::new());
        let resolver = DriverAssignmentResolver::new(repo.clone(), Arc::new(LogNotifier));

        let booking = Booking::new(
            "C1".to_string(),
            "Cliente Test".to_string(),
            "Origen".to_string(),
            "Destino".to_string(),
            10.0,
            50.0,
        );
        repo.insert(&booking).await.unwrap();

        // Sigue en pending: la tabla no permite asignar
        let err = resolver
            .assign(booking.id, "D7", &Actor::admin("A1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidTransition { .. }));
    }
}
