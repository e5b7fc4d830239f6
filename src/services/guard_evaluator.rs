//! Evaluación de guards
//!
//! Evalúa las precondiciones de la tabla de transiciones contra un
//! snapshot de la reserva y el actor que llama. El resultado es el mismo
//! para el portal admin y la app del conductor: una sola fuente de verdad.

use crate::models::{Actor, Booking};
use crate::services::transition_table::{self, Guard, Transition};
use crate::utils::errors::AppError;

/// Evaluar un guard contra el snapshot actual de la reserva
pub fn evaluate(guard: Guard, booking: &Booking, actor: &Actor) -> Result<(), AppError> {
    match guard {
        Guard::None => Ok(()),

        Guard::DriverAssigned => {
            if booking.driver_id.is_some() {
                Ok(())
            } else {
                Err(AppError::GuardFailed {
                    guard: guard.name(),
                    detail: "La reserva no tiene conductor asignado".to_string(),
                })
            }
        }

        Guard::CallerIsAssignedDriver => match booking.driver_id.as_deref() {
            Some(assigned) if assigned == actor.id => Ok(()),
            Some(_) => Err(AppError::GuardFailed {
                guard: guard.name(),
                detail: format!(
                    "El conductor '{}' no es el conductor asignado a esta reserva",
                    actor.id
                ),
            }),
            None => Err(AppError::GuardFailed {
                guard: guard.name(),
                detail: "La reserva no tiene conductor asignado".to_string(),
            }),
        },

        Guard::DriverNotAssigned => match booking.driver_id.as_deref() {
            None => Ok(()),
            Some(assigned) => Err(AppError::DriverAlreadyAssigned {
                driver_id: assigned.to_string(),
            }),
        },

        Guard::NoPendingCancellation => {
            if booking.has_pending_cancellation() {
                Err(AppError::CancellationAlreadyPending)
            } else {
                Ok(())
            }
        }

        Guard::CancellationPending => {
            if booking.has_pending_cancellation() {
                Ok(())
            } else {
                Err(AppError::GuardFailed {
                    guard: guard.name(),
                    detail: "No hay solicitud de cancelación pendiente".to_string(),
                })
            }
        }
    }
}

/// Transiciones disponibles para un actor sobre una reserva
///
/// Consolida tabla + guards para que la UI sea un renderer delgado:
/// los botones del dashboard se habilitan según este resultado.
pub fn available_transitions(booking: &Booking, actor: &Actor) -> Vec<Transition> {
    transition_table::rules_for(booking.status, actor.role)
        .into_iter()
        .filter(|rule| evaluate(rule.guard, booking, actor).is_ok())
        .map(|rule| rule.transition)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Actor, Booking, BookingStatus};

    fn booking_at(status: BookingStatus) -> Booking {
        let mut booking = Booking::new(
            "C1".to_string(),
            "Cliente Test".to_string(),
            "Origen".to_string(),
            "Destino".to_string(),
            10.0,
            50.0,
        );
        booking.status = status;
        booking
    }

    #[test]
    fn test_driver_assigned_guard() {
        let mut booking = booking_at(BookingStatus::Confirmed);
        let admin = Actor::admin("A1");

        let err = evaluate(Guard::DriverAssigned, &booking, &admin).unwrap_err();
        assert!(matches!(err, AppError::GuardFailed { guard: "driver_assigned", .. }));

        booking.driver_id = Some("D7".to_string());
        assert!(evaluate(Guard::DriverAssigned, &booking, &admin).is_ok());
    }

    #[test]
    fn test_caller_identity_guard() {
        let mut booking = booking_at(BookingStatus::OrderAccepted);
        booking.driver_id = Some("D3".to_string());

        let wrong_driver = Actor::driver("D9");
        let err = evaluate(Guard::CallerIsAssignedDriver, &booking, &wrong_driver).unwrap_err();
        assert!(matches!(err, AppError::GuardFailed { .. }));

        let right_driver = Actor::driver("D3");
        assert!(evaluate(Guard::CallerIsAssignedDriver, &booking, &right_driver).is_ok());
    }

    #[test]
    fn test_pending_cancellation_guards() {
        let mut booking = booking_at(BookingStatus::InTransit);
        let customer = Actor::customer("C1");

        assert!(evaluate(Guard::NoPendingCancellation, &booking, &customer).is_ok());
        assert!(matches!(
            evaluate(Guard::CancellationPending, &booking, &customer),
            Err(AppError::GuardFailed { .. })
        ));

        booking.cancellation_request = Some(crate::models::CancellationRequest {
            requested_by: "C1".to_string(),
            requested_at: chrono::Utc::now(),
            reason: "Retraso".to_string(),
            status: crate::models::CancellationStatus::Pending,
            reviewed_by: None,
            review_notes: None,
            reviewed_at: None,
            prior_status: BookingStatus::InTransit,
        });

        assert!(matches!(
            evaluate(Guard::NoPendingCancellation, &booking, &customer),
            Err(AppError::CancellationAlreadyPending)
        ));
        assert!(evaluate(Guard::CancellationPending, &booking, &customer).is_ok());
    }

    #[test]
    fn test_available_transitions_for_driver() {
        let mut booking = booking_at(BookingStatus::OrderAccepted);
        booking.driver_id = Some("D3".to_string());

        let assigned = available_transitions(&booking, &Actor::driver("D3"));
        assert_eq!(assigned, vec![Transition::StartPickup]);

        // Otro conductor no ve ninguna acción habilitada
        let other = available_transitions(&booking, &Actor::driver("D9"));
        assert!(other.is_empty());
    }

    #[test]
    fn test_driver_not_assigned_guard_reports_conflict() {
        let mut booking = booking_at(BookingStatus::Confirmed);
        let admin = Actor::admin("A1");

        assert!(evaluate(Guard::DriverNotAssigned, &booking, &admin).is_ok());

        booking.driver_id = Some("D7".to_string());
        let err = evaluate(Guard::DriverNotAssigned, &booking, &admin).unwrap_err();
        assert!(matches!(err, AppError::DriverAlreadyAssigned { .. }));
    }

    #[test]
    fn test_available_transitions_for_admin_on_confirmed() {
        let mut booking = booking_at(BookingStatus::Confirmed);

        // Sin conductor: solo se puede asignar
        let actions = available_transitions(&booking, &Actor::admin("A1"));
        assert_eq!(actions, vec![Transition::AssignDriver]);

        // Con conductor: solo se puede aceptar la orden
        booking.driver_id = Some("D7".to_string());
        let actions = available_transitions(&booking, &Actor::admin("A1"));
        assert_eq!(actions, vec![Transition::AcceptOrder]);
    }

    #[test]
    fn test_available_transitions_for_admin_on_pending() {
        let booking = booking_at(BookingStatus::Pending);
        let actions = available_transitions(&booking, &Actor::admin("A1"));
        assert_eq!(actions, vec![Transition::Confirm]);
    }
}
