use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use crate::dto::booking_dto::{
    ApiResponse, AvailableActionsResponse, BookingResponse, CreateBookingRequest,
};
use crate::models::{Actor, ActorRole, Booking};
use crate::repositories::BookingRepository;
use crate::services::booking_state_machine::{BookingStateMachine, TransitionPayload};
use crate::services::cancellation::{CancellationNegotiator, ReviewAction};
use crate::services::driver_assignment::DriverAssignmentResolver;
use crate::services::guard_evaluator;
use crate::services::notification::NotificationEmitter;
use crate::services::transition_table::Transition;
use crate::utils::errors::AppError;

/// Orquesta las operaciones del ciclo de vida sobre los servicios del núcleo
pub struct BookingController {
    repository: Arc<dyn BookingRepository>,
    machine: BookingStateMachine,
    resolver: DriverAssignmentResolver,
    negotiator: CancellationNegotiator,
}

impl BookingController {
    pub fn new(
        repository: Arc<dyn BookingRepository>,
        notifier: Arc<dyn NotificationEmitter>,
    ) -> Self {
        Self {
            machine: BookingStateMachine::new(repository.clone(), notifier.clone()),
            resolver: DriverAssignmentResolver::new(repository.clone(), notifier.clone()),
            negotiator: CancellationNegotiator::new(repository.clone(), notifier),
            repository,
        }
    }

    /// Intake: crear una reserva nueva en estado pending
    pub async fn create(
        &self,
        request: CreateBookingRequest,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        request.validate()?;

        let booking = Booking::new(
            request.customer_id,
            request.customer_name,
            request.from_location,
            request.to_location,
            request.distance_km,
            request.final_amount,
        );
        self.repository.insert(&booking).await?;

        tracing::info!("🆕 Reserva {} creada para el cliente {}", booking.id, booking.customer_id);

        Ok(ApiResponse::success_with_message(
            booking.into(),
            "Reserva creada exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<BookingResponse, AppError> {
        let booking = self.machine.load(id).await?;
        Ok(booking.into())
    }

    /// Acciones habilitadas para un actor: tabla + guards consolidados
    pub async fn available_actions(
        &self,
        id: Uuid,
        actor: &Actor,
    ) -> Result<AvailableActionsResponse, AppError> {
        let booking = self.machine.load(id).await?;
        let actions = guard_evaluator::available_transitions(&booking, actor)
            .into_iter()
            .map(|t| t.step_name().to_string())
            .collect();

        Ok(AvailableActionsResponse {
            booking_id: booking.id,
            status: booking.status.as_str().to_string(),
            actions,
        })
    }

    pub async fn confirm_booking(
        &self,
        id: Uuid,
        admin_id: &str,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let booking = self
            .machine
            .apply(id, &Actor::admin(admin_id), Transition::Confirm, TransitionPayload::default())
            .await?;

        Ok(ApiResponse::success_with_message(
            booking.into(),
            "Reserva confirmada exitosamente".to_string(),
        ))
    }

    pub async fn assign_driver(
        &self,
        id: Uuid,
        driver_id: &str,
        admin_id: &str,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let booking = self
            .resolver
            .assign(id, driver_id, &Actor::admin(admin_id))
            .await?;

        Ok(ApiResponse::success_with_message(
            booking.into(),
            "Conductor asignado exitosamente".to_string(),
        ))
    }

    pub async fn accept_order(
        &self,
        id: Uuid,
        admin_id: &str,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let booking = self
            .machine
            .apply(id, &Actor::admin(admin_id), Transition::AcceptOrder, TransitionPayload::default())
            .await?;

        Ok(ApiResponse::success_with_message(
            booking.into(),
            "Orden aceptada exitosamente".to_string(),
        ))
    }

    /// Avance de entrega disparado por el conductor
    pub async fn update_delivery_status(
        &self,
        id: Uuid,
        driver_id: &str,
        step: &str,
        location: Option<String>,
        notes: Option<String>,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let transition = Transition::from_delivery_step(step).ok_or_else(|| {
            AppError::BadRequest(format!("Paso de entrega desconocido: '{}'", step))
        })?;

        let booking = self
            .machine
            .apply(
                id,
                &Actor::driver(driver_id),
                transition,
                TransitionPayload { location, notes },
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            booking.into(),
            "Estado de entrega actualizado".to_string(),
        ))
    }

    pub async fn complete_booking(
        &self,
        id: Uuid,
        actor_id: &str,
        role: &str,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let role = parse_role(role)?;
        let booking = self
            .machine
            .apply(
                id,
                &Actor::new(actor_id, role),
                Transition::Complete,
                TransitionPayload::default(),
            )
            .await?;

        Ok(ApiResponse::success_with_message(
            booking.into(),
            "Reserva completada exitosamente".to_string(),
        ))
    }

    pub async fn request_cancellation(
        &self,
        id: Uuid,
        customer_id: &str,
        reason: String,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let booking = self
            .negotiator
            .request_cancellation(id, customer_id, reason)
            .await?;

        Ok(ApiResponse::success_with_message(
            booking.into(),
            "Solicitud de cancelación registrada".to_string(),
        ))
    }

    pub async fn review_cancellation(
        &self,
        id: Uuid,
        reviewer_id: &str,
        role: &str,
        action: &str,
        notes: Option<String>,
    ) -> Result<ApiResponse<BookingResponse>, AppError> {
        let role = parse_role(role)?;
        let action = ReviewAction::parse(action).ok_or_else(|| {
            AppError::BadRequest(format!("Acción de revisión desconocida: '{}'", action))
        })?;

        let booking = self
            .negotiator
            .review(id, &Actor::new(reviewer_id, role), action, notes)
            .await?;

        Ok(ApiResponse::success_with_message(
            booking.into(),
            "Solicitud de cancelación resuelta".to_string(),
        ))
    }
}

fn parse_role(role: &str) -> Result<ActorRole, AppError> {
    ActorRole::parse(role)
        .ok_or_else(|| AppError::BadRequest(format!("Rol desconocido: '{}'", role)))
}
