//! Negociación de cancelación
//!
//! Sub-protocolo solicitud -> pendiente -> {aprobada, denegada} anidado en
//! la máquina de estados. Al solicitar se guarda el estado previo exacto;
//! una denegación lo restaura y deja la metadata de revisión para auditoría.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    Actor, Booking, BookingEvent, CancellationRequest, CancellationStatus,
};
use crate::repositories::BookingRepository;
use crate::services::booking_state_machine::{BookingStateMachine, TransitionPayload};
use crate::services::notification::NotificationEmitter;
use crate::services::transition_table::Transition;
use crate::utils::errors::AppError;

/// Acción del revisor sobre una solicitud pendiente
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewAction {
    Approve,
    Deny,
}

impl ReviewAction {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "approve" => Some(ReviewAction::Approve),
            "deny" => Some(ReviewAction::Deny),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct CancellationNegotiator {
    machine: BookingStateMachine,
    notifier: Arc<dyn NotificationEmitter>,
}

impl CancellationNegotiator {
    pub fn new(
        repository: Arc<dyn BookingRepository>,
        notifier: Arc<dyn NotificationEmitter>,
    ) -> Self {
        Self {
            machine: BookingStateMachine::new(repository, notifier.clone()),
            notifier,
        }
    }

    /// Solicitar la cancelación de una reserva en vuelo
    ///
    /// Solo puede haber una solicitud pendiente por reserva; una segunda
    /// solicitud mientras hay una pendiente se rechaza con
    /// `CancellationAlreadyPending`.
    pub async fn request_cancellation(
        &self,
        booking_id: Uuid,
        requested_by: &str,
        reason: String,
    ) -> Result<Booking, AppError> {
        let actor = Actor::customer(requested_by);
        let requester = requested_by.to_string();
        let request_reason = reason.clone();

        let (booking, prior_status) = self
            .machine
            .apply_with(
                booking_id,
                &actor,
                Transition::RequestCancellation,
                TransitionPayload::with_notes(reason.clone()),
                move |booking| {
                    // El snapshot del estado previo permite reanudar
                    // exactamente donde estaba si la revisión deniega
                    booking.cancellation_request = Some(CancellationRequest {
                        requested_by: requester,
                        requested_at: Utc::now(),
                        reason: request_reason,
                        status: CancellationStatus::Pending,
                        reviewed_by: None,
                        review_notes: None,
                        reviewed_at: None,
                        prior_status: booking.status,
                    });
                    Ok(())
                },
            )
            .await?;

        self.notifier
            .emit(BookingEvent::CancellationRequested {
                booking_id,
                requested_by: requested_by.to_string(),
                reason,
                prior_status,
            })
            .await;

        Ok(booking)
    }

    /// Resolver una solicitud pendiente: aprobar (terminal) o denegar
    /// (restaura el estado previo)
    pub async fn review(
        &self,
        booking_id: Uuid,
        reviewer: &Actor,
        action: ReviewAction,
        notes: Option<String>,
    ) -> Result<Booking, AppError> {
        let transition = match action {
            ReviewAction::Approve => Transition::ApproveCancellation,
            ReviewAction::Deny => Transition::DenyCancellation,
        };

        let reviewer_id = reviewer.id.clone();
        let review_notes = notes.clone();

        let (booking, _from) = self
            .machine
            .apply_with(
                booking_id,
                reviewer,
                transition,
                TransitionPayload {
                    location: None,
                    notes,
                },
                move |booking| {
                    let request = booking.cancellation_request.as_mut().ok_or_else(|| {
                        AppError::Internal(
                            "Revisión sin solicitud de cancelación registrada".to_string(),
                        )
                    })?;
                    request.status = match action {
                        ReviewAction::Approve => CancellationStatus::Approved,
                        ReviewAction::Deny => CancellationStatus::Denied,
                    };
                    request.reviewed_by = Some(reviewer_id);
                    request.review_notes = review_notes;
                    request.reviewed_at = Some(Utc::now());
                    Ok(())
                },
            )
            .await?;

        self.notifier
            .emit(BookingEvent::CancellationResolved {
                booking_id,
                action,
                reviewed_by: reviewer.id.clone(),
                resumed_status: booking.status,
            })
            .await;

        Ok(booking)
    }
}
