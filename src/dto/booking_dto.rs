use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Booking, CancellationRequest, TrackingStep};

// Request de intake: crea una reserva en estado pending
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    #[validate(length(min = 1))]
    pub customer_id: String,
    #[validate(length(min = 1))]
    pub customer_name: String,
    #[validate(length(min = 1))]
    pub from_location: String,
    #[validate(length(min = 1))]
    pub to_location: String,
    pub distance_km: f64,
    pub final_amount: f64,
}

// Request para confirmar una reserva pendiente
#[derive(Debug, Deserialize)]
pub struct ConfirmBookingRequest {
    pub admin_id: String,
}

// Request para asignar conductor
#[derive(Debug, Deserialize)]
pub struct AssignDriverRequest {
    pub driver_id: String,
    pub admin_id: String,
}

// Request para aceptar la orden (confirmed -> order_accepted)
#[derive(Debug, Deserialize)]
pub struct AcceptOrderRequest {
    pub admin_id: String,
}

// Request del conductor para avanzar el estado de entrega
#[derive(Debug, Deserialize)]
pub struct UpdateDeliveryStatusRequest {
    pub driver_id: String,
    pub step: String,
    pub location: Option<String>,
    pub notes: Option<String>,
}

// Request para completar una reserva entregada (admin o conductor)
#[derive(Debug, Deserialize)]
pub struct CompleteBookingRequest {
    pub actor_id: String,
    pub role: String,
}

// Request del cliente para solicitar cancelación
#[derive(Debug, Deserialize, Validate)]
pub struct RequestCancellationRequest {
    #[validate(length(min = 1))]
    pub customer_id: String,
    #[validate(length(min = 1))]
    pub reason: String,
}

// Request del revisor (admin o conductor) para resolver la solicitud
#[derive(Debug, Deserialize)]
pub struct ReviewCancellationRequest {
    pub reviewer_id: String,
    pub role: String,
    pub action: String,
    pub notes: Option<String>,
}

// Response de reserva
#[derive(Debug, Serialize)]
pub struct BookingResponse {
    pub id: Uuid,
    pub customer_id: String,
    pub customer_name: String,
    pub vehicle_id: Option<String>,
    pub driver_id: Option<String>,
    pub status: String,
    pub from_location: String,
    pub to_location: String,
    pub distance_km: f64,
    pub final_amount: f64,
    pub tracking_steps: Vec<TrackingStep>,
    pub cancellation_request: Option<CancellationRequest>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Booking> for BookingResponse {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id,
            customer_id: booking.customer_id,
            customer_name: booking.customer_name,
            vehicle_id: booking.vehicle_id,
            driver_id: booking.driver_id,
            status: booking.status.as_str().to_string(),
            from_location: booking.from_location,
            to_location: booking.to_location,
            distance_km: booking.distance_km,
            final_amount: booking.final_amount,
            tracking_steps: booking.tracking_steps,
            cancellation_request: booking.cancellation_request,
            version: booking.version,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

// Response con las acciones habilitadas para un actor
// (la UI renderiza esto en vez de recalcular guards)
#[derive(Debug, Serialize)]
pub struct AvailableActionsResponse {
    pub booking_id: Uuid,
    pub status: String,
    pub actions: Vec<String>,
}

// Response genérica
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}
