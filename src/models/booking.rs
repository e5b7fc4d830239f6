use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Estado de una reserva de transporte
///
/// Enum cerrado: agregar un estado obliga a revisar todos los `match`
/// que manejan transiciones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    OrderAccepted,
    OrderProcessing,
    PickupStarted,
    OrderPickedUp,
    InTransit,
    Delivered,
    Completed,
    CancellationRequested,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::OrderAccepted => "order_accepted",
            BookingStatus::OrderProcessing => "order_processing",
            BookingStatus::PickupStarted => "pickup_started",
            BookingStatus::OrderPickedUp => "order_picked_up",
            BookingStatus::InTransit => "in_transit",
            BookingStatus::Delivered => "delivered",
            BookingStatus::Completed => "completed",
            BookingStatus::CancellationRequested => "cancellation_requested",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "order_accepted" => Some(BookingStatus::OrderAccepted),
            "order_processing" => Some(BookingStatus::OrderProcessing),
            "pickup_started" => Some(BookingStatus::PickupStarted),
            "order_picked_up" => Some(BookingStatus::OrderPickedUp),
            "in_transit" => Some(BookingStatus::InTransit),
            "delivered" => Some(BookingStatus::Delivered),
            "completed" => Some(BookingStatus::Completed),
            "cancellation_requested" => Some(BookingStatus::CancellationRequested),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }

    /// Estados terminales: no se permite ninguna transición posterior
    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Completed | BookingStatus::Cancelled)
    }

    /// `order_accepted` y `order_processing` se tratan como estados
    /// pre-pickup equivalentes (el backend legacy produce ambos)
    pub fn is_pre_pickup(&self) -> bool {
        matches!(self, BookingStatus::OrderAccepted | BookingStatus::OrderProcessing)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paso de tracking registrado en cada transición exitosa
///
/// La secuencia es append-only: nunca se muta ni se reordena.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingStep {
    pub step: String,
    pub timestamp: DateTime<Utc>,
    pub location: Option<String>,
    pub notes: Option<String>,
}

/// Estado de una solicitud de cancelación
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationStatus {
    Pending,
    Approved,
    Denied,
}

/// Solicitud de cancelación con su metadata de revisión
///
/// `prior_status` guarda el estado exacto a restaurar si la revisión
/// deniega la cancelación.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationRequest {
    pub requested_by: String,
    pub requested_at: DateTime<Utc>,
    pub reason: String,
    pub status: CancellationStatus,
    pub reviewed_by: Option<String>,
    pub review_notes: Option<String>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub prior_status: BookingStatus,
}

impl CancellationRequest {
    pub fn is_pending(&self) -> bool {
        self.status == CancellationStatus::Pending
    }
}

/// Reserva de transporte
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub customer_id: String,
    pub customer_name: String,
    pub vehicle_id: Option<String>,
    pub driver_id: Option<String>,
    pub status: BookingStatus,
    // Campos de carga: el núcleo los transporta pero nunca los interpreta
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

impl Booking {
    /// Crear una reserva nueva en estado `pending` (proceso de intake)
    pub fn new(
        customer_id: String,
        customer_name: String,
        from_location: String,
        to_location: String,
        distance_km: f64,
        final_amount: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            customer_id,
            customer_name,
            vehicle_id: None,
            driver_id: None,
            status: BookingStatus::Pending,
            from_location,
            to_location,
            distance_km,
            final_amount,
            tracking_steps: Vec::new(),
            cancellation_request: None,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_pending_cancellation(&self) -> bool {
        self.cancellation_request
            .as_ref()
            .map_or(false, |req| req.is_pending())
    }

    /// Agregar un paso de tracking (solo append, nunca se reescribe)
    pub fn push_tracking_step(
        &mut self,
        step: &str,
        location: Option<String>,
        notes: Option<String>,
    ) {
        self.tracking_steps.push(TrackingStep {
            step: step.to_string(),
            timestamp: Utc::now(),
            location,
            notes,
        });
    }
}
