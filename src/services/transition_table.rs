//! Tabla de transiciones del ciclo de vida
//!
//! Única fuente de verdad para (estado, rol, transición) -> {permitido, guard}.
//! El portal admin y la app del conductor renderizan el resultado de esta
//! tabla en vez de duplicar condiciones de habilitación en cada pantalla.

use serde::{Deserialize, Serialize};

use crate::models::{ActorRole, Booking, BookingStatus};

/// Transición nombrada del ciclo de vida
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Confirm,
    AssignDriver,
    AcceptOrder,
    StartPickup,
    MarkPickedUp,
    StartTransit,
    MarkDelivered,
    Complete,
    RequestCancellation,
    ApproveCancellation,
    DenyCancellation,
}

impl Transition {
    /// Nombre registrado en el tracking step de la reserva
    pub fn step_name(&self) -> &'static str {
        match self {
            Transition::Confirm => "confirmed",
            Transition::AssignDriver => "driver_assigned",
            Transition::AcceptOrder => "order_accepted",
            Transition::StartPickup => "pickup_started",
            Transition::MarkPickedUp => "order_picked_up",
            Transition::StartTransit => "in_transit",
            Transition::MarkDelivered => "delivered",
            Transition::Complete => "completed",
            Transition::RequestCancellation => "cancellation_requested",
            Transition::ApproveCancellation => "cancelled",
            Transition::DenyCancellation => "cancellation_denied",
        }
    }

    /// Parsear el `step` que envía la app del conductor
    /// (los nombres coinciden con el estado destino)
    pub fn from_delivery_step(step: &str) -> Option<Self> {
        match step {
            "pickup_started" => Some(Transition::StartPickup),
            "order_picked_up" => Some(Transition::MarkPickedUp),
            "in_transit" => Some(Transition::StartTransit),
            "delivered" => Some(Transition::MarkDelivered),
            "completed" => Some(Transition::Complete),
            _ => None,
        }
    }

    /// Estado destino nominal, usado para reportar `InvalidTransition`.
    /// Para la denegación el destino real es el estado previo guardado.
    pub fn nominal_target(&self, booking: &Booking) -> BookingStatus {
        match self {
            Transition::Confirm => BookingStatus::Confirmed,
            // Efecto lateral sin cambio de estado
            Transition::AssignDriver => BookingStatus::Confirmed,
            Transition::AcceptOrder => BookingStatus::OrderAccepted,
            Transition::StartPickup => BookingStatus::PickupStarted,
            Transition::MarkPickedUp => BookingStatus::OrderPickedUp,
            Transition::StartTransit => BookingStatus::InTransit,
            Transition::MarkDelivered => BookingStatus::Delivered,
            Transition::Complete => BookingStatus::Completed,
            Transition::RequestCancellation => BookingStatus::CancellationRequested,
            Transition::ApproveCancellation => BookingStatus::Cancelled,
            Transition::DenyCancellation => booking
                .cancellation_request
                .as_ref()
                .map(|req| req.prior_status)
                .unwrap_or(booking.status),
        }
    }
}

impl std::fmt::Display for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.step_name())
    }
}

/// Precondición que debe cumplirse para permitir la transición
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    /// Sin precondición
    None,
    /// La reserva debe tener conductor asignado
    DriverAssigned,
    /// El actor debe ser exactamente el conductor asignado
    CallerIsAssignedDriver,
    /// La reserva no puede tener conductor asignado todavía
    DriverNotAssigned,
    /// No puede haber una solicitud de cancelación pendiente
    NoPendingCancellation,
    /// Debe haber una solicitud de cancelación pendiente
    CancellationPending,
}

impl Guard {
    pub fn name(&self) -> &'static str {
        match self {
            Guard::None => "none",
            Guard::DriverAssigned => "driver_assigned",
            Guard::CallerIsAssignedDriver => "caller_is_assigned_driver",
            Guard::DriverNotAssigned => "driver_not_assigned",
            Guard::NoPendingCancellation => "no_pending_cancellation",
            Guard::CancellationPending => "cancellation_pending",
        }
    }
}

/// Estados de origen de una regla
#[derive(Debug, Clone, Copy)]
pub enum Source {
    States(&'static [BookingStatus]),
    /// Cualquier estado no terminal (rama de cancelación)
    AnyNonTerminal,
}

impl Source {
    pub fn matches(&self, status: BookingStatus) -> bool {
        match self {
            Source::States(states) => states.contains(&status),
            Source::AnyNonTerminal => !status.is_terminal(),
        }
    }
}

/// Estado destino de una regla
#[derive(Debug, Clone, Copy)]
pub enum Target {
    Fixed(BookingStatus),
    /// Restaurar el estado previo a la solicitud de cancelación
    PriorStatus,
}

/// Regla de transición: quién puede hacer qué, desde dónde y bajo qué guard
#[derive(Debug, Clone, Copy)]
pub struct TransitionRule {
    pub transition: Transition,
    pub from: Source,
    pub actors: &'static [ActorRole],
    pub guard: Guard,
    pub target: Target,
}

const ADMIN: &[ActorRole] = &[ActorRole::Admin];
const DRIVER: &[ActorRole] = &[ActorRole::Driver];
const ADMIN_OR_DRIVER: &[ActorRole] = &[ActorRole::Admin, ActorRole::Driver];
const CUSTOMER: &[ActorRole] = &[ActorRole::Customer];

/// Camino directo del ciclo de vida más las dos ramas laterales.
/// Nota: `order_accepted` y `order_processing` son estados pre-pickup
/// equivalentes; ninguna regla produce `order_processing`.
pub const RULES: &[TransitionRule] = &[
    TransitionRule {
        transition: Transition::Confirm,
        from: Source::States(&[BookingStatus::Pending]),
        actors: ADMIN,
        guard: Guard::None,
        target: Target::Fixed(BookingStatus::Confirmed),
    },
    TransitionRule {
        transition: Transition::AssignDriver,
        from: Source::States(&[BookingStatus::Confirmed]),
        actors: ADMIN,
        guard: Guard::DriverNotAssigned,
        target: Target::Fixed(BookingStatus::Confirmed),
    },
    TransitionRule {
        transition: Transition::AcceptOrder,
        from: Source::States(&[BookingStatus::Confirmed]),
        actors: ADMIN,
        guard: Guard::DriverAssigned,
        target: Target::Fixed(BookingStatus::OrderAccepted),
    },
    TransitionRule {
        transition: Transition::StartPickup,
        from: Source::States(&[BookingStatus::OrderAccepted, BookingStatus::OrderProcessing]),
        actors: DRIVER,
        guard: Guard::CallerIsAssignedDriver,
        target: Target::Fixed(BookingStatus::PickupStarted),
    },
    TransitionRule {
        transition: Transition::MarkPickedUp,
        from: Source::States(&[BookingStatus::PickupStarted]),
        actors: DRIVER,
        guard: Guard::CallerIsAssignedDriver,
        target: Target::Fixed(BookingStatus::OrderPickedUp),
    },
    TransitionRule {
        transition: Transition::StartTransit,
        from: Source::States(&[BookingStatus::OrderPickedUp]),
        actors: DRIVER,
        guard: Guard::CallerIsAssignedDriver,
        target: Target::Fixed(BookingStatus::InTransit),
    },
    TransitionRule {
        transition: Transition::MarkDelivered,
        from: Source::States(&[BookingStatus::InTransit]),
        actors: DRIVER,
        guard: Guard::CallerIsAssignedDriver,
        target: Target::Fixed(BookingStatus::Delivered),
    },
    TransitionRule {
        transition: Transition::Complete,
        from: Source::States(&[BookingStatus::Delivered]),
        actors: ADMIN_OR_DRIVER,
        guard: Guard::None,
        target: Target::Fixed(BookingStatus::Completed),
    },
    TransitionRule {
        transition: Transition::RequestCancellation,
        from: Source::AnyNonTerminal,
        actors: CUSTOMER,
        guard: Guard::NoPendingCancellation,
        target: Target::Fixed(BookingStatus::CancellationRequested),
    },
    TransitionRule {
        transition: Transition::ApproveCancellation,
        from: Source::States(&[BookingStatus::CancellationRequested]),
        actors: ADMIN_OR_DRIVER,
        guard: Guard::CancellationPending,
        target: Target::Fixed(BookingStatus::Cancelled),
    },
    TransitionRule {
        transition: Transition::DenyCancellation,
        from: Source::States(&[BookingStatus::CancellationRequested]),
        actors: ADMIN_OR_DRIVER,
        guard: Guard::CancellationPending,
        target: Target::PriorStatus,
    },
];

/// Buscar la regla que permite `transition` desde `status` para `role`
pub fn lookup(
    status: BookingStatus,
    role: ActorRole,
    transition: Transition,
) -> Option<&'static TransitionRule> {
    RULES.iter().find(|rule| {
        rule.transition == transition && rule.from.matches(status) && rule.actors.contains(&role)
    })
}

/// Reglas candidatas para un estado y rol (sin evaluar guards)
pub fn rules_for(status: BookingStatus, role: ActorRole) -> Vec<&'static TransitionRule> {
    RULES
        .iter()
        .filter(|rule| rule.from.matches(status) && rule.actors.contains(&role))
        .collect()
}
