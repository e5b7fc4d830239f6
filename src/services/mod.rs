//! Services module
//!
//! Este módulo contiene la lógica de negocio del ciclo de vida de la
//! reserva: la tabla de transiciones, la evaluación de guards, la máquina
//! de estados y los dos llamadores especializados (asignación de conductor
//! y negociación de cancelación).

pub mod booking_state_machine;
pub mod cancellation;
pub mod driver_assignment;
pub mod guard_evaluator;
pub mod notification;
pub mod transition_table;

pub use booking_state_machine::{BookingStateMachine, TransitionPayload};
pub use cancellation::{CancellationNegotiator, ReviewAction};
pub use driver_assignment::DriverAssignmentResolver;
pub use notification::{LogNotifier, NotificationEmitter};
pub use transition_table::{Guard, Transition, TransitionRule};
