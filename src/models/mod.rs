//! Modelos del sistema
//!
//! Este módulo contiene los modelos de dominio de la reserva de transporte
//! y los eventos que el núcleo emite hacia el colaborador de notificaciones.

pub mod actor;
pub mod booking;
pub mod events;

pub use actor::{Actor, ActorRole};
pub use booking::{Booking, BookingStatus, CancellationRequest, CancellationStatus, TrackingStep};
pub use events::BookingEvent;
