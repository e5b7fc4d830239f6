//! Repositorios de acceso a datos
//!
//! El contrato `BookingRepository` define lecturas/escrituras con
//! concurrencia optimista; hay una implementación PostgreSQL y una en
//! memoria para tests y desarrollo.

pub mod booking_repository;
pub mod memory;

pub use booking_repository::{BookingRepository, PgBookingRepository};
pub use memory::InMemoryBookingRepository;
