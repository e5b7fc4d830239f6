//! Controllers de la API
//!
//! Capa delgada entre las rutas y los servicios del núcleo.

pub mod booking_controller;

pub use booking_controller::BookingController;
