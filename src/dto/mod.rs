//! DTOs de la API
//!
//! Requests y responses que viajan por HTTP; la lógica vive en los
//! servicios, aquí solo hay forma de datos.

pub mod booking_dto;
