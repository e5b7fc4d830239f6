//! Middleware del sistema
//!
//! Este módulo contiene el middleware de CORS para la API.

pub mod cors;
