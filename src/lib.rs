//! Núcleo del ciclo de vida de reservas de transporte
//!
//! Máquina de estados multi-actor (cliente, admin, conductor) con tabla de
//! transiciones única, guards por actor, asignación de conductor con
//! compare-and-set y negociación de cancelación que puede reanudar el
//! estado previo. La persistencia y las notificaciones en tiempo real son
//! colaboradores externos detrás de traits.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
