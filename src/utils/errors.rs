//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas. Los errores de dominio
//! (transiciones, guards, conflictos de concurrencia) son valores tipados:
//! ningún camino de error persiste parcialmente una reserva.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::{ActorRole, BookingStatus};

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid transition from '{from}' to '{to}' for role '{actor_role}'")]
    InvalidTransition {
        from: BookingStatus,
        to: BookingStatus,
        actor_role: ActorRole,
    },

    #[error("Guard '{guard}' failed: {detail}")]
    GuardFailed { guard: &'static str, detail: String },

    #[error("Concurrent modification: expected version {expected}, found {actual}")]
    ConcurrentModification { expected: i64, actual: i64 },

    #[error("Driver '{driver_id}' is already assigned to this booking")]
    DriverAlreadyAssigned { driver_id: String },

    #[error("A cancellation request is already pending for this booking")]
    CancellationAlreadyPending,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        AppError::Database(e.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(e: validator::ValidationErrors) -> Self {
        AppError::Validation(e.to_string())
    }
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::InvalidTransition { from, to, actor_role } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse {
                    error: "Invalid Transition".to_string(),
                    message: self.to_string(),
                    details: Some(json!({
                        "from": from.as_str(),
                        "to": to.as_str(),
                        "actor_role": actor_role.as_str(),
                    })),
                    code: Some("INVALID_TRANSITION".to_string()),
                },
            ),

            AppError::GuardFailed { guard, detail } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse {
                    error: "Guard Failed".to_string(),
                    message: detail.clone(),
                    details: Some(json!({ "guard": guard })),
                    code: Some("GUARD_FAILED".to_string()),
                },
            ),

            AppError::ConcurrentModification { expected, actual } => (
                StatusCode::CONFLICT,
                ErrorResponse {
                    error: "Concurrent Modification".to_string(),
                    message: "La reserva fue modificada por otra operación; vuelve a leer y reintenta"
                        .to_string(),
                    details: Some(json!({ "expected_version": expected, "actual_version": actual })),
                    code: Some("CONCURRENT_MODIFICATION".to_string()),
                },
            ),

            AppError::DriverAlreadyAssigned { driver_id } => (
                StatusCode::CONFLICT,
                ErrorResponse {
                    error: "Driver Already Assigned".to_string(),
                    message: "La reserva ya tiene un conductor asignado".to_string(),
                    details: Some(json!({ "driver_id": driver_id })),
                    code: Some("DRIVER_ALREADY_ASSIGNED".to_string()),
                },
            ),

            AppError::CancellationAlreadyPending => (
                StatusCode::CONFLICT,
                ErrorResponse {
                    error: "Cancellation Already Pending".to_string(),
                    message: "Ya existe una solicitud de cancelación pendiente".to_string(),
                    details: None,
                    code: Some("CANCELLATION_ALREADY_PENDING".to_string()),
                },
            ),

            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse {
                    error: "Not Found".to_string(),
                    message: msg.clone(),
                    details: None,
                    code: Some("NOT_FOUND".to_string()),
                },
            ),

            AppError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Database Error".to_string(),
                        message: "An error occurred while accessing the database".to_string(),
                        details: Some(json!({ "sql_error": msg })),
                        code: Some("DB_ERROR".to_string()),
                    },
                )
            }

            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Validation Error".to_string(),
                    message: msg.clone(),
                    details: None,
                    code: Some("VALIDATION_ERROR".to_string()),
                },
            ),

            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse {
                    error: "Bad Request".to_string(),
                    message: msg.clone(),
                    details: None,
                    code: Some("BAD_REQUEST".to_string()),
                },
            ),

            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Internal Server Error".to_string(),
                        message: "An unexpected error occurred".to_string(),
                        details: Some(json!({ "internal_error": msg })),
                        code: Some("INTERNAL_ERROR".to_string()),
                    },
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_transition_message() {
        let err = AppError::InvalidTransition {
            from: BookingStatus::Pending,
            to: BookingStatus::PickupStarted,
            actor_role: ActorRole::Driver,
        };
        let msg = err.to_string();
        assert!(msg.contains("pending"));
        assert!(msg.contains("pickup_started"));
        assert!(msg.contains("driver"));
    }

    #[test]
    fn test_not_found_helper() {
        let err = not_found_error("Booking", "abc");
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
