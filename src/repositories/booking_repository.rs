use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, CancellationRequest, TrackingStep};
use crate::utils::errors::{not_found_error, AppError, AppResult};

/// Almacenamiento duradero de reservas con concurrencia optimista
///
/// El núcleo solo depende de este contrato; la tecnología de persistencia
/// es un colaborador externo intercambiable.
#[async_trait]
pub trait BookingRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>>;

    async fn insert(&self, booking: &Booking) -> AppResult<()>;

    /// Escritura condicional: solo persiste si la versión almacenada
    /// coincide con `expected_version`. `booking.version` ya viene
    /// incrementada por el llamador.
    async fn compare_and_save(&self, booking: &Booking, expected_version: i64) -> AppResult<()>;
}

// Fila tal como vive en PostgreSQL; tracking y cancelación van en JSONB
#[derive(Debug, sqlx::FromRow)]
struct BookingRow {
    id: Uuid,
    customer_id: String,
    customer_name: String,
    vehicle_id: Option<String>,
    driver_id: Option<String>,
    status: String,
    from_location: String,
    to_location: String,
    distance_km: f64,
    final_amount: f64,
    tracking_steps: sqlx::types::Json<Vec<TrackingStep>>,
    cancellation_request: Option<sqlx::types::Json<CancellationRequest>>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingRow {
    fn into_booking(self) -> Result<Booking, AppError> {
        let status = BookingStatus::parse(&self.status).ok_or_else(|| {
            AppError::Internal(format!("Estado desconocido en la base de datos: '{}'", self.status))
        })?;

        Ok(Booking {
            id: self.id,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            vehicle_id: self.vehicle_id,
            driver_id: self.driver_id,
            status,
            from_location: self.from_location,
            to_location: self.to_location,
            distance_km: self.distance_km,
            final_amount: self.final_amount,
            tracking_steps: self.tracking_steps.0,
            cancellation_request: self.cancellation_request.map(|json| json.0),
            version: self.version,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub struct PgBookingRepository {
    pool: PgPool,
}

impl PgBookingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PgBookingRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let row = sqlx::query_as::<_, BookingRow>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Error finding booking: {}", e)))?;

        row.map(BookingRow::into_booking).transpose()
    }

    async fn insert(&self, booking: &Booking) -> AppResult<()> {
        let tracking_steps = serde_json::to_value(&booking.tracking_steps)
            .map_err(|e| AppError::Internal(format!("Error serializing tracking steps: {}", e)))?;
        let cancellation = booking
            .cancellation_request
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| AppError::Internal(format!("Error serializing cancellation: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO bookings (
                id, customer_id, customer_name, vehicle_id, driver_id, status,
                from_location, to_location, distance_km, final_amount,
                tracking_steps, cancellation_request, version, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(booking.id)
        .bind(&booking.customer_id)
        .bind(&booking.customer_name)
        .bind(&booking.vehicle_id)
        .bind(&booking.driver_id)
        .bind(booking.status.as_str())
        .bind(&booking.from_location)
        .bind(&booking.to_location)
        .bind(booking.distance_km)
        .bind(booking.final_amount)
        .bind(tracking_steps)
        .bind(cancellation)
        .bind(booking.version)
        .bind(booking.created_at)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Error creating booking: {}", e)))?;

        Ok(())
    }

    async fn compare_and_save(&self, booking: &Booking, expected_version: i64) -> AppResult<()> {
        let tracking_steps = serde_json::to_value(&booking.tracking_steps)
            .map_err(|e| AppError::Internal(format!("Error serializing tracking steps: {}", e)))?;
        let cancellation = booking
            .cancellation_request
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| AppError::Internal(format!("Error serializing cancellation: {}", e)))?;

        // La cláusula WHERE sobre version hace la escritura condicional:
        // si otro escritor ganó, rows_affected es 0 y no se persiste nada
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET vehicle_id = $3, driver_id = $4, status = $5,
                tracking_steps = $6, cancellation_request = $7,
                version = $8, updated_at = $9
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(booking.id)
        .bind(expected_version)
        .bind(&booking.vehicle_id)
        .bind(&booking.driver_id)
        .bind(booking.status.as_str())
        .bind(tracking_steps)
        .bind(cancellation)
        .bind(booking.version)
        .bind(booking.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Error saving booking: {}", e)))?;

        if result.rows_affected() == 0 {
            // Distinguir conflicto de versión de reserva inexistente
            let current: Option<(i64,)> =
                sqlx::query_as("SELECT version FROM bookings WHERE id = $1")
                    .bind(booking.id)
                    .fetch_optional(&self.pool)
                    .await
                    .map_err(|e| AppError::Database(format!("Error re-reading booking: {}", e)))?;

            return match current {
                Some((actual,)) => Err(AppError::ConcurrentModification {
                    expected: expected_version,
                    actual,
                }),
                None => Err(not_found_error("Booking", &booking.id.to_string())),
            };
        }

        Ok(())
    }
}
