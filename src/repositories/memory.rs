//! Repositorio en memoria
//!
//! Implementación de `BookingRepository` sobre un HashMap compartido.
//! Se usa en tests de integración y en desarrollo local sin PostgreSQL;
//! reproduce la misma semántica compare-and-set que la implementación SQL.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Booking;
use crate::utils::errors::{not_found_error, AppError, AppResult};

use super::booking_repository::BookingRepository;

#[derive(Clone, Default)]
pub struct InMemoryBookingRepository {
    bookings: Arc<RwLock<HashMap<Uuid, Booking>>>,
}

impl InMemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookingRepository for InMemoryBookingRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Booking>> {
        let bookings = self.bookings.read().await;
        Ok(bookings.get(&id).cloned())
    }

    async fn insert(&self, booking: &Booking) -> AppResult<()> {
        let mut bookings = self.bookings.write().await;
        if bookings.contains_key(&booking.id) {
            return Err(AppError::BadRequest(format!(
                "Booking with id '{}' already exists",
                booking.id
            )));
        }
        bookings.insert(booking.id, booking.clone());
        Ok(())
    }

    async fn compare_and_save(&self, booking: &Booking, expected_version: i64) -> AppResult<()> {
        // El write lock hace atómica la comparación y la escritura
        let mut bookings = self.bookings.write().await;
        match bookings.get(&booking.id) {
            None => Err(not_found_error("Booking", &booking.id.to_string())),
            Some(stored) if stored.version != expected_version => {
                Err(AppError::ConcurrentModification {
                    expected: expected_version,
                    actual: stored.version,
                })
            }
            Some(_) => {
                bookings.insert(booking.id, booking.clone());
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookingStatus;

    fn sample_booking() -> Booking {
        Booking::new(
            "C1".to_string(),
            "Cliente Test".to_string(),
            "Origen".to_string(),
            "Destino".to_string(),
            12.0,
            80.0,
        )
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = InMemoryBookingRepository::new();
        let booking = sample_booking();
        repo.insert(&booking).await.unwrap();

        let found = repo.find_by_id(booking.id).await.unwrap().unwrap();
        assert_eq!(found.id, booking.id);
        assert_eq!(found.status, BookingStatus::Pending);
    }

    #[tokio::test]
    async fn test_compare_and_save_detects_stale_version() {
        let repo = InMemoryBookingRepository::new();
        let booking = sample_booking();
        repo.insert(&booking).await.unwrap();

        // Primer escritor gana
        let mut first = booking.clone();
        first.version = 2;
        repo.compare_and_save(&first, 1).await.unwrap();

        // Segundo escritor con versión vieja pierde
        let mut second = booking.clone();
        second.version = 2;
        let err = repo.compare_and_save(&second, 1).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::ConcurrentModification { expected: 1, actual: 2 }
        ));
    }

    #[tokio::test]
    async fn test_compare_and_save_unknown_id() {
        let repo = InMemoryBookingRepository::new();
        let booking = sample_booking();
        let err = repo.compare_and_save(&booking, 1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
