use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::controllers::booking_controller::BookingController;
use crate::dto::booking_dto::{
    AcceptOrderRequest, ApiResponse, AssignDriverRequest, AvailableActionsResponse,
    BookingResponse, CompleteBookingRequest, ConfirmBookingRequest, CreateBookingRequest,
    RequestCancellationRequest, ReviewCancellationRequest, UpdateDeliveryStatusRequest,
};
use crate::models::{Actor, ActorRole};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_booking_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking))
        .route("/:id", get(get_booking))
        .route("/:id/actions", get(get_available_actions))
        .route("/:id/confirm", post(confirm_booking))
        .route("/:id/assign-driver", post(assign_driver))
        .route("/:id/accept", post(accept_order))
        .route("/:id/delivery-status", post(update_delivery_status))
        .route("/:id/complete", post(complete_booking))
        .route("/:id/cancellation/request", post(request_cancellation))
        .route("/:id/cancellation/review", post(review_cancellation))
}

fn controller(state: &AppState) -> BookingController {
    BookingController::new(state.repository.clone(), state.notifier.clone())
}

async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let response = controller(&state).create(request).await?;
    Ok(Json(response))
}

async fn get_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let response = controller(&state).get_by_id(id).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
struct ActionsQuery {
    actor_id: String,
    role: String,
}

async fn get_available_actions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ActionsQuery>,
) -> Result<Json<AvailableActionsResponse>, AppError> {
    let role = ActorRole::parse(&query.role)
        .ok_or_else(|| AppError::BadRequest(format!("Rol desconocido: '{}'", query.role)))?;
    let actor = Actor::new(query.actor_id, role);
    let response = controller(&state).available_actions(id, &actor).await?;
    Ok(Json(response))
}

async fn confirm_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ConfirmBookingRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let response = controller(&state).confirm_booking(id, &request.admin_id).await?;
    Ok(Json(response))
}

async fn assign_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AssignDriverRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let response = controller(&state)
        .assign_driver(id, &request.driver_id, &request.admin_id)
        .await?;
    Ok(Json(response))
}

async fn accept_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<AcceptOrderRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let response = controller(&state).accept_order(id, &request.admin_id).await?;
    Ok(Json(response))
}

async fn update_delivery_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateDeliveryStatusRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let response = controller(&state)
        .update_delivery_status(
            id,
            &request.driver_id,
            &request.step,
            request.location,
            request.notes,
        )
        .await?;
    Ok(Json(response))
}

async fn complete_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CompleteBookingRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let response = controller(&state)
        .complete_booking(id, &request.actor_id, &request.role)
        .await?;
    Ok(Json(response))
}

async fn request_cancellation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RequestCancellationRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let response = controller(&state)
        .request_cancellation(id, &request.customer_id, request.reason)
        .await?;
    Ok(Json(response))
}

async fn review_cancellation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ReviewCancellationRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let response = controller(&state)
        .review_cancellation(
            id,
            &request.reviewer_id,
            &request.role,
            &request.action,
            request.notes,
        )
        .await?;
    Ok(Json(response))
}
