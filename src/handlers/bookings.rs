use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::booking;
use crate::error::{AppError, AppResult};
use crate::handlers::{message, present};
use crate::services::booking::{self as booking_service, BookingRequest, UserBooking};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateBookingsRequest {
    pub user_email: Option<String>,
    pub bookings: Option<Vec<BookingRequest>>,
}

#[derive(Debug, Serialize)]
pub struct CreateBookingsResponse {
    pub message: String,
    pub bookings: Vec<booking::Model>,
}

#[derive(Debug, Deserialize)]
pub struct UserBookingsQuery {
    pub email: Option<String>,
}

/// Check out: create one pending booking per cart line, all or nothing
pub async fn create_bookings(
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingsRequest>,
) -> AppResult<(StatusCode, Json<CreateBookingsResponse>)> {
    let (Some(user_email), Some(requests)) = (present(payload.user_email), payload.bookings) else {
        return Err(AppError::Validation("Invalid request data".to_string()));
    };

    let bookings = booking_service::create_bookings(&state.db, &user_email, &requests).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateBookingsResponse {
            message: "Bookings created successfully".to_string(),
            bookings,
        }),
    ))
}

/// List a user's bookings, newest pickup first
pub async fn my_bookings(
    State(state): State<AppState>,
    Query(query): Query<UserBookingsQuery>,
) -> AppResult<Json<Vec<UserBooking>>> {
    let email = present(query.email)
        .ok_or_else(|| AppError::Validation("Email is required".to_string()))?;

    Ok(Json(
        booking_service::list_bookings_for_user(&state.db, &email).await?,
    ))
}

/// Cancel a booking, whatever its status
pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<i32>,
) -> AppResult<Json<Value>> {
    booking_service::delete_booking(&state.db, booking_id).await?;

    Ok(Json(message("Booking cancelled successfully")))
}
