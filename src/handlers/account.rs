use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::handlers::{message, present};
use crate::services::account::{self, ProfileUpdate};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub new_fname: Option<String>,
    pub new_lname: Option<String>,
    pub new_email: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteAccountRequest {
    pub email: Option<String>,
}

/// Update profile fields; blank fields are left as they are
pub async fn update_profile(
    State(state): State<AppState>,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<Value>> {
    let email = present(payload.email)
        .ok_or_else(|| AppError::Validation("Current email is required".to_string()))?;

    account::update_profile(
        &state.db,
        &email,
        ProfileUpdate {
            fname: payload.new_fname,
            lname: payload.new_lname,
            email: payload.new_email,
            password: payload.new_password,
        },
    )
    .await?;

    Ok(Json(message("Profile updated successfully")))
}

/// Delete the caller's account together with their bookings and cart
pub async fn delete_account(
    State(state): State<AppState>,
    Json(payload): Json<DeleteAccountRequest>,
) -> AppResult<Json<Value>> {
    let email = present(payload.email)
        .ok_or_else(|| AppError::Validation("Email is required".to_string()))?;

    account::delete_account(&state.db, &email).await?;

    Ok(Json(message("Account deleted successfully")))
}
