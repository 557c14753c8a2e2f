use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entities::user::UserRole;
use crate::error::{AppError, AppResult};
use crate::handlers::{message, present};
use crate::services::account::{self, NewUser, UserInfo};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub fname: Option<String>,
    pub lname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserInfo,
}

/// Register a new customer account
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let (Some(fname), Some(lname), Some(email), Some(password)) = (
        present(payload.fname),
        present(payload.lname),
        present(payload.email),
        present(payload.password),
    ) else {
        return Err(AppError::Validation("All fields are required".to_string()));
    };

    account::register(
        &state.db,
        NewUser {
            fname,
            lname,
            email,
            password,
            role: UserRole::User,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(message("User registered successfully")),
    ))
}

/// Login with email and password
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let (Some(email), Some(password)) = (present(payload.email), present(payload.password)) else {
        return Err(AppError::Validation(
            "Email and password are required".to_string(),
        ));
    };

    let user = account::authenticate(&state.db, &email, &password).await?;

    Ok(Json(LoginResponse { user: user.into() }))
}
