use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::handlers::message;
use crate::services::cart::{self, CartEntry};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub user_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CartLine {
    pub car_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ReplaceCartRequest {
    pub user_id: Option<i32>,
    pub cart: Option<Vec<CartLine>>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveItemRequest {
    pub user_id: Option<i32>,
    pub car_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ClearCartRequest {
    pub user_id: Option<i32>,
}

/// List the cars in a user's cart
pub async fn get_cart(
    State(state): State<AppState>,
    Query(query): Query<CartQuery>,
) -> AppResult<Json<Vec<CartEntry>>> {
    let user_id = query
        .user_id
        .ok_or_else(|| AppError::Validation("User ID is required".to_string()))?;

    Ok(Json(cart::get_cart(&state.db, user_id).await?))
}

/// Replace a user's cart with the given cars
pub async fn replace_cart(
    State(state): State<AppState>,
    Json(payload): Json<ReplaceCartRequest>,
) -> AppResult<Json<Value>> {
    let invalid = || AppError::Validation("Invalid request data".to_string());

    let user_id = payload.user_id.ok_or_else(invalid)?;
    let car_ids = payload
        .cart
        .ok_or_else(invalid)?
        .into_iter()
        .map(|line| line.car_id.ok_or_else(invalid))
        .collect::<AppResult<Vec<i32>>>()?;

    cart::replace_cart(&state.db, user_id, &car_ids).await?;

    Ok(Json(message("Cart updated successfully")))
}

/// Remove one car from a user's cart
pub async fn remove_item(
    State(state): State<AppState>,
    Json(payload): Json<RemoveItemRequest>,
) -> AppResult<Json<Value>> {
    let (Some(user_id), Some(car_id)) = (payload.user_id, payload.car_id) else {
        return Err(AppError::Validation(
            "User ID and Car ID are required".to_string(),
        ));
    };

    cart::remove_item(&state.db, user_id, car_id).await?;

    Ok(Json(message("Item removed from cart successfully")))
}

/// Empty a user's cart
pub async fn clear_cart(
    State(state): State<AppState>,
    Json(payload): Json<ClearCartRequest>,
) -> AppResult<Json<Value>> {
    let user_id = payload
        .user_id
        .ok_or_else(|| AppError::Validation("User ID is required".to_string()))?;

    let removed = cart::clear_cart(&state.db, user_id).await?;

    Ok(Json(json!({ "message": "Cart cleared", "removed": removed })))
}
