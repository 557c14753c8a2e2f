use axum::{
    body::Bytes,
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    Json,
};
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::entities::car::{self, FuelType, Transmission};
use crate::error::{AppError, AppResult};
use crate::handlers::{message, present};
use crate::services::account::{self, UserInfo};
use crate::services::booking::{self as booking_service, BookingInfo};
use crate::utils::upload::{gallery_url, store_image, validate_image};
use crate::AppState;

// ============ Car Management ============

/// List all cars (admin)
pub async fn list_cars(State(state): State<AppState>) -> AppResult<Json<Vec<car::Model>>> {
    let cars = car::Entity::find()
        .order_by_asc(car::Column::Id)
        .all(&state.db)
        .await?;

    Ok(Json(cars))
}

struct UploadedImage {
    file_name: Option<String>,
    contents: Bytes,
}

/// Text fields and image collected from the multipart form
#[derive(Default)]
struct CarForm {
    name: Option<String>,
    brand: Option<String>,
    model_year: Option<String>,
    transmission: Option<String>,
    fuel_type: Option<String>,
    price_per_day: Option<String>,
    available: Option<String>,
    image: Option<UploadedImage>,
}

fn upload_error(e: MultipartError) -> AppError {
    AppError::Upload(format!("File upload error: {}", e.body_text()))
}

fn invalid(field: &str) -> AppError {
    AppError::Validation(format!("Invalid {}", field))
}

fn parse_enum<T: serde::de::DeserializeOwned>(field: &str, value: String) -> AppResult<T> {
    serde_json::from_value(Value::String(value)).map_err(|_| invalid(field))
}

fn parse_available(value: Option<String>) -> AppResult<bool> {
    match present(value).as_deref().map(str::trim) {
        None | Some("1") | Some("true") => Ok(true),
        Some("0") | Some("false") => Ok(false),
        Some(_) => Err(invalid("available")),
    }
}

impl CarForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = CarForm::default();

        while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
            let name = field.name().unwrap_or_default().to_string();

            if name == "image" {
                let content_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let contents = field.bytes().await.map_err(upload_error)?;
                validate_image(content_type.as_deref(), contents.len())?;
                form.image = Some(UploadedImage {
                    file_name,
                    contents,
                });
                continue;
            }

            let value = Some(field.text().await.map_err(upload_error)?);
            match name.as_str() {
                "name" => form.name = value,
                "brand" => form.brand = value,
                "model_year" => form.model_year = value,
                "transmission" => form.transmission = value,
                "fuel_type" => form.fuel_type = value,
                "price_per_day" => form.price_per_day = value,
                "available" => form.available = value,
                _ => {}
            }
        }

        Ok(form)
    }

    /// Validate the text fields into an unsaved car; `image_url` is filled in
    /// once the image is stored.
    fn into_parts(self) -> AppResult<(car::ActiveModel, UploadedImage)> {
        let (
            Some(name),
            Some(brand),
            Some(model_year),
            Some(transmission),
            Some(fuel_type),
            Some(price_per_day),
        ) = (
            present(self.name),
            present(self.brand),
            present(self.model_year),
            present(self.transmission),
            present(self.fuel_type),
            present(self.price_per_day),
        )
        else {
            return Err(AppError::Validation(
                "Missing required fields: name, brand, model_year, transmission, fuel_type, price_per_day"
                    .to_string(),
            ));
        };

        let model_year: i32 = model_year.trim().parse().map_err(|_| invalid("model_year"))?;
        let transmission: Transmission = parse_enum("transmission", transmission)?;
        let fuel_type: FuelType = parse_enum("fuel_type", fuel_type)?;
        let price_per_day: f64 = price_per_day
            .trim()
            .parse()
            .map_err(|_| invalid("price_per_day"))?;
        if price_per_day <= 0.0 {
            return Err(AppError::Validation(
                "price_per_day must be positive".to_string(),
            ));
        }
        let available = parse_available(self.available)?;

        let image = self
            .image
            .ok_or_else(|| AppError::Validation("Image file is required".to_string()))?;

        let new_car = car::ActiveModel {
            name: Set(name),
            brand: Set(brand),
            model_year: Set(model_year),
            transmission: Set(transmission),
            fuel_type: Set(fuel_type),
            price_per_day: Set(price_per_day),
            available: Set(available),
            ..Default::default()
        };

        Ok((new_car, image))
    }
}

/// Add a car from a multipart form with an `image` file (admin)
pub async fn create_car(
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<Value>)> {
    let (mut new_car, image) = CarForm::read(multipart).await?.into_parts()?;

    let (filename, path) = store_image(
        &state.config.gallery_dir,
        image.file_name.as_deref(),
        &image.contents,
    )
    .await?;

    new_car.image_url = Set(gallery_url(&filename));

    let created = match new_car.insert(&state.db).await {
        Ok(created) => created,
        Err(e) => {
            // The car was not saved, so the image has nothing pointing at it
            if let Err(cleanup_err) = tokio::fs::remove_file(&path).await {
                tracing::warn!(path = %path.display(), error = %cleanup_err, "Failed to remove orphaned image");
            }
            return Err(e.into());
        }
    };

    tracing::info!(car_id = created.id, image = %created.image_url, "Car added");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Car added successfully", "carId": created.id })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCarRequest {
    pub name: Option<String>,
    pub price_per_day: Option<f64>,
}

/// Rename and reprice a car (admin)
pub async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCarRequest>,
) -> AppResult<Json<Value>> {
    let (Some(name), Some(price_per_day)) = (present(payload.name), payload.price_per_day) else {
        return Err(AppError::Validation(
            "Name and price are required".to_string(),
        ));
    };

    if price_per_day <= 0.0 {
        return Err(AppError::Validation(
            "price_per_day must be positive".to_string(),
        ));
    }

    let existing = car::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;

    let mut active: car::ActiveModel = existing.into();
    active.name = Set(name);
    active.price_per_day = Set(price_per_day);
    active.update(&state.db).await?;

    Ok(Json(message("Car updated successfully")))
}

/// Delete a car (admin). Bookings and cart rows naming it are left alone.
pub async fn delete_car(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Value>> {
    let result = car::Entity::delete_by_id(id).exec(&state.db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Car not found".to_string()));
    }

    tracing::info!(car_id = id, "Car deleted");
    Ok(Json(message("Car deleted successfully")))
}

// ============ User Management ============

/// List all users (admin)
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserInfo>>> {
    Ok(Json(account::list_users(&state.db).await?))
}

/// Delete any user account along with their bookings and cart (admin)
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Value>> {
    account::delete_user(&state.db, id).await?;

    Ok(Json(message("User deleted successfully")))
}

// ============ Bookings Management ============

/// List all bookings (admin)
pub async fn list_bookings(State(state): State<AppState>) -> AppResult<Json<Vec<BookingInfo>>> {
    Ok(Json(booking_service::list_all_bookings(&state.db).await?))
}

/// Confirm a pending booking (admin)
pub async fn confirm_booking(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Value>> {
    booking_service::confirm_booking(&state.db, id).await?;

    Ok(Json(message("Booking confirmed successfully")))
}

/// Delete any booking (admin)
pub async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<Value>> {
    booking_service::delete_booking(&state.db, id).await?;

    Ok(Json(message("Booking deleted successfully")))
}
