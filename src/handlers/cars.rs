use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::entities::car::{self, FuelType, Transmission};
use crate::error::{AppError, AppResult};
use crate::handlers::present;
use crate::services::availability::{booked_car_ids, confirmed_bookings, is_car_booked};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CarListQuery {
    pub brand: Option<String>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum PriceSort {
    #[serde(rename = "low-high")]
    LowToHigh,
    #[serde(rename = "high-low")]
    HighToLow,
}

/// Parsed listing filters. Blank query values mean "no filter".
#[derive(Debug, Default, PartialEq)]
pub struct CarFilter {
    pub brand: Option<String>,
    pub fuel_type: Option<FuelType>,
    pub transmission: Option<Transmission>,
    pub sort: Option<PriceSort>,
}

fn parse_choice<T: DeserializeOwned>(field: &str, value: Option<String>) -> AppResult<Option<T>> {
    present(value)
        .map(|v| {
            serde_json::from_value(serde_json::Value::String(v.clone()))
                .map_err(|_| AppError::Validation(format!("Invalid {}: {}", field, v)))
        })
        .transpose()
}

impl TryFrom<CarListQuery> for CarFilter {
    type Error = AppError;

    fn try_from(query: CarListQuery) -> AppResult<Self> {
        Ok(Self {
            brand: present(query.brand),
            fuel_type: parse_choice("fuel_type", query.fuel_type)?,
            transmission: parse_choice("transmission", query.transmission)?,
            sort: parse_choice("sort", query.sort)?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CarListing {
    #[serde(flatten)]
    pub car: car::Model,
    /// Rented out right now under a confirmed booking.
    pub booked: bool,
}

/// List cars with optional filters, flagging the ones currently rented out
pub async fn list_cars(
    State(state): State<AppState>,
    Query(query): Query<CarListQuery>,
) -> AppResult<Json<Vec<CarListing>>> {
    let filter = CarFilter::try_from(query)?;

    let mut select = car::Entity::find();
    if let Some(brand) = &filter.brand {
        select = select.filter(car::Column::Brand.eq(brand.as_str()));
    }
    if let Some(fuel_type) = filter.fuel_type {
        select = select.filter(car::Column::FuelType.eq(fuel_type));
    }
    if let Some(transmission) = filter.transmission {
        select = select.filter(car::Column::Transmission.eq(transmission));
    }
    select = match filter.sort {
        Some(PriceSort::LowToHigh) => select.order_by_asc(car::Column::PricePerDay),
        Some(PriceSort::HighToLow) => select.order_by_desc(car::Column::PricePerDay),
        None => select,
    }
    .order_by_asc(car::Column::Id);

    let cars = select.all(&state.db).await?;
    let bookings = confirmed_bookings(&state.db, None).await?;
    let booked = booked_car_ids(Utc::now(), &bookings);

    Ok(Json(
        cars.into_iter()
            .map(|c| CarListing {
                booked: booked.contains(&c.id),
                car: c,
            })
            .collect(),
    ))
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// RFC 3339 instant, e.g. `2024-01-03T12:00:00Z`.
    pub as_of: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub car_id: i32,
    pub booked: bool,
    pub as_of: DateTime<Utc>,
}

/// Whether one car is rented out at an instant (now unless `as_of` is given)
pub async fn car_availability(
    State(state): State<AppState>,
    Path(car_id): Path<i32>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    car::Entity::find_by_id(car_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Car not found".to_string()))?;

    let as_of = query.as_of.unwrap_or_else(Utc::now);
    let bookings = confirmed_bookings(&state.db, Some(car_id)).await?;

    Ok(Json(AvailabilityResponse {
        car_id,
        booked: is_car_booked(car_id, as_of, &bookings),
        as_of,
    }))
}
