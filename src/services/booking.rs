use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use crate::entities::booking::{self, BookingStatus};
use crate::entities::car;
use crate::error::{AppError, AppResult};
use crate::utils::rental::{rental_days, rental_total};

/// One line of a checkout as sent by the client. `price_per_day` is taken as
/// given and not re-read from the car.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingRequest {
    pub car_id: Option<i32>,
    pub pickup_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub price_per_day: Option<f64>,
}

struct ValidBookingRequest {
    car_id: i32,
    pickup_date: NaiveDate,
    return_date: NaiveDate,
    price_per_day: f64,
}

impl BookingRequest {
    fn validate(&self) -> AppResult<ValidBookingRequest> {
        match (
            self.car_id,
            self.pickup_date,
            self.return_date,
            self.price_per_day.filter(|p| *p > 0.0),
        ) {
            (Some(car_id), Some(pickup_date), Some(return_date), Some(price_per_day)) => {
                Ok(ValidBookingRequest {
                    car_id,
                    pickup_date,
                    return_date,
                    price_per_day,
                })
            }
            _ => Err(AppError::Validation(
                "Missing required booking fields".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UserBooking {
    pub booking_id: i32,
    pub car_id: i32,
    pub car_name: String,
    pub price_per_day: f64,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub status: BookingStatus,
    pub total: f64,
    pub duration: i64,
}

#[derive(Debug, Serialize)]
pub struct BookingInfo {
    pub id: i32,
    pub user_email: String,
    pub car_id: i32,
    pub car_name: String,
    pub pickup_date: NaiveDate,
    pub return_date: NaiveDate,
    pub status: BookingStatus,
    pub total: f64,
}

/// Create one pending booking per request, all or nothing.
///
/// Items are validated in order inside the transaction; the first failure
/// rolls back every insert made so far. Car availability is not re-checked.
pub async fn create_bookings(
    db: &DatabaseConnection,
    user_email: &str,
    requests: &[BookingRequest],
) -> AppResult<Vec<booking::Model>> {
    if user_email.trim().is_empty() || requests.is_empty() {
        return Err(AppError::Validation("Invalid request data".to_string()));
    }

    let txn = db.begin().await?;

    match insert_bookings(&txn, user_email, requests).await {
        Ok(created) => {
            txn.commit()
                .await
                .map_err(|e| AppError::transaction("Failed to create bookings", e))?;
            tracing::info!(user_email, count = created.len(), "Bookings created");
            Ok(created)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!(error = %rollback_err, "Rollback failed");
            }
            tracing::warn!(user_email, error = %e, "Booking request rolled back");
            Err(AppError::transaction("Failed to create bookings", e))
        }
    }
}

async fn insert_bookings(
    txn: &DatabaseTransaction,
    user_email: &str,
    requests: &[BookingRequest],
) -> AppResult<Vec<booking::Model>> {
    let mut created = Vec::with_capacity(requests.len());

    for request in requests {
        let item = request.validate()?;
        let total = rental_total(item.pickup_date, item.return_date, item.price_per_day);

        let new_booking = booking::ActiveModel {
            user_email: Set(user_email.to_string()),
            car_id: Set(item.car_id),
            pickup_date: Set(item.pickup_date),
            return_date: Set(item.return_date),
            status: Set(BookingStatus::Pending),
            total: Set(total),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        created.push(new_booking.insert(txn).await?);
    }

    Ok(created)
}

/// Mark a booking confirmed. Confirming twice is a harmless repeat update.
pub async fn confirm_booking(db: &DatabaseConnection, id: i32) -> AppResult<booking::Model> {
    let existing = booking::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    let mut active: booking::ActiveModel = existing.into();
    active.status = Set(BookingStatus::Confirmed);
    let updated = active.update(db).await?;

    tracing::info!(booking_id = id, "Booking confirmed");
    Ok(updated)
}

/// Delete a booking whatever its status.
pub async fn delete_booking(db: &DatabaseConnection, id: i32) -> AppResult<()> {
    let result = booking::Entity::delete_by_id(id).exec(db).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound("Booking not found".to_string()));
    }

    tracing::info!(booking_id = id, "Booking deleted");
    Ok(())
}

/// Bookings owned by `email`, newest pickup first. Bookings whose car has
/// been deleted are left out.
pub async fn list_bookings_for_user(
    db: &DatabaseConnection,
    email: &str,
) -> AppResult<Vec<UserBooking>> {
    let rows = booking::Entity::find()
        .filter(booking::Column::UserEmail.eq(email))
        .find_also_related(car::Entity)
        .order_by_desc(booking::Column::PickupDate)
        .order_by_desc(booking::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(b, c)| {
            let c = c?;
            Some(UserBooking {
                booking_id: b.id,
                car_id: b.car_id,
                car_name: c.name,
                price_per_day: c.price_per_day,
                duration: rental_days(b.pickup_date, b.return_date),
                pickup_date: b.pickup_date,
                return_date: b.return_date,
                status: b.status,
                total: b.total,
            })
        })
        .collect())
}

/// Every booking with its car name, newest pickup first.
pub async fn list_all_bookings(db: &DatabaseConnection) -> AppResult<Vec<BookingInfo>> {
    let rows = booking::Entity::find()
        .find_also_related(car::Entity)
        .order_by_desc(booking::Column::PickupDate)
        .order_by_desc(booking::Column::Id)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(b, c)| {
            let c = c?;
            Some(BookingInfo {
                id: b.id,
                user_email: b.user_email,
                car_id: b.car_id,
                car_name: c.name,
                pickup_date: b.pickup_date,
                return_date: b.return_date,
                status: b.status,
                total: b.total,
            })
        })
        .collect())
}
