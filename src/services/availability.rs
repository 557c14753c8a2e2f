//! Whether a car is rented out at a given instant.
//!
//! Only confirmed bookings reserve a car; pending ones never block it. A
//! booking spans from midnight UTC of its pickup date to midnight UTC of its
//! return date, both ends included. Results are computed from the bookings
//! passed in and never cached.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entities::booking::{self, BookingStatus};
use crate::error::AppResult;

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn blocks(booking: &booking::Model, as_of: DateTime<Utc>) -> bool {
    booking.status == BookingStatus::Confirmed
        && midnight(booking.pickup_date) <= as_of
        && as_of <= midnight(booking.return_date)
}

/// True iff a confirmed booking for `car_id` covers `as_of`.
pub fn is_car_booked(car_id: i32, as_of: DateTime<Utc>, bookings: &[booking::Model]) -> bool {
    bookings
        .iter()
        .any(|b| b.car_id == car_id && blocks(b, as_of))
}

/// Every car id that [`is_car_booked`] would report as booked on `as_of`.
pub fn booked_car_ids(as_of: DateTime<Utc>, bookings: &[booking::Model]) -> HashSet<i32> {
    bookings
        .iter()
        .filter(|b| blocks(b, as_of))
        .map(|b| b.car_id)
        .collect()
}

/// Confirmed bookings, optionally narrowed to one car.
pub async fn confirmed_bookings(
    db: &DatabaseConnection,
    car_id: Option<i32>,
) -> AppResult<Vec<booking::Model>> {
    let mut query =
        booking::Entity::find().filter(booking::Column::Status.eq(BookingStatus::Confirmed));
    if let Some(car_id) = car_id {
        query = query.filter(booking::Column::CarId.eq(car_id));
    }

    Ok(query.all(db).await?)
}
