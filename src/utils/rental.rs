use chrono::NaiveDate;

/// Number of billable days between pickup and return.
///
/// Return dates on or before the pickup date are not rejected and yield zero
/// or a negative count.
pub fn rental_days(pickup_date: NaiveDate, return_date: NaiveDate) -> i64 {
    (return_date - pickup_date).num_days()
}

/// Total charged for a rental: billable days times the daily price.
pub fn rental_total(pickup_date: NaiveDate, return_date: NaiveDate, price_per_day: f64) -> f64 {
    rental_days(pickup_date, return_date) as f64 * price_per_day
}
