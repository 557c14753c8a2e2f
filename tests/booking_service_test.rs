mod common;

use car_rental_backend::entities::booking::{self, BookingStatus};
use car_rental_backend::entities::car;
use car_rental_backend::services::availability::{confirmed_bookings, is_car_booked};
use car_rental_backend::services::booking::{
    confirm_booking, create_bookings, delete_booking, list_all_bookings, list_bookings_for_user,
    BookingRequest,
};
use car_rental_backend::utils::rental::rental_days;
use car_rental_backend::AppError;
use chrono::NaiveDate;
use sea_orm::{DatabaseConnection, EntityTrait};

use common::{at, date, seed_car, setup_db};

fn request(car_id: i32, pickup: NaiveDate, ret: NaiveDate, price: f64) -> BookingRequest {
    BookingRequest {
        car_id: Some(car_id),
        pickup_date: Some(pickup),
        return_date: Some(ret),
        price_per_day: Some(price),
    }
}

async fn booking_count(db: &DatabaseConnection) -> usize {
    booking::Entity::find().all(db).await.unwrap().len()
}

#[tokio::test]
async fn two_day_rental_costs_two_days() {
    let db = setup_db().await;
    let car = seed_car(&db, "Corolla", 1000.0).await;

    let created = create_bookings(
        &db,
        "asha@example.com",
        &[request(car.id, date(2024, 1, 1), date(2024, 1, 3), 1000.0)],
    )
    .await
    .unwrap();

    assert_eq!(created.len(), 1);
    assert_eq!(created[0].total, 2000.0);
    assert_eq!(created[0].status, BookingStatus::Pending);
    assert_eq!(created[0].user_email, "asha@example.com");

    let listed = list_bookings_for_user(&db, "asha@example.com").await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].duration, 2);
    assert_eq!(listed[0].car_name, "Corolla");
    assert_eq!(listed[0].price_per_day, 1000.0);
}

#[tokio::test]
async fn every_total_is_days_times_client_price() {
    let db = setup_db().await;
    let car = seed_car(&db, "Civic", 1200.0).await;

    // The client price is used as sent, even when it differs from the car's
    let requests = [
        request(car.id, date(2024, 3, 1), date(2024, 3, 2), 1200.0),
        request(car.id, date(2024, 3, 10), date(2024, 3, 17), 999.5),
        request(car.id, date(2024, 2, 27), date(2024, 3, 1), 50.0),
    ];

    let created = create_bookings(&db, "asha@example.com", &requests)
        .await
        .unwrap();

    for (b, r) in created.iter().zip(requests.iter()) {
        let days = rental_days(b.pickup_date, b.return_date);
        assert_eq!(b.total, days as f64 * r.price_per_day.unwrap());
    }
}

#[tokio::test]
async fn failure_on_last_item_commits_nothing() {
    let db = setup_db().await;
    let car = seed_car(&db, "Swift", 800.0).await;

    let requests = [
        request(car.id, date(2024, 4, 1), date(2024, 4, 2), 800.0),
        request(car.id, date(2024, 4, 5), date(2024, 4, 6), 800.0),
        BookingRequest {
            price_per_day: None,
            ..request(car.id, date(2024, 4, 9), date(2024, 4, 10), 800.0)
        },
    ];

    let err = create_bookings(&db, "asha@example.com", &requests)
        .await
        .unwrap_err();

    match err {
        AppError::Transaction { message, cause } => {
            assert_eq!(message, "Failed to create bookings");
            assert!(cause.contains("Missing required booking fields"));
        }
        other => panic!("expected transaction error, got {:?}", other),
    }
    assert_eq!(booking_count(&db).await, 0);
}

#[tokio::test]
async fn empty_or_ownerless_requests_are_rejected_up_front() {
    let db = setup_db().await;
    let car = seed_car(&db, "Swift", 800.0).await;

    assert!(matches!(
        create_bookings(&db, "asha@example.com", &[]).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        create_bookings(
            &db,
            "  ",
            &[request(car.id, date(2024, 4, 1), date(2024, 4, 2), 800.0)]
        )
        .await,
        Err(AppError::Validation(_))
    ));
    assert_eq!(booking_count(&db).await, 0);
}

#[tokio::test]
async fn confirm_moves_pending_to_confirmed() {
    let db = setup_db().await;
    let car = seed_car(&db, "Nexon", 1500.0).await;
    let created = create_bookings(
        &db,
        "asha@example.com",
        &[request(car.id, date(2024, 5, 1), date(2024, 5, 4), 1500.0)],
    )
    .await
    .unwrap();
    let id = created[0].id;

    let confirmed = confirm_booking(&db, id).await.unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    // Confirming again is accepted and changes nothing
    let again = confirm_booking(&db, id).await.unwrap();
    assert_eq!(again.status, BookingStatus::Confirmed);
    assert_eq!(again.total, 4500.0);

    assert!(matches!(
        confirm_booking(&db, id + 100).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn deleting_missing_booking_is_not_found() {
    let db = setup_db().await;
    let car = seed_car(&db, "Nexon", 1500.0).await;
    let created = create_bookings(
        &db,
        "asha@example.com",
        &[request(car.id, date(2024, 5, 1), date(2024, 5, 4), 1500.0)],
    )
    .await
    .unwrap();
    let id = created[0].id;

    // Confirmed bookings can still be cancelled
    confirm_booking(&db, id).await.unwrap();
    delete_booking(&db, id).await.unwrap();

    assert!(matches!(
        delete_booking(&db, id).await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(booking_count(&db).await, 0);
}

#[tokio::test]
async fn user_bookings_are_newest_pickup_first_and_skip_deleted_cars() {
    let db = setup_db().await;
    let kept = seed_car(&db, "Creta", 2000.0).await;
    let removed = seed_car(&db, "Alto", 600.0).await;

    create_bookings(
        &db,
        "asha@example.com",
        &[
            request(kept.id, date(2024, 1, 10), date(2024, 1, 12), 2000.0),
            request(kept.id, date(2024, 6, 1), date(2024, 6, 2), 2000.0),
            request(removed.id, date(2024, 3, 1), date(2024, 3, 2), 600.0),
        ],
    )
    .await
    .unwrap();
    create_bookings(
        &db,
        "other@example.com",
        &[request(kept.id, date(2024, 2, 1), date(2024, 2, 2), 2000.0)],
    )
    .await
    .unwrap();

    let listed = list_bookings_for_user(&db, "asha@example.com").await.unwrap();
    let pickups: Vec<NaiveDate> = listed.iter().map(|b| b.pickup_date).collect();
    assert_eq!(
        pickups,
        vec![date(2024, 6, 1), date(2024, 3, 1), date(2024, 1, 10)]
    );

    // Deleting a car leaves its bookings in place but drops them from joined views
    car::Entity::delete_by_id(removed.id).exec(&db).await.unwrap();
    let listed = list_bookings_for_user(&db, "asha@example.com").await.unwrap();
    assert_eq!(listed.len(), 2);
    assert!(listed.iter().all(|b| b.car_id == kept.id));
    assert_eq!(booking_count(&db).await, 4);

    let all = list_all_bookings(&db).await.unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].pickup_date, date(2024, 6, 1));
}

#[tokio::test]
async fn only_confirmed_bookings_block_a_car() {
    let db = setup_db().await;
    let car = seed_car(&db, "Thar", 3000.0).await;
    let created = create_bookings(
        &db,
        "asha@example.com",
        &[request(car.id, date(2024, 7, 1), date(2024, 7, 5), 3000.0)],
    )
    .await
    .unwrap();

    let confirmed = confirmed_bookings(&db, Some(car.id)).await.unwrap();
    assert!(!is_car_booked(car.id, at(2024, 7, 3, 10), &confirmed));

    confirm_booking(&db, created[0].id).await.unwrap();

    let confirmed = confirmed_bookings(&db, Some(car.id)).await.unwrap();
    assert!(is_car_booked(car.id, at(2024, 7, 1, 0), &confirmed));
    assert!(is_car_booked(car.id, at(2024, 7, 4, 18), &confirmed));
    assert!(is_car_booked(car.id, at(2024, 7, 5, 0), &confirmed));
    assert!(!is_car_booked(car.id, at(2024, 7, 5, 9), &confirmed));
}

// Overlapping checkouts for one car are not prevented. If this starts failing,
// booking creation has begun checking availability and callers need to know.
#[tokio::test]
async fn concurrent_overlapping_bookings_both_succeed() {
    let db = setup_db().await;
    let car = seed_car(&db, "Innova", 2500.0).await;

    let first = [request(car.id, date(2024, 8, 1), date(2024, 8, 5), 2500.0)];
    let second = [request(car.id, date(2024, 8, 3), date(2024, 8, 7), 2500.0)];

    let (a, b) = tokio::join!(
        create_bookings(&db, "asha@example.com", &first),
        create_bookings(&db, "ravi@example.com", &second),
    );

    assert!(a.is_ok());
    assert!(b.is_ok());

    let all = booking::Entity::find().all(&db).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|b| b.car_id == car.id));
}
