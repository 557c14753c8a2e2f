#![allow(dead_code)]

use std::path::{Path, PathBuf};

use car_rental_backend::{
    config::Config,
    db,
    entities::car::{self, FuelType, Transmission},
    entities::user::{self, UserRole},
    services::account::{self, NewUser},
    AppState,
};
use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;

pub fn test_config(gallery_dir: &Path) -> Config {
    Config {
        // One connection keeps every query on the same in-memory database
        database_url: "sqlite::memory:".to_string(),
        db_max_connections: 1,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        gallery_dir: PathBuf::from(gallery_dir),
        admin_email: None,
        admin_password: None,
        rate_limit_period_ms: 60,
        rate_limit_burst: 100,
    }
}

pub async fn setup_db() -> DatabaseConnection {
    let config = test_config(&std::env::temp_dir());
    let db = db::connect(&config).await.expect("connect to sqlite");
    migration::Migrator::up(&db, None)
        .await
        .expect("run migrations");
    db
}

pub async fn test_state(gallery_dir: &Path) -> AppState {
    AppState {
        db: setup_db().await,
        config: test_config(gallery_dir),
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub fn at(y: i32, m: u32, d: u32, hour: u32) -> DateTime<Utc> {
    date(y, m, d)
        .and_hms_opt(hour, 0, 0)
        .expect("valid time")
        .and_utc()
}

pub async fn seed_user(db: &DatabaseConnection, email: &str) -> user::Model {
    account::register(
        db,
        NewUser {
            fname: "Asha".to_string(),
            lname: "Rao".to_string(),
            email: email.to_string(),
            password: "secret".to_string(),
            role: UserRole::User,
        },
    )
    .await
    .expect("register user")
}

pub async fn seed_car_with(
    db: &DatabaseConnection,
    name: &str,
    brand: &str,
    fuel_type: FuelType,
    price_per_day: f64,
) -> car::Model {
    car::ActiveModel {
        name: Set(name.to_string()),
        brand: Set(brand.to_string()),
        model_year: Set(2022),
        transmission: Set(Transmission::Automatic),
        fuel_type: Set(fuel_type),
        price_per_day: Set(price_per_day),
        image_url: Set(format!("/gallery/{}.jpg", name.to_lowercase())),
        available: Set(true),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("insert car")
}

pub async fn seed_car(db: &DatabaseConnection, name: &str, price_per_day: f64) -> car::Model {
    seed_car_with(db, name, "Toyota", FuelType::Petrol, price_per_day).await
}
