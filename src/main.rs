use std::net::SocketAddr;

use axum::middleware;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use sea_orm_migration::MigratorTrait;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use car_rental_backend::{
    config::Config,
    db,
    entities::user::{self, UserRole},
    middleware::rate_limit::{create_global_governor, log_request},
    routes, AppState,
};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "car_rental_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!("Starting server at {}", config.server_addr());

    // Connect to database
    let db = db::connect(&config)
        .await
        .expect("Failed to connect to database");
    tracing::info!(
        max_connections = config.db_max_connections,
        "Connected to database"
    );

    // Run migrations
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    tracing::info!("Migrations complete");

    tokio::fs::create_dir_all(&config.gallery_dir)
        .await
        .expect("Failed to create gallery directory");

    if let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) {
        seed_admin(&db, email, password).await;
    }

    let governor = create_global_governor(config.rate_limit_period_ms, config.rate_limit_burst)
        .expect("Invalid rate limit configuration");

    let state = AppState {
        db,
        config: config.clone(),
    };

    // Create router with middleware
    let app = routes::create_router(state)
        .layer(middleware::from_fn(log_request))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(governor);

    // Start server with socket address for rate limiting
    let addr: SocketAddr = config.server_addr().parse().expect("Invalid address");
    let listener = TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}

/// Seed the admin account if it doesn't exist
async fn seed_admin(db: &DatabaseConnection, email: &str, password: &str) {
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
        .expect("Failed to check for admin");

    if existing.is_none() {
        let admin = user::ActiveModel {
            fname: Set("Admin".to_string()),
            lname: Set("Account".to_string()),
            email: Set(email.to_string()),
            password: Set(password.to_string()),
            role: Set(UserRole::Admin),
            created_at: Set(chrono::Utc::now().into()),
            ..Default::default()
        };

        admin.insert(db).await.expect("Failed to create admin");
        tracing::info!("Admin account created: {}", email);
    }
}
