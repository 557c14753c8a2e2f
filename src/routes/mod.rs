use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::services::ServeDir;

use crate::handlers::{account, admin, auth, bookings, cars, cart};
use crate::utils::upload::{GALLERY_ROUTE, MAX_IMAGE_BYTES};
use crate::AppState;

/// Room for the multipart envelope and text fields around the image.
const CAR_FORM_OVERHEAD_BYTES: usize = 64 * 1024;

pub fn create_router(state: AppState) -> Router {
    // Public storefront routes
    let public_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/cars", get(cars::list_cars))
        .route("/cars/{id}/availability", get(cars::car_availability))
        .route("/users", get(admin::list_users));

    // Account and booking routes keyed by the caller's email
    let user_routes = Router::new()
        .route("/bookings", get(bookings::my_bookings))
        .route("/bookings/{id}", delete(bookings::cancel_booking))
        .route("/update", put(account::update_profile))
        .route("/delete", delete(account::delete_account));

    // Admin routes. There is no authentication layer in front of these.
    let admin_routes = Router::new()
        // Car management
        .route("/cars", get(admin::list_cars))
        .route(
            "/cars",
            post(admin::create_car)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + CAR_FORM_OVERHEAD_BYTES)),
        )
        .route("/cars/{id}", put(admin::update_car))
        .route("/cars/{id}", delete(admin::delete_car))
        // User management
        .route("/users", get(admin::list_users))
        .route("/users/{id}", delete(admin::delete_user))
        // Booking management
        .route("/bookings", get(admin::list_bookings))
        .route("/bookings/{id}", delete(admin::delete_booking))
        .route("/bookings/{id}/confirm", put(admin::confirm_booking));

    let gallery = ServeDir::new(&state.config.gallery_dir);

    // Combine all routes
    Router::new()
        .nest("/api", public_routes)
        .route(
            "/api/cart",
            get(cart::get_cart)
                .post(cart::replace_cart)
                .delete(cart::clear_cart),
        )
        .route("/api/cart/remove", delete(cart::remove_item))
        .route("/api/bookings", post(bookings::create_bookings))
        .nest("/api/user", user_routes)
        .nest("/api/admin", admin_routes)
        .nest_service(GALLERY_ROUTE, gallery)
        .with_state(state)
}
