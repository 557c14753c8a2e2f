pub mod account;
pub mod admin;
pub mod auth;
pub mod bookings;
pub mod cars;
pub mod cart;

use serde_json::{json, Value};

/// Treat blank strings the same as absent ones.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub(crate) fn message(text: &str) -> Value {
    json!({ "message": text })
}
