pub mod booking;
pub mod car;
pub mod cart_item;
pub mod user;
