pub mod account;
pub mod availability;
pub mod booking;
pub mod cart;
