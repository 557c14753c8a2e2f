pub mod rental;
pub mod upload;
