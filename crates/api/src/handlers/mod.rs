pub mod appointment;
pub mod availability;
pub mod counselor;
pub mod user;
