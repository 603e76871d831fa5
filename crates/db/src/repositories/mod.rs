pub mod appointment;
pub mod counselor;
pub mod user;
