pub mod appointment;
pub mod counselor;
pub mod health;
pub mod user;
