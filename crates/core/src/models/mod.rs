pub mod actor;
pub mod appointment;
pub mod directory;
pub mod slot;
