//! # Counselbook Core
//!
//! Domain types and pure rules for counselor appointment booking: the
//! appointment model, the fixed daily slot schedule, availability derivation
//! and the status lifecycle. Nothing in this crate performs I/O.

pub mod availability;
pub mod errors;
pub mod lifecycle;
pub mod models;
