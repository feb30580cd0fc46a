//! Domain models for Robin.

pub mod tier;
pub mod user;
