//! Robin Core — domain types shared by every Robin service: the
//! persisted user record, the permission tier model and the user store
//! contract.

pub mod error;
pub mod models;
pub mod repository;
