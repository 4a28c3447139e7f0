//! Handlers for the fixed system endpoints.

pub mod docs;
pub mod health;
pub mod home;
