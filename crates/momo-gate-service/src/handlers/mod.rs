//! API handlers.

pub mod gates;
pub mod health;
pub mod unlocks;
