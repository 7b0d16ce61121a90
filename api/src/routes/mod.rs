//! API route definitions.
//!
//! This module organizes all HTTP routes for the Querylens API server.

mod configuration;
mod format;
mod health;
mod profiles;

pub use configuration::configuration_routes;
pub use format::format_routes;
pub use health::health_routes;
pub use profiles::profile_routes;
