//! Infrastructure layer - External service implementations

pub mod artifact;
pub mod cache;
pub mod logging;
pub mod model;
pub mod observability;
pub mod services;
