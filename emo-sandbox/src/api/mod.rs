//! HTTP API handlers for emo-sandbox

pub mod health;
pub mod sandbox;

pub use health::health_routes;
pub use sandbox::sandbox_routes;
