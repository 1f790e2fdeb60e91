//! HTTP API handlers for emo-scores

pub mod health;
pub mod info;
pub mod scores;
pub mod summary;

pub use health::health_routes;
pub use info::info_routes;
pub use scores::score_routes;
pub use summary::summary_routes;
