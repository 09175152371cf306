pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use config::Config;
pub use error::{AppError, Result};
pub use services::RecommendationService;
