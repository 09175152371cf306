pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use config::{Config, Environment};
pub use error::{Result, TrustSafetyError};
pub use models::{ModeratedContent, ModerationInput, ModerationResult};
pub use services::{ModerationGate, ModerationStats};
