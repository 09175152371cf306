pub mod classifier;
pub mod gate;
pub mod keyword_screen;
pub mod stats;

pub use classifier::{ContentClassifier, OpenAiModerationClient};
pub use gate::ModerationGate;
pub use stats::{ModerationStats, StatsSnapshot};
