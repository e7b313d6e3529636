//! Infrastructure configuration modules.

pub mod analysis;
pub mod logging;
pub mod settings;

pub use analysis::{AnalysisConfig, BatchConfig};
pub use logging::LoggingConfig;
pub use settings::Config;
