pub mod config;
pub mod types;

// Re-export commonly used types for convenience
pub use config::Config;
pub use types::{Job, Results, TestCase, Verdict};
