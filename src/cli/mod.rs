// mod.rs - CLI module

pub mod args;
pub mod config;
pub mod merge;
pub mod validation;

// Re-export main types for convenience
pub use args::{parse_args, usage, Args, Invocation};
pub use config::Config;
pub use merge::ResolvedArgs;
pub use validation::{validate_args, ValidationResult};
