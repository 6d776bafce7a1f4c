//! Cognition Deploy Core Library
//!
//! This crate provides the configuration, error types, experiment file
//! classification and CI pipeline abstraction shared by the API client and
//! the `cognition-deploy` binary.

pub mod config;
pub mod error;
pub mod files;
pub mod pipeline;

// Re-export commonly used types
pub use config::{repository_name_from_event, DeployConfig, DEFAULT_ENDPOINT};
pub use error::{DeployError, UploadFailure};
pub use files::{is_experiment_file, is_ignored, is_qualifying_file};
pub use pipeline::{GithubActions, MemoryPipeline, Pipeline};
